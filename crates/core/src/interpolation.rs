use std::collections::{HashMap, HashSet};

use leon::Template;

use crate::error::Result;

/// Key substituted with the current directory.
pub const CWD_KEY: &str = "cwd";
/// Key substituted with the user name.
pub const USER_KEY: &str = "user";

/// Values available to prompt templates.
#[must_use]
pub fn prompt_values(cwd: &str, user: &str) -> HashMap<&'static str, String> {
    HashMap::from([(CWD_KEY, cwd.to_string()), (USER_KEY, user.to_string())])
}

/// Keys referenced by a template.
pub fn get_keys(template: &str) -> Result<HashSet<String>> {
    let template = Template::parse(template)?;
    Ok(template.keys().map(|key| (*key).to_string()).collect())
}

/// Renders a prompt template. A template without keys is returned unchanged.
pub fn render_prompt(template: &str, values: &HashMap<&'static str, String>) -> Result<String> {
    let template = Template::parse(template)?;
    Ok(template.render(values)?)
}
