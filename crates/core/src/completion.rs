//! Completion candidates for a partially typed argument list.

use log::debug;

use crate::catalog::Catalog;
use crate::descriptor::{Descriptor, LONG_DELIMITER, SHORT_DELIMITER};
use crate::resolution::Resolution;

/// Source of free-form value candidates, e.g. file-system names.
pub trait ValueCompleter {
    /// Candidates for `fragment`, the value about to be given to `descriptor`.
    /// `descriptor` is `None` when no descriptor would receive a plain token.
    fn complete(&self, descriptor: Option<&Descriptor>, fragment: &str) -> Vec<String>;
}

/// A [`ValueCompleter`] that never offers anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoValues;

impl ValueCompleter for NoValues {
    fn complete(&self, _descriptor: Option<&Descriptor>, _fragment: &str) -> Vec<String> {
        Vec::new()
    }
}

/// The descriptor a plain token typed now would bind to: the first required
/// implicit one still unbound, else the variadic one.
#[must_use]
pub fn value_target<'a>(resolution: &Resolution<'a>) -> Option<&'a Descriptor> {
    resolution
        .positional_target()
        .or_else(|| resolution.catalog().variadic())
}

/// Candidates for `fragment` given the tokens that precede it.
///
/// Switch fragments complete to the patterns of descriptors that were neither
/// named nor bound by `partial_tokens`. Anything else is handed to `values`.
/// Candidates are not filtered by the fragment and come back in catalog order.
pub fn complete(
    catalog: &Catalog,
    partial_tokens: &[String],
    fragment: &str,
    values: &dyn ValueCompleter,
) -> Vec<String> {
    let resolution = Resolution::classify(catalog, partial_tokens);

    let pattern_of: Option<fn(&Descriptor) -> Option<&str>> =
        if fragment.starts_with(LONG_DELIMITER) {
            Some(Descriptor::long_pattern)
        } else if fragment.starts_with(SHORT_DELIMITER) {
            Some(Descriptor::short_pattern)
        } else {
            None
        };

    match pattern_of {
        Some(pattern_of) => {
            let candidates: Vec<String> = resolution
                .records()
                .filter(|(descriptor, record)| descriptor.is_variadic() || !record.is_given())
                .filter_map(|(descriptor, _)| pattern_of(descriptor).map(ToString::to_string))
                .collect();
            debug!("{} switch candidates for `{fragment}`", candidates.len());
            candidates
        }
        None => {
            let target = value_target(&resolution);
            debug!(
                "Completing value for {}",
                target.map_or("no descriptor".to_string(), Descriptor::display_name)
            );
            values.complete(target, fragment)
        }
    }
}
