//! Bindable argument descriptors.
//!
//! A [`Descriptor`] is the metadata and value slots of one bindable member of a
//! target. Descriptors are built with [`DescriptorBuilder`] and then handed to a
//! [`crate::catalog::CatalogBuilder`]; once the catalog exists they never change.

use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};

use crate::value::{Value, ValueKind};

/// Prefix of long switch patterns, e.g. `--message`.
pub const LONG_DELIMITER: &str = "--";
/// Prefix of short switch patterns, e.g. `-m`.
pub const SHORT_DELIMITER: &str = "-";

/// Storage shared between every target, the equivalent of a static member.
#[derive(Debug, Clone, Default)]
pub struct SharedSlot(Arc<Mutex<Option<Value>>>);

impl SharedSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> Option<Value> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn set(&self, value: Value) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }
}

/// Where a resolved value is written to.
#[derive(Debug, Clone, Default)]
pub enum Binding {
    /// A member of the target passed to the commit.
    #[default]
    Member,
    /// A slot shared by all targets.
    Shared(SharedSlot),
}

/// Inter-descriptor consistency rule, checked only when the owner was touched.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// The named descriptor must also be given.
    Requires(String),
    /// The named descriptor must not be given.
    Conflicts(String),
    /// The named descriptor must resolve to this value.
    RequiresValue { name: String, value: Value },
}

impl Trigger {
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Trigger::Requires(name) | Trigger::Conflicts(name) => name,
            Trigger::RequiresValue { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Descriptor {
    name: String,
    long_pattern: Option<String>,
    short_pattern: Option<String>,
    kind: ValueKind,
    required: bool,
    explicit: bool,
    variadic: bool,
    default_value: Option<Value>,
    explicit_value: Option<Value>,
    init_value: Option<Value>,
    binding: Binding,
    triggers: Vec<Trigger>,
    description: Option<String>,
}

impl Descriptor {
    /// Starts a string-valued, optional, implicit descriptor named `name`.
    #[must_use]
    pub fn builder(name: &str) -> DescriptorBuilder {
        DescriptorBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn long_pattern(&self) -> Option<&str> {
        self.long_pattern.as_deref()
    }

    #[must_use]
    pub fn short_pattern(&self) -> Option<&str> {
        self.short_pattern.as_deref()
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    #[must_use]
    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    #[must_use]
    pub fn explicit_value(&self) -> Option<&Value> {
        self.explicit_value.as_ref()
    }

    #[must_use]
    pub fn init_value(&self) -> Option<&Value> {
        self.init_value.as_ref()
    }

    #[must_use]
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether `token` is exactly one of this descriptor's switch patterns.
    #[must_use]
    pub fn matches_pattern(&self, token: &str) -> bool {
        self.long_pattern.as_deref() == Some(token) || self.short_pattern.as_deref() == Some(token)
    }

    /// Name used in messages: the long pattern, else the short one, else the name.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.long_pattern
            .clone()
            .or_else(|| self.short_pattern.clone())
            .unwrap_or_else(|| self.name.clone())
    }

    /// Value of last resort when nothing was given and no slot applies.
    #[must_use]
    pub fn zero_value(&self) -> Value {
        if self.variadic {
            Value::Array(Vec::new())
        } else {
            self.kind.zero()
        }
    }
}

impl Display for Descriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}`", self.display_name())?;

        if let Some(desc) = &self.description {
            write!(f, " ({desc})")?;
        }

        Ok(())
    }
}

/// Builder for [`Descriptor`].
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    descriptor: Descriptor,
}

impl DescriptorBuilder {
    fn new(name: &str) -> Self {
        Self {
            descriptor: Descriptor {
                name: name.to_string(),
                long_pattern: None,
                short_pattern: None,
                kind: ValueKind::Str,
                required: false,
                explicit: false,
                variadic: false,
                default_value: None,
                explicit_value: None,
                init_value: None,
                binding: Binding::Member,
                triggers: Vec::new(),
                description: None,
            },
        }
    }

    /// Sets the long switch name; `message` and `--message` are equivalent.
    /// Giving a switch makes the descriptor explicit.
    #[must_use]
    pub fn long(mut self, name: &str) -> Self {
        let name = name.trim_start_matches('-');
        self.descriptor.long_pattern = Some(format!("{LONG_DELIMITER}{name}"));
        self.descriptor.explicit = true;
        self
    }

    /// Sets the short switch character. Giving a switch makes the descriptor explicit.
    #[must_use]
    pub fn short(mut self, c: char) -> Self {
        self.descriptor.short_pattern = Some(format!("{SHORT_DELIMITER}{c}"));
        self.descriptor.explicit = true;
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.descriptor.kind = kind;
        self
    }

    /// A boolean switch that becomes `true` when given without a value.
    #[must_use]
    pub fn flag(mut self) -> Self {
        self.descriptor.kind = ValueKind::Bool;
        self.descriptor.explicit_value = Some(Value::Bool(true));
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.descriptor.required = true;
        self
    }

    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.descriptor.variadic = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.descriptor.default_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn explicit_value(mut self, value: impl Into<Value>) -> Self {
        self.descriptor.explicit_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn init_value(mut self, value: impl Into<Value>) -> Self {
        self.descriptor.init_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn shared(mut self, slot: SharedSlot) -> Self {
        self.descriptor.binding = Binding::Shared(slot);
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.descriptor.triggers.push(trigger);
        self
    }

    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.descriptor.description = Some(description.to_string());
        self
    }

    #[must_use]
    pub fn build(self) -> Descriptor {
        self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let path = Descriptor::builder("path").build();
        assert_eq!(path.name(), "path");
        assert_eq!(path.kind(), ValueKind::Str);
        assert!(!path.is_required());
        assert!(!path.is_explicit());
        assert!(!path.is_variadic());
        assert!(path.default_value().is_none());
        assert!(matches!(path.binding(), Binding::Member));
    }

    #[test]
    fn test_switches_make_descriptor_explicit() {
        let message = Descriptor::builder("message")
            .short('m')
            .long("message")
            .build();
        assert!(message.is_explicit());
        assert_eq!(message.long_pattern(), Some("--message"));
        assert_eq!(message.short_pattern(), Some("-m"));
        assert!(message.matches_pattern("-m"));
        assert!(message.matches_pattern("--message"));
        assert!(!message.matches_pattern("message"));
    }

    #[test]
    fn test_long_accepts_leading_dashes() {
        let verbose = Descriptor::builder("verbose").long("--verbose").build();
        assert_eq!(verbose.long_pattern(), Some("--verbose"));
    }

    #[test]
    fn test_flag_sets_explicit_value() {
        let force = Descriptor::builder("force").long("force").flag().build();
        assert_eq!(force.kind(), ValueKind::Bool);
        assert_eq!(force.explicit_value(), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_display_name_and_display() {
        let rest = Descriptor::builder("rest").variadic().build();
        assert_eq!(rest.display_name(), "rest");
        assert_eq!(rest.zero_value(), Value::Array(Vec::new()));

        let message = Descriptor::builder("message")
            .short('m')
            .description("Lock comment")
            .build();
        assert_eq!(message.display_name(), "-m");
        assert_eq!(format!("{message}"), "`-m` (Lock comment)");
    }

    #[test]
    fn test_shared_slot_is_shared_between_clones() {
        let slot = SharedSlot::new();
        let descriptor = Descriptor::builder("level").shared(slot.clone()).build();

        if let Binding::Shared(inner) = descriptor.binding() {
            inner.set(Value::Int(3));
        }
        assert_eq!(slot.get(), Some(Value::Int(3)));
    }

    #[test]
    fn test_trigger_target() {
        assert_eq!(Trigger::Requires("a".to_string()).target(), "a");
        let trigger = Trigger::RequiresValue {
            name: "b".to_string(),
            value: Value::Bool(true),
        };
        assert_eq!(trigger.target(), "b");
    }
}
