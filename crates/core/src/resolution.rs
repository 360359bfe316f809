//! Argument resolution: binding a token list onto a catalog's descriptors.
//!
//! Resolution happens in two phases. [`Resolution::classify`] walks the tokens
//! once and records, per descriptor, what the user gave; it never fails, so that
//! every token is classified before any error is reported. [`Resolution::commit`]
//! then validates the whole record set and only if everything passes writes the
//! final values onto the target, so a failed commit leaves the target untouched.

use std::collections::VecDeque;

use indexmap::IndexMap;
use log::{debug, info};

use crate::catalog::Catalog;
use crate::descriptor::{Binding, Descriptor, Trigger};
use crate::error::Error::{
    Conversion, MissingExplicitValue, MissingRequired, TriggerValidationFailed, UnresolvedTokens,
};
use crate::error::{ConversionFailure, Result, UnparsedToken};
use crate::tokenizer::{is_switch, split_all, SENTINEL};
use crate::value::{DefaultValueParser, Value, ValueParser};

/// Receiver of resolved values for [`Binding::Member`] descriptors.
pub trait Target {
    fn assign(&mut self, descriptor: &Descriptor, value: Value);
}

/// A [`Target`] that keeps values by descriptor name, in assignment order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap(IndexMap<String, Value>);

impl ValueMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Array elements of `name` rendered as strings; empty when absent.
    #[must_use]
    pub fn get_strings(&self, name: &str) -> Vec<String> {
        self.get(name)
            .and_then(Value::as_array)
            .map(|items| items.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Target for ValueMap {
    fn assign(&mut self, descriptor: &Descriptor, value: Value) {
        self.0.insert(descriptor.name().to_string(), value);
    }
}

/// What one parse learned about one descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    desired: Option<Value>,
    switch: Option<String>,
    failure: Option<ConversionFailure>,
}

impl Record {
    /// The value parsed from the input, if any.
    #[must_use]
    pub fn desired(&self) -> Option<&Value> {
        self.desired.as_ref()
    }

    /// The switch token that named this descriptor, if it was named.
    #[must_use]
    pub fn switch(&self) -> Option<&str> {
        self.switch.as_deref()
    }

    #[must_use]
    pub fn is_touched(&self) -> bool {
        self.switch.is_some()
    }

    /// A literal was consumed for this descriptor, whether or not it converted.
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.desired.is_some() || self.failure.is_some()
    }

    /// Given by the user in any form.
    #[must_use]
    pub fn is_given(&self) -> bool {
        self.is_parsed() || self.is_touched()
    }

    fn set_literal(&mut self, result: std::result::Result<Value, ConversionFailure>) {
        match result {
            Ok(value) => {
                self.desired = Some(value);
                self.failure = None;
            }
            Err(failure) => {
                self.desired = None;
                self.failure = Some(failure);
            }
        }
    }
}

/// The classified state of one token list against one catalog.
#[derive(Debug)]
pub struct Resolution<'a> {
    catalog: &'a Catalog,
    records: IndexMap<&'a str, Record>,
    unparsed: Vec<UnparsedToken>,
}

impl<'a> Resolution<'a> {
    /// Classifies `tokens` with the [`DefaultValueParser`].
    #[must_use]
    pub fn classify(catalog: &'a Catalog, tokens: &[String]) -> Self {
        Self::classify_with(catalog, tokens, &DefaultValueParser)
    }

    /// Classifies `tokens` left to right, converting literals with `parser`.
    #[must_use]
    pub fn classify_with(catalog: &'a Catalog, tokens: &[String], parser: &dyn ValueParser) -> Self {
        let mut resolution = Self {
            catalog,
            records: catalog
                .iter()
                .map(|descriptor| (descriptor.name(), Record::default()))
                .collect(),
            unparsed: Vec::new(),
        };

        let variadic = catalog.variadic();
        let mut pending: Vec<String> = Vec::new();
        let mut queue: VecDeque<String> = tokens.iter().cloned().collect();

        while let Some(token) = queue.pop_front() {
            if let Some(descriptor) = catalog.by_pattern(&token) {
                let takes_value = queue.front().is_some_and(|next| {
                    !next.is_empty()
                        && next != SENTINEL
                        && !is_switch(next)
                        && catalog.by_pattern(next).is_none()
                });

                let record = resolution.record_mut(descriptor);
                if takes_value {
                    if let Some(literal) = queue.pop_front() {
                        debug!("`{token}` takes value `{literal}`");
                        record.set_literal(parser.parse_scalar(descriptor, &literal));
                    }
                } else {
                    debug!("`{token}` given without a value");
                    record.desired = None;
                    record.failure = None;
                }
                record.switch = Some(token);
            } else if token == SENTINEL {
                if variadic.is_some() {
                    debug!("Routing {} tokens after `{SENTINEL}` to variadic", queue.len());
                    pending.extend(queue.drain(..));
                } else {
                    resolution.unparsed.extend(queue.drain(..).map(|token| UnparsedToken {
                        token,
                        value: None,
                    }));
                }
            } else if is_switch(&token) {
                debug!("Unknown switch `{token}`");
                resolution.unparsed.push(UnparsedToken { token, value: None });
            } else if let Some(descriptor) = resolution.positional_target() {
                debug!("Binding `{token}` to `{}`", descriptor.name());
                let result = parser.parse_scalar(descriptor, &token);
                resolution.record_mut(descriptor).set_literal(result);
            } else if variadic.is_some() {
                pending.push(token);
            } else {
                let pairs = queue
                    .front()
                    .is_some_and(|next| next != SENTINEL && !is_switch(next));
                let value = if pairs { queue.pop_front() } else { None };
                debug!("Unresolved token `{token}`");
                resolution.unparsed.push(UnparsedToken { token, value });
            }
        }

        if let Some(variadic) = variadic {
            if !pending.is_empty() {
                let result = parser.parse_array(variadic, &pending);
                resolution.record_mut(variadic).set_literal(result);
            }
        }

        resolution
    }

    fn record_mut(&mut self, descriptor: &'a Descriptor) -> &mut Record {
        self.records.entry(descriptor.name()).or_default()
    }

    #[must_use]
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    #[must_use]
    pub fn record(&self, name: &str) -> Option<&Record> {
        self.records.get(name)
    }

    /// Descriptors paired with their records, in catalog order.
    pub fn records(&self) -> impl Iterator<Item = (&'a Descriptor, &Record)> + '_ {
        self.catalog
            .iter()
            .filter_map(|descriptor| self.records.get(descriptor.name()).map(|r| (descriptor, r)))
    }

    #[must_use]
    pub fn unparsed(&self) -> &[UnparsedToken] {
        &self.unparsed
    }

    /// The descriptor the next plain token would bind to by position.
    #[must_use]
    pub fn positional_target(&self) -> Option<&'a Descriptor> {
        self.catalog.iter().find(|descriptor| {
            descriptor.is_required()
                && !descriptor.is_explicit()
                && !descriptor.is_variadic()
                && !self
                    .records
                    .get(descriptor.name())
                    .is_some_and(Record::is_parsed)
        })
    }

    /// Checks everything that can fail, without touching any target.
    ///
    /// # Errors
    ///
    /// In order: [`UnresolvedTokens`], [`Conversion`], then per descriptor
    /// [`MissingExplicitValue`] or [`MissingRequired`].
    pub fn validate(&self) -> Result<()> {
        if !self.unparsed.is_empty() {
            return Err(UnresolvedTokens(self.unparsed.clone()));
        }

        let failures: Vec<ConversionFailure> = self
            .records
            .values()
            .filter_map(|record| record.failure.clone())
            .collect();
        if !failures.is_empty() {
            return Err(Conversion(failures));
        }

        for (descriptor, record) in self.records() {
            if descriptor.is_explicit()
                && record.is_touched()
                && record.desired.is_none()
                && descriptor.explicit_value().is_none()
            {
                return Err(MissingExplicitValue {
                    name: descriptor.display_name(),
                });
            }

            if record.is_given() {
                continue;
            }

            if descriptor.is_required() {
                if !descriptor.is_explicit() && descriptor.default_value().is_some() {
                    continue;
                }
                return Err(MissingRequired {
                    name: descriptor.display_name(),
                });
            }
        }

        Ok(())
    }

    /// The value every descriptor would receive, in catalog order.
    #[must_use]
    pub fn final_values(&self) -> Vec<(&'a Descriptor, Value)> {
        self.records()
            .map(|(descriptor, record)| (descriptor, final_value(descriptor, record)))
            .collect()
    }

    fn validate_triggers(&self, values: &[(&'a Descriptor, Value)]) -> Result<()> {
        let value_of = |name: &str| {
            values
                .iter()
                .find(|(descriptor, _)| descriptor.name() == name)
                .map(|(_, value)| value)
        };
        let is_given = |name: &str| self.records.get(name).is_some_and(Record::is_given);

        for (descriptor, record) in self.records() {
            if !record.is_given() {
                continue;
            }

            for trigger in descriptor.triggers() {
                let other = trigger.target();
                let other_name = self
                    .catalog
                    .get(other)
                    .map_or_else(|| other.to_string(), Descriptor::display_name);

                let reason = match trigger {
                    Trigger::Requires(_) if !is_given(other) => {
                        Some(format!("it requires {other_name}"))
                    }
                    Trigger::Conflicts(_) if is_given(other) => {
                        Some(format!("it cannot be used with {other_name}"))
                    }
                    Trigger::RequiresValue { value, .. } if value_of(other) != Some(value) => {
                        Some(format!("it requires {other_name} to be `{value}`"))
                    }
                    _ => None,
                };

                if let Some(reason) = reason {
                    return Err(TriggerValidationFailed {
                        name: descriptor.display_name(),
                        reason,
                    });
                }
            }
        }

        Ok(())
    }

    /// Validates and, only if everything passes, writes every final value.
    ///
    /// # Errors
    ///
    /// Any error of [`Resolution::validate`], or [`TriggerValidationFailed`].
    /// The target is not modified when an error is returned.
    pub fn commit(self, target: &mut dyn Target) -> Result<()> {
        self.validate()?;

        let values = self.final_values();
        self.validate_triggers(&values)?;

        info!("Committing {} argument values", values.len());
        for (descriptor, value) in values {
            match descriptor.binding() {
                Binding::Member => target.assign(descriptor, value),
                Binding::Shared(slot) => slot.set(value),
            }
        }

        Ok(())
    }
}

/// `desired`, then the default, then the explicit value, then the init value,
/// then the zero value of the kind.
fn final_value(descriptor: &Descriptor, record: &Record) -> Value {
    if let Some(desired) = &record.desired {
        return desired.clone();
    }

    let touched = record.is_touched();

    if !descriptor.is_explicit() || touched {
        if let Some(default) = descriptor.default_value() {
            return default.clone();
        }
    }

    if touched {
        if let Some(explicit) = descriptor.explicit_value() {
            return explicit.clone();
        }
    }

    if let Some(init) = descriptor.init_value() {
        return init.clone();
    }

    descriptor.zero_value()
}

/// Classifies `tokens` against `catalog` and commits the result onto `target`.
///
/// # Errors
///
/// See [`Resolution::commit`].
pub fn resolve(catalog: &Catalog, tokens: &[String], target: &mut dyn Target) -> Result<()> {
    Resolution::classify(catalog, tokens).commit(target)
}

/// Like [`resolve`], splitting `line` with [`split_all`] first.
///
/// # Errors
///
/// See [`Resolution::commit`].
pub fn resolve_line(catalog: &Catalog, line: &str, target: &mut dyn Target) -> Result<()> {
    resolve(catalog, &split_all(line), target)
}
