//! The ordered set of descriptors a command binds against.

use indexmap::IndexMap;
use log::debug;

use crate::descriptor::Descriptor;
use crate::error::Error::{
    DuplicateName, DuplicatePattern, InvalidDescriptor, MultipleVariadic, UnknownTriggerTarget,
};
use crate::error::Result;

/// An immutable, ordered collection of [`Descriptor`]s.
///
/// Order matters: positional tokens bind to required implicit descriptors in
/// catalog order, and validation reports the first failing descriptor in
/// catalog order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    descriptors: IndexMap<String, Descriptor>,
    patterns: IndexMap<String, String>,
}

impl Catalog {
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Descriptor> {
        self.descriptors.get(name)
    }

    /// Looks up the explicit descriptor whose long or short pattern is `pattern`.
    #[must_use]
    pub fn by_pattern(&self, pattern: &str) -> Option<&Descriptor> {
        self.patterns
            .get(pattern)
            .and_then(|name| self.descriptors.get(name))
    }

    /// The descriptor that absorbs residual tokens, if there is one.
    #[must_use]
    pub fn variadic(&self) -> Option<&Descriptor> {
        self.descriptors.values().find(|d| d.is_variadic())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Descriptor;
    type IntoIter = indexmap::map::Values<'a, String, Descriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.values()
    }
}

#[derive(Debug, Default)]
pub struct CatalogBuilder {
    descriptors: Vec<Descriptor>,
}

impl CatalogBuilder {
    #[must_use]
    pub fn descriptor(mut self, descriptor: Descriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Validates the descriptors and freezes them into a [`Catalog`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a name is empty, contains whitespace, or is used twice
    /// - a switch pattern is used by two descriptors
    /// - more than one descriptor is variadic, or a variadic one has switches
    /// - a trigger refers to a descriptor that does not exist
    pub fn build(self) -> Result<Catalog> {
        let mut descriptors: IndexMap<String, Descriptor> = IndexMap::new();
        let mut patterns: IndexMap<String, String> = IndexMap::new();
        let mut variadic: Option<String> = None;

        for descriptor in self.descriptors {
            let name = descriptor.name().to_string();
            validate_name(&name)?;

            if descriptors.contains_key(&name) {
                return Err(DuplicateName(name));
            }

            if descriptor.is_variadic() {
                if descriptor.is_explicit() {
                    return Err(InvalidDescriptor(
                        name,
                        "a variadic descriptor cannot have switches".to_string(),
                    ));
                }
                if let Some(existing) = &variadic {
                    return Err(MultipleVariadic(existing.clone(), name));
                }
                variadic = Some(name.clone());
            }

            for pattern in [descriptor.long_pattern(), descriptor.short_pattern()]
                .into_iter()
                .flatten()
            {
                if let Some(first) = patterns.get(pattern) {
                    return Err(DuplicatePattern {
                        pattern: pattern.to_string(),
                        first: first.clone(),
                        second: name,
                    });
                }
                patterns.insert(pattern.to_string(), name.clone());
            }

            descriptors.insert(name, descriptor);
        }

        for descriptor in descriptors.values() {
            for trigger in descriptor.triggers() {
                if !descriptors.contains_key(trigger.target()) {
                    return Err(UnknownTriggerTarget(
                        descriptor.name().to_string(),
                        trigger.target().to_string(),
                    ));
                }
            }
        }

        debug!(
            "Built catalog with {} descriptors and {} switch patterns",
            descriptors.len(),
            patterns.len()
        );

        Ok(Catalog {
            descriptors,
            patterns,
        })
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(InvalidDescriptor(
            name.to_string(),
            "name may not be empty".to_string(),
        ));
    }

    if name.chars().any(char::is_whitespace) {
        return Err(InvalidDescriptor(
            name.to_string(),
            "name may not contain whitespace".to_string(),
        ));
    }

    Ok(())
}
