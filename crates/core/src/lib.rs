//! Argline Core Library
//!
//! This crate binds command-line tokens onto declared arguments. A command
//! describes its arguments as a [`catalog::Catalog`] of
//! [`descriptor::Descriptor`]s; the resolution engine classifies a token list
//! against it and commits the final values onto a [`resolution::Target`].
//!
//! # Key Features
//!
//! - **Positional and named arguments**: required implicit arguments bind by
//!   position, explicit ones through `--long` or `-s` switches
//! - **Variadic arguments**: residual tokens, including everything after `--`
//! - **Value precedence**: given value, then default, explicit, init and zero values
//! - **All-or-nothing commit**: nothing is written unless every check passes
//! - **Completion**: switch and value candidates for a partially typed line
//! - **Shell configuration**: YAML config, history persistence and prompt templates
//!
//! # Examples
//!
//! ```
//! use argline_core::catalog::Catalog;
//! use argline_core::descriptor::Descriptor;
//! use argline_core::resolution::{resolve_line, ValueMap};
//!
//! let catalog = Catalog::builder()
//!     .descriptor(Descriptor::builder("path").required().default_value("").build())
//!     .descriptor(Descriptor::builder("message").short('m').long("message").required().build())
//!     .build()?;
//!
//! let mut values = ValueMap::new();
//! resolve_line(&catalog, "notes.txt -m \"editing now\"", &mut values)?;
//! assert_eq!(values.get_str("path"), Some("notes.txt"));
//! assert_eq!(values.get_str("message"), Some("editing now"));
//! # Ok::<(), argline_core::error::Error>(())
//! ```

pub mod catalog;
pub mod completion;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod file_handling;
pub mod interpolation;
pub mod resolution;
pub mod tokenizer;
pub mod value;
