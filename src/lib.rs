//! Thin typed-argument layer over clap.
//!
//! Fields are declared up front (name, kind, optional default) together with
//! a doc text whose `:field_name: description` lines become per-argument help.
//! A schema built from those declarations registers one `--<field>` option
//! per field, required when the field has no default. Parsing validates every
//! bound value against its declared kind with exact equality, copies values
//! into a [`ParsedArgs`] record, runs the optional [`Hooks`], and can
//! serialize the final values plus a reproducibility block to indented,
//! key-sorted JSON.
//!
//! ```
//! use typed_args::{FieldDecl, FieldKind, FieldValue, Schema, TypedParser};
//!
//! let schema = Schema::builder()
//!     .doc("Trains a model.\n\n:lr: learning rate\n:epochs: number of passes")
//!     .field(FieldDecl::new("lr", FieldKind::Float))
//!     .field(FieldDecl::new("epochs", FieldKind::Int).default(FieldValue::Int(10)))
//!     .build()?;
//! let args = TypedParser::new("train", schema).parse_from(["train", "--lr", "0.01"])?;
//! assert_eq!(args.get_float("lr"), Some(0.01));
//! assert_eq!(args.get_int("epochs"), Some(10));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod docstring;
mod error;
mod parsed;
mod parser;
mod reproducibility;
mod schema;

pub use error::{Error, Mismatch, SchemaError, ValidationError};
pub use parsed::ParsedArgs;
pub use parser::{Hooks, TypedParser};
pub use reproducibility::{GitStatus, RunContext};
pub use schema::{ArgSpec, FieldDecl, FieldKind, FieldValue, Schema, SchemaBuilder};
