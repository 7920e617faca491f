//! @ai:module:intent Signature-file API compatibility checker library
//! @ai:module:layer infrastructure
//! @ai:module:public_api model, parser, nullness, diff, diagnostic, writer, config, output, error
//! @ai:module:stateless true
//!
//! # sigcheck
//!
//! Parses textual API signature files into a structural model and reports
//! changes between two releases that would break existing callers: removed
//! packages, classes and members, changed declarations, and nullness
//! regressions.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sigcheck::{diff, output, parse_file, ParseOptions};
//! use std::path::Path;
//!
//! let options = ParseOptions::default();
//! let previous = parse_file(Path::new("api/released.txt"), &options).unwrap();
//! let current = parse_file(Path::new("api/current.txt"), &options).unwrap();
//!
//! let diagnostics = diff(&previous, &current).unwrap();
//! println!("{}", output::format_diagnostics(&diagnostics, output::OutputFormat::Text));
//! ```

pub mod config;
pub mod diagnostic;
pub mod diff;
pub mod error;
pub mod lexer;
pub mod model;
pub mod nullness;
pub mod output;
pub mod parser;
pub mod writer;

pub use config::{CheckConfig, ParseConfig, Policy};
pub use diagnostic::{Diagnostic, Diagnostics, Issue, Severity};
pub use diff::{diff, diff_files, diff_many};
pub use error::{Error, Result};
pub use model::{
    ApiModel, ClassItem, ClassKind, ConstructorItem, FieldItem, Location, Member, MemberKey,
    MethodItem, Modifiers, NullMode, Nullability, PackageItem, Parameter, TypeRef,
    UnresolvedReference, Visibility,
};
pub use nullness::{compatible, Regression, Role, Verdict};
pub use output::{format_diagnostics, format_model, to_json, OutputFormat};
pub use parser::{parse_file, parse_signature, ParseOptions};
pub use writer::write_signature;
