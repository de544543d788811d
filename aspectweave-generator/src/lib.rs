//! # aspectweave-generator
//!
//! Compile-time half of aspectweave. Given a symbolic model of a crate
//! ([`model::Compilation`]) it finds every call to a method carrying aspect
//! attributes, decides whether the call can be rewritten, and renders one
//! interceptor per distinct call site.
//!
//! ```rust
//! use aspectweave_generator::{CollectingSink, WeaverConfig, WeavingGenerator};
//! use aspectweave_generator::model::Compilation;
//!
//! let unit = Compilation::from_json(r#"{ "crate_name": "app" }"#)?;
//! let sink = CollectingSink::new();
//! let output = WeavingGenerator::new(WeaverConfig::default()).run(&unit, &sink)?;
//! assert!(output.file.is_none());
//! # Ok::<(), aspectweave_generator::GeneratorError>(())
//! ```

pub mod access;
pub mod call_site;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod emit;
pub mod error;
pub mod generator;
pub mod model;
pub mod synthesis;
pub mod validate;

pub use call_site::{CallSite, CallSiteId};
pub use config::{ConfigBound, WeaverConfig};
pub use diagnostics::{Classification, CollectingSink, Diagnostic, DiagnosticSink, Severity};
pub use discovery::{AppliedAspectSet, AspectInfo, find_applicable_aspects};
pub use emit::{Emitter, GeneratedFile};
pub use error::{GeneratorError, Result};
pub use generator::{GeneratorOutput, WeavingGenerator};
pub use validate::{Validator, Verdict};
