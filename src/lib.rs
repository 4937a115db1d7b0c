//! Compile [JSON Type Definition](https://jsontypedef.com) schemas into
//! reusable validators, with optional extensions that tighten what a schema
//! may say.
//!
//! ```
//! use serde_json::json;
//! use jtdx::{compile, extensions, CompilationOptions};
//!
//! let schema = json!({
//!     "properties": {
//!         "name": { "type": "string" },
//!         "tags": {
//!             "elements": { "type": "string" },
//!             "x:checks": { "uniqueElements": true },
//!         },
//!     },
//! });
//!
//! let options = CompilationOptions::new().with_extension(extensions::X_CHECKS);
//! let validator = compile(&schema, &options).unwrap();
//!
//! assert!(validator.validate(&json!({ "name": "a", "tags": ["x", "y"] })).is_ok());
//!
//! let errors = validator
//!     .validate(&json!({ "name": "a", "tags": ["x", "x"] }))
//!     .unwrap_err();
//! assert_eq!(vec!["tags"], errors[0].instance_path);
//! ```

mod compile;
mod errors;
mod extension;
pub mod extensions;
mod form;
mod graph;
mod hooks;
mod json_type;
mod rfc3339;
mod schema_keys;
mod validator;

pub use compile::*;
pub use errors::*;
pub use extension::*;
pub use form::*;
pub use hooks::*;
pub use json_type::JsonType;
pub use rfc3339::is_rfc3339;
pub use validator::*;
