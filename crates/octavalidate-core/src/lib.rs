//! octavalidate core
//!
//! A declarative payload-validation engine. A schema describes constraints
//! on named fields and on named file uploads; a [`Validator`] checks JSON
//! payloads against it and keeps a structured, per-field, per-rule error
//! [`Report`].
//!
//! ## Features
//!
//! - **Schema compilation**: unknown rule keys and malformed rule values are
//!   rejected up front, atomically
//! - **Semantic patterns**: built-in `ruleTitle` checks such as `email`,
//!   `userName` or `strongPassword`, plus caller-registered custom patterns
//! - **File rules**: file count, size (`"5MB"`) and MIME type checks
//! - **Strict mode**: prohibited-word filtering and case-sensitive `matches`
//! - **Self-cleaning reports**: a rule that passes clears its previous failure
//!
//! ## Architecture
//!
//! 1. **Patterns** (`patterns`): built-in semantic rules and custom patterns.
//! 2. **Size** (`size`): human-readable byte sizes.
//! 3. **Schema** (`schema`): compiles rule sets into rule objects.
//! 4. **Engine** (`engine`): the executor, the rule framework and the
//!    [`Validator`] facade.
//! 5. **Report** (`report`): session → field → rule → message.
//!
//! ## Example
//!
//! ```rust
//! use octavalidate_core::{RuleKey, Validator};
//! use serde_json::json;
//!
//! let mut validator = Validator::new("login").unwrap();
//! validator
//!     .compile(&json!({
//!         "username": { "required": true, "ruleTitle": "userName" },
//!         "avatar": { "type": "file", "maxFileSize": "2MB", "mimeType": "image/*" }
//!     }))
//!     .unwrap();
//!
//! let payload = json!({
//!     "username": "user_!@#",
//!     "avatar": { "name": "me.png", "size": 1024, "mimetype": "image/png" }
//! });
//! assert!(!validator.validate(&payload).unwrap());
//!
//! let report = validator.get_errors();
//! assert!(report.message("login", "username", RuleKey::RuleTitle).is_some());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod patterns;
pub mod report;
pub mod schema;
pub mod size;
pub mod value;

mod ordered;

pub use config::{ValidatorOptions, ValidatorOptionsBuilder, DEFAULT_PROHIBITED_WORDS};
pub use engine::rules::{FileRule, RuleContext, ValueRule, Verdict};
pub use engine::{Executor, Validator, FIELD_NOT_FOUND};
pub use error::{EngineError, Result};
pub use patterns::{compile_pattern, PatternLibrary, PatternMatcher, SemanticRule};
pub use report::{FieldErrors, Report, SessionErrors};
pub use schema::{FieldKind, RuleKey, Schema, ValueType};
pub use size::{parse_size, ByteSize};
pub use value::{FieldValue, FileDescriptor, FileSet};

/// Crate version (from Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
