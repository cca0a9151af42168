//! Layered configuration loading.
//!
//! A configuration structure is populated from three sources, each
//! overriding the previous one:
//!
//! 1. defaults declared on the fields
//! 2. JSON files, in the order given, applied field by field (unreadable or
//!    malformed files are skipped)
//! 3. environment variables named `<PREFIX>_<PATH>_<FIELD>`, upper-cased
//!
//! # Modules
//!
//! - `coerce`: string to field-value conversion and custom capabilities
//! - `schema`: per-type field declarations and the `specification!` macro
//! - `walk`: the structure walker behind the default and environment passes
//! - `merge`: the JSON file pass
//! - `env`: environment sources
//! - `loader`: the `Loader` builder and the `process` entry points
//!
//! # Example
//!
//! ```rust
//! use confstack::specification;
//! use std::collections::HashMap;
//! use std::time::Duration;
//!
//! #[derive(Debug, Default)]
//! struct Server {
//!     host: String,
//!     port: u16,
//!     timeout: Duration,
//! }
//!
//! specification!(Server {
//!     host(env = "HOSTNAME", default = "127.0.0.1"),
//!     port(default = "3000"),
//!     timeout(default = "5s"),
//! });
//!
//! #[derive(Debug, Default)]
//! struct Config {
//!     server: Server,
//!     tags: Vec<String>,
//! }
//!
//! specification!(Config { server, tags });
//!
//! let env = HashMap::from([
//!     ("APP_SERVER_PORT".to_string(), "8080".to_string()),
//!     ("APP_TAGS".to_string(), "a,b".to_string()),
//! ]);
//! let config: Config = confstack::Loader::new("app")
//!     .file("app.json")
//!     .environment(env)
//!     .load()?;
//!
//! assert_eq!(config.server.host, "127.0.0.1");
//! assert_eq!(config.server.port, 8080);
//! assert_eq!(config.server.timeout, Duration::from_secs(5));
//! assert_eq!(config.tags, ["a", "b"]);
//! # Ok::<(), confstack::ConfigError>(())
//! ```

pub mod coerce;
pub mod env;
pub mod error;
pub mod loader;
pub mod merge;
pub mod schema;
pub mod walk;

pub use coerce::{coerce, BoxError, CoerceError, Decoder, Setter, TextUnmarshaler, Value};
pub use env::{Environment, ProcessEnv};
pub use error::{ConfigError, ConfigResult, ParseError};
pub use loader::{must_process, process, search_paths, Loader};
pub use schema::{FieldSpec, Specification};
