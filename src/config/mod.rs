//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file)
//!     → command-line flags and positional target (main.rs)
//!     → validation.rs (semantic checks)
//!     → AwaitConfig::poll_params() → poll engine
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Validation runs once, after every source has been merged

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AwaitConfig;
pub use validation::{validate_config, ValidationError};
