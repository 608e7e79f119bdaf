//! Shared types: the error taxonomy, the record-type enum, and the
//! ambient config layer used by both the DNSSEC engine and the CLI.
pub mod config;
pub mod errors;
pub mod record_type;

pub use config::{Config, ConfigError, TrustAnchorEntry};
pub use errors::TrustWalkError;
pub use record_type::RecordType;
