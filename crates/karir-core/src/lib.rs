//! Karir Core - RIASEC domain, preferences, configuration, and error handling

pub mod config;
pub mod error;
pub mod preferences;
pub mod riasec;
pub mod types;

pub use config::KarirConfig;
pub use error::{Error, Result};
pub use preferences::{PreferenceSet, SharedPreferences};
pub use riasec::*;
pub use types::SessionKey;
