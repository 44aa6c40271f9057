//! Session state, token codec, errors, configuration.

pub mod config;
pub mod error;
pub mod session;
pub mod token;

pub use config::{DataPaths, ExtAuthConfig};
pub use error::{Error, Result};
pub use session::SessionState;
