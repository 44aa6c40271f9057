//! Reload host trait and implementations.
//!
//! The `ReloadHost` trait abstracts over whatever hosts the extension and
//! can reload it. The coordinator never reloads anything itself; it asks
//! its host, and treats failures as log-and-continue.

use extauth_core::Result;

/// Trait for hosts that can reload the running extension contexts.
pub trait ReloadHost: Send + Sync {
    /// Reload the page and every context attached to it.
    /// Called after the logout acknowledgment has already been sent, so
    /// errors are logged by the caller and never surfaced.
    fn reload(&self) -> Result<()>;
}

/// Placeholder host that accepts reload requests and does nothing.
pub struct NoopReloadHost;

impl ReloadHost for NoopReloadHost {
    fn reload(&self) -> Result<()> {
        Ok(())
    }
}
