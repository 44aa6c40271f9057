//! Session Coordinator and its reload host seam.

pub mod coordinator;
pub mod reload;

pub use coordinator::{CoordinatorHandle, SessionCoordinator};
pub use reload::{NoopReloadHost, ReloadHost};
