//! Read-only session observer.

pub mod observer;

pub use observer::{Observer, ObserverReport};
