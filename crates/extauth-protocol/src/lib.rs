//! Action-tagged request/reply contract between extension contexts.
//!
//! The page and content contexts never touch the coordinator's state
//! directly; everything crosses this boundary as JSON-shaped messages with
//! camelCase fields, matching the `chrome.runtime` message surface the
//! extension presents to its scripts.

pub mod message;

pub use message::{Ack, LogReceipt, Message, Response};
