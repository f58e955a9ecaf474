//! Record models cached by consumers of the expiring cache
//!
//! These are the denormalized shapes stored as cache values.

pub mod user;

pub use user::{RemoteUser, ServerUser};
