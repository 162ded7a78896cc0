//! Utility modules
//!
//! Helpers shared by the provider implementation.

pub mod mime;
