//! Retry module
//! - policy.rs: generic policy-based retries
//! - backoff.rs: backoff crate-based retries

pub mod backoff;
pub mod policy;

pub use self::backoff::*;
pub use self::policy::*;
