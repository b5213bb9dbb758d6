//! Utility modules for the auth core
//!
//! - **error**: Error taxonomy and the portal's response contract
//! - **logging**: Tracing subscriber initialization

pub mod error;
pub mod logging;

pub use error::{AuthError, ErrorResponse, InvalidTokenReason, Result};

use std::time::{SystemTime, UNIX_EPOCH};

/// Get current timestamp in seconds
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
