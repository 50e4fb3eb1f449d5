//! Shared utilities for use cases.
//!
//! Cancellation checking and poison-tolerant locking used by the round,
//! consensus and loop use cases.

use council_domain::CouncilError;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(CouncilError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), CouncilError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(CouncilError::Cancelled);
    }
    Ok(())
}

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// Critical sections never leave registry or ledger state half-updated, so
/// the inner value is still consistent after a poison.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Elapsed milliseconds since `start`, on the tokio clock.
pub(crate) fn elapsed_ms(start: tokio::time::Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
