//! Error boundary for behavior hooks and a retry helper.
//!
//! A failing hook (returned error or panic) is logged and reported as a
//! no-op so a single misbehaving buff cannot halt the turn pipeline.

use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

use tracing::{error, warn};

use super::behavior::{BuffHook, HookResult};

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Runs `hook_fn` and reports whether it completed successfully.
pub fn guard<F>(hook: BuffHook, instance_id: &str, hook_fn: F) -> bool
where
    F: FnOnce() -> HookResult,
{
    match panic::catch_unwind(AssertUnwindSafe(hook_fn)) {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            warn!(
                target: "battle::buff",
                hook = %hook,
                instance = instance_id,
                error = %err,
                "buff hook failed, skipping"
            );
            false
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(
                target: "battle::buff",
                hook = %hook,
                instance = instance_id,
                panic = %message,
                "buff hook panicked, skipping"
            );
            false
        }
    }
}

/// Calls `op` up to `max_attempts` times until it succeeds.
///
/// `op` receives the 1-based attempt number. Each failure is logged at
/// `warn`; `None` is returned once every attempt has failed.
pub fn retry<T, E, F>(max_attempts: u32, mut op: F) -> Option<T>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
{
    for attempt in 1..=max_attempts.max(1) {
        match op(attempt) {
            Ok(value) => return Some(value),
            Err(err) => warn!(
                target: "battle::retry",
                attempt,
                max_attempts,
                error = %err,
                "operation failed"
            ),
        }
    }
    None
}
