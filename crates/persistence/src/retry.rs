// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tracing::warn;

/// Why a retried operation gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryFailure<E> {
    /// Every attempt failed with a retryable error.
    Exhausted { attempts: u32 },
    /// An attempt failed with an error that is not retryable.
    Failed(E),
}

/// Runs `attempt` with a fresh nonce until it succeeds, fails for a reason
/// `is_retryable` rejects, or `max_attempts` is reached.
///
/// `regenerate` is called before every attempt, including the first.
///
/// # Errors
///
/// Returns `RetryFailure::Exhausted` after `max_attempts` retryable failures
/// and `RetryFailure::Failed` on the first non-retryable one.
pub fn retry_with_fresh_nonce<N, T, E>(
    max_attempts: u32,
    mut regenerate: impl FnMut() -> N,
    mut attempt: impl FnMut(&N) -> Result<T, E>,
    is_retryable: impl Fn(&E) -> bool,
) -> Result<T, RetryFailure<E>> {
    for attempt_number in 1..=max_attempts {
        let nonce: N = regenerate();
        match attempt(&nonce) {
            Ok(value) => return Ok(value),
            Err(err) if is_retryable(&err) => {
                warn!(attempt = attempt_number, max_attempts, "Retryable collision, regenerating");
            }
            Err(err) => return Err(RetryFailure::Failed(err)),
        }
    }

    Err(RetryFailure::Exhausted {
        attempts: max_attempts,
    })
}
