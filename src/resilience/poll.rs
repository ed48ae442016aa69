//! Fixed-interval polling with a bounded attempt budget.

use std::future::Future;
use std::time::Duration;

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus<T, E> {
    /// Done; stop polling.
    Ready(T),
    /// Terminal failure; stop polling.
    Failed(E),
    /// Not yet; try again after the interval.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError<E> {
    #[error("terminal failure after {attempts} attempts")]
    Failed { error: E, attempts: u32 },

    #[error("no terminal state after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Run `check` up to `max_attempts` times, sleeping `interval` between
/// attempts. Attempts are numbered from 1. No sleep follows the last attempt.
///
/// Returns the ready value and the attempt that produced it.
pub async fn poll_until<T, E, F, Fut>(
    interval: Duration,
    max_attempts: u32,
    mut check: F,
) -> Result<(T, u32), PollError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = PollStatus<T, E>>,
{
    for attempt in 1..=max_attempts {
        match check(attempt).await {
            PollStatus::Ready(value) => return Ok((value, attempt)),
            PollStatus::Failed(error) => {
                return Err(PollError::Failed {
                    error,
                    attempts: attempt,
                })
            }
            PollStatus::Pending => {
                if attempt < max_attempts {
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }

    Err(PollError::Exhausted {
        attempts: max_attempts,
    })
}
