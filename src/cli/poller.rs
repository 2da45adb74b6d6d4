//! Completion polling for long-running remote operations
//!
//! A `PendingOperation` wraps a resource that is not yet in a terminal
//! state. `wait()` blocks the calling thread, refreshing the resource every
//! poll interval until it completes, fails, or the timeout elapses. A single
//! continuation can be attached with `then()` and runs once, only on
//! completion.

use crate::cli::adapters::{AsyncResource, Clock, RemoteState};
use crate::cli::error::{CliError, CliResult};
use std::time::Duration;

/// How long `wait()` may block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Wait until a terminal state, however long that takes
    Unbounded,
    Bounded(Duration),
}

impl Timeout {
    /// `0` means unbounded
    pub fn from_secs(secs: u64) -> Self {
        if secs == 0 {
            Timeout::Unbounded
        } else {
            Timeout::Bounded(Duration::from_secs(secs))
        }
    }
}

/// Poll cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    interval: Duration,
}

impl PollSettings {
    /// Polls are never issued closer together than this
    pub const MIN_INTERVAL: Duration = Duration::from_millis(500);

    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Self::MIN_INTERVAL),
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::from_millis(2000)
    }
}

type Continuation<'c, R> = Box<dyn FnOnce(R) -> CliResult<R> + 'c>;

/// A resource being waited on
pub struct PendingOperation<'c, R: AsyncResource> {
    resource: R,
    operation: String,
    timeout: Timeout,
    interval: Duration,
    clock: &'c dyn Clock,
    continuation: Option<Continuation<'c, R>>,
}

/// Start waiting on `resource`
pub fn when_complete<'c, R: AsyncResource>(
    resource: R,
    timeout: Timeout,
    settings: &PollSettings,
    clock: &'c dyn Clock,
) -> PendingOperation<'c, R> {
    PendingOperation {
        resource,
        operation: "remote operation".to_string(),
        timeout,
        interval: settings.interval(),
        clock,
        continuation: None,
    }
}

impl<'c, R: AsyncResource + 'c> PendingOperation<'c, R> {
    /// Name used in log lines and timeout errors
    pub fn named(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    /// Run `f` once the resource completes.
    ///
    /// Calling `then` again chains onto the existing continuation; the
    /// second runs on the first one's result.
    pub fn then<F>(mut self, f: F) -> Self
    where
        F: FnOnce(R) -> CliResult<R> + 'c,
    {
        self.continuation = Some(match self.continuation.take() {
            None => Box::new(f),
            Some(previous) => Box::new(move |resource| previous(resource).and_then(f)),
        });
        self
    }

    /// Block until the resource reaches a terminal state
    pub fn wait(self) -> CliResult<R> {
        let PendingOperation {
            mut resource,
            operation,
            timeout,
            interval,
            clock,
            continuation,
        } = self;

        let started = clock.now();
        let mut polls: u64 = 0;

        loop {
            resource.refresh()?;
            polls += 1;

            match resource.state() {
                RemoteState::Complete => {
                    tracing::info!(operation = %operation, polls, "operation complete");
                    return match continuation {
                        Some(f) => f(resource),
                        None => Ok(resource),
                    };
                }
                RemoteState::Failed(reason) => {
                    tracing::warn!(
                        operation = %operation,
                        polls,
                        reason = %reason,
                        "operation failed"
                    );
                    return Err(CliError::RemoteOperation(format!(
                        "{}: {}",
                        operation, reason
                    )));
                }
                RemoteState::Pending => {}
            }

            let elapsed = clock.now().saturating_duration_since(started);
            let nap = match timeout {
                Timeout::Unbounded => interval,
                Timeout::Bounded(limit) if elapsed >= limit => {
                    return Err(timed_out(operation, polls, elapsed));
                }
                // never sleep past the deadline
                Timeout::Bounded(limit) => interval.min(limit - elapsed),
            };

            tracing::debug!(
                operation = %operation,
                polls,
                elapsed_ms = elapsed.as_millis() as u64,
                "still pending"
            );
            clock.sleep(nap);

            if let Timeout::Bounded(limit) = timeout {
                let elapsed = clock.now().saturating_duration_since(started);
                if elapsed >= limit {
                    return Err(timed_out(operation, polls, elapsed));
                }
            }
        }
    }
}

fn timed_out(operation: String, polls: u64, elapsed: Duration) -> CliError {
    tracing::warn!(operation = %operation, polls, "gave up waiting");
    CliError::OperationTimeout {
        operation,
        waited_secs: elapsed.as_secs(),
    }
}
