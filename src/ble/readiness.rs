//! One-shot rendezvous between the stack's "enabled" completion and the
//! initializer.
//!
//! The initializer hands an [`EnableCompletion`] to the stack together
//! with the enable request, then awaits the gate. The completion is
//! consumed when fired, so the stack cannot report twice for one request.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::error::{InitError, TransportError};

pub struct ReadinessGate {
    status: Signal<CriticalSectionRawMutex, bool>,
}

impl ReadinessGate {
    pub const fn new() -> Self {
        Self {
            status: Signal::new(),
        }
    }

    /// Issue an enable request and wait for its completion.
    ///
    /// `request` receives the completion to pass to the stack. If it
    /// fails, no completion can arrive and we return immediately with
    /// `EnableRequestFailed`. Otherwise this waits, with no timeout, until
    /// the completion fires and returns the status it reported.
    pub async fn wait_until_ready<'g, F>(&'g self, request: F) -> Result<(), InitError>
    where
        F: FnOnce(EnableCompletion<'g>) -> Result<(), TransportError>,
    {
        // Drop anything left over from a request that was never awaited.
        self.status.reset();

        if let Err(e) = request(EnableCompletion { gate: self }) {
            error!("Enable request failed: {:?}", e);
            return Err(InitError::EnableRequestFailed(e));
        }

        debug!("Waiting for stack enable completion");
        if self.status.wait().await {
            Ok(())
        } else {
            Err(InitError::EnableFailed)
        }
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-use completion for one enable request.
#[must_use = "the initializer waits until this completion fires"]
pub struct EnableCompletion<'g> {
    gate: &'g ReadinessGate,
}

impl EnableCompletion<'_> {
    /// Report the outcome of the enable request and wake the waiter.
    pub fn complete(self, ok: bool) {
        if ok {
            info!("Stack enabled");
        } else {
            error!("Stack enable completed with failure");
        }
        self.gate.status.signal(ok);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn completion_fired_inline_resolves_ready() {
        let gate = ReadinessGate::new();
        let result = block_on(gate.wait_until_ready(|done| {
            done.complete(true);
            Ok(())
        }));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn completion_failure_is_reported() {
        let gate = ReadinessGate::new();
        let result = block_on(gate.wait_until_ready(|done| {
            done.complete(false);
            Ok(())
        }));
        assert_eq!(result, Err(InitError::EnableFailed));
    }

    #[test]
    fn request_failure_returns_without_waiting() {
        let gate = ReadinessGate::new();
        // The completion is dropped unfired; waiting on it would hang.
        let result = block_on(gate.wait_until_ready(|_done| Err(TransportError::Raw(8))));
        assert_eq!(
            result,
            Err(InitError::EnableRequestFailed(TransportError::Raw(8)))
        );
    }

    #[test]
    fn waiter_blocks_until_completion_from_another_thread() {
        let gate = ReadinessGate::new();
        let (tx, rx) = mpsc::channel::<EnableCompletion<'_>>();

        std::thread::scope(|s| {
            s.spawn(move || {
                let done = rx.recv().unwrap();
                std::thread::sleep(Duration::from_millis(20));
                done.complete(true);
            });

            let result = block_on(gate.wait_until_ready(|done| {
                tx.send(done).map_err(|_| TransportError::Busy)
            }));
            assert_eq!(result, Ok(()));
        });
    }

    #[test]
    fn stale_signal_does_not_satisfy_a_new_request() {
        let gate = ReadinessGate::new();
        // A failure from an earlier, abandoned request.
        gate.status.signal(false);

        let result = block_on(gate.wait_until_ready(|done| {
            done.complete(true);
            Ok(())
        }));
        assert_eq!(result, Ok(()));
    }
}
