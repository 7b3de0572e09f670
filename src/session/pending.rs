//! One-shot asynchronous request plumbing.
//!
//! Runtime requests (reference spaces, hit-test sources) resolve at some later
//! point, possibly on another thread. The requester keeps a [`Pending`] and
//! polls it without blocking once per tracking cycle; the runtime keeps the
//! matching [`Completer`] and answers exactly once.
//!
//! Dropping the `Pending` cancels interest: a later completion is discarded.
//! Dropping the `Completer` without answering is observed as
//! [`PollResult::Abandoned`].

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

/// Outcome of polling a pending request.
#[derive(Debug)]
pub enum PollResult<T> {
    /// No answer yet.
    Pending,
    /// The runtime answered.
    Ready(anyhow::Result<T>),
    /// The runtime dropped the request without answering.
    Abandoned,
}

/// Requester side of a one-shot request.
#[derive(Debug)]
pub struct Pending<T> {
    rx: Receiver<anyhow::Result<T>>,
}

/// Runtime side of a one-shot request.
#[derive(Debug)]
pub struct Completer<T> {
    tx: Sender<anyhow::Result<T>>,
}

/// Create a linked completer/pending pair.
pub fn request<T>() -> (Completer<T>, Pending<T>) {
    // Capacity 1: the single answer never blocks the runtime.
    let (tx, rx) = bounded(1);
    (Completer { tx }, Pending { rx })
}

impl<T> Pending<T> {
    /// A request that is already answered successfully.
    pub fn ready(value: T) -> Self {
        let (completer, pending) = request();
        completer.resolve(value);
        pending
    }

    /// A request that is already rejected.
    pub fn failed(err: anyhow::Error) -> Self {
        let (completer, pending) = request();
        completer.reject(err);
        pending
    }

    /// Non-blocking check for an answer.
    pub fn poll(&self) -> PollResult<T> {
        match self.rx.try_recv() {
            Ok(result) => PollResult::Ready(result),
            Err(TryRecvError::Empty) => PollResult::Pending,
            Err(TryRecvError::Disconnected) => PollResult::Abandoned,
        }
    }
}

impl<T> Completer<T> {
    /// Answer the request. Returns false if the requester already gave up.
    pub fn complete(self, result: anyhow::Result<T>) -> bool {
        self.tx.send(result).is_ok()
    }

    pub fn resolve(self, value: T) -> bool {
        self.complete(Ok(value))
    }

    pub fn reject(self, err: anyhow::Error) -> bool {
        self.complete(Err(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_before_and_after_completion() {
        let (completer, pending) = request::<u32>();
        assert!(matches!(pending.poll(), PollResult::Pending));

        assert!(completer.resolve(5));
        assert!(matches!(pending.poll(), PollResult::Ready(Ok(5))));
    }

    #[test]
    fn test_dropped_completer_is_abandoned() {
        let (completer, pending) = request::<u32>();
        drop(completer);
        assert!(matches!(pending.poll(), PollResult::Abandoned));
    }

    #[test]
    fn test_completion_after_cancel_is_discarded() {
        let (completer, pending) = request::<u32>();
        drop(pending);
        assert!(!completer.resolve(1));
    }

    #[test]
    fn test_completion_from_another_thread() {
        let (completer, pending) = request::<&'static str>();
        std::thread::spawn(move || {
            completer.resolve("done");
        })
        .join()
        .unwrap();

        assert!(matches!(pending.poll(), PollResult::Ready(Ok("done"))));
    }

    #[test]
    fn test_failed_request() {
        let pending = Pending::<u32>::failed(anyhow::anyhow!("nope"));
        match pending.poll() {
            PollResult::Ready(Err(e)) => assert_eq!(e.to_string(), "nope"),
            other => panic!("unexpected poll result: {:?}", other),
        }
    }
}
