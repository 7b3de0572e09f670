//! Hit-test source acquisition.
//!
//! The manager holds at most one hit-test source for the active session and at
//! most one acquisition in flight. Acquisition is two-step (reference space,
//! then a source scoped to it) and fire-and-forget: `ensure` never blocks, it
//! issues requests and observes their answers on later calls.
//!
//! Retry policy: a failed acquisition clears the in-flight state and is not
//! retried until the next `ensure` call, i.e. the next tracking cycle. There
//! is no retry limit; attempts continue until success or session end.

use tracing::{debug, info, warn};

use crate::error::{AcquisitionStage, TrackingError};
use crate::session::{
    HitTestSource, Pending, PollResult, ReferenceSpace, ReferenceSpaceKind,
    TrackingSessionProvider,
};

/// Acquisition progress for the current session generation.
#[derive(Debug)]
enum Acquisition {
    /// No handle and nothing outstanding.
    Idle,
    /// Reference space requested.
    AwaitingSpace(Pending<ReferenceSpace>),
    /// Space granted, hit-test source requested.
    AwaitingSource(Pending<HitTestSource>),
    /// Handle stored.
    Ready(HitTestSource),
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceManagerStats {
    /// Acquisitions started (reference space requests issued).
    pub acquisitions_started: usize,
    /// Hit-test source requests issued.
    pub source_requests: usize,
    /// Handles successfully stored.
    pub handles_acquired: usize,
    /// Acquisitions that ended in failure.
    pub failures: usize,
    /// Stored handles dropped after a failed query.
    pub invalidations: usize,
}

/// Tracking Source Manager.
#[derive(Debug)]
pub struct TrackingSourceManager {
    /// Space the hit-test source is scoped to (viewer-relative by default).
    space_kind: ReferenceSpaceKind,
    acquisition: Acquisition,
    /// Incremented on every session start; acquisitions never span two.
    generation: u64,
    last_error: Option<TrackingError>,
    stats: SourceManagerStats,
}

impl TrackingSourceManager {
    pub fn new(space_kind: ReferenceSpaceKind) -> Self {
        Self {
            space_kind,
            acquisition: Acquisition::Idle,
            generation: 0,
            last_error: None,
            stats: SourceManagerStats::default(),
        }
    }

    /// Make sure a hit-test source exists or is being acquired.
    ///
    /// Returns the stored handle when one is available. While a request is
    /// outstanding this only checks for its answer; it never issues a second
    /// request. A failure observed here is not retried within the same call.
    pub fn ensure<P>(&mut self, provider: &mut P) -> Option<HitTestSource>
    where
        P: TrackingSessionProvider + ?Sized,
    {
        if let Acquisition::Idle = self.acquisition {
            debug!(
                generation = self.generation,
                space = %self.space_kind,
                "Requesting reference space for hit testing"
            );
            self.stats.acquisitions_started += 1;
            self.acquisition =
                Acquisition::AwaitingSpace(provider.request_reference_space(self.space_kind));
        }

        self.advance(provider);
        self.handle()
    }

    /// Poll outstanding requests and move the acquisition forward as far as
    /// the answers allow.
    fn advance<P>(&mut self, provider: &mut P)
    where
        P: TrackingSessionProvider + ?Sized,
    {
        loop {
            let next = match &self.acquisition {
                Acquisition::Idle | Acquisition::Ready(_) => return,
                Acquisition::AwaitingSpace(pending) => match pending.poll() {
                    PollResult::Pending => return,
                    PollResult::Ready(Ok(space)) => {
                        debug!(space_id = space.id, "Reference space granted, requesting hit-test source");
                        self.stats.source_requests += 1;
                        Acquisition::AwaitingSource(provider.request_hit_test_source(space))
                    }
                    PollResult::Ready(Err(err)) => {
                        self.fail(TrackingError::acquisition(AcquisitionStage::ReferenceSpace, &err));
                        return;
                    }
                    PollResult::Abandoned => {
                        self.fail(TrackingError::RequestAbandoned {
                            stage: AcquisitionStage::ReferenceSpace,
                        });
                        return;
                    }
                },
                Acquisition::AwaitingSource(pending) => match pending.poll() {
                    PollResult::Pending => return,
                    PollResult::Ready(Ok(source)) => {
                        info!(generation = self.generation, source = %source, "Hit-test source acquired");
                        self.stats.handles_acquired += 1;
                        self.last_error = None;
                        Acquisition::Ready(source)
                    }
                    PollResult::Ready(Err(err)) => {
                        self.fail(TrackingError::acquisition(AcquisitionStage::HitTestSource, &err));
                        return;
                    }
                    PollResult::Abandoned => {
                        self.fail(TrackingError::RequestAbandoned {
                            stage: AcquisitionStage::HitTestSource,
                        });
                        return;
                    }
                },
            };
            self.acquisition = next;
        }
    }

    fn fail(&mut self, err: TrackingError) {
        warn!(generation = self.generation, "Hit-test source acquisition failed: {}", err);
        self.stats.failures += 1;
        self.last_error = Some(err);
        self.acquisition = Acquisition::Idle;
    }

    /// Drop the stored handle so the next `ensure` re-acquires.
    ///
    /// Used after a query against the handle failed. Outstanding requests are
    /// left alone.
    pub fn invalidate(&mut self) {
        if let Acquisition::Ready(source) = self.acquisition {
            debug!(source = %source, "Invalidating hit-test source");
            self.stats.invalidations += 1;
            self.acquisition = Acquisition::Idle;
        }
    }

    /// A new session began: start a fresh generation with nothing held.
    pub fn session_started(&mut self) {
        self.generation += 1;
        self.acquisition = Acquisition::Idle;
        self.last_error = None;
    }

    /// The session ended: clear the handle and cancel any outstanding request.
    ///
    /// Dropping the pending request discards a late answer.
    pub fn session_ended(&mut self) {
        if self.is_in_flight() {
            debug!(generation = self.generation, "Cancelling outstanding hit-test acquisition");
        }
        self.acquisition = Acquisition::Idle;
    }

    pub fn handle(&self) -> Option<HitTestSource> {
        match self.acquisition {
            Acquisition::Ready(source) => Some(source),
            _ => None,
        }
    }

    /// True while a reference space or hit-test source request is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self.acquisition,
            Acquisition::AwaitingSpace(_) | Acquisition::AwaitingSource(_)
        )
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_error(&self) -> Option<&TrackingError> {
        self.last_error.as_ref()
    }

    pub fn stats(&self) -> &SourceManagerStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimProvider;

    fn manager() -> TrackingSourceManager {
        let mut manager = TrackingSourceManager::new(ReferenceSpaceKind::Viewer);
        manager.session_started();
        manager
    }

    #[test]
    fn test_immediate_acquisition() {
        let mut sim = SimProvider::immediate();
        let mut manager = manager();

        let handle = manager.ensure(&mut sim);
        assert!(handle.is_some());
        assert_eq!(handle.unwrap().space.kind, ReferenceSpaceKind::Viewer);
        assert!(!manager.is_in_flight());

        // Already held: no further requests.
        manager.ensure(&mut sim);
        assert_eq!(sim.space_request_count(), 1);
        assert_eq!(sim.source_request_count(), 1);
    }

    #[test]
    fn test_single_flight_while_outstanding() {
        let mut sim = SimProvider::deferred();
        let mut manager = manager();

        for _ in 0..5 {
            assert!(manager.ensure(&mut sim).is_none());
            assert!(manager.is_in_flight());
        }
        assert_eq!(sim.space_request_count(), 1);

        // Space granted: the second step is issued exactly once.
        sim.complete_pending();
        for _ in 0..3 {
            assert!(manager.ensure(&mut sim).is_none());
        }
        assert_eq!(sim.source_request_count(), 1);

        sim.complete_pending();
        let handle = manager.ensure(&mut sim);
        assert!(handle.is_some());
        assert_eq!(manager.stats().handles_acquired, 1);
        assert_eq!(sim.space_request_count(), 1);
        assert_eq!(sim.source_request_count(), 1);
    }

    #[test]
    fn test_failure_retried_on_next_ensure_only() {
        let mut sim = SimProvider::immediate();
        sim.fail_next_source_requests(1);
        let mut manager = manager();

        assert!(manager.ensure(&mut sim).is_none());
        assert!(!manager.is_in_flight());
        assert!(manager.last_error().is_some());
        assert_eq!(sim.source_request_count(), 1);

        // Next cycle retries and succeeds.
        assert!(manager.ensure(&mut sim).is_some());
        assert_eq!(sim.source_request_count(), 2);
        assert_eq!(manager.stats().failures, 1);
        assert!(manager.last_error().is_none());
    }

    #[test]
    fn test_reference_space_failure() {
        let mut sim = SimProvider::immediate();
        sim.fail_next_space_requests(2);
        let mut manager = manager();

        assert!(manager.ensure(&mut sim).is_none());
        assert!(manager.ensure(&mut sim).is_none());
        assert!(manager.ensure(&mut sim).is_some());
        assert_eq!(sim.space_request_count(), 3);
        assert_eq!(sim.source_request_count(), 1);
    }

    #[test]
    fn test_abandoned_request_clears_in_flight() {
        let mut sim = SimProvider::deferred();
        let mut manager = manager();

        manager.ensure(&mut sim);
        sim.abandon_pending();
        assert!(manager.ensure(&mut sim).is_none());
        assert!(!manager.is_in_flight());
        assert!(matches!(
            manager.last_error(),
            Some(TrackingError::RequestAbandoned {
                stage: AcquisitionStage::ReferenceSpace
            })
        ));
    }

    #[test]
    fn test_session_end_cancels_outstanding_request() {
        let mut sim = SimProvider::deferred();
        let mut manager = manager();

        manager.ensure(&mut sim);
        assert!(manager.is_in_flight());

        manager.session_ended();
        assert!(!manager.is_in_flight());
        assert!(manager.handle().is_none());

        // The late answer goes nowhere.
        assert_eq!(sim.complete_pending(), 0);

        manager.session_started();
        assert_eq!(manager.generation(), 2);
        manager.ensure(&mut sim);
        assert_eq!(sim.space_request_count(), 2);
    }

    #[test]
    fn test_invalidate_forces_reacquisition() {
        let mut sim = SimProvider::immediate();
        let mut manager = manager();

        let first = manager.ensure(&mut sim).unwrap();
        manager.invalidate();
        assert!(manager.handle().is_none());

        let second = manager.ensure(&mut sim).unwrap();
        assert_ne!(first, second);
        assert_eq!(manager.stats().invalidations, 1);
    }
}
