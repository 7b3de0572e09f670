//! Measurement system - the context object the host drives.
//!
//! `MeasureSystem` owns every component (source manager, resolver, reticle,
//! marker registry, state machine) and the status line. The host calls
//! [`MeasureSystem::run_cycle`] once per display refresh and delivers session
//! and input events either directly through [`MeasureSystem::handle_event`]
//! or by posting them to the queue, which each cycle drains first.
//!
//! Everything runs on the host's loop thread. An event handler runs to
//! completion before the next cycle starts, so taps read the reticle without
//! locking. Nothing in here returns an error to the host: failures are
//! logged and recovered locally so the loop keeps running.

use crossbeam_channel::Sender;
use tracing::{debug, info, warn};

use crate::config::MeasureConfig;
use crate::geometry::Pose;
use crate::measure::{
    Measurement, MarkerRegistry, MeasurementState, MeasurementStateMachine, Scene, Status,
    Transition,
};
use crate::session::{
    AppEvent, CycleFrame, EventQueue, ReferenceSpace, SessionId, TrackingSessionProvider,
};
use crate::tracking::{PoseResolver, Reticle, ReticleController, TrackingSourceManager};

use super::result::{CycleResult, TrackingOutcome};

/// The session currently driving tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSession {
    pub id: SessionId,
    /// Base space in which hit poses are resolved.
    pub reference_space: ReferenceSpace,
}

/// Top-level measurement system driven once per cycle by the host.
pub struct MeasureSystem<P, S>
where
    P: TrackingSessionProvider,
    S: Scene,
{
    config: MeasureConfig,
    provider: P,
    session: Option<ActiveSession>,

    source_manager: TrackingSourceManager,
    resolver: PoseResolver,
    reticle: ReticleController,
    registry: MarkerRegistry<S>,
    state_machine: MeasurementStateMachine,

    status: Status,
    events: EventQueue,
    cycle_count: u64,
}

impl<P, S> MeasureSystem<P, S>
where
    P: TrackingSessionProvider,
    S: Scene,
{
    pub fn new(provider: P, scene: S, config: MeasureConfig) -> Self {
        Self {
            source_manager: TrackingSourceManager::new(config.hit_test_space),
            resolver: PoseResolver::new(config.hit_selection),
            reticle: ReticleController::new(),
            registry: MarkerRegistry::new(scene, config.marker, config.segment),
            state_machine: MeasurementStateMachine::new(),
            status: Status::Initializing,
            events: EventQueue::new(),
            session: None,
            cycle_count: 0,
            provider,
            config,
        }
    }

    /// Sender for input/session callbacks that run outside the loop.
    pub fn event_sender(&self) -> Sender<AppEvent> {
        self.events.sender()
    }

    /// Queue an event for the next cycle.
    pub fn post(&self, event: AppEvent) {
        self.events.push(event);
    }

    /// Dispatch one event immediately.
    ///
    /// Returns the measurement transition for select events.
    pub fn handle_event(&mut self, event: AppEvent) -> Option<Transition> {
        match event {
            AppEvent::SessionStart {
                session,
                reference_space,
            } => {
                self.start_session(session, reference_space);
                None
            }
            AppEvent::SessionEnd => {
                self.end_session();
                None
            }
            AppEvent::Select => Some(self.select()),
        }
    }

    fn start_session(&mut self, id: SessionId, reference_space: ReferenceSpace) {
        if let Some(previous) = self.session {
            warn!(previous = %previous.id, next = %id, "Session started while another was active; ending it");
            self.end_session();
        }
        self.source_manager.session_started();
        self.session = Some(ActiveSession {
            id,
            reference_space,
        });
        info!(
            session = %id,
            space = %reference_space.kind,
            generation = self.source_manager.generation(),
            "Tracking session started"
        );
        self.set_status(Status::DetectSurfaces);
    }

    fn end_session(&mut self) {
        let Some(session) = self.session.take() else {
            debug!("Session end without an active session");
            return;
        };
        self.source_manager.session_ended();
        self.reticle.update(None);
        let released = self.state_machine.clear(&mut self.registry);
        debug!(released, "Cleared measurement on session end");
        info!(session = %session.id, "Tracking session ended");
        self.set_status(Status::Initializing);
    }

    fn select(&mut self) -> Transition {
        let transition = self
            .state_machine
            .on_select(self.reticle.reticle(), &mut self.registry);
        self.set_status(transition.status());
        transition
    }

    fn set_status(&mut self, status: Status) {
        if status != self.status {
            debug!(status = %status, "Status updated");
        }
        self.status = status;
    }

    /// Run one tracking cycle.
    ///
    /// Queued events are dispatched first, in arrival order. Then, if a
    /// session is active and the host supplied a frame: ensure a hit-test
    /// source, resolve this cycle's pose, and update the reticle. An active
    /// session without a frame hides the reticle.
    pub fn run_cycle<F>(&mut self, frame: Option<&F>) -> CycleResult
    where
        F: CycleFrame + ?Sized,
    {
        self.cycle_count += 1;

        let transitions: Vec<Transition> = self
            .events
            .drain()
            .into_iter()
            .filter_map(|event| self.handle_event(event))
            .collect();

        let (tracking, pose) = match (self.session, frame) {
            (Some(session), Some(frame)) => self.track(&session, frame),
            (Some(_), None) => {
                // No frame means no pose this cycle.
                self.reticle.update(None);
                (TrackingOutcome::NoSurface, None)
            }
            (None, _) => (TrackingOutcome::SessionAbsent, None),
        };

        CycleResult {
            cycle: self.cycle_count,
            tracking,
            pose,
            reticle_visible: self.reticle.reticle().is_visible(),
            transitions,
            state: self.state_machine.state(),
            status: self.status,
        }
    }

    fn track<F>(
        &mut self,
        session: &ActiveSession,
        frame: &F,
    ) -> (TrackingOutcome, Option<Pose>)
    where
        F: CycleFrame + ?Sized,
    {
        let Some(source) = self.source_manager.ensure(&mut self.provider) else {
            self.reticle.update(None);
            return (TrackingOutcome::Acquiring, None);
        };

        match self
            .resolver
            .resolve(&source, &session.reference_space, frame)
        {
            Ok(pose) => {
                self.reticle.update(pose.as_ref());
                let outcome = if pose.is_some() {
                    TrackingOutcome::Surface
                } else {
                    TrackingOutcome::NoSurface
                };
                (outcome, pose)
            }
            Err(err) => {
                warn!(cycle = self.cycle_count, source = %source, "{}; re-acquiring", err);
                self.source_manager.invalidate();
                self.reticle.update(None);
                (TrackingOutcome::QueryFailed, None)
            }
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn reticle(&self) -> &Reticle {
        self.reticle.reticle()
    }

    pub fn measurement(&self) -> &Measurement {
        self.state_machine.measurement()
    }

    pub fn state(&self) -> MeasurementState {
        self.state_machine.state()
    }

    pub fn state_machine(&self) -> &MeasurementStateMachine {
        &self.state_machine
    }

    pub fn registry(&self) -> &MarkerRegistry<S> {
        &self.registry
    }

    pub fn source_manager(&self) -> &TrackingSourceManager {
        &self.source_manager
    }

    pub fn session(&self) -> Option<&ActiveSession> {
        self.session.as_ref()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn config(&self) -> &MeasureConfig {
        &self.config
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }
}
