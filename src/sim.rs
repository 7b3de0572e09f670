//! Scripted spatial runtime.
//!
//! Stands in for a real AR runtime in the demo binary and in tests. Requests
//! are either answered immediately or held until [`SimProvider::complete_pending`]
//! is called, which lets callers observe the system while an acquisition is
//! still outstanding. Failures can be injected per request kind.
//!
//! The provider handle is cheap to clone and can be driven from another
//! thread, like a runtime that answers on its own schedule.

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::anyhow;
use nalgebra::{UnitQuaternion, Vector3};
use parking_lot::Mutex;

use crate::geometry::{Pose, SE3};
use crate::session::{
    request, Completer, CycleFrame, HitResult, HitTestSource, Pending, ReferenceSpace,
    ReferenceSpaceKind, TrackingSessionProvider,
};

/// When simulated requests are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Answered before the request call returns.
    Immediate,
    /// Held until `complete_pending` or `abandon_pending`.
    Deferred,
}

#[derive(Debug)]
struct SimState {
    mode: ResponseMode,
    next_id: u64,
    space_requests: usize,
    source_requests: usize,
    fail_space_requests: usize,
    fail_source_requests: usize,
    held_spaces: VecDeque<(Completer<ReferenceSpace>, ReferenceSpace)>,
    held_sources: VecDeque<(Completer<HitTestSource>, HitTestSource)>,
}

impl SimState {
    fn mint_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Simulated session provider.
#[derive(Debug, Clone)]
pub struct SimProvider {
    state: Arc<Mutex<SimState>>,
}

impl SimProvider {
    pub fn new(mode: ResponseMode) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                mode,
                next_id: 0,
                space_requests: 0,
                source_requests: 0,
                fail_space_requests: 0,
                fail_source_requests: 0,
                held_spaces: VecDeque::new(),
                held_sources: VecDeque::new(),
            })),
        }
    }

    pub fn immediate() -> Self {
        Self::new(ResponseMode::Immediate)
    }

    pub fn deferred() -> Self {
        Self::new(ResponseMode::Deferred)
    }

    pub fn set_mode(&self, mode: ResponseMode) {
        self.state.lock().mode = mode;
    }

    /// Reject the next `n` reference space requests.
    pub fn fail_next_space_requests(&self, n: usize) {
        self.state.lock().fail_space_requests = n;
    }

    /// Reject the next `n` hit-test source requests.
    pub fn fail_next_source_requests(&self, n: usize) {
        self.state.lock().fail_source_requests = n;
    }

    pub fn space_request_count(&self) -> usize {
        self.state.lock().space_requests
    }

    pub fn source_request_count(&self) -> usize {
        self.state.lock().source_requests
    }

    /// Number of requests currently held (deferred mode).
    pub fn held_count(&self) -> usize {
        let state = self.state.lock();
        state.held_spaces.len() + state.held_sources.len()
    }

    /// Answer every held request. Returns how many answers were delivered
    /// to a requester that was still waiting.
    pub fn complete_pending(&self) -> usize {
        let (spaces, sources) = {
            let mut state = self.state.lock();
            (
                std::mem::take(&mut state.held_spaces),
                std::mem::take(&mut state.held_sources),
            )
        };
        let delivered_spaces = spaces
            .into_iter()
            .map(|(completer, space)| completer.resolve(space))
            .filter(|delivered| *delivered)
            .count();
        let delivered_sources = sources
            .into_iter()
            .map(|(completer, source)| completer.resolve(source))
            .filter(|delivered| *delivered)
            .count();
        delivered_spaces + delivered_sources
    }

    /// Drop every held request without answering.
    pub fn abandon_pending(&self) {
        let mut state = self.state.lock();
        state.held_spaces.clear();
        state.held_sources.clear();
    }

    /// A fresh base reference space for a new session.
    pub fn base_space(&self, kind: ReferenceSpaceKind) -> ReferenceSpace {
        let id = self.state.lock().mint_id();
        ReferenceSpace { id, kind }
    }
}

impl TrackingSessionProvider for SimProvider {
    fn request_reference_space(&mut self, kind: ReferenceSpaceKind) -> Pending<ReferenceSpace> {
        let mut state = self.state.lock();
        state.space_requests += 1;
        if state.fail_space_requests > 0 {
            state.fail_space_requests -= 1;
            return Pending::failed(anyhow!("reference space '{kind}' not supported"));
        }
        let space = ReferenceSpace {
            id: state.mint_id(),
            kind,
        };
        match state.mode {
            ResponseMode::Immediate => Pending::ready(space),
            ResponseMode::Deferred => {
                let (completer, pending) = request();
                state.held_spaces.push_back((completer, space));
                pending
            }
        }
    }

    fn request_hit_test_source(&mut self, space: ReferenceSpace) -> Pending<HitTestSource> {
        let mut state = self.state.lock();
        state.source_requests += 1;
        if state.fail_source_requests > 0 {
            state.fail_source_requests -= 1;
            return Pending::failed(anyhow!("hit-test feature unavailable"));
        }
        let source = HitTestSource {
            id: state.mint_id(),
            space,
        };
        match state.mode {
            ResponseMode::Immediate => Pending::ready(source),
            ResponseMode::Deferred => {
                let (completer, pending) = request();
                state.held_sources.push_back((completer, source));
                pending
            }
        }
    }
}

/// Simulated hit result. Poses are stored already expressed in the session's
/// base space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimHit {
    pub pose: Option<Pose>,
}

impl SimHit {
    pub fn at(position: Vector3<f64>) -> Self {
        Self {
            pose: Some(Pose::from_position(position)),
        }
    }

    /// A hit whose pose cannot be expressed in any space.
    pub fn unresolvable() -> Self {
        Self { pose: None }
    }
}

impl HitResult for SimHit {
    fn pose(&self, _space: &ReferenceSpace) -> Option<Pose> {
        self.pose
    }
}

/// Simulated tracking cycle.
#[derive(Debug, Clone, Default)]
pub struct SimFrame {
    pub hits: Vec<SimHit>,
    /// When set, every query fails with this message.
    pub query_error: Option<String>,
}

impl SimFrame {
    /// No surface in view.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single surface intersection at `position`.
    pub fn hit_at(position: Vector3<f64>) -> Self {
        Self::with_hits(vec![SimHit::at(position)])
    }

    pub fn with_hits(hits: Vec<SimHit>) -> Self {
        Self {
            hits,
            query_error: None,
        }
    }

    /// Every query in this cycle fails.
    pub fn failing(message: &str) -> Self {
        Self {
            hits: Vec::new(),
            query_error: Some(message.to_string()),
        }
    }
}

impl CycleFrame for SimFrame {
    type Hit = SimHit;

    fn hit_test_results(&self, _source: &HitTestSource) -> anyhow::Result<Vec<SimHit>> {
        match &self.query_error {
            Some(message) => Err(anyhow!("{message}")),
            None => Ok(self.hits.clone()),
        }
    }
}

/// Horizontal floor swept by the viewer's forward ray, used by the demo.
///
/// The viewer stands at the origin at `eye_height` and looks down at the
/// floor plane `y = 0` along `pitch` (radians below the horizon) and `yaw`
/// (radians to the right). The hit is found along the viewer's -Z axis and
/// mapped into the base space through the viewer pose.
pub fn floor_hit(eye_height: f64, pitch: f64, yaw: f64) -> SimFrame {
    if pitch <= 0.0 {
        return SimFrame::empty();
    }
    let viewer = SE3 {
        rotation: UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -yaw)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -pitch),
        translation: Vector3::new(0.0, eye_height, 0.0),
    };
    let ray_length = eye_height / pitch.sin();
    SimFrame::hit_at(viewer.transform_point(&Vector3::new(0.0, 0.0, -ray_length)))
}
