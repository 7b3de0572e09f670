//! Identity types for tracking sessions and the handles they hand out.
//!
//! Handles are lightweight ids minted by the runtime. They carry no
//! behaviour of their own; the runtime resolves them when queried.

use serde::{Deserialize, Serialize};

/// Identifier of one tracking session (one start/end lifetime).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// Kind of reference space a runtime can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceSpaceKind {
    /// Origin tracks the viewer; forward is the view direction.
    Viewer,
    /// World-stable origin near the viewer's position at session start.
    Local,
    /// Like `Local`, with the origin on the floor.
    LocalFloor,
}

impl std::fmt::Display for ReferenceSpaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Viewer => "viewer",
            Self::Local => "local",
            Self::LocalFloor => "local-floor",
        };
        f.write_str(name)
    }
}

/// Coordinate space handed out by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReferenceSpace {
    pub id: u64,
    pub kind: ReferenceSpaceKind,
}

/// Handle to a runtime hit-test subscription.
///
/// Valid only within the session that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitTestSource {
    pub id: u64,
    pub space: ReferenceSpace,
}

impl std::fmt::Display for HitTestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HT{}@{}", self.id, self.space.kind)
    }
}
