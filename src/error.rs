//! Failure taxonomy for the tracking side of the system.
//!
//! None of these are fatal. They are produced while acquiring a hit-test
//! source or querying a cycle, logged, and recovered from inside the cycle
//! loop. Absence of a session and taps without a surface are ordinary states
//! and have no variant here.

use std::fmt;

use thiserror::Error;

/// Step of hit-test source acquisition that was outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionStage {
    /// Waiting for the viewer-relative reference space.
    ReferenceSpace,
    /// Waiting for the hit-test source scoped to that space.
    HitTestSource,
}

impl fmt::Display for AcquisitionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReferenceSpace => write!(f, "reference space"),
            Self::HitTestSource => write!(f, "hit-test source"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("{stage} request rejected: {reason}")]
    SourceAcquisition {
        stage: AcquisitionStage,
        reason: String,
    },

    #[error("{stage} request abandoned by the runtime")]
    RequestAbandoned { stage: AcquisitionStage },

    #[error("hit-test query failed: {reason}")]
    Query { reason: String },
}

impl TrackingError {
    pub fn acquisition(stage: AcquisitionStage, err: &anyhow::Error) -> Self {
        Self::SourceAcquisition {
            stage,
            reason: format!("{err:#}"),
        }
    }

    pub fn query(err: &anyhow::Error) -> Self {
        Self::Query {
            reason: format!("{err:#}"),
        }
    }

    /// True for failures that leave the source manager without a handle.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            Self::SourceAcquisition { .. } | Self::RequestAbandoned { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TrackingError::acquisition(
            AcquisitionStage::HitTestSource,
            &anyhow::anyhow!("feature not enabled"),
        );
        assert_eq!(
            err.to_string(),
            "hit-test source request rejected: feature not enabled"
        );
        assert!(err.is_acquisition_failure());

        let err = TrackingError::query(&anyhow::anyhow!("source invalidated"));
        assert_eq!(err.to_string(), "hit-test query failed: source invalidated");
        assert!(!err.is_acquisition_failure());
    }
}
