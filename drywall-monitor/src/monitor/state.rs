use std::sync::Arc;

use crate::aggregator::ErrorDetail;
use crate::snapshot::StatusSnapshot;

/// Latest known outcome of polling.
///
/// `Loading` replaces whatever was shown before: a cycle in progress
/// hides the previous snapshot rather than displaying it as stale.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PollState {
    /// No cycle has started yet.
    #[default]
    Idle,

    /// A cycle is in flight.
    Loading,

    /// The most recent accepted cycle succeeded.
    Ready(Arc<StatusSnapshot>),

    /// The most recent accepted cycle failed.
    Failed(ErrorDetail),
}

impl PollState {
    pub fn snapshot(&self) -> Option<&StatusSnapshot> {
        match self {
            PollState::Ready(snapshot) => Some(snapshot.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorDetail> {
        match self {
            PollState::Failed(detail) => Some(detail),
            _ => None,
        }
    }
}
