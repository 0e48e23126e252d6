//! Query lifecycle: idle → in-flight → succeeded | failed.
//!
//! Every submission gets a fresh [`RequestId`]. Resolutions carrying any other id are
//! dropped, so a late response to a superseded request can never overwrite newer state.

use crate::error::{ErrorKind, GatewayError, ValidationError};
use crate::model::{Query, ResultModel};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the request runner needs to perform one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub id: RequestId,
    pub query: Query,
}

#[derive(Debug, Clone)]
pub enum LifecycleState {
    Idle,
    InFlight {
        id: RequestId,
        started_at: Instant,
    },
    Succeeded {
        result: Arc<ResultModel>,
    },
    Failed {
        kind: ErrorKind,
        message: String,
    },
}

/// Whether a resolution was committed to state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

#[derive(Debug)]
pub struct QueryLifecycle {
    state: LifecycleState,
    next_id: u64,
}

impl Default for QueryLifecycle {
    fn default() -> Self {
        Self {
            state: LifecycleState::Idle,
            next_id: 1,
        }
    }
}

impl QueryLifecycle {
    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, LifecycleState::InFlight { .. })
    }

    pub fn current_request(&self) -> Option<RequestId> {
        match self.state {
            LifecycleState::InFlight { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&Arc<ResultModel>> {
        match &self.state {
            LifecycleState::Succeeded { result } => Some(result),
            _ => None,
        }
    }

    /// Start a new request. Any previous result, error or in-flight request is discarded.
    pub fn submit(&mut self, text: &str, location: &str) -> Result<RequestTicket, ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        let id = RequestId(self.next_id);
        self.next_id += 1;
        if let Some(prev) = self.current_request() {
            tracing::debug!(superseded = %prev, by = %id, "resubmitted while in flight");
        }
        self.state = LifecycleState::InFlight {
            id,
            started_at: Instant::now(),
        };
        Ok(RequestTicket {
            id,
            query: Query {
                text: text.to_string(),
                location: location.to_string(),
            },
        })
    }

    pub fn on_gateway_success(&mut self, id: RequestId, result: ResultModel) -> Resolution {
        if self.current_request() != Some(id) {
            tracing::debug!(request = %id, "discarding stale success");
            return Resolution::Stale;
        }
        self.state = LifecycleState::Succeeded {
            result: Arc::new(result),
        };
        Resolution::Applied
    }

    pub fn on_gateway_failure(
        &mut self,
        id: RequestId,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Resolution {
        if self.current_request() != Some(id) {
            tracing::debug!(request = %id, "discarding stale failure");
            return Resolution::Stale;
        }
        self.state = LifecycleState::Failed {
            kind,
            message: message.into(),
        };
        Resolution::Applied
    }

    /// Apply a gateway outcome, whichever way it went.
    pub fn resolve(
        &mut self,
        id: RequestId,
        outcome: Result<ResultModel, GatewayError>,
    ) -> Resolution {
        match outcome {
            Ok(result) => self.on_gateway_success(id, result),
            Err(e) => self.on_gateway_failure(id, e.kind(), e.to_string()),
        }
    }

    /// Back to `Idle`; an outstanding request can no longer resolve.
    pub fn reset(&mut self) {
        self.state = LifecycleState::Idle;
    }
}
