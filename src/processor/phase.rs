//! Per-exchange lifecycle state machine.
//!
//! Six phases per request/response exchange, driven by the host in protocol
//! order. Only `RequestHeaders` carries a decision; the other five
//! transitions are unconditional pass-throughs with no inspection of the
//! payload. A phase arriving out of order is a protocol error, not a
//! verdict.

use std::fmt;

use anyhow::{bail, ensure, Result};
use serde::Deserialize;

use super::{Headers, RequestProcessor};
use crate::policy::Verdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    RequestHeaders,
    RequestBody,
    RequestTrailers,
    ResponseHeaders,
    ResponseBody,
    ResponseTrailers,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::RequestHeaders => "request_headers",
            Phase::RequestBody => "request_body",
            Phase::RequestTrailers => "request_trailers",
            Phase::ResponseHeaders => "response_headers",
            Phase::ResponseBody => "response_body",
            Phase::ResponseTrailers => "response_trailers",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lifecycle event from the host, carrying the phase payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PhaseEvent {
    RequestHeaders {
        #[serde(default)]
        headers: Headers,
    },
    RequestBody {
        #[serde(default)]
        body: String,
    },
    RequestTrailers {
        #[serde(default)]
        trailers: Headers,
    },
    ResponseHeaders {
        #[serde(default)]
        headers: Headers,
    },
    ResponseBody {
        #[serde(default)]
        body: String,
    },
    ResponseTrailers {
        #[serde(default)]
        trailers: Headers,
    },
}

impl PhaseEvent {
    pub fn phase(&self) -> Phase {
        match self {
            PhaseEvent::RequestHeaders { .. } => Phase::RequestHeaders,
            PhaseEvent::RequestBody { .. } => Phase::RequestBody,
            PhaseEvent::RequestTrailers { .. } => Phase::RequestTrailers,
            PhaseEvent::ResponseHeaders { .. } => Phase::ResponseHeaders,
            PhaseEvent::ResponseBody { .. } => Phase::ResponseBody,
            PhaseEvent::ResponseTrailers { .. } => Phase::ResponseTrailers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Awaiting(Phase),
    Cancelled,
    Completed,
}

/// State machine for one request/response exchange.
#[derive(Debug)]
pub struct Exchange {
    state: ExchangeState,
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new()
    }
}

impl Exchange {
    pub fn new() -> Self {
        Self {
            state: ExchangeState::Awaiting(Phase::RequestHeaders),
        }
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, ExchangeState::Cancelled | ExchangeState::Completed)
    }

    /// Applies one phase event. The request-headers transition consults the
    /// processor; every other transition continues unconditionally.
    pub fn advance(
        &mut self,
        event: &PhaseEvent,
        processor: &dyn RequestProcessor,
    ) -> Result<Verdict> {
        let phase = event.phase();
        let expected = match self.state {
            ExchangeState::Awaiting(expected) => expected,
            ExchangeState::Cancelled => {
                bail!("phase {phase} received after the exchange was cancelled")
            }
            ExchangeState::Completed => {
                bail!("phase {phase} received after the exchange completed")
            }
        };
        ensure!(
            phase == expected,
            "phase {phase} received while awaiting {expected}"
        );

        let verdict = match event {
            PhaseEvent::RequestHeaders { headers } => processor.request_headers(headers),
            _ => Verdict::Continue,
        };

        self.state = match verdict {
            Verdict::Cancel { .. } => ExchangeState::Cancelled,
            Verdict::Continue => match phase {
                Phase::RequestHeaders => ExchangeState::Awaiting(Phase::RequestBody),
                Phase::RequestBody => ExchangeState::Awaiting(Phase::RequestTrailers),
                Phase::RequestTrailers => ExchangeState::Awaiting(Phase::ResponseHeaders),
                Phase::ResponseHeaders => ExchangeState::Awaiting(Phase::ResponseBody),
                Phase::ResponseBody => ExchangeState::Awaiting(Phase::ResponseTrailers),
                Phase::ResponseTrailers => ExchangeState::Completed,
            },
        };

        Ok(verdict)
    }
}
