//! JSON command dispatch
//!
//! Each request is a JSON object tagged by `"op"`; each response is a JSON
//! object. Failures are rendered as `{"error": "<message>"}` so a transport
//! can forward them verbatim.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use vmsim_api::{Error, Result, SegmentId, error};
use vmsim_memory_management::{PagingSnapshot, SegmentDescriptor, SegmentSnapshot, StepOutcome};

use crate::request::PagingRequest;
use crate::session::{SessionStats, SimulationSession, TranslateOutcome};

/// A command addressed to a session
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Request {
    /// (Re)initialize paging
    Init(PagingRequest),
    /// Process one reference
    Step,
    /// Run paging to completion
    Run,
    /// Read the paging state
    Snapshot,
    /// (Re)initialize segmentation
    InitSegments {
        /// New segment table
        segments: Vec<SegmentDescriptor>,
    },
    /// Translate a logical address
    Translate {
        /// Segment id
        segment: SegmentId,
        /// Offset within the segment
        offset: u64,
    },
    /// Read the segmentation state
    Segments,
    /// Read both engines' counters
    Stats,
}

impl Request {
    /// Operation name, for logging
    pub fn op(&self) -> &'static str {
        match self {
            Request::Init(_) => "init",
            Request::Step => "step",
            Request::Run => "run",
            Request::Snapshot => "snapshot",
            Request::InitSegments { .. } => "initSegments",
            Request::Translate { .. } => "translate",
            Request::Segments => "segments",
            Request::Stats => "stats",
        }
    }
}

/// A rendered reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// Paging state, with a status on init and run
    Paging {
        /// `initialized` or `done`
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<&'static str>,
        /// Snapshot
        state: PagingSnapshot,
    },
    /// Outcome of a step
    Step(StepOutcome),
    /// Segmentation state, with a status on init
    Segmentation {
        /// `initialized`
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<&'static str>,
        /// Snapshot
        state: SegmentSnapshot,
    },
    /// Outcome of a translation
    Translate(TranslateOutcome),
    /// Counters
    Stats(SessionStats),
    /// Request-level failure
    Error {
        /// Error message
        error: String,
    },
}

impl From<Error> for Response {
    fn from(error: Error) -> Self {
        Response::Error {
            error: error.to_string(),
        }
    }
}

/// Parse a request document
pub fn parse_request(line: &str) -> Result<Request> {
    serde_json::from_str(line).map_err(|e| error::invalid_configuration(&format!("malformed request: {}", e)))
}

/// Execute a parsed request against `session`
pub fn execute(session: &SimulationSession, request: Request) -> Result<Response> {
    log::debug!("dispatch {}", request.op());
    let response = match request {
        Request::Init(params) => {
            let (references, config) = params.into_parts()?;
            Response::Paging {
                status: Some("initialized"),
                state: session.init_paging(references, config)?,
            }
        }
        Request::Step => Response::Step(session.step()?),
        Request::Run => Response::Paging {
            status: Some("done"),
            state: session.run()?,
        },
        Request::Snapshot => Response::Paging {
            status: None,
            state: session.paging_snapshot()?,
        },
        Request::InitSegments { segments } => Response::Segmentation {
            status: Some("initialized"),
            state: session.init_segmentation(segments)?,
        },
        Request::Translate { segment, offset } => Response::Translate(session.translate(segment, offset)?),
        Request::Segments => Response::Segmentation {
            status: None,
            state: session.segmentation_snapshot()?,
        },
        Request::Stats => Response::Stats(session.stats()),
    };
    Ok(response)
}

/// Render a response document
pub fn render(response: &Response) -> Result<String> {
    serde_json::to_string(response).map_err(|e| error::serialization(&e.to_string()))
}

/// Handle one request document and produce one response document
pub fn handle(session: &SimulationSession, line: &str) -> String {
    let response = parse_request(line)
        .and_then(|request| execute(session, request))
        .unwrap_or_else(|error| {
            log::warn!("request rejected: {}", error);
            Response::from(error)
        });

    render(&response).unwrap_or_else(|error| serde_json::json!({ "error": error.to_string() }).to_string())
}
