pub mod engine;
pub mod pool;

use http::StatusCode;

pub use engine::{extract_client_address, AccessPolicy, FORWARDED_FOR_HEADER};
pub use pool::IpPool;

pub const REASON_MISSING_HEADER: &str = "no forwarded-address header";
pub const REASON_NOT_IN_ALLOW_LIST: &str = "address not in allow list";
pub const REASON_IN_BLOCK_LIST: &str = "address in block list";

/// Outcome of evaluating one request: let the exchange proceed, or terminate
/// it with a status code and a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Cancel {
        status: StatusCode,
        reason: &'static str,
    },
}

impl Verdict {
    pub fn cancel(status: StatusCode, reason: &'static str) -> Self {
        Self::Cancel { status, reason }
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }
}
