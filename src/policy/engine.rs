use http::StatusCode;

use super::pool::IpPool;
use super::{Verdict, REASON_IN_BLOCK_LIST, REASON_MISSING_HEADER, REASON_NOT_IN_ALLOW_LIST};
use crate::config::LIST_SEPARATOR;

/// Request header conventionally listing the chain of client/proxy addresses
/// a request traversed, originating client first.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Applies allow/block policy to the client address carried in the
/// forwarded-address header.
///
/// Holds both pools even though startup validation only ever populates one
/// of them; evaluation is defined for the combined case regardless, with the
/// allow check running first.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    allow: IpPool,
    block: IpPool,
}

impl AccessPolicy {
    pub fn new(allow: IpPool, block: IpPool) -> Self {
        Self { allow, block }
    }

    pub fn allow_pool(&self) -> &IpPool {
        &self.allow
    }

    pub fn block_pool(&self) -> &IpPool {
        &self.block
    }

    /// Evaluates one request. Pure function over the immutable pools; never
    /// errors, only produces a policy outcome.
    pub fn evaluate(&self, forwarded: &str) -> Verdict {
        let Some(address) = extract_client_address(forwarded) else {
            return Verdict::cancel(StatusCode::FORBIDDEN, REASON_MISSING_HEADER);
        };

        if !self.allow.is_empty() && !self.allow.contains(address) {
            return Verdict::cancel(StatusCode::FORBIDDEN, REASON_NOT_IN_ALLOW_LIST);
        }

        if !self.block.is_empty() && self.block.contains(address) {
            return Verdict::cancel(StatusCode::FORBIDDEN, REASON_IN_BLOCK_LIST);
        }

        Verdict::Continue
    }
}

/// Takes the first comma-separated segment of the forwarded-address header,
/// trimmed. The chain's left-to-right ordering is trusted, not validated.
/// Returns `None` when the header (or its first segment) is empty.
pub fn extract_client_address(forwarded: &str) -> Option<&str> {
    let first = forwarded.split(LIST_SEPARATOR).next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first)
    }
}
