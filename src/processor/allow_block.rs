use anyhow::Result;
use tracing::info;

use super::{Headers, RequestProcessor};
use crate::policy::{AccessPolicy, IpPool, Verdict, FORWARDED_FOR_HEADER};
use crate::settings::Settings;

/// Allows or blocks exchanges by the client address in `x-forwarded-for`.
#[derive(Debug)]
pub struct AllowBlockProcessor {
    policy: AccessPolicy,
}

impl AllowBlockProcessor {
    pub fn new(allow: IpPool, block: IpPool) -> Self {
        Self {
            policy: AccessPolicy::new(allow, block),
        }
    }

    pub fn build(settings: &Settings) -> Result<Box<dyn RequestProcessor>> {
        let processor = Self::new(
            IpPool::from_list(&settings.allow),
            IpPool::from_list(&settings.block),
        );
        Ok(Box::new(processor))
    }
}

impl RequestProcessor for AllowBlockProcessor {
    fn name(&self) -> &'static str {
        "allow-and-block"
    }

    fn request_headers(&self, headers: &Headers) -> Verdict {
        let forwarded = headers
            .get(FORWARDED_FOR_HEADER)
            .map(String::as_str)
            .unwrap_or_default();
        let verdict = self.policy.evaluate(forwarded);
        if let Verdict::Cancel { status, reason } = &verdict {
            info!(
                forwarded = %forwarded,
                status = status.as_u16(),
                reason,
                "request rejected"
            );
        }
        verdict
    }
}
