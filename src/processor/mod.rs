pub mod allow_block;
pub mod phase;

use std::collections::BTreeMap;

use anyhow::{bail, Result};

use crate::policy::Verdict;
use crate::settings::Settings;

pub use phase::{Exchange, ExchangeState, Phase, PhaseEvent};

/// Header map as delivered by the host proxy, keyed by lowercase name.
pub type Headers = BTreeMap<String, String>;

/// A named processor the host consults at the request-headers decision
/// point. The five remaining lifecycle phases never carry a decision; the
/// [`Exchange`] state machine passes them through unconditionally.
pub trait RequestProcessor: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn request_headers(&self, headers: &Headers) -> Verdict;
}

type ProcessorFactory = fn(&Settings) -> Result<Box<dyn RequestProcessor>>;

/// Registered processors, resolved once at startup. No runtime mutation.
const REGISTRY: &[(&str, ProcessorFactory)] =
    &[("allow-and-block", allow_block::AllowBlockProcessor::build)];

pub fn build_processor(settings: &Settings) -> Result<Box<dyn RequestProcessor>> {
    for (name, factory) in REGISTRY {
        if *name == settings.processor {
            return factory(settings);
        }
    }
    bail!("processor \"{}\" is not defined", settings.processor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::LogFormat;
    use crate::settings::ProcessingOptions;

    fn settings(processor: &str) -> Settings {
        Settings {
            listen: "127.0.0.1:0".parse().unwrap(),
            processor: processor.to_string(),
            options: ProcessingOptions::default(),
            allow: Vec::new(),
            block: Vec::new(),
            log: LogFormat::Text,
        }
    }

    #[test]
    fn resolves_registered_processor() {
        let processor = build_processor(&settings("allow-and-block")).unwrap();
        assert_eq!(processor.name(), "allow-and-block");
    }

    #[test]
    fn rejects_unknown_processor_name() {
        let err = build_processor(&settings("no-such-processor")).unwrap_err();
        assert!(err.to_string().contains("\"no-such-processor\""));
    }
}
