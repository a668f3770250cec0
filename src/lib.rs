pub mod cli;
pub mod config;
pub mod logging;
pub mod policy;
pub mod processor;
pub mod server;
pub mod settings;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::processor::RequestProcessor;
use crate::server::ServerContext;
use crate::settings::Settings;

pub async fn run(settings: Settings) -> Result<()> {
    let settings = Arc::new(settings);
    let processor: Arc<dyn RequestProcessor> = Arc::from(processor::build_processor(&settings)?);
    info!(
        processor = processor.name(),
        allow_entries = settings.allow.len(),
        block_entries = settings.block.len(),
        "processor initialized"
    );
    server::run(ServerContext {
        settings,
        processor,
    })
    .await
}
