pub mod codec;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::processor::{Exchange, PhaseEvent, RequestProcessor};
use crate::settings::Settings;

/// Everything a connection task needs, shared read-only across connections.
#[derive(Clone)]
pub struct ServerContext {
    pub settings: Arc<Settings>,
    pub processor: Arc<dyn RequestProcessor>,
}

pub async fn run(ctx: ServerContext) -> Result<()> {
    start_listener(ctx).await
}

async fn start_listener(ctx: ServerContext) -> Result<()> {
    let bind_addr = ctx.settings.listen;
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind listener on {bind_addr}"))?;
    let local_addr = listener.local_addr().unwrap_or(bind_addr);
    info!(address = %local_addr, processor = ctx.processor.name(), "processor listener started");

    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(err) => {
                error!(error = %err, "failed to accept incoming connection");
                continue;
            }
        };
        if let Err(err) = stream.set_nodelay(true) {
            debug!(peer = %peer_addr, error = %err, "failed to set TCP_NODELAY on stream");
        }
        let connection_ctx = ctx.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, peer_addr, connection_ctx).await {
                debug!(peer = %peer_addr, error = %err, "stream closed with error");
            }
        });
    }
}

/// Drives one exchange: phase events in protocol order, one response each.
/// Stops reading once the exchange reaches a terminal state.
async fn handle_connection(stream: TcpStream, peer: SocketAddr, ctx: ServerContext) -> Result<()> {
    let options = ctx.settings.options;
    if options.log_stream {
        debug!(peer = %peer, "stream opened");
    }

    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut exchange = Exchange::new();
    let mut line = String::new();

    loop {
        let read = codec::read_event_line(&mut reader, &mut line, peer).await?;
        if read == 0 {
            break;
        }
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        let event: PhaseEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("malformed phase event from {peer}"))?;
        if options.log_phases {
            debug!(peer = %peer, phase = %event.phase(), "phase event");
        }
        let verdict = exchange.advance(&event, ctx.processor.as_ref())?;
        codec::write_response(&mut write_half, &verdict).await?;
        if exchange.is_terminal() {
            break;
        }
    }

    if options.log_stream {
        debug!(peer = %peer, state = ?exchange.state(), "stream closed");
    }
    Ok(())
}
