//! Newline-delimited JSON framing for phase events and their responses.
//!
//! One line in, one line out per phase. The format stands in for the host
//! proxy's extension-stream transport and is internal to this crate and its
//! tests.

use std::net::SocketAddr;

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::policy::Verdict;

/// Phase events are small; anything larger is a broken peer.
const MAX_EVENT_BYTES: usize = 64 * 1024;

/// Reads one event line into `buf`. Returns 0 when the peer closed the
/// stream cleanly before sending another event.
pub async fn read_event_line<S>(
    reader: &mut BufReader<S>,
    buf: &mut String,
    peer: SocketAddr,
) -> Result<usize>
where
    S: AsyncRead + Unpin,
{
    buf.clear();
    let mut collected = Vec::new();

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            if collected.is_empty() {
                return Ok(0);
            }
            bail!("connection closed mid-event from {peer}");
        }

        let newline_pos = available.iter().position(|byte| *byte == b'\n');
        let consume = newline_pos.map(|idx| idx + 1).unwrap_or(available.len());

        if collected.len() + consume > MAX_EVENT_BYTES {
            bail!("phase event from {peer} exceeds limit of {MAX_EVENT_BYTES} bytes");
        }

        collected.extend_from_slice(&available[..consume]);
        reader.consume(consume);

        if newline_pos.is_some() {
            break;
        }
    }

    let line = String::from_utf8(collected)
        .map_err(|_| anyhow!("phase event from {peer} contained invalid bytes"))?;
    let len = line.len();
    *buf = line;
    Ok(len)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PhaseResponse {
    Continue,
    Cancel {
        status: u16,
        status_text: &'static str,
        reason: &'static str,
    },
}

impl From<&Verdict> for PhaseResponse {
    fn from(verdict: &Verdict) -> Self {
        match verdict {
            Verdict::Continue => PhaseResponse::Continue,
            Verdict::Cancel { status, reason } => PhaseResponse::Cancel {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or(""),
                reason,
            },
        }
    }
}

pub async fn write_response<S>(writer: &mut S, verdict: &Verdict) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let mut payload = serde_json::to_vec(&PhaseResponse::from(verdict))?;
    payload.push(b'\n');
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}
