#![allow(dead_code)]

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration as StdDuration;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use xffgate::cli::LogFormat;
use xffgate::config::split_address_args;
use xffgate::settings::{ProcessingOptions, Settings};

const IO_TIMEOUT: StdDuration = StdDuration::from_secs(2);

pub fn find_free_port() -> Result<u16> {
    let listener = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

pub async fn wait_for_listener(addr: SocketAddr) -> Result<()> {
    for _ in 0..50 {
        match timeout(StdDuration::from_millis(50), TcpStream::connect(addr)).await {
            Ok(Ok(mut stream)) => {
                stream.shutdown().await.ok();
                return Ok(());
            }
            _ => sleep(StdDuration::from_millis(50)).await,
        }
    }
    Err(anyhow!("listener {addr} did not become ready"))
}

pub struct ProcessorHarness {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ProcessorHarness {
    /// Spawns the allow-and-block processor with the given raw list
    /// arguments, exactly as the CLI would supply them.
    pub async fn spawn(allow: Option<&str>, block: Option<&str>) -> Result<Self> {
        let (allow, block) = split_address_args(allow, block)?;
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, find_free_port()?));
        let settings = Settings {
            listen: addr,
            processor: "allow-and-block".to_string(),
            options: ProcessingOptions {
                log_stream: true,
                log_phases: true,
            },
            allow,
            block,
            log: LogFormat::Text,
        };

        let handle = tokio::spawn(async move {
            if let Err(err) = xffgate::run(settings).await {
                eprintln!("processor run failed: {err:?}");
            }
        });

        wait_for_listener(addr).await?;
        Ok(Self { addr, handle })
    }

    pub async fn connect(&self) -> Result<ExchangeClient> {
        let stream = TcpStream::connect(self.addr).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(ExchangeClient {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }

    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}

/// One proxied exchange stream from the host's point of view.
pub struct ExchangeClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl ExchangeClient {
    /// Sends one phase event and reads the processor's response line.
    pub async fn send(&mut self, event: Value) -> Result<Value> {
        self.write_event(&event).await?;
        let mut line = String::new();
        let read = timeout(IO_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .context("timed out waiting for phase response")??;
        if read == 0 {
            return Err(anyhow!("stream closed before a phase response arrived"));
        }
        serde_json::from_str(line.trim_end()).context("malformed phase response")
    }

    /// Sends one phase event and expects the processor to close the stream
    /// without responding.
    pub async fn send_expect_closed(&mut self, event: Value) -> Result<()> {
        self.write_event(&event).await?;
        let mut line = String::new();
        let read = timeout(IO_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .context("timed out waiting for stream close")??;
        if read != 0 {
            return Err(anyhow!("expected closed stream, got response: {line}"));
        }
        Ok(())
    }

    /// Confirms the processor closed the stream after a terminal state.
    pub async fn expect_closed(&mut self) -> Result<()> {
        let mut line = String::new();
        let read = timeout(IO_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .context("timed out waiting for stream close")??;
        if read != 0 {
            return Err(anyhow!("expected closed stream, got response: {line}"));
        }
        Ok(())
    }

    async fn write_event(&mut self, event: &Value) -> Result<()> {
        let mut payload = serde_json::to_vec(event)?;
        payload.push(b'\n');
        self.writer.write_all(&payload).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
