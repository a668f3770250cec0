use std::net::{Ipv4Addr, SocketAddr};

use anyhow::Result;

use crate::cli::{Cli, LogFormat};
use crate::config::split_address_args;

/// Validated startup configuration, read-only for the life of the process.
#[derive(Debug, Clone)]
pub struct Settings {
    pub listen: SocketAddr,
    pub processor: String,
    pub options: ProcessingOptions,
    pub allow: Vec<String>,
    pub block: Vec<String>,
    pub log: LogFormat,
}

/// Host-level processing toggles shared with the transport layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessingOptions {
    pub log_stream: bool,
    pub log_phases: bool,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (allow, block) =
            split_address_args(cli.allow_list.as_deref(), cli.block_list.as_deref())?;
        Ok(Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, cli.port)),
            processor: cli.processor.clone(),
            options: ProcessingOptions {
                log_stream: cli.log_stream,
                log_phases: cli.log_phases,
            },
            allow,
            block,
            log: cli.log,
        })
    }
}
