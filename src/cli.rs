use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "xffgate", about = "xffgate request-filtering processor")]
pub struct Cli {
    /// Name of the registered processor to serve.
    pub processor: String,

    /// TCP port the processor listens on.
    #[arg(long, default_value_t = 50051)]
    pub port: u16,

    /// Log stream open and close events.
    #[arg(long)]
    pub log_stream: bool,

    /// Log every processing phase event.
    #[arg(long)]
    pub log_phases: bool,

    /// Comma-separated addresses to allow (mutually exclusive with --block-list).
    #[arg(long)]
    pub allow_list: Option<String>,

    /// Comma-separated addresses to block (mutually exclusive with --allow-list).
    #[arg(long)]
    pub block_list: Option<String>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    pub log: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    Json,
    Text,
}
