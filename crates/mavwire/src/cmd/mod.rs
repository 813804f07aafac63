use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Subcommand};
use mavwire_codec::SessionConfig;
use mavwire_schema::SchemaRegistry;

use crate::exit::{config_error, schema_error, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod messages;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode MAVLink v2 frames from a file or stdin.
    Decode(DecodeArgs),
    /// Encode a JSON command document into a frame.
    Encode(EncodeArgs),
    /// List dialect messages or show one message's wire layout.
    Messages(MessagesArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    pub format: OutputFormat,
    pub dialect: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl Context {
    /// The dialect named by `--dialect`, else the bundled common set.
    pub fn registry(&self) -> CliResult<Arc<SchemaRegistry>> {
        let registry = match &self.dialect {
            Some(path) => SchemaRegistry::from_file(path)
                .map_err(|err| schema_error(&format!("dialect {}", path.display()), err))?,
            None => SchemaRegistry::common()
                .map_err(|err| schema_error("bundled dialect", err))?,
        };
        tracing::debug!(
            dialect = registry.dialect(),
            version = registry.version(),
            messages = registry.len(),
            "dialect loaded"
        );
        Ok(Arc::new(registry))
    }

    /// Session config from `--config`, else defaults.
    pub fn session_config(&self) -> CliResult<SessionConfig> {
        match &self.config {
            Some(path) => SessionConfig::from_json_file(path)
                .map_err(|err| config_error(&format!("config {}", path.display()), err)),
            None => Ok(SessionConfig::default()),
        }
    }
}

pub fn run(command: Command, ctx: &Context) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, ctx),
        Command::Encode(args) => encode::run(args, ctx),
        Command::Messages(args) => messages::run(args, ctx),
        Command::Version(args) => version::run(args, ctx),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Read frames from this file instead of stdin.
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,
    /// Input is hex text rather than raw bytes. Whitespace is ignored.
    #[arg(long)]
    pub hex: bool,
    /// Feed the decoder in chunks of this many bytes.
    #[arg(long, default_value = "4096", value_parser = clap::value_parser!(u32).range(1..))]
    pub chunk: u32,
    /// Only accept frames from this system id (0 accepts all).
    #[arg(long, env = "MAVWIRE_TARGET")]
    pub target: Option<u8>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Command document, e.g. '{"MSGNAME":"COMMAND_LONG","command":400}'.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub json: Option<String>,
    /// Read the command document from a file. A JSON array encodes each element.
    #[arg(long, short = 'f', value_name = "FILE")]
    pub file: Option<PathBuf>,
    /// Print frames as hex instead of writing raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Source system id stamped on the frame.
    #[arg(long, env = "MAVWIRE_SYSID")]
    pub sysid: Option<u8>,
    /// Source component id stamped on the frame.
    #[arg(long, env = "MAVWIRE_COMPID")]
    pub compid: Option<u8>,
    /// Drop trailing zero payload bytes.
    #[arg(long, env = "MAVWIRE_TRUNCATE")]
    pub truncate: bool,
}

#[derive(Args, Debug)]
pub struct MessagesArgs {
    /// Show the layout of this message (case-insensitive).
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
