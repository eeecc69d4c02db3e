use clap::{Parser, Subcommand};
use smb_rpc::{BindConfig, RequestConfig, DEFAULT_SHARE_INFO_LEVEL};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    /// Writes the raw PDU to this file instead of printing it as hex.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct BindCmd {
    #[arg(long, default_value_t = BindConfig::DEFAULT_CALL_ID)]
    pub call_id: u32,
    #[arg(long, default_value_t = BindConfig::NO_ASSOC_GROUP_ID)]
    pub assoc_group_id: u32,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl BindCmd {
    pub fn make_bind_config(&self) -> BindConfig {
        BindConfig {
            call_id: self.call_id,
            assoc_group_id: self.assoc_group_id,
            ..Default::default()
        }
    }
}

#[derive(Parser, Debug)]
pub struct ShareEnumCmd {
    /// Server name, usually in `\\host` form.
    pub server: String,
    #[arg(short, long, default_value_t = DEFAULT_SHARE_INFO_LEVEL)]
    pub level: u32,
    #[arg(long, default_value_t = RequestConfig::DEFAULT_CALL_ID)]
    pub call_id: u32,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl ShareEnumCmd {
    pub fn make_request_config(&self) -> RequestConfig {
        RequestConfig {
            call_id: self.call_id,
            ..Default::default()
        }
    }
}

#[derive(Parser, Debug)]
pub struct SharesCmd {
    /// Captured `NetrShareEnum` response PDU.
    pub file: PathBuf,
    /// Skips PDU header validation.
    #[arg(long)]
    pub raw: bool,
}

#[derive(Parser, Debug)]
pub struct BindAckCmd {
    /// Captured bind response PDU.
    pub file: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Builds the SRVSVC bind request.
    Bind(BindCmd),
    /// Builds a share enumeration request.
    ShareEnum(ShareEnumCmd),
    /// Lists the shares in a captured response.
    Shares(SharesCmd),
    /// Checks a captured bind response.
    BindAck(BindAckCmd),
}
