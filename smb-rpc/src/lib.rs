//! DCE/RPC codec for enumerating SMB shares through the SRVSVC named pipe.
//!
//! The crate builds the bind and `NetrShareEnum` request PDUs, and decodes
//! the NDR level-1 share list from the server's response. It performs no I/O:
//! writing the buffers to `\PIPE\srvsvc` and reading the replies is up to the
//! SMB transport.

pub mod config;
pub mod error;
pub mod packets;

pub use config::{BindConfig, RequestConfig};
pub use error::Error;
pub use packets::rpc::interface::srvsvc::{
    build_share_enum_request, build_share_enum_request_with, parse_share_enum_pdu,
    parse_share_enum_response, ShareKind, ShareRecord, ShareType, SrvSvc,
    DEFAULT_SHARE_INFO_LEVEL, SHARE_TYPE_UNKNOWN,
};
pub use packets::rpc::interface::{
    build_bind_request, build_bind_request_for, check_bind_ack, RpcInterface,
};

pub type Result<T> = std::result::Result<T, crate::Error>;
