use thiserror::Error;

use crate::packets::rpc::pdu::DceRpcCoPktBindRejectReason;

#[derive(Error, Debug)]
pub enum Error {
    /// The response is too short for a field it declares, or a string
    /// length would read past the end of the buffer.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Unexpected Message, {0}")]
    InvalidMessage(String),
    #[error("Binrw Error: {0}")]
    BinRWError(#[from] binrw::Error),
    #[error("Server returned an RPC fault, status {0:#010x}")]
    RpcFault(u32),
    #[error("Bind rejected by server: {0:?}")]
    BindRejected(DceRpcCoPktBindRejectReason),
}
