//! SRVSVC share enumeration ([MS-SRVS] `NetrShareEnum`, info level 1).

use std::{fmt::Display, io::Cursor};

use binrw::prelude::*;
use modular_bitfield::prelude::*;

use super::RpcInterface;
use crate::{
    config::RequestConfig,
    guid,
    packets::rpc::{
        ndr::{NdrReader, NdrWideString},
        pdu::{
            DceRpcCoRequestPkt, DceRpcCoResponsePkt, DceRpcSyntaxId, DcRpcCoPktRequest,
            DcRpcCoPktResponseContent,
        },
    },
    Error,
};

/// The Server Service interface, bound on `\PIPE\srvsvc`.
pub struct SrvSvc;

impl SrvSvc {
    pub const NETR_SHARE_ENUM_OPNUM: u16 = 0xf;
}

impl RpcInterface for SrvSvc {
    const SYNTAX_ID: DceRpcSyntaxId = DceRpcSyntaxId {
        uuid: guid!("4b324fc8-1670-01d3-1278-5a47bf6ee188"),
        version: 3,
        version_minor: 0,
    };
}

/// `SHARE_INFO_1`: name, type and remark.
pub const DEFAULT_SHARE_INFO_LEVEL: u32 = 1;

/// Share type reported when the descriptor's type field cannot be read.
pub const SHARE_TYPE_UNKNOWN: u32 = 0xFFFF_FFFF;

#[derive(BitfieldSpecifier, Debug, Clone, Copy, PartialEq, Eq)]
#[bits = 2]
pub enum ShareKind {
    Disk = 0,
    PrintQ = 1,
    Device = 2,
    IPC = 3,
}

/// Share types
///
/// [MS-SRVS][https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-srvs/6069f8c0-c93f-43a0-a5b4-7ed447eb4b84]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareType {
    pub kind: ShareKind,
    #[skip]
    __: B23,
    pub cluster_fs: bool,
    pub cluster_sofs: bool,
    pub cluster_dfs: bool,
    #[skip]
    __: B2,
    pub temporary: bool,
    pub special: bool,
}

impl ShareType {
    /// Returns whether this is the windows IPC share (IPC$)
    pub fn is_win_ipc(&self) -> bool {
        self.kind() == ShareKind::IPC && self.special()
    }
}

impl From<u32> for ShareType {
    fn from(value: u32) -> Self {
        Self::from_bytes(value.to_le_bytes())
    }
}

/// One share, as listed by `NetrShareEnum` at level 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRecord {
    pub name: String,
    /// Raw share type bitmask, or [`SHARE_TYPE_UNKNOWN`].
    pub share_type: u32,
    pub comment: String,
}

impl ShareRecord {
    /// The decoded share type, or `None` if the server's value was unreadable.
    pub fn share_type_flags(&self) -> Option<ShareType> {
        (self.share_type != SHARE_TYPE_UNKNOWN).then(|| ShareType::from(self.share_type))
    }
}

impl Display for ShareRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.share_type_flags() {
            Some(t) if t.special() => format!("{:?}*", t.kind()),
            Some(t) => format!("{:?}", t.kind()),
            None => "Unknown".to_string(),
        };
        write!(f, "{:<20} {:<8} {}", self.name, kind, self.comment)
    }
}

// FYI: RPC top-level stub data is aligned to min(8, arg_size0, arg_size1, ...) bytes.
// DCE/RPC Chap. 12.3: RPC PDU Encodings/Alignment.

/// Input arguments for [NetrShareEnum][https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-srvs/c4a98e7b-d416-439c-97bd-4d9f52f8ba52]
#[binrw::binwrite]
#[derive(Debug, PartialEq, Eq)]
#[bw(little)]
struct NetrShareEnumIn {
    #[bw(calc = NetrShareEnumIn::UNIQUE_REFERENT_ID)]
    _server_name_referent: u32,
    server_name: NdrWideString,
    level: u32,
    /// `SHARE_ENUM_UNION` switch.
    #[bw(calc = 1)]
    _container_switch: u32,
    #[bw(calc = NetrShareEnumIn::UNIQUE_REFERENT_ID)]
    _container_referent: u32,
    #[bw(calc = 0)]
    _entries_read: u32,
    /// The server fills in the share array.
    #[bw(calc = 0)]
    _null_buffer: u32,
    prefered_maximum_length: u32,
    #[bw(calc = NetrShareEnumIn::UNIQUE_REFERENT_ID)]
    _resume_handle_referent: u32,
    resume_handle: u32,
}

impl NetrShareEnumIn {
    const UNIQUE_REFERENT_ID: u32 = 1;
    const MAX_PREFERRED_LENGTH: u32 = u32::MAX;
}

/// Builds a `NetrShareEnum` request PDU with the default [`RequestConfig`].
pub fn build_share_enum_request(server_name: &str, level: u32) -> Vec<u8> {
    build_share_enum_request_with(server_name, level, &RequestConfig::default())
}

/// Builds a `NetrShareEnum` request PDU, enumerating from the first share.
///
/// # Panics
/// If `server_name` is too long for the PDU to fit a 16-bit fragment length.
pub fn build_share_enum_request_with(
    server_name: &str,
    level: u32,
    config: &RequestConfig,
) -> Vec<u8> {
    let input = NetrShareEnumIn {
        server_name: server_name.into(),
        level,
        prefered_maximum_length: NetrShareEnumIn::MAX_PREFERRED_LENGTH,
        resume_handle: 0,
    };
    let mut stub = Cursor::new(Vec::new());
    input
        .write(&mut stub)
        .expect("writing to an in-memory buffer cannot fail");

    log::debug!("Building NetrShareEnum request for {server_name:?}, level {level}");
    DceRpcCoRequestPkt::new(
        DcRpcCoPktRequest {
            alloc_hint: config.alloc_hint,
            context_id: config.context_id,
            opnum: SrvSvc::NETR_SHARE_ENUM_OPNUM,
            stub_data: stub.into_inner(),
        }
        .into(),
        config.call_id,
    )
    .to_bytes()
}

/// Response PDU header, stub info level, container and array pointers,
/// up to the conformant array's max count.
const SHARE_COUNT_OFFSET: usize = 44;
/// Start of the `SHARE_INFO_1` array.
const SHARE_INFO_OFFSET: usize = 48;
/// netname pointer, type, remark pointer.
const SHARE_INFO_1_SIZE: usize = 12;
const SHARE_INFO_1_TYPE_OFFSET: usize = 4;

fn share_type_offset(index: usize) -> Option<usize> {
    index
        .checked_mul(SHARE_INFO_1_SIZE)?
        .checked_add(SHARE_INFO_OFFSET + SHARE_INFO_1_TYPE_OFFSET)
}

/// Parses the share list out of a raw `NetrShareEnum` level 1 response PDU.
///
/// The `SHARE_INFO_1` array is followed by the netname and remark strings of
/// each entry, in order. A type field that cannot be read is reported as
/// [`SHARE_TYPE_UNKNOWN`], and a string that is not valid UTF-16 as an empty
/// string; only a buffer too short for a declared field fails the parse.
pub fn parse_share_enum_response(data: &[u8]) -> crate::Result<Vec<ShareRecord>> {
    let count = NdrReader::new(data)
        .peek_u32(SHARE_COUNT_OFFSET)
        .ok_or_else(|| {
            Error::MalformedResponse(format!(
                "Response of {} bytes is too short for a share count",
                data.len()
            ))
        })? as usize;
    log::debug!("Response declares {count} shares");

    let strings_offset = count
        .checked_mul(SHARE_INFO_1_SIZE)
        .and_then(|size| size.checked_add(SHARE_INFO_OFFSET))
        .ok_or_else(|| Error::MalformedResponse(format!("Share count {count} overflows")))?;
    let mut reader = NdrReader::with_position(data, strings_offset);

    let mut shares = vec![];
    for i in 0..count {
        let share_type = share_type_offset(i)
            .and_then(|offset| reader.peek_u32(offset))
            .unwrap_or_else(|| {
                log::debug!("Type of share #{i} is unreadable");
                SHARE_TYPE_UNKNOWN
            });
        let name = reader.read_wide_string()?;
        let comment = reader.read_wide_string()?;
        log::trace!("Share #{i}: {name:?} ({share_type:#x}) {comment:?}");
        shares.push(ShareRecord {
            name,
            share_type,
            comment,
        });

        // The final alignment pad may be missing; keep what was read.
        if reader.is_past_end() {
            log::debug!(
                "Response ends at offset {} after {} of {} shares",
                reader.position(),
                shares.len(),
                count
            );
            break;
        }
    }
    Ok(shares)
}

/// Validates the common header of a `NetrShareEnum` reply, then parses its
/// share list. Fault PDUs are reported as [`Error::RpcFault`].
pub fn parse_share_enum_pdu(data: &[u8]) -> crate::Result<Vec<ShareRecord>> {
    let pdu = DceRpcCoResponsePkt::try_from(data)?;
    let frag_length = pdu.header().frag_length as usize;
    match pdu.into_content() {
        DcRpcCoPktResponseContent::Response(_) => parse_share_enum_response(&data[..frag_length]),
        DcRpcCoPktResponseContent::Fault(fault) => Err(Error::RpcFault(fault.status)),
        content => Err(Error::InvalidMessage(format!(
            "Expected Response, got: {:?}",
            content.get_type()
        ))),
    }
}
