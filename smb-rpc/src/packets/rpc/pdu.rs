//! DCE/RPC PDUs for connection-oriented RPC over SMB.

use std::io::Cursor;

use binrw::prelude::*;
use modular_bitfield::prelude::*;

use crate::packets::guid::Guid;

pub const DCE_RPC_VERSION: DceRpcVersion = DceRpcVersion { major: 5, minor: 0 };

/// Little-endian integers, ASCII characters, IEEE floats.
pub const PACKED_DREP: u32 = 0x10;

macro_rules! rpc_pkts {
    ($
        ($name:ident {
            $($pdu_type:ident = $pdu_oper_id:literal,)+
        }),+
    ) => {
        paste::paste! {
                    $(
// Packet Type (Bind/BindAck, etc.)
#[binrw::binrw]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[brw(repr(u8))]
pub enum [<DceRpcCoPkt $name Type>] {
    $(
        $pdu_type = $pdu_oper_id,
    )+
}

impl TryFrom<u8> for [<DceRpcCoPkt $name Type>] {
    type Error = crate::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            $(
                $pdu_oper_id => Ok(Self::$pdu_type),
            )+
            _ => Err(crate::Error::InvalidMessage(format!(
                "Unexpected {} packet type: {}",
                stringify!($name),
                value
            ))),
        }
    }
}

// Packet Content, redefined for each direction.
#[binrw::binrw]
#[derive(Debug, PartialEq, Eq)]
#[br(import(ptype: u8))]
pub enum [<DcRpcCoPkt $name Content>] {
        $(
            #[br(pre_assert(ptype == [<DceRpcCoPkt $name Type>]::$pdu_type as u8))]
            $pdu_type([<DcRpcCoPkt $pdu_type>]),
        )+
}

impl [<DcRpcCoPkt $name Content>] {
    /// Returns the Type of the packet by its content.
    pub fn get_type(&self) -> [<DceRpcCoPkt $name Type>] {
        match self {
            $(
                Self::$pdu_type(_) => [<DceRpcCoPkt $name Type>]::$pdu_type,
            )+
        }
    }
}

$(
    impl From<[<DcRpcCoPkt $pdu_type>]> for [<DcRpcCoPkt $name Content>] {
        fn from(value: [<DcRpcCoPkt $pdu_type>]) -> Self {
            Self::$pdu_type(value)
        }
    }
)+
                    )+
                }
    };
}

rpc_pkts! {
    Request {
        Request = 0,
        Bind = 11,
    },
    Response {
        Response = 2,
        Fault = 3,
        BindAck = 12,
        BindNak = 13,
    }
}

/// The common header shared by every connection-oriented PDU.
#[binrw::binrw]
#[derive(Debug, PartialEq, Eq, Clone)]
#[brw(little)]
pub struct DceRpcCoHeader {
    pub rpc_ver: DceRpcVersion,
    pub ptype: u8,
    pub pfc_flags: DceRpcCoPktFlags,
    pub packed_drep: u32,
    /// Size of the whole PDU, header included.
    pub frag_length: u16,
    #[br(assert(auth_length == 0))]
    #[bw(calc = 0)]
    auth_length: u16, // auth currently disabled.
    pub call_id: u32,
}

impl DceRpcCoHeader {
    pub const SIZE: usize = 16;
}

/// An outgoing PDU.
///
/// The content is serialized before the header, so the fragment length
/// is known when the header is written and never patched afterwards.
#[derive(Debug, PartialEq, Eq)]
pub struct DceRpcCoRequestPkt {
    call_id: u32,
    pfc_flags: DceRpcCoPktFlags,
    content: DcRpcCoPktRequestContent,
}

impl DceRpcCoRequestPkt {
    pub fn new(content: DcRpcCoPktRequestContent, call_id: u32) -> Self {
        Self {
            call_id,
            pfc_flags: DceRpcCoPktFlags::new()
                .with_first_frag(true)
                .with_last_frag(true),
            content,
        }
    }

    /// Serializes the PDU.
    ///
    /// # Panics
    /// If the encoded PDU does not fit in a 16-bit fragment length. Callers
    /// must keep their inputs (e.g. server names) within that bound.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut body = Cursor::new(Vec::new());
        self.content
            .write_le(&mut body)
            .expect("writing to an in-memory buffer cannot fail");
        let body = body.into_inner();

        let frag_length = u16::try_from(DceRpcCoHeader::SIZE + body.len())
            .expect("PDU exceeds the maximum fragment length");
        let header = DceRpcCoHeader {
            rpc_ver: DCE_RPC_VERSION,
            ptype: self.content.get_type() as u8,
            pfc_flags: self.pfc_flags,
            packed_drep: PACKED_DREP,
            frag_length,
            call_id: self.call_id,
        };

        let mut pdu = Cursor::new(Vec::with_capacity(frag_length as usize));
        header
            .write(&mut pdu)
            .expect("writing to an in-memory buffer cannot fail");
        let mut pdu = pdu.into_inner();
        pdu.extend_from_slice(&body);
        log::trace!(
            "Built {:?} PDU, call id {}, {} bytes",
            self.content.get_type(),
            self.call_id,
            pdu.len()
        );
        pdu
    }
}

/// An incoming PDU, decoded up to its declared fragment length.
#[derive(Debug, PartialEq, Eq)]
pub struct DceRpcCoResponsePkt {
    header: DceRpcCoHeader,
    content: DcRpcCoPktResponseContent,
}

impl DceRpcCoResponsePkt {
    pub fn header(&self) -> &DceRpcCoHeader {
        &self.header
    }

    pub fn into_content(self) -> DcRpcCoPktResponseContent {
        self.content
    }
}

impl TryFrom<&[u8]> for DceRpcCoResponsePkt {
    type Error = crate::Error;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        let header = DceRpcCoHeader::read(&mut Cursor::new(data))?;
        if header.rpc_ver != DCE_RPC_VERSION {
            return Err(crate::Error::InvalidMessage(format!(
                "Unsupported RPC version: {}.{}",
                header.rpc_ver.major, header.rpc_ver.minor
            )));
        }
        let ptype = DceRpcCoPktResponseType::try_from(header.ptype)?;
        if header.packed_drep != PACKED_DREP {
            return Err(crate::Error::InvalidMessage(format!(
                "Currently Unsupported packed DREP: {:#x}",
                header.packed_drep
            )));
        }
        let frag_length = header.frag_length as usize;
        if frag_length < DceRpcCoHeader::SIZE || frag_length > data.len() {
            return Err(crate::Error::InvalidMessage(format!(
                "Fragment length {} does not fit a {} byte buffer",
                frag_length,
                data.len()
            )));
        }
        let mut content_cursor = Cursor::new(&data[DceRpcCoHeader::SIZE..frag_length]);
        let content =
            DcRpcCoPktResponseContent::read_le_args(&mut content_cursor, (ptype as u8,))?;
        Ok(Self { header, content })
    }
}

#[binrw::binrw]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DceRpcVersion {
    pub major: u8,
    pub minor: u8,
}

#[bitfield]
#[derive(BinWrite, BinRead, Debug, Clone, Copy, PartialEq, Eq)]
#[bw(map = |&x| Self::into_bytes(x))]
pub struct DceRpcCoPktFlags {
    pub first_frag: bool,
    pub last_frag: bool,
    /// Cancel was pending at sender
    pub pending_cancel: bool,
    #[skip]
    __: bool,
    /// supports concurrent multiplexing of a single connection.
    pub conc_mpx: bool,
    /// only meaningful on `fault' packet;
    /// if true, guaranteed call did not execute.
    pub did_not_execute: bool,
    #[skip]
    __: bool,
    /// a non-nil object UUID is present in the optional object field.
    pub object_uuid: bool,
}

#[binrw::binrw]
#[derive(Debug, PartialEq, Eq)]
pub struct DcRpcCoPktRequest {
    pub alloc_hint: u32,
    pub context_id: u16,
    pub opnum: u16,
    #[br(parse_with = binrw::helpers::until_eof)]
    pub stub_data: Vec<u8>,
}

#[binrw::binrw]
#[derive(Debug, PartialEq, Eq)]
pub struct DcRpcCoPktResponse {
    pub alloc_hint: u32,
    pub context_id: u16,
    pub cancel_count: u8,
    #[bw(calc = 0)]
    _reserved: u8,
    #[br(parse_with = binrw::helpers::until_eof)]
    pub stub_data: Vec<u8>,
}

#[binrw::binrw]
#[derive(Debug, PartialEq, Eq)]
pub struct DcRpcCoPktFault {
    pub alloc_hint: u32,
    pub context_id: u16,
    pub cancel_count: u8,
    #[bw(calc = 0)]
    _reserved: u8,
    pub status: u32,
    #[bw(calc = 0)]
    _reserved2: u32,
}

#[binrw::binrw]
#[derive(Debug, PartialEq, Eq)]
pub struct DcRpcCoPktBind {
    pub max_xmit_frag: u16,
    pub max_recv_frag: u16,
    pub assoc_group_id: u32,

    #[bw(calc = context_elements.len() as u8)]
    num_context_items: u8,

    #[bw(calc = 0)]
    _reserved: u8,
    #[bw(calc = 0)]
    _reserved2: u16,

    #[br(count = num_context_items)]
    pub context_elements: Vec<DcRpcCoPktBindContextElement>,
}

#[binrw::binrw]
#[derive(Debug, PartialEq, Eq)]
pub struct DcRpcCoPktBindContextElement {
    pub context_id: u16,
    #[bw(calc = transfer_syntaxes.len() as u8)]
    num_transfer_syntaxes: u8,
    #[bw(calc = 0)]
    #[br(assert(_reserved == 0))]
    _reserved: u8,
    pub abstract_syntax: DceRpcSyntaxId,
    #[br(count = num_transfer_syntaxes)]
    pub transfer_syntaxes: Vec<DceRpcSyntaxId>,
}

/// An interface or transfer syntax identifier: UUID plus major.minor version.
#[binrw::binrw]
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DceRpcSyntaxId {
    pub uuid: Guid,
    pub version: u16,
    pub version_minor: u16,
}

impl std::fmt::Display for DceRpcSyntaxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}/{}.{})", self.uuid, self.version, self.version_minor)
    }
}

#[binrw::binrw]
#[derive(Debug, PartialEq, Eq)]
pub struct DcRpcCoPktBindAck {
    pub max_xmit_frag: u16,
    pub max_recv_frag: u16,
    pub assoc_group_id: u32,

    #[bw(calc = port_spec.len() as u16)]
    port_spec_len: u16,
    /// Secondary address, e.g. `\PIPE\srvsvc`, null terminated.
    #[br(count = port_spec_len)]
    pub port_spec: Vec<u8>,

    #[brw(align_before = 4)]
    #[bw(calc = results.len() as u8)]
    num_results: u8,
    #[bw(calc = 0)]
    _reserved: u8,
    #[bw(calc = 0)]
    _reserved2: u16,

    #[br(count = num_results)]
    pub results: Vec<DcRpcCoPktBindAckResult>,
}

impl DcRpcCoPktBindAck {
    /// The secondary address as text, without the null terminator.
    pub fn port_spec_str(&self) -> String {
        let end = self
            .port_spec
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(self.port_spec.len());
        String::from_utf8_lossy(&self.port_spec[..end]).into_owned()
    }
}

#[binrw::binrw]
#[derive(Debug, PartialEq, Eq)]
pub struct DcRpcCoPktBindAckResult {
    pub result: DceRpcCoPktBindAckDefResult,
    pub reason: DcRpcCoPktBindAckReason,
    pub syntax: DceRpcSyntaxId,
}

#[binrw::binrw]
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[brw(repr(u16))]
pub enum DceRpcCoPktBindAckDefResult {
    Acceptance = 0,
    UserRejection = 1,
    ProviderRejection = 2,
    NegotiateAck = 3,
}

#[binrw::binrw]
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[brw(repr(u16))]
pub enum DcRpcCoPktBindAckReason {
    NotSpecified = 0,
    AbstractSyntaxNotSupported = 1,
    ProposedTransferSyntaxesNotSupported = 2,
    LocalLimitExceeded = 3,
}

#[binrw::binrw]
#[derive(Debug, PartialEq, Eq)]
pub struct DcRpcCoPktBindNak {
    pub reason: DceRpcCoPktBindRejectReason,
    #[bw(calc = protocols.len() as u8)]
    num_protocols: u8,
    #[br(count = num_protocols)]
    pub protocols: Vec<DceRpcVersion>,
}

#[binrw::binrw]
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[brw(repr(u16))]
pub enum DceRpcCoPktBindRejectReason {
    ReasonNotSpecified = 0,
    TemporaryCongestion = 1,
    LocalLimitExceeded = 2,
    CalledPaddrUnknown = 3,
    ProtocolVersionNotSupported = 4,
    DefaultContextNotSupported = 5,
    UserDataNotReadable = 6,
    NoPsapAvailable = 7,
    AuthenticationTypeNotRecognized = 8,
    AuthenticationTypeNotSupported = 9,
}
