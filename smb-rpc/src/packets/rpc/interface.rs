//! RPC interfaces, and the bind exchange that selects one on a pipe.

pub mod srvsvc;

use crate::{
    config::BindConfig,
    packets::rpc::{
        ndr::NDR_TRANSFER_SYNTAX,
        pdu::{
            DceRpcCoPktBindAckDefResult, DceRpcCoRequestPkt, DceRpcCoResponsePkt,
            DceRpcSyntaxId, DcRpcCoPktBind, DcRpcCoPktBindContextElement,
            DcRpcCoPktResponseContent,
        },
    },
    Error,
};

use srvsvc::SrvSvc;

pub trait RpcInterface {
    /// Abstract syntax the interface is bound by.
    const SYNTAX_ID: DceRpcSyntaxId;
}

/// Builds the bind PDU for SRVSVC over NDR, with the default [`BindConfig`].
pub fn build_bind_request() -> Vec<u8> {
    build_bind_request_for::<SrvSvc>(&BindConfig::default())
}

/// Builds a bind PDU proposing a single presentation context (id 0):
/// the interface's abstract syntax over the NDR transfer syntax.
pub fn build_bind_request_for<I>(config: &BindConfig) -> Vec<u8>
where
    I: RpcInterface,
{
    log::debug!("Building bind request for {}", I::SYNTAX_ID);
    DceRpcCoRequestPkt::new(
        DcRpcCoPktBind {
            max_xmit_frag: config.max_xmit_frag,
            max_recv_frag: config.max_recv_frag,
            assoc_group_id: config.assoc_group_id,
            context_elements: vec![DcRpcCoPktBindContextElement {
                context_id: 0,
                abstract_syntax: I::SYNTAX_ID,
                transfer_syntaxes: vec![NDR_TRANSFER_SYNTAX],
            }],
        }
        .into(),
        config.call_id,
    )
    .to_bytes()
}

/// Checks the server's answer to [`build_bind_request_for`], returning the
/// accepted presentation context id.
pub fn check_bind_ack(data: &[u8]) -> crate::Result<u16> {
    const CONTEXT_ID: u16 = 0;

    let bind_ack = match DceRpcCoResponsePkt::try_from(data)?.into_content() {
        DcRpcCoPktResponseContent::BindAck(bind_ack) => bind_ack,
        DcRpcCoPktResponseContent::BindNak(bind_nak) => {
            return Err(Error::BindRejected(bind_nak.reason));
        }
        content => {
            return Err(Error::InvalidMessage(format!(
                "Expected BindAck, got: {:?}",
                content.get_type()
            )));
        }
    };
    log::debug!("Bound to pipe with port spec {}", bind_ack.port_spec_str());

    let [ack_context] = bind_ack.results.as_slice() else {
        return Err(Error::InvalidMessage(format!(
            "BindAck has {} results, expected 1",
            bind_ack.results.len()
        )));
    };
    if ack_context.result != DceRpcCoPktBindAckDefResult::Acceptance {
        return Err(Error::InvalidMessage(format!(
            "BindAck result was not acceptance: {:?}",
            ack_context
        )));
    }
    if ack_context.syntax != NDR_TRANSFER_SYNTAX {
        return Err(Error::InvalidMessage(format!(
            "BindAck transfer syntax {} does not match expected {}",
            ack_context.syntax, NDR_TRANSFER_SYNTAX
        )));
    }
    Ok(CONTEXT_ID)
}
