//! Wire parameters for the bind and request PDUs.

/// Parameters of the interface bind PDU.
///
/// The defaults are the values every SRVSVC client sends: maximal fragment
/// sizes, a fresh association group, and call id 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindConfig {
    pub max_xmit_frag: u16,
    pub max_recv_frag: u16,
    /// Zero requests a new association group.
    pub assoc_group_id: u32,
    pub call_id: u32,
}

impl BindConfig {
    pub const DEFAULT_FRAG_LIMIT: u16 = u16::MAX;
    pub const NO_ASSOC_GROUP_ID: u32 = 0;
    pub const DEFAULT_CALL_ID: u32 = 1;
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            max_xmit_frag: Self::DEFAULT_FRAG_LIMIT,
            max_recv_frag: Self::DEFAULT_FRAG_LIMIT,
            assoc_group_id: Self::NO_ASSOC_GROUP_ID,
            call_id: Self::DEFAULT_CALL_ID,
        }
    }
}

/// Parameters of an RPC request PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    pub call_id: u32,
    /// Presentation context negotiated by the bind. A single-context bind
    /// always yields context 0.
    pub context_id: u16,
    /// Advisory size of the stub data, in bytes.
    pub alloc_hint: u32,
}

impl RequestConfig {
    pub const DEFAULT_CALL_ID: u32 = 0;
    pub const DEFAULT_ALLOC_HINT: u32 = 72;
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            call_id: Self::DEFAULT_CALL_ID,
            context_id: 0,
            alloc_hint: Self::DEFAULT_ALLOC_HINT,
        }
    }
}
