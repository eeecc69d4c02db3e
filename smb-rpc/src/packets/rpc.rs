//! Connection-oriented DCE/RPC, as carried over SMB named pipes.
pub mod interface;
pub mod ndr;
pub mod pdu;
