pub mod guid;
pub mod rpc;
pub mod util;
