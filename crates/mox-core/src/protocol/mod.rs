//! Protocol module containing frame types and the binary codec.

pub mod codec;
pub mod messages;

pub use codec::{classify, decode_command, decode_header, decode_response, encode_command, ProtocolError};
pub use messages::*;
