use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{PeerResponse, MAX_VALUE_SIZE};

/// Codec for peer response bodies.
///
/// Layout: `[8 bytes little-endian length][value bytes]`, as produced by
/// bincode for a struct with a single byte-vector field.
pub struct PeerCodec;

impl PeerCodec {
    /// Content type used for encoded responses.
    pub const CONTENT_TYPE: &'static str = "application/octet-stream";

    pub fn encode(resp: &PeerResponse) -> ProtocolResult<Vec<u8>> {
        resp.check_size()?;
        bincode::serialize(resp).map_err(|e| ProtocolError::Serialization(e.to_string()))
    }

    pub fn decode(data: &[u8]) -> ProtocolResult<PeerResponse> {
        if data.len() < 8 {
            return Err(ProtocolError::Deserialization(format!(
                "body too short: {} bytes",
                data.len()
            )));
        }
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&data[..8]);
        let declared = u64::from_le_bytes(prefix);
        if declared > MAX_VALUE_SIZE as u64 {
            return Err(ProtocolError::ValueTooLarge {
                size: declared as usize,
                max: MAX_VALUE_SIZE,
            });
        }
        let expected = 8 + declared as usize;
        if data.len() != expected {
            return Err(ProtocolError::Deserialization(format!(
                "body is {} bytes but the length prefix declares {expected}",
                data.len()
            )));
        }
        bincode::deserialize(data).map_err(|e| ProtocolError::Deserialization(e.to_string()))
    }
}
