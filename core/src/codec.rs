//! Payload encoding for cross-component calls
//!
//! Proposal and action payloads are opaque bytes to the components that
//! carry them; the router decodes them into per-component call enums.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to encode payload: {0}")]
    Encode(serde_json::Error),

    #[error("Failed to decode payload: {0}")]
    Decode(serde_json::Error),
}

pub fn encode<T: Serialize>(call: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(call).map_err(CodecError::Encode)
}

pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(payload).map_err(CodecError::Decode)
}
