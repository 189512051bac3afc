/// Errors from envelope encode/decode.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("msgpack encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("msgpack decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}
