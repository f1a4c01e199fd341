use thiserror::Error;

/// Errors that can occur while reading a manifest, generating a blob or
/// reading one back.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to parse CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("hex decoding error: {0}")]
    HexError(#[from] hex::FromHexError),

    #[error("base64 decoding error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("key file must hold 32 raw bytes or 64 hex digits, found {0} bytes")]
    InvalidKeyFile(usize),

    #[error("field '{key}' rejected: {reason}")]
    FieldRejected {
        key: String,
        reason: secure_config_store::Error,
    },

    #[error(transparent)]
    Store(#[from] secure_config_store::Error),
}
