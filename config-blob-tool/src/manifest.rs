use std::path::PathBuf;

use secure_config_store::raw::MAX_AAD_LEN;

use crate::error::Error;

/// A single named field of a provisioning manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// The field name. Stored in the blob as the associated data of the field.
    pub key: String,
    pub value: FieldValue,
}

/// Where the plaintext of a field comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Inline value, already decoded. `encoding` is how it is written in CSV.
    Data { encoding: Encoding, bytes: Vec<u8> },
    /// Raw file content, read at generation time.
    File(PathBuf),
}

/// Encoding of an inline value in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8 text, used as is.
    String,
    /// Hex-encoded binary data.
    Hex2Bin,
    /// Base64-encoded binary data.
    Base64,
}

impl std::str::FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "hex2bin" => Ok(Self::Hex2Bin),
            "base64" => Ok(Self::Base64),
            _ => Err(Error::InvalidEncoding(s.to_string())),
        }
    }
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Hex2Bin => "hex2bin",
            Self::Base64 => "base64",
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ManifestEntry {
    pub fn new_data(key: String, encoding: Encoding, bytes: Vec<u8>) -> Self {
        Self {
            key,
            value: FieldValue::Data { encoding, bytes },
        }
    }

    pub fn new_file(key: String, file_path: PathBuf) -> Self {
        Self {
            key,
            value: FieldValue::File(file_path),
        }
    }

    /// Picks the encoding a decrypted value is written back with: printable ASCII as `string`,
    /// anything else as `hex2bin`.
    pub fn from_plaintext(key: String, bytes: Vec<u8>) -> Self {
        let printable = !bytes.is_empty() && bytes.iter().all(|b| (0x20..=0x7E).contains(b));
        let encoding = if printable {
            Encoding::String
        } else {
            Encoding::Hex2Bin
        };
        Self::new_data(key, encoding, bytes)
    }

    /// The plaintext of this field.
    pub fn resolve(&self) -> Result<Vec<u8>, Error> {
        match &self.value {
            FieldValue::Data { bytes, .. } => Ok(bytes.clone()),
            FieldValue::File(path) => Ok(std::fs::read(path)?),
        }
    }
}

/// Field names are 1 to 64 printable ASCII characters without whitespace.
pub(crate) fn validate_key(key: &str) -> Result<(), Error> {
    if key.is_empty() {
        return Err(Error::InvalidKey("key cannot be empty".to_string()));
    }
    if key.len() > MAX_AAD_LEN {
        return Err(Error::InvalidKey(format!(
            "key '{}' is too long (max {} bytes)",
            key, MAX_AAD_LEN
        )));
    }
    if !key.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(Error::InvalidKey(format!(
            "key '{}' contains non-printable characters",
            key.escape_default()
        )));
    }
    Ok(())
}
