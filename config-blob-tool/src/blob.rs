use std::path::Path;

use secure_config_store::credentials::{CredentialVerifier, Verdict, VerifierConfig};
use secure_config_store::parser::{self, ParsedBlob};
use secure_config_store::raw::MAX_ENTRIES;
use secure_config_store::{CryptoProvider, FieldStore, KeyHandle, Layout, StoreConfig};

use crate::error::Error;

/// Geometry of an existing blob: the region is the whole file.
pub fn layout_for(region_size: usize, stride: usize) -> Result<Layout, Error> {
    Ok(Layout::new(region_size, stride, MAX_ENTRIES)?)
}

/// Parses a blob without decrypting anything.
pub fn inspect_blob(data: &[u8], stride: usize) -> Result<ParsedBlob, Error> {
    let layout = layout_for(data.len(), stride)?;
    Ok(parser::parse_with_layout(data, &layout))
}

/// Parses the blob file at `path`.
pub fn inspect_blob_file<P: AsRef<Path>>(path: P, stride: usize) -> Result<ParsedBlob, Error> {
    let data = std::fs::read(path)?;
    inspect_blob(&data, stride)
}

/// Checks `password` against the credential fields of a blob.
pub fn verify_password<P: CryptoProvider>(
    data: &[u8],
    stride: usize,
    provider: &mut P,
    key: KeyHandle,
    password: &[u8],
    config: VerifierConfig,
) -> Result<Verdict, Error> {
    let store_config = StoreConfig {
        layout: layout_for(data.len(), stride)?,
        ..Default::default()
    };
    let store = FieldStore::load(data, &store_config)?;
    let verifier = CredentialVerifier::new(config)?;
    Ok(verifier.verify(&store, provider, key, password)?)
}
