use std::path::Path;

use rand_core::OsRng;
use secure_config_store::crypto::{SoftwareCrypto, KEY_LEN};
use secure_config_store::DEVICE_KEY_HANDLE;
use zeroize::Zeroizing;

use crate::error::Error;

/// Read the device key from `path`. See [`parse_key`] for the accepted formats.
pub fn load_key<P: AsRef<Path>>(path: P) -> Result<Zeroizing<[u8; KEY_LEN]>, Error> {
    let content = Zeroizing::new(std::fs::read(path)?);
    parse_key(&content)
}

/// Accept either the 32 raw key bytes or 64 hex digits, optionally followed by a newline.
pub fn parse_key(content: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, Error> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);

    if content.len() == KEY_LEN {
        key.copy_from_slice(content);
        return Ok(key);
    }

    let text = content.trim_ascii();
    if text.len() != 2 * KEY_LEN {
        return Err(Error::InvalidKeyFile(content.len()));
    }
    hex::decode_to_slice(text, &mut key[..])?;
    Ok(key)
}

/// Software crypto backed by the operating system RNG, holding `key` under the device key
/// handle.
pub fn host_crypto(key: &[u8; KEY_LEN]) -> Result<SoftwareCrypto<OsRng>, Error> {
    let mut crypto = SoftwareCrypto::new(OsRng);
    crypto.import_key(DEVICE_KEY_HANDLE, *key)?;
    Ok(crypto)
}
