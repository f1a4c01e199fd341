//! Host-side generator and inspector for encrypted configuration blobs.
//!
//! A manifest is a CSV file with the columns `key,encoding,value`. Every row becomes one
//! AES-GCM encrypted field of the blob, in manifest order.

pub mod blob;
pub mod error;
pub mod keyfile;
pub mod manifest;

mod csv;

use std::fs;
use std::io::Write;
use std::path::Path;

pub use blob::{inspect_blob, inspect_blob_file, layout_for, verify_password};
pub use error::Error;
pub use manifest::{Encoding, FieldValue, ManifestEntry};
use secure_config_store::credentials::{provision_credential, VerifierConfig, DEFAULT_SALT_LEN};
use secure_config_store::provision::Provisioner;
use secure_config_store::{BlobImage, CryptoProvider, FieldStore, KeyHandle, Layout, StoreConfig};
use zeroize::Zeroizing;

/// An ordered list of named fields to provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

/// How [`Manifest::generate_blob`] lays out and protects the fields.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub layout: Layout,
    /// Decrypt each field right after encrypting it and compare with the input.
    pub verify: bool,
    /// Also provision salt and reference hash for this password.
    pub admin_password: Option<Zeroizing<String>>,
    pub verifier: VerifierConfig,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            verify: true,
            admin_password: None,
            verifier: VerifierConfig::default(),
        }
    }
}

impl Manifest {
    /// Parse manifest CSV content from a string.
    ///
    /// File entries keep the path exactly as written. Use [`Manifest::from_csv_file`] to have
    /// relative paths resolved against the manifest location.
    pub fn from_csv(content: &str) -> Result<Self, Error> {
        csv::parser::parse_csv(content)
    }

    /// Parse the manifest file at `path`. Relative file paths are resolved against the parent
    /// directory of the manifest.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(&path)?;
        let mut manifest = csv::parser::parse_csv(&content)?;

        if let Some(base) = path.as_ref().parent() {
            for entry in &mut manifest.entries {
                if let FieldValue::File(file_path) = &mut entry.value {
                    if file_path.is_relative() {
                        *file_path = base.join(&file_path);
                    }
                }
            }
        }

        Ok(manifest)
    }

    pub fn to_csv(&self) -> Result<String, Error> {
        csv::writer::write_csv_content(self)
    }

    pub fn to_csv_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        csv::writer::write_csv(self, path)
    }

    /// Encrypt every field under `key` and return the sealed blob image.
    ///
    /// Unlike on-device provisioning, the first field that cannot be encrypted aborts the run:
    /// a blob with missing fields is never written.
    pub fn generate_blob<P: CryptoProvider>(
        &self,
        provider: P,
        key: KeyHandle,
        options: &GenerateOptions,
    ) -> Result<Vec<u8>, Error> {
        let mut fields = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            fields.push((entry.key.as_bytes(), Zeroizing::new(entry.resolve()?)));
        }

        let mut provisioner = Provisioner::with_layout(provider, key, options.layout)?;
        let report = provisioner.provision(
            fields.iter().map(|(name, value)| (*name, value.as_slice())),
            options.verify,
        );
        if let Some(failure) = report.failures.first() {
            return Err(Error::FieldRejected {
                key: failure.name_display().to_string(),
                reason: failure.error,
            });
        }

        let mut entries = report.entries;
        if let Some(password) = &options.admin_password {
            entries.extend(provision_credential(
                &mut provisioner,
                &options.verifier,
                password.as_bytes(),
                DEFAULT_SALT_LEN,
            )?);
        }

        Ok(BlobImage::from_entries(options.layout, &entries)?)
    }

    /// Like [`Manifest::generate_blob`], writing the image to `path`.
    pub fn generate_blob_file<P: CryptoProvider, Q: AsRef<Path>>(
        &self,
        path: Q,
        provider: P,
        key: KeyHandle,
        options: &GenerateOptions,
    ) -> Result<(), Error> {
        let data = self.generate_blob(provider, key, options)?;
        fs::File::create(path)?.write_all(&data)?;
        Ok(())
    }

    /// Decrypt every field of a blob back into a manifest.
    ///
    /// Unlike the device, which boots with whatever it can read, a field that fails to
    /// authenticate is an error here.
    pub fn decrypt_blob<P: CryptoProvider>(
        data: &[u8],
        stride: usize,
        provider: &mut P,
        key: KeyHandle,
    ) -> Result<Self, Error> {
        let config = StoreConfig {
            layout: layout_for(data.len(), stride)?,
            ..Default::default()
        };
        let store = FieldStore::load(data, &config)?;

        let mut entries = Vec::with_capacity(store.len());
        for field in store.iter() {
            let name = String::from_utf8(field.aad().to_vec())
                .map_err(|_| Error::InvalidKey(field.name_display().to_string()))?;
            let plaintext = FieldStore::decrypt_to_vec(field, provider, key).map_err(|reason| {
                Error::FieldRejected {
                    key: name.clone(),
                    reason,
                }
            })?;
            entries.push(ManifestEntry::from_plaintext(name, plaintext.to_vec()));
        }

        Ok(Self { entries })
    }

    /// Decrypt the blob file at `path` into a manifest.
    pub fn decrypt_blob_file<P: CryptoProvider, Q: AsRef<Path>>(
        path: Q,
        stride: usize,
        provider: &mut P,
        key: KeyHandle,
    ) -> Result<Self, Error> {
        let data = fs::read(path)?;
        Self::decrypt_blob(&data, stride, provider, key)
    }
}
