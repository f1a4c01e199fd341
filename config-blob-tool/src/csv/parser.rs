use std::path::Path;

use base64::Engine;

use crate::error::Error;
use crate::manifest::{validate_key, Encoding, ManifestEntry};
use crate::Manifest;

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    key: String,
    encoding: String,
    value: String,
}

/// Parse manifest CSV content from a string into a [`Manifest`].
pub(crate) fn parse_csv(content: &str) -> Result<Manifest, Error> {
    let mut manifest = Manifest { entries: vec![] };
    let mut reader = csv::Reader::from_reader(content.as_bytes());

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        manifest.entries.push(parse_row(row)?);
    }

    Ok(manifest)
}

fn parse_row(row: CsvRow) -> Result<ManifestEntry, Error> {
    validate_key(&row.key)?;

    if row.encoding == "file" {
        if row.value.is_empty() {
            return Err(Error::InvalidValue(format!(
                "file entry '{}' must have a file path",
                row.key
            )));
        }
        let file_path = Path::new(&row.value).to_path_buf();
        return Ok(ManifestEntry::new_file(row.key, file_path));
    }

    let encoding: Encoding = row.encoding.parse()?;
    let bytes = decode_value(&row.value, encoding)?;
    Ok(ManifestEntry::new_data(row.key, encoding, bytes))
}

fn decode_value(value: &str, encoding: Encoding) -> Result<Vec<u8>, Error> {
    match encoding {
        Encoding::String => Ok(value.as_bytes().to_vec()),
        Encoding::Hex2Bin => Ok(hex::decode(value.trim())?),
        Encoding::Base64 => Ok(base64::engine::general_purpose::STANDARD.decode(value.trim())?),
    }
}
