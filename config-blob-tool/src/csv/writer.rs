use std::path::Path;

use base64::Engine;
use csv::Writer;

use crate::error::Error;
use crate::manifest::{Encoding, FieldValue};
use crate::Manifest;

/// Serialize a manifest to a CSV file at the given `output_path`.
pub(crate) fn write_csv<P: AsRef<Path>>(manifest: &Manifest, output_path: P) -> Result<(), Error> {
    let mut wtr = Writer::from_path(output_path)?;
    write_records(&mut wtr, manifest)
}

/// Serialize a manifest to CSV and return the content as a `String`.
pub(crate) fn write_csv_content(manifest: &Manifest) -> Result<String, Error> {
    let mut wtr = Writer::from_writer(Vec::new());
    write_records(&mut wtr, manifest)?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| Error::IoError(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::InvalidValue(format!("CSV output is not valid UTF-8: {}", e)))
}

fn write_records<W: std::io::Write>(wtr: &mut Writer<W>, manifest: &Manifest) -> Result<(), Error> {
    wtr.write_record(["key", "encoding", "value"])?;

    for entry in &manifest.entries {
        match &entry.value {
            FieldValue::Data { encoding, bytes } => {
                let value = encode_value(bytes, *encoding)?;
                wtr.write_record([entry.key.as_str(), encoding.as_str(), &value])?;
            }
            FieldValue::File(path) => {
                wtr.write_record([entry.key.as_str(), "file", &path.to_string_lossy()])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

fn encode_value(bytes: &[u8], encoding: Encoding) -> Result<String, Error> {
    match encoding {
        Encoding::String => String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::InvalidValue(format!("string value is not valid UTF-8: {}", e))),
        Encoding::Hex2Bin => Ok(hex::encode(bytes)),
        Encoding::Base64 => Ok(base64::engine::general_purpose::STANDARD.encode(bytes)),
    }
}
