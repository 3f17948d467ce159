//! USDZ packaging (zip container around the .usda layer)

use serde::Deserialize;
use std::io::{Cursor, Seek, Write};
use zip::result::ZipError;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::error::Result;

/// USDZ readers expect stored file data to start on a 64-byte boundary
pub const USDZ_ALIGNMENT: u16 = 64;

/// How the layer is stored inside the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Deflate-compressed entry (smallest file)
    #[default]
    Deflated,
    /// Uncompressed, 64-byte aligned entry (what strict USDZ readers want)
    Stored,
}

impl Compression {
    fn file_options(self) -> SimpleFileOptions {
        // Fixed timestamp keeps archives byte-identical across runs
        let options = SimpleFileOptions::default().last_modified_time(zip::DateTime::default());
        match self {
            Compression::Deflated => options.compression_method(CompressionMethod::Deflated),
            Compression::Stored => options
                .compression_method(CompressionMethod::Stored)
                .with_alignment(USDZ_ALIGNMENT),
        }
    }
}

/// Write a USDZ container holding exactly one file at the archive root
pub fn write_usdz<W: Write + Seek>(
    w: W,
    entry_name: &str,
    payload: &[u8],
    compression: Compression,
) -> Result<W> {
    let mut zip = ZipWriter::new(w);
    zip.start_file(entry_name, compression.file_options())?;
    zip.write_all(payload).map_err(ZipError::from)?;
    Ok(zip.finish()?)
}

/// Build a USDZ container in memory
pub fn package_usdz(entry_name: &str, payload: &[u8], compression: Compression) -> Result<Vec<u8>> {
    let cursor = write_usdz(Cursor::new(Vec::new()), entry_name, payload, compression)?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    const LAYER: &[u8] = b"#usda 1.0\n(\n)\n\ndef Xform \"Snowglobe\"\n{\n}\n";

    fn open(bytes: Vec<u8>) -> ZipArchive<Cursor<Vec<u8>>> {
        ZipArchive::new(Cursor::new(bytes)).expect("valid zip")
    }

    #[test]
    fn test_single_entry_at_root() {
        let bytes = package_usdz("cube_snowglobe.usda", LAYER, Compression::Deflated).unwrap();
        let mut archive = open(bytes);

        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "cube_snowglobe.usda");
        assert_eq!(entry.compression(), CompressionMethod::Deflated);

        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, LAYER);
    }

    #[test]
    fn test_stored_entry_is_aligned() {
        let bytes = package_usdz("a.usda", LAYER, Compression::Stored).unwrap();
        let mut archive = open(bytes);

        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Stored);
        assert_eq!(entry.data_start() % USDZ_ALIGNMENT as u64, 0);
    }

    #[test]
    fn test_packaging_is_deterministic() {
        let a = package_usdz("a.usda", LAYER, Compression::Deflated).unwrap();
        let b = package_usdz("a.usda", LAYER, Compression::Deflated).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_compression_from_toml_value() {
        #[derive(Deserialize)]
        struct Wrapper {
            compression: Compression,
        }
        let parsed: Wrapper = toml::from_str("compression = \"stored\"").unwrap();
        assert_eq!(parsed.compression, Compression::Stored);
    }
}
