//! `zip`-backed [`ArchiveCodec`] implementation.
//!
//! `.mcaddon` and `.mcpack` files are plain ZIP containers, so one codec
//! serves every addon format.

use std::io::{Cursor, Read, Write};

use tracing::{debug, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::codec::{ArchiveCodec, ArchiveEntry};
use crate::error::ArchiveError;
use crate::path::normalize_separators;

/// ZIP codec used for all addon archives.
///
/// Written archives use deflate and a fixed 1980-01-01 timestamp on every
/// entry, so identical inputs produce byte-identical archives.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZipCodec;

impl ZipCodec {
    /// Create a new codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn file_options() -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
    }
}

impl ArchiveCodec for ZipCodec {
    #[instrument(level = "debug", skip_all, fields(bytes = bytes.len()))]
    fn read(&self, bytes: &[u8]) -> Result<Vec<ArchiveEntry>, ArchiveError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            let path = normalize_separators(file.name());
            let mut data = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
            file.read_to_end(&mut data)
                .map_err(|e| ArchiveError::Entry {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
            entries.push(ArchiveEntry { path, data });
        }

        debug!(entries = entries.len(), "decoded archive");
        Ok(entries)
    }

    #[instrument(level = "debug", skip_all, fields(entries = entries.len()))]
    fn write(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = Self::file_options();

        for entry in entries {
            writer
                .start_file(entry.path.as_str(), options)
                .map_err(|e| ArchiveError::Entry {
                    path: entry.path.clone(),
                    message: e.to_string(),
                })?;
            writer.write_all(&entry.data)?;
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_preserves_order_and_bytes() {
        let codec = ZipCodec::new();
        let entries = vec![
            ArchiveEntry::new("manifest.json", b"{}".to_vec()),
            ArchiveEntry::new("textures/a.png", vec![0x89, 0x50, 0x4e, 0x47]),
            ArchiveEntry::new("texts/en_US.lang", b"a=b\n".to_vec()),
        ];
        let bytes = codec.write(&entries).unwrap();
        let back = codec.read(&bytes).unwrap();
        assert_eq!(back, entries);
    }

    #[test]
    fn identical_inputs_produce_identical_archives() {
        let codec = ZipCodec::new();
        let entries = vec![ArchiveEntry::new("a.txt", b"hello".to_vec())];
        assert_eq!(codec.write(&entries).unwrap(), codec.write(&entries).unwrap());
    }

    #[test]
    fn garbage_is_malformed() {
        let garbage = vec![b'x'; 256];
        let err = ZipCodec::new().read(&garbage).unwrap_err();
        assert!(
            matches!(err, ArchiveError::Malformed { .. } | ArchiveError::Io(_)),
            "got {err:?}"
        );
    }

    #[test]
    fn directory_entries_are_skipped() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .add_directory("textures/", SimpleFileOptions::default())
            .unwrap();
        writer
            .start_file("textures/a.png", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"png").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let entries = ZipCodec::new().read(&bytes).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "textures/a.png");
    }
}
