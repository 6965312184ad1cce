//! Asset delivery
//!
//! Extracts catalogued assets from an archive for external consumption:
//! - [`extract_one`] is strict: a catalogued asset missing from the archive
//!   is reported as an error.
//! - [`extract_all`] is best-effort: unresolved assets are logged and left
//!   out of the package.

use crate::archive::Archive;
use crate::error::{ArchiveError, ArchiveResult};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A catalogued asset that can be resolved against an archive
pub trait DeliverableAsset {
    /// Archive entry key (`<assetId>.<dataFormat>`)
    fn md5ext(&self) -> &str;

    /// Display label, not unique
    fn display_name(&self) -> &str;

    /// File extension
    fn data_format(&self) -> &str;

    /// Content hash portion of the entry key
    fn asset_id(&self) -> &str {
        let key = self.md5ext();
        key.rsplit_once('.').map_or(key, |(stem, _)| stem)
    }
}

/// Result of a bulk extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPackage {
    /// Zip-encoded package bytes
    pub bytes: Vec<u8>,
    /// Filenames written, in catalog order
    pub included: Vec<String>,
    /// Entry keys that could not be resolved
    pub omitted: Vec<String>,
}

/// Extract a single asset
///
/// # Errors
/// - `ArchiveError::AssetMissing` if `md5ext` has no archive entry
/// - `ArchiveError::EntryRead` if the entry cannot be decompressed
pub fn extract_one<A: DeliverableAsset + ?Sized>(
    archive: &Archive,
    asset: &A,
) -> ArchiveResult<Vec<u8>> {
    let md5ext = asset.md5ext();
    let bytes = archive
        .read_entry(md5ext)?
        .ok_or_else(|| ArchiveError::AssetMissing {
            md5ext: md5ext.to_string(),
        })?;

    tracing::debug!(asset = md5ext, bytes = bytes.len(), "extracted asset");
    Ok(bytes)
}

/// Package every resolvable asset into a fresh zip archive
///
/// Each asset is stored under a sanitized display filename. Assets that fail
/// to resolve are omitted and reported in [`AssetPackage::omitted`].
///
/// # Errors
/// `ArchiveError::Package` only if writing the output package itself fails
pub fn extract_all<'a, A, I>(archive: &Archive, assets: I) -> ArchiveResult<AssetPackage>
where
    A: DeliverableAsset + ?Sized + 'a,
    I: IntoIterator<Item = &'a A>,
{
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut used = HashSet::new();
    let mut included = Vec::new();
    let mut omitted = Vec::new();

    for asset in assets {
        let bytes = match extract_one(archive, asset) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(asset = asset.md5ext(), error = %e, "omitting asset from package");
                omitted.push(asset.md5ext().to_string());
                continue;
            }
        };

        let filename = unique_filename(&package_filename(asset), &mut used);
        writer
            .start_file(filename.as_str(), options)
            .map_err(|e| ArchiveError::Package(e.to_string()))?;
        writer
            .write_all(&bytes)
            .map_err(|e| ArchiveError::Package(e.to_string()))?;
        included.push(filename);
    }

    let bytes = writer
        .finish()
        .map_err(|e| ArchiveError::Package(e.to_string()))?
        .into_inner();

    tracing::info!(
        included = included.len(),
        omitted = omitted.len(),
        "packaged assets"
    );

    Ok(AssetPackage {
        bytes,
        included,
        omitted,
    })
}

/// Filename used for an asset inside a bulk package
///
/// Derived from the display name; falls back to the content hash when the
/// name sanitizes to nothing.
#[must_use]
pub fn package_filename<A: DeliverableAsset + ?Sized>(asset: &A) -> String {
    let stem = match sanitize_filename(asset.display_name()) {
        s if s.is_empty() => sanitize_filename(asset.asset_id()),
        s => s,
    };
    let stem = if stem.is_empty() {
        "asset".to_string()
    } else {
        stem
    };

    let ext = sanitize_filename(asset.data_format());
    if ext.is_empty() {
        stem
    } else {
        format!("{stem}.{ext}")
    }
}

/// Reduce a display label to a portable filename stem
///
/// Keeps alphanumerics, `-`, `_`, and interior spaces; everything else
/// becomes `_`. Leading/trailing whitespace, dots, and underscores are trimmed.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let mapped: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    mapped
        .trim_matches(|c: char| c.is_whitespace() || c == '_' || c == '.')
        .to_string()
}

fn unique_filename(candidate: &str, used: &mut HashSet<String>) -> String {
    if used.insert(candidate.to_string()) {
        return candidate.to_string();
    }

    let (stem, ext) = match candidate.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (candidate, None),
    };

    let mut n = 2;
    loop {
        let next = match ext {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        };
        if used.insert(next.clone()) {
            return next;
        }
        n += 1;
    }
}
