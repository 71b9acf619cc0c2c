// src/recipe/kitchen/archive.rs

//! Archive and source file utilities for the Kitchen

use crate::error::{Error, Result};
use crate::hash::{hash_file, verify_hash, Hash};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// Download a file from a URL to `dest`
///
/// `file://` URLs are copied directly. A 404 or 410 means the requested
/// version does not exist upstream and is reported as an unresolvable source.
pub fn download_file(url: &str, dest: &Path, timeout: Duration, progress: bool) -> Result<u64> {
    let parsed = Url::parse(url)
        .map_err(|e| Error::DownloadError(format!("Invalid URL {}: {}", url, e)))?;

    if parsed.scheme() == "file" {
        let path = parsed
            .to_file_path()
            .map_err(|_| Error::DownloadError(format!("Invalid file URL: {}", url)))?;
        if !path.exists() {
            return Err(Error::UnresolvableSource(format!(
                "{} does not exist",
                path.display()
            )));
        }
        return fs::copy(&path, dest)
            .map_err(|e| Error::DownloadError(format!("Failed to copy {}: {}", path.display(), e)));
    }

    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::DownloadError(format!("Failed to create HTTP client: {e}")))?;

    let response = client
        .get(parsed)
        .send()
        .map_err(|e| Error::DownloadError(format!("Request to {} failed: {}", url, e)))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return Err(Error::UnresolvableSource(format!(
            "{} returned HTTP {}",
            url, status
        )));
    }
    if !status.is_success() {
        return Err(Error::DownloadError(format!(
            "Failed to download {}: HTTP {}",
            url, status
        )));
    }

    let total_size = response.content_length().unwrap_or(0);
    let progress_bar = progress.then(|| create_progress_bar(total_size, url));

    let mut file = File::create(dest)?;
    let downloaded = stream_to_file(response, &mut file, progress_bar.as_ref())?;

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    debug!("Downloaded {} bytes from {}", downloaded, url);
    Ok(downloaded)
}

fn stream_to_file<R: Read>(
    mut reader: R,
    file: &mut File,
    progress_bar: Option<&ProgressBar>,
) -> Result<u64> {
    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| Error::DownloadError(format!("Failed to read response: {e}")))?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| Error::IoError(format!("Failed to write data: {e}")))?;

        downloaded += bytes_read as u64;
        if let Some(pb) = progress_bar {
            pb.set_position(downloaded);
        }
    }

    Ok(downloaded)
}

fn create_progress_bar(size: u64, name: &str) -> ProgressBar {
    let pb = if size > 0 {
        let pb = ProgressBar::new(size);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {bytes} ({bytes_per_sec}) {msg}")
        {
            pb.set_style(style);
        }
        pb
    };
    pb.set_message(name.to_string());
    pb
}

/// Verify a file against the declared checksum
///
/// A file that cannot be read is an I/O error, not a mismatch.
pub fn verify_file_checksum(path: &Path, expected: &Hash) -> Result<()> {
    let actual = hash_file(expected.algorithm, path)
        .map_err(|e| Error::IoError(format!("Failed to read {}: {}", path.display(), e)))?;
    verify_hash(expected, &actual).map_err(|e| Error::ChecksumMismatch {
        expected: e.expected,
        actual: e.actual,
    })
}

/// Supported archive compressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveFormat {
    TarGz,
    TarXz,
    TarZst,
    Tar,
}

impl ArchiveFormat {
    fn detect(filename: &str) -> Option<Self> {
        if filename.ends_with(".tar.gz") || filename.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if filename.ends_with(".tar.xz") || filename.ends_with(".txz") {
            Some(Self::TarXz)
        } else if filename.ends_with(".tar.zst") {
            Some(Self::TarZst)
        } else if filename.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

/// Extract an archive into a destination directory
///
/// Supports: .tar.gz, .tgz, .tar.xz, .txz, .tar.zst, .tar. The format is taken
/// from `name`, since cached archives are stored under their checksum.
pub fn extract_archive(archive: &Path, name: &str, dest: &Path) -> Result<()> {
    let format = ArchiveFormat::detect(name)
        .ok_or_else(|| Error::ParseError(format!("Unknown archive format: {}", name)))?;

    let file = File::open(archive)?;
    let reader: Box<dyn Read> = match format {
        ArchiveFormat::TarGz => Box::new(flate2::read::GzDecoder::new(file)),
        ArchiveFormat::TarXz => Box::new(xz2::read::XzDecoder::new(file)),
        ArchiveFormat::TarZst => Box::new(zstd::stream::read::Decoder::new(file)?),
        ArchiveFormat::Tar => Box::new(file),
    };

    tar::Archive::new(reader)
        .unpack(dest)
        .map_err(|e| Error::BuildFailure(format!("Failed to extract {}: {}", name, e)))
}

/// Locate the source root inside an extraction directory
///
/// Release archives usually wrap everything in one top-level directory.
pub fn source_root(extract_dir: &Path) -> io::Result<PathBuf> {
    let entries: Vec<_> = fs::read_dir(extract_dir)?
        .filter_map(|e| e.ok())
        .collect();

    if let [only] = entries.as_slice()
        && only.file_type().map(|t| t.is_dir()).unwrap_or(false)
    {
        return Ok(only.path());
    }

    Ok(extract_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{hash_bytes, HashAlgorithm};
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn write_tar_gz(path: &Path, top: &str, files: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, format!("{}/{}", top, name), content.as_bytes())
                .unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_verify_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.tar.gz");
        fs::write(&path, b"archive bytes").unwrap();

        let good = hash_bytes(HashAlgorithm::Sha256, b"archive bytes");
        assert!(verify_file_checksum(&path, &good).is_ok());

        let bad = hash_bytes(HashAlgorithm::Sha256, b"other bytes");
        let err = verify_file_checksum(&path, &bad).unwrap_err();
        match err {
            Error::ChecksumMismatch { expected, actual } => {
                assert_eq!(expected, bad.to_prefixed_string());
                assert_eq!(actual, good.to_prefixed_string());
            }
            other => panic!("expected ChecksumMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_unreadable_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let expected = hash_bytes(HashAlgorithm::Sha256, b"archive bytes");

        let err = verify_file_checksum(&dir.path().join("missing.tar.gz"), &expected).unwrap_err();
        assert!(matches!(err, Error::IoError(ref msg) if msg.contains("missing.tar.gz")));
    }

    #[test]
    fn test_extract_archive_unknown_format() {
        let result = extract_archive(Path::new("file.unknown"), "file.unknown", Path::new("/tmp"));
        assert!(matches!(result, Err(Error::ParseError(_))));
    }

    #[test]
    fn test_extract_and_find_root() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("lala-0.1.0.tar.gz");
        write_tar_gz(
            &archive,
            "lala-0.1.0",
            &[("Cargo.toml", "[package]\nname = \"lala\"\n"), ("src/main.rs", "fn main() {}\n")],
        );

        let dest = dir.path().join("source");
        fs::create_dir_all(&dest).unwrap();
        extract_archive(&archive, "lala-0.1.0.tar.gz", &dest).unwrap();

        let root = source_root(&dest).unwrap();
        assert_eq!(root, dest.join("lala-0.1.0"));
        assert!(root.join("Cargo.toml").exists());
        assert!(root.join("src/main.rs").exists());
    }

    #[test]
    fn test_source_root_flat_archive() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Cargo.toml"), "").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();

        assert_eq!(source_root(dir.path()).unwrap(), dir.path());
    }

    #[test]
    fn test_download_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("upstream.tar.gz");
        fs::write(&src, b"payload").unwrap();

        let url = Url::from_file_path(&src).unwrap();
        let dest = dir.path().join("downloaded");
        let bytes = download_file(url.as_str(), &dest, Duration::from_secs(5), false).unwrap();

        assert_eq!(bytes, 7);
        assert_eq!(fs::read(&dest).unwrap(), b"payload");
    }

    #[test]
    fn test_download_missing_file_is_unresolvable() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("v9.9.9.tar.gz")).unwrap();
        let dest = dir.path().join("downloaded");

        let err = download_file(url.as_str(), &dest, Duration::from_secs(5), false).unwrap_err();
        assert!(matches!(err, Error::UnresolvableSource(_)));
    }
}
