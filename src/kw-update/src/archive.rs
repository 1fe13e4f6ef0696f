//! Bundled package extraction.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{UpdateError, UpdateResult};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Extract a downloaded package into `dest`, overwriting existing files.
///
/// Zip is the default format; gzip-compressed tarballs are recognised by
/// their magic bytes. Runs on the blocking pool.
pub async fn extract_package(archive: &Path, dest: &Path) -> UpdateResult<usize> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || extract_package_sync(&archive, &dest))
        .await
        .map_err(|e| UpdateError::ExtractionFailed {
            message: format!("extraction task failed: {e}"),
        })?
}

fn extract_package_sync(archive: &Path, dest: &Path) -> UpdateResult<usize> {
    let mut file = File::open(archive)?;
    let mut magic = [0u8; 2];
    let is_gzip = file.read_exact(&mut magic).is_ok() && magic == GZIP_MAGIC;
    file.seek(SeekFrom::Start(0))?;

    if is_gzip {
        extract_tar_gz(file, dest)
    } else {
        extract_zip(file, dest)
    }
}

fn extract_zip(file: File, dest: &Path) -> UpdateResult<usize> {
    let mut archive = zip::ZipArchive::new(file).map_err(extraction_failed)?;
    let mut written = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(extraction_failed)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(UpdateError::ExtractionFailed {
                message: format!("entry escapes install directory: {}", entry.name()),
            });
        };
        let out_path: PathBuf = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode))?;
            }
        }

        written += 1;
    }

    tracing::debug!(files = written, dest = %dest.display(), "Zip package extracted");
    Ok(written)
}

fn extract_tar_gz(file: File, dest: &Path) -> UpdateResult<usize> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let mut archive = Archive::new(GzDecoder::new(file));
    archive.set_overwrite(true);

    let mut written = 0;
    for entry in archive.entries().map_err(extraction_failed)? {
        let mut entry = entry.map_err(extraction_failed)?;
        let is_file = entry.header().entry_type().is_file();
        // unpack_in refuses paths outside `dest` and reports them as `false`.
        let unpacked = entry.unpack_in(dest).map_err(extraction_failed)?;
        if !unpacked {
            return Err(UpdateError::ExtractionFailed {
                message: "entry escapes install directory".to_string(),
            });
        }
        if is_file {
            written += 1;
        }
    }

    tracing::debug!(files = written, dest = %dest.display(), "Tarball package extracted");
    Ok(written)
}

fn extraction_failed(e: impl std::fmt::Display) -> UpdateError {
    UpdateError::ExtractionFailed {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn tar_gz_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *content).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[tokio::test]
    async fn test_extract_zip_overwrites() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("kw.exe"), b"old exe").unwrap();

        let archive = dir.path().join("kw_update.zip");
        std::fs::write(
            &archive,
            zip_bytes(&[("kw.exe", b"new exe"), ("data/kw.pck", b"new pck")]),
        )
        .unwrap();

        let count = extract_package(&archive, dir.path()).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(std::fs::read(dir.path().join("kw.exe")).unwrap(), b"new exe");
        assert_eq!(
            std::fs::read(dir.path().join("data").join("kw.pck")).unwrap(),
            b"new pck"
        );
    }

    #[tokio::test]
    async fn test_extract_tar_gz() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("kw_update.zip");
        std::fs::write(&archive, tar_gz_bytes(&[("kw.pck", b"packed")])).unwrap();

        let count = extract_package(&archive, dir.path()).await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(std::fs::read(dir.path().join("kw.pck")).unwrap(), b"packed");
    }

    #[tokio::test]
    async fn test_zip_entry_escaping_root_rejected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("install");
        std::fs::create_dir(&root).unwrap();

        let archive = root.join("kw_update.zip");
        std::fs::write(&archive, zip_bytes(&[("../evil.txt", b"outside")])).unwrap();

        let result = extract_package(&archive, &root).await;
        assert!(matches!(result, Err(UpdateError::ExtractionFailed { .. })));
        assert!(!dir.path().join("evil.txt").exists());
    }

    #[tokio::test]
    async fn test_tar_gz_entry_escaping_root_rejected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("install");
        std::fs::create_dir(&root).unwrap();

        // tar::Builder refuses `..` paths, so write the name into the header directly.
        let content = b"outside";
        let mut header = tar::Header::new_gnu();
        let name = b"../evil.txt";
        header.as_gnu_mut().unwrap().name[..name.len()].copy_from_slice(name);
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();

        let encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.append(&header, &content[..]).unwrap();
        let bytes = builder.into_inner().unwrap().finish().unwrap();

        let archive = root.join("kw_update.zip");
        std::fs::write(&archive, bytes).unwrap();

        let result = extract_package(&archive, &root).await;
        assert!(matches!(result, Err(UpdateError::ExtractionFailed { .. })));
        assert!(!dir.path().join("evil.txt").exists());
    }

    #[tokio::test]
    async fn test_garbage_archive_fails() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("kw_update.zip");
        std::fs::write(&archive, b"definitely not an archive").unwrap();

        let result = extract_package(&archive, dir.path()).await;
        assert!(matches!(result, Err(UpdateError::ExtractionFailed { .. })));
    }
}
