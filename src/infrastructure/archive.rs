//! 压缩包解压 - 基础设施层
//!
//! 只暴露"把 zip 解到某个目录"的能力，不关心资源种类与划分

use crate::error::{AppResult, ArchiveError};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// 解压 zip 文件到目标目录
///
/// 阻塞操作，异步上下文中应通过 `spawn_blocking` 调用。
///
/// # 返回
/// 返回解压出的文件数量（不含目录）
pub fn extract_zip(archive_path: &Path, dest: &Path) -> AppResult<usize> {
    let file = File::open(archive_path).map_err(|source| ArchiveError::OpenFailed {
        path: archive_path.to_path_buf(),
        source: source.into(),
    })?;

    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|source| ArchiveError::OpenFailed {
            path: archive_path.to_path_buf(),
            source,
        })?;

    fs::create_dir_all(dest).map_err(|source| write_failed(dest, source))?;

    let mut extracted = 0;
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|source| ArchiveError::OpenFailed {
                path: archive_path.to_path_buf(),
                source,
            })?;

        // 拒绝 ../ 与绝对路径，防止写出目标目录
        let relative = match entry.enclosed_name() {
            Some(name) => name.to_path_buf(),
            None => {
                return Err(ArchiveError::UnsafeEntry {
                    path: archive_path.to_path_buf(),
                    entry: entry.name().to_string(),
                }
                .into())
            }
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|source| write_failed(&out_path, source))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|source| write_failed(parent, source))?;
        }

        let mut out_file =
            File::create(&out_path).map_err(|source| write_failed(&out_path, source))?;
        io::copy(&mut entry, &mut out_file).map_err(|source| write_failed(&out_path, source))?;
        extracted += 1;
    }

    debug!(
        "解压完成: {} → {} ({} 个文件)",
        archive_path.display(),
        dest.display(),
        extracted
    );
    Ok(extracted)
}

fn write_failed(path: &Path, source: io::Error) -> ArchiveError {
    ArchiveError::WriteFailed {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    #[test]
    fn extracts_nested_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("val2014.zip");

        let mut writer = zip::ZipWriter::new(File::create(&archive_path).unwrap());
        writer
            .add_directory("val2014/", SimpleFileOptions::default())
            .unwrap();
        writer
            .start_file("val2014/COCO_val2014_000000000009.jpg", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"jpeg").unwrap();
        writer.finish().unwrap();

        let dest = dir.path().join("out");
        let count = extract_zip(&archive_path, &dest).unwrap();

        assert_eq!(count, 1);
        let image = dest.join("val2014/COCO_val2014_000000000009.jpg");
        assert_eq!(fs::read(image).unwrap(), b"jpeg");
    }

    #[test]
    fn corrupt_archive_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("broken.zip");
        fs::write(&archive_path, b"not a zip").unwrap();

        let err = extract_zip(&archive_path, &dir.path().join("out")).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Archive(ArchiveError::OpenFailed { .. })
        ));
    }

    #[test]
    fn entry_outside_destination_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("evil.zip");

        let mut writer = zip::ZipWriter::new(File::create(&archive_path).unwrap());
        writer
            .start_file("../escape.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"boom").unwrap();
        writer.finish().unwrap();

        let err = extract_zip(&archive_path, &dir.path().join("out")).unwrap_err();
        match err {
            crate::error::AppError::Archive(ArchiveError::UnsafeEntry { entry, .. }) => {
                assert_eq!(entry, "../escape.txt");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!dir.path().join("escape.txt").exists());
    }
}
