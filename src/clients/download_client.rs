/// 压缩包下载客户端
///
/// 封装单个远程文件到本地文件的下载逻辑，支持 http(s):// 与 file://
use crate::config::Config;
use crate::error::{AppError, AppResult, DownloadError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// 压缩包下载客户端
#[derive(Clone)]
pub struct DownloadClient {
    http: reqwest::Client,
}

impl DownloadClient {
    /// 创建新的下载客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("vqa_v2_loader/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::request_failed("<client>", e))?;
        Ok(Self { http })
    }

    /// 下载文件到 `dest`
    ///
    /// 先写入 `{dest}.part`，完成后再重命名，中断的下载不会被当作已完成。
    ///
    /// # 返回
    /// 返回写入的字节数
    pub async fn download_to(&self, url: &str, dest: &Path) -> AppResult<u64> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| write_failed(parent, source))?;
        }

        let partial = partial_path(dest);
        let written = match url.strip_prefix("file://") {
            Some(local) => self.copy_local(Path::new(local), &partial).await?,
            None => self.fetch_remote(url, &partial).await?,
        };

        fs::rename(&partial, dest)
            .await
            .map_err(|source| write_failed(dest, source))?;

        info!(
            "✓ 下载完成: {} ({:.1} MB)",
            dest.display(),
            written as f64 / (1024.0 * 1024.0)
        );
        Ok(written)
    }

    async fn fetch_remote(&self, url: &str, partial: &Path) -> AppResult<u64> {
        info!("⬇️ 正在下载: {}", url);

        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::request_failed(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        if let Some(total) = response.content_length() {
            debug!("文件大小: {} 字节", total);
        }

        let mut file = fs::File::create(partial)
            .await
            .map_err(|source| write_failed(partial, source))?;
        let mut written: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| AppError::request_failed(url, e))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|source| write_failed(partial, source))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|source| write_failed(partial, source))?;

        Ok(written)
    }

    async fn copy_local(&self, source_path: &Path, partial: &Path) -> AppResult<u64> {
        debug!("复制本地文件: {}", source_path.display());
        fs::copy(source_path, partial)
            .await
            .map_err(|e| AppError::file_read_failed(source_path, e))
    }
}

/// 从下载地址推断压缩包文件名
pub fn archive_file_name(url: &str) -> AppResult<String> {
    let trimmed = url.split(['?', '#']).next().unwrap_or(url);
    match trimmed.rsplit('/').next() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(DownloadError::InvalidUrl {
            url: url.to_string(),
        }
        .into()),
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

fn write_failed(path: &Path, source: std::io::Error) -> AppError {
    DownloadError::WriteFailed {
        path: path.to_path_buf(),
        source,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_from_url() {
        assert_eq!(
            archive_file_name("http://images.cocodataset.org/zips/val2014.zip").unwrap(),
            "val2014.zip"
        );
        assert_eq!(
            archive_file_name("https://host/a/b.zip?sig=1").unwrap(),
            "b.zip"
        );
        assert!(archive_file_name("https://host/dir/").is_err());
    }

    #[test]
    fn partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("/tmp/val2014.zip")),
            PathBuf::from("/tmp/val2014.zip.part")
        );
    }
}
