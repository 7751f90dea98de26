//! 资源获取服务 - 业务能力层
//!
//! ## 职责
//!
//! 接收完整的资源表（种类 × 划分 → 地址），下载并解压所有压缩包，
//! 返回每个 (种类, 划分) 对应的本地解压目录。
//!
//! ## 缓存布局
//!
//! ```text
//! {cache_dir}/downloads/{压缩包文件名}
//! {cache_dir}/extracted/{压缩包名去掉扩展名}/.vqa_complete
//! ```
//!
//! 完成标记最后写入。标记存在时既不下载也不解压；
//! 压缩包存在但标记不存在时只重新解压。

use crate::clients::download_client::{archive_file_name, DownloadClient};
use crate::config::Config;
use crate::error::{AppError, AppResult, DownloadError};
use crate::infrastructure::extract_zip;
use crate::models::{ResourceKind, ResourceMap, Split};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

const COMPLETE_MARKER: &str = ".vqa_complete";

/// 资源种类 → 划分 → 本地解压目录
#[derive(Debug, Clone, Default)]
pub struct AcquiredPaths {
    dirs: BTreeMap<ResourceKind, BTreeMap<Split, PathBuf>>,
}

impl AcquiredPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ResourceKind, split: Split, dir: impl Into<PathBuf>) {
        self.dirs.entry(kind).or_default().insert(split, dir.into());
    }

    /// 查询解压目录，None 表示该划分没有此类资源
    pub fn get(&self, kind: ResourceKind, split: Split) -> Option<&Path> {
        self.dirs
            .get(&kind)
            .and_then(|entries| entries.get(&split))
            .map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.dirs.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 下载与解压管理器
///
/// 职责：
/// - 同一地址只下载一次（test 与 test-dev 共用压缩包）
/// - 使用 Semaphore 限制并发下载数量
/// - 任一压缩包失败则整体失败，不做部分恢复
pub struct DownloadManager {
    client: DownloadClient,
    cache_dir: PathBuf,
    max_concurrent: usize,
}

impl DownloadManager {
    /// 创建新的下载管理器
    pub fn new(config: &Config) -> AppResult<Self> {
        Ok(Self::with_client(
            DownloadClient::new(config)?,
            config.cache_path(),
            config.max_concurrent_downloads,
        ))
    }

    pub fn with_client(client: DownloadClient, cache_dir: PathBuf, max_concurrent: usize) -> Self {
        Self {
            client,
            cache_dir,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// 下载并解压资源表中的全部压缩包
    pub async fn download_and_extract(&self, resources: &ResourceMap) -> AppResult<AcquiredPaths> {
        let unique_urls: BTreeSet<&str> = resources
            .values()
            .flat_map(|entries| entries.values().map(String::as_str))
            .collect();

        info!("📥 共 {} 个压缩包待获取", unique_urls.len());

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::with_capacity(unique_urls.len());

        for url in unique_urls {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| DownloadError::TaskFailed(e.to_string()))?;
            let client = self.client.clone();
            let cache_dir = self.cache_dir.clone();
            let url = url.to_string();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result = fetch_and_unpack(&client, &cache_dir, &url).await;
                (url, result)
            });
            handles.push(handle);
        }

        let mut extracted: HashMap<String, PathBuf> = HashMap::new();
        let mut first_error: Option<AppError> = None;

        // 等待所有任务结束后再返回第一个错误，避免留下仍在写入的后台任务
        for outcome in futures::future::join_all(handles).await {
            match outcome {
                Ok((url, Ok(dir))) => {
                    extracted.insert(url, dir);
                }
                Ok((url, Err(e))) => {
                    error!("❌ 获取失败 {}: {}", url, e);
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    error!("❌ 下载任务异常: {}", e);
                    first_error.get_or_insert(DownloadError::TaskFailed(e.to_string()).into());
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        let mut acquired = AcquiredPaths::new();
        for (kind, entries) in resources {
            for (split, url) in entries {
                if let Some(dir) = extracted.get(url) {
                    acquired.insert(*kind, *split, dir.clone());
                }
            }
        }

        Ok(acquired)
    }
}

/// 获取单个压缩包：命中缓存则直接返回解压目录
async fn fetch_and_unpack(client: &DownloadClient, cache_dir: &Path, url: &str) -> AppResult<PathBuf> {
    let archive_name = archive_file_name(url)?;
    let stem = Path::new(&archive_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| archive_name.clone());

    let extract_dir = cache_dir.join("extracted").join(&stem);
    let marker = extract_dir.join(COMPLETE_MARKER);

    if tokio::fs::try_exists(&marker).await.unwrap_or(false) {
        info!("✓ 已缓存: {}", archive_name);
        return Ok(extract_dir);
    }

    let archive_path = cache_dir.join("downloads").join(&archive_name);
    if !tokio::fs::try_exists(&archive_path).await.unwrap_or(false) {
        client.download_to(url, &archive_path).await?;
    }

    info!("📂 正在解压: {}", archive_name);
    let (from, to) = (archive_path.clone(), extract_dir.clone());
    let count = tokio::task::spawn_blocking(move || extract_zip(&from, &to))
        .await
        .map_err(|e| DownloadError::TaskFailed(e.to_string()))??;

    tokio::fs::write(&marker, url.as_bytes())
        .await
        .map_err(|e| AppError::file_write_failed(&marker, e))?;

    info!("✓ 解压完成: {} ({} 个文件)", archive_name, count);
    Ok(extract_dir)
}
