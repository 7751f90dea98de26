use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError, FileError};
use crate::models::split::{parse_split_list, Split};

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 下载与解压缓存目录
    pub cache_dir: String,
    /// JSON Lines 导出目录，不设置则只统计不导出
    pub export_dir: Option<String>,
    /// 需要处理的划分
    pub splits: Vec<Split>,
    /// 同时下载的压缩包数量
    pub max_concurrent_downloads: usize,
    /// 建立连接的超时时间（秒）
    pub connect_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: "vqa_v2_cache".to_string(),
            export_dir: None,
            splits: Split::ALL.to_vec(),
            max_concurrent_downloads: 4,
            connect_timeout_secs: 30,
            verbose_logging: false,
            output_log_file: "vqa_v2_load.log".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（可选）→ 环境变量
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        base.with_env()
    }

    /// 只使用默认值与环境变量
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env()
    }

    /// 从 TOML 文件读取，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::file_read_failed(path, e))?;
        Self::from_toml_str(&content).map_err(|source| {
            AppError::File(FileError::TomlParseFailed {
                path: path.to_path_buf(),
                source,
            })
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env(self) -> AppResult<Self> {
        let splits = match std::env::var("VQA_SPLITS") {
            Ok(value) => parse_split_list(&value)?,
            Err(_) => self.splits,
        };

        Ok(Self {
            cache_dir: std::env::var("VQA_CACHE_DIR").unwrap_or(self.cache_dir),
            export_dir: std::env::var("VQA_EXPORT_DIR").ok().or(self.export_dir),
            splits,
            max_concurrent_downloads: env_parse(
                "MAX_CONCURRENT_DOWNLOADS",
                self.max_concurrent_downloads,
            )?,
            connect_timeout_secs: env_parse("CONNECT_TIMEOUT_SECS", self.connect_timeout_secs)?,
            verbose_logging: env_parse("VERBOSE_LOGGING", self.verbose_logging)?,
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        })
    }

    pub fn cache_path(&self) -> PathBuf {
        PathBuf::from(&self.cache_dir)
    }

    pub fn export_path(&self) -> Option<PathBuf> {
        self.export_dir.as_ref().map(PathBuf::from)
    }
}

/// 读取并解析环境变量，不存在时返回默认值
fn env_parse<T: FromStr>(var_name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }),
        Err(_) => Ok(default),
    }
}
