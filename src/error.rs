use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{ResourceKind, Split};

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 下载相关错误
    #[error("下载错误: {0}")]
    Download(#[from] DownloadError),
    /// 压缩包解压错误
    #[error("解压错误: {0}")]
    Archive(#[from] ArchiveError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 数据结构校验错误（上游格式漂移）
    #[error("数据格式错误: {0}")]
    Schema(#[from] SchemaError),
    /// 问题与标注关联错误
    #[error("关联错误: {0}")]
    Join(#[from] JoinError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 下载相关错误
#[derive(Debug, Error)]
pub enum DownloadError {
    /// 网络请求失败
    #[error("请求失败 ({url}): {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务器返回非成功状态码
    #[error("服务器返回错误状态 ({url}): {status}")]
    BadStatus { url: String, status: u16 },
    /// 写入下载文件失败
    #[error("写入下载文件失败 ({path}): {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 无法从 URL 推断压缩包文件名
    #[error("无效的下载地址: {url}")]
    InvalidUrl { url: String },
    /// 某个划分缺少必需的资源
    #[error("划分 {split} 缺少资源 {kind}")]
    MissingResource { kind: ResourceKind, split: Split },
    /// 后台任务异常退出
    #[error("下载任务执行失败: {0}")]
    TaskFailed(String),
}

/// 压缩包解压错误
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// 打开或读取压缩包失败
    #[error("无法读取压缩包 ({path}): {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    /// 条目路径会逃逸出目标目录
    #[error("压缩包 {path} 中存在不安全的条目: {entry}")]
    UnsafeEntry { path: PathBuf, entry: String },
    /// 写出解压文件失败
    #[error("写出解压文件失败 ({path}): {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: PathBuf },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// 记录种类，用于错误信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Question,
    Annotation,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Question => write!(f, "问题"),
            RecordKind::Annotation => write!(f, "标注"),
        }
    }
}

/// 数据结构校验错误
#[derive(Debug, Error)]
pub enum SchemaError {
    /// 条目不是 JSON 对象
    #[error("第 {index} 个{kind}条目不是 JSON 对象")]
    NotAnObject { kind: RecordKind, index: usize },
    /// 条目缺少整数类型的 question_id
    #[error("第 {index} 个{kind}条目缺少整数 question_id")]
    MissingQuestionId { kind: RecordKind, index: usize },
    /// 字段集合与预期不一致
    #[error("{kind}字段集合不符 (question_id: {question_id}): 缺少 {missing:?}, 多余 {unexpected:?}")]
    FieldSetMismatch {
        kind: RecordKind,
        question_id: i64,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    /// 字段值类型不符
    #[error("{kind}字段值无效 (question_id: {question_id}): {source}")]
    InvalidValue {
        kind: RecordKind,
        question_id: i64,
        #[source]
        source: serde_json::Error,
    },
}

/// 问题与标注关联错误
#[derive(Debug, Error)]
pub enum JoinError {
    /// 标注文件中找不到对应的问题
    #[error("找不到 question_id {question_id} 对应的标注 ({path})")]
    MissingAnnotation { question_id: i64, path: PathBuf },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 未知的划分名称
    #[error("未知的数据划分: {name}")]
    UnknownSplit { name: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误，文件不存在时归为 NotFound
    pub fn file_read_failed(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == std::io::ErrorKind::NotFound {
            AppError::File(FileError::NotFound { path })
        } else {
            AppError::File(FileError::ReadFailed { path, source })
        }
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    /// 创建 JSON 解析错误
    pub fn json_parse_failed(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        AppError::File(FileError::JsonParseFailed {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    /// 创建 JSON 写出错误
    pub fn json_write_failed(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::file_write_failed(path, std::io::Error::new(std::io::ErrorKind::Other, source))
    }

    /// 创建网络请求错误
    pub fn request_failed(url: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Download(DownloadError::RequestFailed {
            url: url.into(),
            source,
        })
    }

    /// 是否为上游格式漂移导致的错误
    pub fn is_schema_drift(&self) -> bool {
        matches!(self, AppError::Schema(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
