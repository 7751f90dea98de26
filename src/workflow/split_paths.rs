//! 划分路径上下文
//!
//! 封装"这个划分的问题文件、标注文件、图片目录在哪里"这一信息

use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::error::{AppResult, DownloadError};
use crate::models::resource::sub_path;
use crate::models::{ResourceKind, Split};
use crate::services::AcquiredPaths;

/// 单个划分的输入路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPaths {
    /// 所属划分
    pub split: Split,

    /// 问题 JSON 文件
    pub questions_path: PathBuf,

    /// 标注 JSON 文件，无标注划分为 None
    pub annotations_path: Option<PathBuf>,

    /// COCO 图片目录，目录名参与图片文件名拼接
    pub images_path: PathBuf,
}

impl SplitPaths {
    /// 创建新的划分路径
    pub fn new(
        split: Split,
        questions_path: impl Into<PathBuf>,
        annotations_path: Option<PathBuf>,
        images_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            split,
            questions_path: questions_path.into(),
            annotations_path,
            images_path: images_path.into(),
        }
    }

    /// 由解压目录与资源表中的子路径拼出本划分的三个路径
    ///
    /// 问题与图片为必需资源；标注缺失表示该划分没有标注。
    pub fn from_acquired(split: Split, acquired: &AcquiredPaths) -> AppResult<Self> {
        let questions_path = resolve(acquired, ResourceKind::Questions, split)
            .ok_or(DownloadError::MissingResource {
                kind: ResourceKind::Questions,
                split,
            })?;
        let images_path = resolve(acquired, ResourceKind::Images, split).ok_or(
            DownloadError::MissingResource {
                kind: ResourceKind::Images,
                split,
            },
        )?;
        let annotations_path = resolve(acquired, ResourceKind::Annotations, split);

        Ok(Self {
            split,
            questions_path,
            annotations_path,
            images_path,
        })
    }

    pub fn has_annotations(&self) -> bool {
        self.annotations_path.is_some()
    }
}

fn resolve(acquired: &AcquiredPaths, kind: ResourceKind, split: Split) -> Option<PathBuf> {
    let dir: &Path = acquired.get(kind, split)?;
    let name = sub_path(kind, split)?;
    Some(dir.join(name))
}

impl Display for SplitPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[划分 {} 问题#{} 标注#{} 图片#{}]",
            self.split,
            self.questions_path.display(),
            self.annotations_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "无".to_string()),
            self.images_path.display()
        )
    }
}
