//! 资源定位表
//!
//! (资源种类 × 划分) → 远程压缩包地址 / 解压后的文件或目录名

use std::collections::BTreeMap;
use std::fmt;

use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::models::split::Split;

/// 资源种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// 问题文件
    Questions,
    /// 标注文件
    Annotations,
    /// COCO 图片
    Images,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Questions,
        ResourceKind::Annotations,
        ResourceKind::Images,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ResourceKind::Questions => "questions",
            ResourceKind::Annotations => "annotations",
            ResourceKind::Images => "images",
        }
    }

    fn urls(self) -> &'static phf::Map<&'static str, &'static str> {
        match self {
            ResourceKind::Questions => &QUESTION_URLS,
            ResourceKind::Annotations => &ANNOTATION_URLS,
            ResourceKind::Images => &IMAGE_URLS,
        }
    }

    fn sub_paths(self) -> &'static phf::Map<&'static str, &'static str> {
        match self {
            ResourceKind::Questions => &QUESTION_FILES,
            ResourceKind::Annotations => &ANNOTATION_FILES,
            ResourceKind::Images => &IMAGE_DIRS,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

static QUESTION_URLS: phf::Map<&'static str, &'static str> = phf_map! {
    "train" => "https://s3.amazonaws.com/cvmlp/vqa/mscoco/vqa/v2_Questions_Train_mscoco.zip",
    "val" => "https://s3.amazonaws.com/cvmlp/vqa/mscoco/vqa/v2_Questions_Val_mscoco.zip",
    "test-dev" => "https://s3.amazonaws.com/cvmlp/vqa/mscoco/vqa/v2_Questions_Test_mscoco.zip",
    "test" => "https://s3.amazonaws.com/cvmlp/vqa/mscoco/vqa/v2_Questions_Test_mscoco.zip",
};

// test-dev / test 没有公开标注
static ANNOTATION_URLS: phf::Map<&'static str, &'static str> = phf_map! {
    "train" => "https://s3.amazonaws.com/cvmlp/vqa/mscoco/vqa/v2_Annotations_Train_mscoco.zip",
    "val" => "https://s3.amazonaws.com/cvmlp/vqa/mscoco/vqa/v2_Annotations_Val_mscoco.zip",
};

static IMAGE_URLS: phf::Map<&'static str, &'static str> = phf_map! {
    "train" => "http://images.cocodataset.org/zips/train2014.zip",
    "val" => "http://images.cocodataset.org/zips/val2014.zip",
    "test-dev" => "http://images.cocodataset.org/zips/test2015.zip",
    "test" => "http://images.cocodataset.org/zips/test2015.zip",
};

static QUESTION_FILES: phf::Map<&'static str, &'static str> = phf_map! {
    "train" => "v2_OpenEnded_mscoco_train2014_questions.json",
    "val" => "v2_OpenEnded_mscoco_val2014_questions.json",
    "test-dev" => "v2_OpenEnded_mscoco_test-dev2015_questions.json",
    "test" => "v2_OpenEnded_mscoco_test2015_questions.json",
};

static ANNOTATION_FILES: phf::Map<&'static str, &'static str> = phf_map! {
    "train" => "v2_mscoco_train2014_annotations.json",
    "val" => "v2_mscoco_val2014_annotations.json",
};

static IMAGE_DIRS: phf::Map<&'static str, &'static str> = phf_map! {
    "train" => "train2014",
    "val" => "val2014",
    "test-dev" => "test2015",
    "test" => "test2015",
};

/// 资源种类 → 划分 → 下载地址
pub type ResourceMap = BTreeMap<ResourceKind, BTreeMap<Split, String>>;

/// 查询远程压缩包地址，None 表示该划分没有此类资源
pub fn url(kind: ResourceKind, split: Split) -> Option<&'static str> {
    kind.urls().get(split.key()).copied()
}

/// 查询压缩包解压后的文件名或子目录名
pub fn sub_path(kind: ResourceKind, split: Split) -> Option<&'static str> {
    kind.sub_paths().get(split.key()).copied()
}

/// 完整的默认资源表
pub fn resource_map() -> ResourceMap {
    let mut map = ResourceMap::new();
    for kind in ResourceKind::ALL {
        let entries = map.entry(kind).or_default();
        for split in Split::ALL {
            if let Some(url) = url(kind, split) {
                entries.insert(split, url.to_string());
            }
        }
    }
    map
}

/// 只保留指定划分的资源
pub fn restrict(resources: &ResourceMap, splits: &[Split]) -> ResourceMap {
    resources
        .iter()
        .map(|(kind, entries)| {
            let kept = entries
                .iter()
                .filter(|(split, _)| splits.contains(split))
                .map(|(split, url)| (*split, url.clone()))
                .collect();
            (*kind, kept)
        })
        .collect()
}
