use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 数据集划分
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Split {
    /// 训练集
    #[serde(rename = "train")]
    Train,
    /// 验证集
    #[serde(rename = "val", alias = "validation")]
    Val,
    /// 测试开发集（无标注）
    #[serde(rename = "test-dev", alias = "testdev")]
    TestDev,
    /// 测试集（无标注）
    #[serde(rename = "test")]
    Test,
}

impl Split {
    /// 全部划分，按输出顺序排列
    pub const ALL: [Split; 4] = [Split::Train, Split::Val, Split::TestDev, Split::Test];

    /// 资源表中使用的键
    pub fn key(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::TestDev => "test-dev",
            Split::Test => "test",
        }
    }

    /// 对外输出时的划分名称
    pub fn output_name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "validation",
            Split::TestDev => "testdev",
            Split::Test => "test",
        }
    }

    /// 从资源键或输出名称解析划分
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "train" => Some(Split::Train),
            "val" | "validation" => Some(Split::Val),
            "test-dev" | "testdev" => Some(Split::TestDev),
            "test" => Some(Split::Test),
            _ => None,
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Split {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Split::from_key(s).ok_or_else(|| ConfigError::UnknownSplit {
            name: s.to_string(),
        })
    }
}

/// 解析逗号分隔的划分列表，去重并保持出现顺序
pub fn parse_split_list(value: &str) -> Result<Vec<Split>, ConfigError> {
    let mut splits = Vec::new();
    for part in value.split(',').filter(|p| !p.trim().is_empty()) {
        let split: Split = part.parse()?;
        if !splits.contains(&split) {
            splits.push(split);
        }
    }
    Ok(splits)
}
