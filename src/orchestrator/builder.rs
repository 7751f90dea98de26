//! 数据集构建器 - 编排层
//!
//! ## 职责
//!
//! 1. **结构声明**：对外声明输出记录的字段结构（`info()`）
//! 2. **资源获取**：按需裁剪资源表，委托下载管理器获取
//! 3. **划分生成器**：为每个划分拼出输入路径，产出可反复启动的生成器

use crate::error::AppResult;
use crate::models::resource::restrict;
use crate::models::{resource_map, vqa_v2_info, DatasetInfo, ResourceMap, Split};
use crate::services::{AcquiredPaths, DownloadManager};
use crate::workflow::{generate_examples, ExampleGenerator, SplitPaths};
use tracing::info;

/// VQA v2 数据集构建器
pub struct VqaV2Builder {
    resources: ResourceMap,
}

impl VqaV2Builder {
    pub const VERSION: &'static str = "1.0.0";

    /// 使用默认资源表
    pub fn new() -> Self {
        Self::with_resources(resource_map())
    }

    /// 使用自定义资源表（镜像地址、本地 file:// 等）
    pub fn with_resources(resources: ResourceMap) -> Self {
        Self { resources }
    }

    pub fn resources(&self) -> &ResourceMap {
        &self.resources
    }

    /// 数据集元信息与输出结构声明
    pub fn info(&self) -> DatasetInfo {
        vqa_v2_info(Self::VERSION)
    }

    /// 获取所需资源并返回各划分的生成器
    pub async fn download_and_prepare(
        &self,
        manager: &DownloadManager,
        splits: &[Split],
    ) -> AppResult<Vec<SplitGenerator>> {
        let resources = restrict(&self.resources, splits);
        let acquired = manager.download_and_extract(&resources).await?;
        info!("✓ 资源获取完成，共 {} 个 (种类, 划分) 条目", acquired.len());
        self.split_generators(&acquired, splits)
    }

    /// 为每个划分创建生成器
    pub fn split_generators(
        &self,
        acquired: &AcquiredPaths,
        splits: &[Split],
    ) -> AppResult<Vec<SplitGenerator>> {
        splits
            .iter()
            .map(|split| {
                let paths = SplitPaths::from_acquired(*split, acquired)?;
                Ok(SplitGenerator::new(paths))
            })
            .collect()
    }
}

impl Default for VqaV2Builder {
    fn default() -> Self {
        Self::new()
    }
}

/// 单个划分的生成器
#[derive(Debug, Clone)]
pub struct SplitGenerator {
    /// 对外输出的划分名称（train / validation / testdev / test）
    pub name: &'static str,
    pub paths: SplitPaths,
}

impl SplitGenerator {
    pub fn new(paths: SplitPaths) -> Self {
        Self {
            name: paths.split.output_name(),
            paths,
        }
    }

    pub fn split(&self) -> Split {
        self.paths.split
    }

    /// 开始新一轮生成，每次都会重新读取并解析文件
    pub fn generate(&self) -> AppResult<ExampleGenerator> {
        generate_examples(&self.paths)
    }
}
