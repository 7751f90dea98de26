//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：输出启动信息、创建下载管理器
//! 2. **资源准备**：委托构建器获取所需划分的资源
//! 3. **逐划分生成**：在阻塞线程中耗尽每个划分的生成器，可选导出 JSON Lines
//! 4. **全局统计**：汇总所有划分的记录数
//!
//! 任一划分失败即整体失败，不输出部分结果统计。

use crate::config::Config;
use crate::error::{AppResult, DownloadError};
use crate::orchestrator::builder::{SplitGenerator, VqaV2Builder};
use crate::services::{DownloadManager, ExportWriter};
use crate::utils::logging::{
    log_split_complete, log_split_start, log_startup, print_final_stats, truncate_text,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 单个划分的生成统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SplitStats {
    pub records: usize,
    pub annotated: usize,
}

/// 全部划分的生成统计
#[derive(Debug, Default)]
pub struct RunStats {
    pub splits: Vec<(&'static str, SplitStats)>,
}

impl RunStats {
    pub fn total_records(&self) -> usize {
        self.splits.iter().map(|(_, stats)| stats.records).sum()
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    builder: VqaV2Builder,
    downloads: DownloadManager,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        Self::with_builder(config, VqaV2Builder::new())
    }

    /// 使用自定义构建器初始化（自定义资源表）
    pub fn with_builder(config: Config, builder: VqaV2Builder) -> AppResult<Self> {
        log_startup(
            &config.cache_dir,
            config.splits.len(),
            config.max_concurrent_downloads,
        );

        let downloads = DownloadManager::new(&config)?;

        Ok(Self {
            config,
            builder,
            downloads,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<RunStats> {
        if self.config.splits.is_empty() {
            warn!("⚠️ 没有配置任何划分，程序结束");
            return Ok(RunStats::default());
        }

        let generators = self
            .builder
            .download_and_prepare(&self.downloads, &self.config.splits)
            .await?;

        let exporter = match self.config.export_path() {
            Some(dir) => {
                let writer = ExportWriter::new(dir)?;
                let info_path = writer.write_info(&self.builder.info())?;
                info!("📝 数据集信息已写入: {}", info_path.display());
                Some(Arc::new(writer))
            }
            None => None,
        };

        let total = generators.len();
        let mut stats = RunStats::default();

        for (idx, generator) in generators.into_iter().enumerate() {
            log_split_start(generator.name, idx + 1, total);
            debug!("{}", generator.paths);

            let name = generator.name;
            let exporter = exporter.clone();
            let verbose = self.config.verbose_logging;

            let split_stats = tokio::task::spawn_blocking(move || {
                drain_split(&generator, exporter.as_deref(), verbose)
            })
            .await
            .map_err(|e| DownloadError::TaskFailed(e.to_string()))??;

            log_split_complete(name, split_stats.records, split_stats.annotated);
            stats.splits.push((name, split_stats));
        }

        print_final_stats(stats.splits.len(), stats.total_records());

        Ok(stats)
    }
}

/// 耗尽单个划分的生成器，遇到第一个错误立即返回
pub fn drain_split(
    generator: &SplitGenerator,
    exporter: Option<&ExportWriter>,
    verbose: bool,
) -> AppResult<SplitStats> {
    let mut writer = match exporter {
        Some(exporter) => Some(exporter.open_split(generator.name)?),
        None => None,
    };
    let mut stats = SplitStats::default();

    for example in generator.generate()? {
        let (key, record) = example?;

        if verbose && stats.records < 3 {
            info!(
                "[{}] #{} 问题: {}",
                generator.name,
                key,
                truncate_text(&record.question, 80)
            );
        }

        if record.has_annotation() {
            stats.annotated += 1;
        }
        stats.records += 1;

        if let Some(writer) = writer.as_mut() {
            writer.write(&record)?;
        }
    }

    if let Some(writer) = writer {
        let path = writer.path().to_path_buf();
        let written = writer.finish()?;
        info!("📝 [{}] 已导出 {} 条记录: {}", generator.name, written, path.display());
    }

    Ok(stats)
}
