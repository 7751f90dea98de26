//! # VQA v2 Loader
//!
//! 下载 VQA v2 问题、标注与 COCO 图片压缩包，按 question_id 关联问题与标注，
//! 逐条产出带图片路径的结构化记录
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure / Clients）
//! - `clients/` - `DownloadClient`，单个压缩包的下载（http(s):// 与 file://）
//! - `infrastructure/` - `extract_zip`，把压缩包解到目录
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `DownloadManager` - 获取整张资源表，带缓存与去重
//! - `ExportWriter` - 写 JSON Lines 能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个划分"的生成流程
//! - `SplitPaths` - 划分的输入路径
//! - `ExampleGenerator` - 关联、校验、合并、拼图片路径
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/builder` - 数据集构建器，声明结构并产出各划分生成器
//! - `orchestrator/app` - 应用入口，获取资源、逐划分生成并统计

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{DatasetInfo, ResourceKind, Split, VqaRecord};
pub use orchestrator::{App, SplitGenerator, VqaV2Builder};
pub use services::{AcquiredPaths, DownloadManager};
pub use workflow::{generate_examples, ExampleGenerator, SplitPaths};
