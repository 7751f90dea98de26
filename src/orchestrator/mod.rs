//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `builder` - 数据集构建器
//! - 声明输出结构（DatasetInfo）
//! - 裁剪资源表并委托下载管理器获取
//! - 为每个划分产出 SplitGenerator
//!
//! ### `app` - 应用入口
//! - 管理下载管理器与导出目录
//! - 逐划分耗尽生成器并统计
//!
//! ## 层次关系
//!
//! ```text
//! app (处理 Vec<Split>)
//!     ↓
//! builder (SplitGenerator)
//!     ↓
//! workflow::ExampleGenerator (处理单个划分的问题列表)
//!     ↓
//! services (能力层：acquisition / export)
//!     ↓
//! infrastructure / clients (解压 / 下载)
//! ```

pub mod app;
pub mod builder;

pub use app::{drain_split, App, RunStats, SplitStats};
pub use builder::{SplitGenerator, VqaV2Builder};
