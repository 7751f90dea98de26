//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use anyhow::Result;
use std::fs::{self, File, OpenOptions};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// 初始化 tracing 订阅者
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 info / debug。
/// 指定 `log_file` 时先写入文件头，之后的日志同时追加到该文件（无颜色）。
/// 重复调用时静默忽略，方便测试中多次初始化。
pub fn init(verbose: bool, log_file: Option<&str>) {
    let default_level = if verbose {
        "vqa_v2_loader=debug"
    } else {
        "vqa_v2_loader=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let mut file_error = None;
    let file_layer = log_file.and_then(|path| match open_log_file(path) {
        Ok(file) => Some(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        ),
        Err(e) => {
            file_error = Some((path, e));
            None
        }
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init();

    if let Some((path, e)) = file_error {
        warn!("⚠️ 无法写入日志文件 {}: {}", path, e);
    }
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\nVQA v2 加载日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 写入文件头并以追加方式打开日志文件
fn open_log_file(log_file_path: &str) -> Result<File> {
    init_log_file(log_file_path)?;
    let file = OpenOptions::new().append(true).open(log_file_path)?;
    Ok(file)
}

/// 记录程序启动信息
///
/// # 参数
/// - `cache_dir`: 缓存目录
/// - `split_count`: 待处理的划分数量
/// - `max_concurrent`: 最大并发下载数
pub fn log_startup(cache_dir: &str, split_count: usize, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - VQA v2 数据加载");
    info!("📁 缓存目录: {}", cache_dir);
    info!("📋 待处理划分: {} 个", split_count);
    info!("📊 最大并发下载数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录划分开始信息
///
/// # 参数
/// - `split_name`: 划分名称
/// - `index`: 当前划分序号（从1开始）
/// - `total`: 划分总数
pub fn log_split_start(split_name: &str, index: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始生成第 {}/{} 个划分: {}", index, total, split_name);
    info!("{}", "=".repeat(60));
}

/// 记录划分完成信息
pub fn log_split_complete(split_name: &str, records: usize, annotated: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 划分 {} 完成: 共 {} 条记录 (含标注 {} 条)",
        split_name, records, annotated
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `splits`: 完成的划分数量
/// - `records`: 记录总数
pub fn print_final_stats(splits: usize, records: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 划分: {}", splits);
    info!("✅ 记录: {}", records);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
