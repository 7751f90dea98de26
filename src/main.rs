use anyhow::Result;
use std::path::PathBuf;
use vqa_v2_loader::utils::logging;
use vqa_v2_loader::{App, Config};

const DEFAULT_CONFIG_FILE: &str = "vqa_v2.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置：VQA_CONFIG 指定的文件，或当前目录下存在的 vqa_v2.toml
    let config_path = std::env::var("VQA_CONFIG")
        .map(PathBuf::from)
        .ok()
        .or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        });
    let config = Config::load(config_path.as_deref())?;

    // 初始化日志：终端 + 日志文件
    logging::init(config.verbose_logging, Some(&config.output_log_file));
    let log_file = config.output_log_file.clone();

    // 初始化并运行应用
    let stats = App::initialize(config)?.run().await?;
    println!("完成: {} 个划分, {} 条记录", stats.splits.len(), stats.total_records());
    println!("日志已保存至: {}", log_file);

    Ok(())
}
