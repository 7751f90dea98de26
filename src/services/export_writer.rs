//! 记录导出服务 - 业务能力层
//!
//! 只负责"把记录写成 JSON Lines"能力，不关心记录从哪里来

use crate::error::{AppError, AppResult};
use crate::models::{DatasetInfo, VqaRecord};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 导出目录
///
/// 目录结构：
/// - `dataset_info.json`
/// - `{划分名}.jsonl`，每行一条记录
pub struct ExportWriter {
    export_dir: PathBuf,
}

impl ExportWriter {
    /// 创建导出服务，目录不存在时自动创建
    pub fn new(export_dir: impl Into<PathBuf>) -> AppResult<Self> {
        let export_dir = export_dir.into();
        fs::create_dir_all(&export_dir).map_err(|e| AppError::file_write_failed(&export_dir, e))?;
        Ok(Self { export_dir })
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// 写入数据集元信息
    pub fn write_info(&self, info: &DatasetInfo) -> AppResult<PathBuf> {
        let path = self.export_dir.join("dataset_info.json");
        let content =
            serde_json::to_string_pretty(info).map_err(|e| AppError::json_write_failed(&path, e))?;
        fs::write(&path, content).map_err(|e| AppError::file_write_failed(&path, e))?;
        Ok(path)
    }

    /// 打开某个划分的输出文件
    ///
    /// 记录先写入 `{划分名}.jsonl.part`，`finish` 时才重命名为正式文件；
    /// 中途失败的划分不会留下 `{划分名}.jsonl`。
    pub fn open_split(&self, split_name: &str) -> AppResult<SplitWriter> {
        let path = self.export_dir.join(format!("{}.jsonl", split_name));
        let partial = self.export_dir.join(format!("{}.jsonl.part", split_name));
        let file = File::create(&partial).map_err(|e| AppError::file_write_failed(&partial, e))?;
        debug!("打开导出文件: {}", partial.display());
        Ok(SplitWriter {
            path,
            partial,
            writer: BufWriter::new(file),
            written: 0,
            committed: false,
        })
    }
}

/// 单个划分的 JSON Lines 写入器
///
/// 未调用 `finish` 就被丢弃时删除临时文件
pub struct SplitWriter {
    path: PathBuf,
    partial: PathBuf,
    writer: BufWriter<File>,
    written: usize,
    committed: bool,
}

impl SplitWriter {
    /// 写入一条记录
    pub fn write(&mut self, record: &VqaRecord) -> AppResult<()> {
        serde_json::to_writer(&mut self.writer, record)
            .map_err(|e| AppError::json_write_failed(&self.partial, e))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| AppError::file_write_failed(&self.partial, e))?;
        self.written += 1;
        Ok(())
    }

    /// 刷新缓冲区、转为正式文件并返回写入的记录数
    pub fn finish(mut self) -> AppResult<usize> {
        self.writer
            .flush()
            .map_err(|e| AppError::file_write_failed(&self.partial, e))?;
        fs::rename(&self.partial, &self.path)
            .map_err(|e| AppError::file_write_failed(&self.path, e))?;
        self.committed = true;
        Ok(self.written)
    }

    /// 正式输出文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SplitWriter {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = fs::remove_file(&self.partial) {
                warn!("⚠️ 无法删除未完成的导出文件 {}: {}", self.partial.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;

    fn record(question_id: i64) -> VqaRecord {
        VqaRecord::unannotated(
            Question {
                question_id,
                image_id: 9,
                question: "What?".to_string(),
            },
            "test2015/COCO_test2015_000000000009.jpg".to_string(),
        )
    }

    #[test]
    fn finished_split_is_renamed_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ExportWriter::new(dir.path()).unwrap();

        let mut writer = exporter.open_split("test").unwrap();
        writer.write(&record(1)).unwrap();
        writer.write(&record(2)).unwrap();
        assert!(!dir.path().join("test.jsonl").exists());

        assert_eq!(writer.finish().unwrap(), 2);
        let content = fs::read_to_string(dir.path().join("test.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!dir.path().join("test.jsonl.part").exists());
    }

    #[test]
    fn abandoned_split_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ExportWriter::new(dir.path()).unwrap();

        let mut writer = exporter.open_split("validation").unwrap();
        writer.write(&record(1)).unwrap();
        drop(writer);

        assert!(!dir.path().join("validation.jsonl").exists());
        assert!(!dir.path().join("validation.jsonl.part").exists());
    }
}
