//! 记录生成流程 - 流程层
//!
//! 核心职责：把一个划分的问题与标注按 question_id 关联，逐条生成记录
//!
//! 流程顺序：
//! 1. 读入问题文件（完整载入内存）
//! 2. 有标注时读入标注文件，建立 question_id → 标注 的索引（只建一次）
//! 3. 按问题文件原始顺序逐条：查标注 → 校验字段集合 → 合并 → 拼图片路径
//!
//! 任何一步失败都终止整个划分，不跳过单条记录。

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{AppError, AppResult, JoinError, RecordKind, SchemaError};
use crate::models::{Annotation, AnnotationsFile, Question, QuestionsFile, Split, VqaRecord};
use crate::workflow::field_check::check_field_set;
use crate::workflow::split_paths::SplitPaths;

/// 生成结果：(question_id, 记录)
pub type Example = (i64, VqaRecord);

/// 按 COCO 命名规则计算图片路径
///
/// `{images_dir}/COCO_{目录名}_{image_id 补零到12位}.jpg`
pub fn coco_image_path(images_dir: &Path, image_id: i64) -> PathBuf {
    let dir_name = images_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    images_dir.join(format!("COCO_{}_{:0>12}.jpg", dir_name, image_id))
}

/// 开始一次新的生成
///
/// 问题与标注在这里完整读入并解析；之后的迭代不再访问磁盘。
pub fn generate_examples(paths: &SplitPaths) -> AppResult<ExampleGenerator> {
    let questions = load_questions(&paths.questions_path)?;
    info!(
        "📄 [{}] 读入 {} 个问题: {}",
        paths.split,
        questions.len(),
        paths.questions_path.display()
    );

    let annotations = match &paths.annotations_path {
        Some(path) => {
            let index = load_annotation_index(path)?;
            info!("📄 [{}] 建立 {} 条标注索引", paths.split, index.len());
            Some(AnnotationIndex {
                path: path.clone(),
                by_question_id: index,
            })
        }
        None => {
            debug!("[{}] 无标注文件，标注字段置空", paths.split);
            None
        }
    };

    Ok(ExampleGenerator {
        split: paths.split,
        questions: questions.into_iter(),
        annotations,
        images_path: paths.images_path.clone(),
        position: 0,
        finished: false,
    })
}

struct AnnotationIndex {
    path: PathBuf,
    by_question_id: HashMap<i64, Value>,
}

/// 惰性记录生成器
///
/// 按问题文件顺序产出 `(question_id, 记录)`。遇到第一个错误后返回该错误，
/// 之后不再产出任何内容。不支持中途重启，重新生成需再次调用 [`generate_examples`]。
pub struct ExampleGenerator {
    split: Split,
    questions: std::vec::IntoIter<Value>,
    annotations: Option<AnnotationIndex>,
    images_path: PathBuf,
    position: usize,
    finished: bool,
}

impl ExampleGenerator {
    pub fn split(&self) -> Split {
        self.split
    }

    /// 剩余未生成的问题数量
    pub fn remaining(&self) -> usize {
        if self.finished {
            0
        } else {
            self.questions.len()
        }
    }

    /// 生成单条记录，`position` 为该问题在文件中的序号（从0开始）
    fn build(&self, question: Value, position: usize) -> AppResult<Example> {
        let object = question.as_object().ok_or(SchemaError::NotAnObject {
            kind: RecordKind::Question,
            index: position,
        })?;
        let question_id = question_id_of(object, RecordKind::Question, position)?;

        match &self.annotations {
            Some(index) => {
                let annotation = index.by_question_id.get(&question_id).ok_or_else(|| {
                    JoinError::MissingAnnotation {
                        question_id,
                        path: index.path.clone(),
                    }
                })?;
                // 建索引时已确认是对象
                let annotation_object =
                    annotation.as_object().ok_or(SchemaError::NotAnObject {
                        kind: RecordKind::Annotation,
                        index: position,
                    })?;

                check_field_set(RecordKind::Question, object, question_id)?;
                check_field_set(RecordKind::Annotation, annotation_object, question_id)?;

                let annotation = Annotation::deserialize(annotation).map_err(|source| {
                    SchemaError::InvalidValue {
                        kind: RecordKind::Annotation,
                        question_id,
                        source,
                    }
                })?;
                let question = parse_question(question, question_id)?;

                let image = self.image_for(annotation.image_id);
                Ok((question.question_id, VqaRecord::annotated(question, annotation, image)))
            }
            None => {
                check_field_set(RecordKind::Question, object, question_id)?;
                let question = parse_question(question, question_id)?;

                let image = self.image_for(question.image_id);
                Ok((question.question_id, VqaRecord::unannotated(question, image)))
            }
        }
    }

    fn image_for(&self, image_id: i64) -> String {
        coco_image_path(&self.images_path, image_id)
            .to_string_lossy()
            .into_owned()
    }
}

impl Iterator for ExampleGenerator {
    type Item = AppResult<Example>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let question = self.questions.next()?;
        let result = self.build(question, self.position);
        self.position += 1;
        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

fn question_id_of(object: &Map<String, Value>, kind: RecordKind, index: usize) -> AppResult<i64> {
    object
        .get("question_id")
        .and_then(Value::as_i64)
        .ok_or_else(|| SchemaError::MissingQuestionId { kind, index }.into())
}

fn parse_question(question: Value, question_id: i64) -> AppResult<Question> {
    serde_json::from_value(question).map_err(|source| {
        SchemaError::InvalidValue {
            kind: RecordKind::Question,
            question_id,
            source,
        }
        .into()
    })
}

fn read_json_file<T: for<'de> Deserialize<'de>>(path: &Path) -> AppResult<T> {
    let content = fs::read_to_string(path).map_err(|e| AppError::file_read_failed(path, e))?;
    serde_json::from_str(&content).map_err(|e| AppError::json_parse_failed(path, e))
}

fn load_questions(path: &Path) -> AppResult<Vec<Value>> {
    let file: QuestionsFile = read_json_file(path)?;
    Ok(file.questions)
}

/// 建立 question_id → 标注 的索引，重复 id 以最后一条为准
fn load_annotation_index(path: &Path) -> AppResult<HashMap<i64, Value>> {
    let file: AnnotationsFile = read_json_file(path)?;
    let mut index = HashMap::with_capacity(file.annotations.len());

    for (position, annotation) in file.annotations.into_iter().enumerate() {
        let object = annotation.as_object().ok_or(SchemaError::NotAnObject {
            kind: RecordKind::Annotation,
            index: position,
        })?;
        let question_id = question_id_of(object, RecordKind::Annotation, position)?;
        index.insert(question_id, annotation);
    }

    Ok(index)
}
