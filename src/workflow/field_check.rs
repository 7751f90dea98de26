//! 字段集合校验
//!
//! 问题与标注的字段集合必须与白名单完全一致，多一个少一个都视为上游格式漂移

use serde_json::{Map, Value};

use crate::error::{RecordKind, SchemaError};

/// 问题条目允许的字段
pub const QUESTION_FIELDS: [&str; 3] = ["image_id", "question", "question_id"];

/// 标注条目允许的字段
pub const ANNOTATION_FIELDS: [&str; 6] = [
    "question_type",
    "multiple_choice_answer",
    "answers",
    "image_id",
    "answer_type",
    "question_id",
];

fn allowed_fields(kind: RecordKind) -> &'static [&'static str] {
    match kind {
        RecordKind::Question => &QUESTION_FIELDS,
        RecordKind::Annotation => &ANNOTATION_FIELDS,
    }
}

/// 校验字段集合与白名单完全相等
pub fn check_field_set(
    kind: RecordKind,
    object: &Map<String, Value>,
    question_id: i64,
) -> Result<(), SchemaError> {
    let allowed = allowed_fields(kind);

    let mut missing: Vec<String> = allowed
        .iter()
        .filter(|field| !object.contains_key(**field))
        .map(|field| field.to_string())
        .collect();
    let mut unexpected: Vec<String> = object
        .keys()
        .filter(|key| !allowed.contains(&key.as_str()))
        .cloned()
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        return Ok(());
    }

    missing.sort();
    unexpected.sort();
    Err(SchemaError::FieldSetMismatch {
        kind,
        question_id,
        missing,
        unexpected,
    })
}
