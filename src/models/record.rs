use serde::{Deserialize, Serialize};

use crate::models::question::{Annotation, Answer, Question};

/// 对外输出的单条记录
///
/// 无标注划分中四个标注字段为 `None`，序列化为 `null` 而不是省略，
/// 保证所有划分的记录结构一致。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VqaRecord {
    pub question_type: Option<String>,
    pub multiple_choice_answer: Option<String>,
    pub answers: Option<Vec<Answer>>,
    pub image_id: i64,
    pub answer_type: Option<String>,
    pub question_id: i64,
    pub question: String,
    pub image: String,
}

impl VqaRecord {
    /// 合并问题与标注，标注中的 image_id 覆盖问题中的值
    pub fn annotated(question: Question, annotation: Annotation, image: String) -> Self {
        Self {
            question_type: Some(annotation.question_type),
            multiple_choice_answer: Some(annotation.multiple_choice_answer),
            answers: Some(annotation.answers),
            image_id: annotation.image_id,
            answer_type: Some(annotation.answer_type),
            question_id: annotation.question_id,
            question: question.question,
            image,
        }
    }

    /// 无标注划分的记录
    pub fn unannotated(question: Question, image: String) -> Self {
        Self {
            question_type: None,
            multiple_choice_answer: None,
            answers: None,
            image_id: question.image_id,
            answer_type: None,
            question_id: question.question_id,
            question: question.question,
            image,
        }
    }

    /// 是否带有标注字段
    pub fn has_annotation(&self) -> bool {
        self.answers.is_some()
    }
}
