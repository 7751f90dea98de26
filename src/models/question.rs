use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 问题文件中的单个问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: i64,
    pub image_id: i64,
    pub question: String,
}

/// 单个人工回答
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub answer_confidence: String,
    pub answer_id: i64,
}

/// 标注文件中的单条标注，仅 train / val 划分存在
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub question_id: i64,
    pub image_id: i64,
    pub question_type: String,
    pub multiple_choice_answer: String,
    pub answer_type: String,
    pub answers: Vec<Answer>,
}

/// 问题文件顶层结构
///
/// 条目保留为原始 JSON 对象，字段集合校验在逐条生成时进行。
/// `info`、`license` 等其余顶层键被忽略。
#[derive(Debug, Deserialize)]
pub struct QuestionsFile {
    pub questions: Vec<Value>,
}

/// 标注文件顶层结构
#[derive(Debug, Deserialize)]
pub struct AnnotationsFile {
    pub annotations: Vec<Value>,
}
