//! 输出记录的结构声明
//!
//! 只做声明，供下游消费方校验或建表使用

use serde::Serialize;

const DESCRIPTION: &str = "VQA is a new dataset containing open-ended questions about images. \
These questions require an understanding of vision, language and commonsense knowledge to answer.";

const HOMEPAGE: &str = "https://visualqa.org";

// MS COCO 与 VQA 作者都需要署名
const LICENSE: &str = "CC BY 4.0";

const CITATION: &str = r#"@InProceedings{VQA,
author = {Stanislaw Antol and Aishwarya Agrawal and Jiasen Lu and Margaret Mitchell and Dhruv Batra and C. Lawrence Zitnick and Devi Parikh},
title = {VQA: Visual Question Answering},
booktitle = {International Conference on Computer Vision (ICCV)},
year = {2015},
}"#;

/// 标量类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    String,
    Int64,
}

/// 单个字段的类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Feature {
    /// 标量值
    Value { dtype: DType },
    /// 元素为结构体的列表
    Sequence { feature: Features },
    /// 图片，记录中以文件路径表示
    Image,
}

impl Feature {
    pub fn string() -> Self {
        Feature::Value {
            dtype: DType::String,
        }
    }

    pub fn int64() -> Self {
        Feature::Value { dtype: DType::Int64 }
    }
}

/// 有序的字段声明
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Features {
    fields: Vec<(String, Feature)>,
}

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, feature: Feature) -> Self {
        self.fields.push((name.into(), feature));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Feature> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, feature)| feature)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// 数据集元信息
#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub description: String,
    pub homepage: String,
    pub license: String,
    pub citation: String,
    pub version: String,
    pub features: Features,
}

/// VQA v2 输出记录的字段声明
pub fn vqa_v2_features() -> Features {
    let answer = Features::new()
        .with("answer", Feature::string())
        .with("answer_confidence", Feature::string())
        .with("answer_id", Feature::int64());

    Features::new()
        .with("question_type", Feature::string())
        .with("multiple_choice_answer", Feature::string())
        .with("answers", Feature::Sequence { feature: answer })
        .with("image_id", Feature::int64())
        .with("answer_type", Feature::string())
        .with("question_id", Feature::int64())
        .with("question", Feature::string())
        .with("image", Feature::Image)
}

/// VQA v2 数据集元信息
pub fn vqa_v2_info(version: &str) -> DatasetInfo {
    DatasetInfo {
        description: DESCRIPTION.to_string(),
        homepage: HOMEPAGE.to_string(),
        license: LICENSE.to_string(),
        citation: CITATION.to_string(),
        version: version.to_string(),
        features: vqa_v2_features(),
    }
}
