pub mod features;
pub mod question;
pub mod record;
pub mod resource;
pub mod split;

pub use features::{vqa_v2_features, vqa_v2_info, DatasetInfo, Feature, Features};
pub use question::{Annotation, AnnotationsFile, Answer, Question, QuestionsFile};
pub use record::VqaRecord;
pub use resource::{resource_map, ResourceKind, ResourceMap};
pub use split::Split;
