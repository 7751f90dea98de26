pub mod example_flow;
pub mod field_check;
pub mod split_paths;

pub use example_flow::{coco_image_path, generate_examples, Example, ExampleGenerator};
pub use field_check::{check_field_set, ANNOTATION_FIELDS, QUESTION_FIELDS};
pub use split_paths::SplitPaths;
