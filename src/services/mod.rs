pub mod acquisition;
pub mod export_writer;

pub use acquisition::{AcquiredPaths, DownloadManager};
pub use export_writer::{ExportWriter, SplitWriter};
