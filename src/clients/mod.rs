pub mod download_client;

pub use download_client::DownloadClient;
