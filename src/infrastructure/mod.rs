pub mod archive;

pub use archive::extract_zip;
