//! Upload adapters

mod http;

pub use http::HttpUploadClient;
