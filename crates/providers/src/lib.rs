pub mod backend;
pub mod http;

pub use backend::{BackendReply, ChatBackend, ChatSubmission, Upload};
pub use http::HttpBackend;
