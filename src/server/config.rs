use super::RequestsLoggingLevel;
use crate::config::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// Largest accepted request body. Selfies travel base64 encoded.
    pub max_upload_bytes: usize,
    pub frontend_dir_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            frontend_dir_path: None,
        }
    }
}
