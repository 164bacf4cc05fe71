//! Upload storage configuration.

use serde::{Deserialize, Serialize};

/// Physical upload tree configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the physical hierarchy.
    #[serde(default = "default_upload_root")]
    pub upload_root: String,
    /// Maximum upload size in bytes (default 50 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Lowercase extensions accepted on upload.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl StorageConfig {
    /// Whether the given extension (any case, no dot) is accepted.
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        let ext = extension.to_lowercase();
        self.allowed_extensions.iter().any(|e| *e == ext)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_root: default_upload_root(),
            max_upload_size_bytes: default_max_upload(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

fn default_upload_root() -> String {
    "uploads".to_string()
}

fn default_max_upload() -> u64 {
    50 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    [
        "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "jpg", "jpeg", "png", "gif",
        "zip", "rar",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
