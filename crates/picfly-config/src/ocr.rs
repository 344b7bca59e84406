use serde::{Deserialize, Serialize};

fn default_file_field() -> String {
    "file".to_string()
}

fn default_text_pointer() -> String {
    "/text".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Remote OCR service
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OcrConfig {
    pub endpoint: String,
    pub token: String,
    /// Multipart field carrying the image
    #[serde(default = "default_file_field")]
    pub file_field: String,
    /// JSON pointer to the recognized text (string, or array of lines) in the response
    #[serde(default = "default_text_pointer")]
    pub text_pointer: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl OcrConfig {
    /// Let a non-empty `PICFLY_OCR_ENDPOINT` / `PICFLY_OCR_TOKEN` win over the current values.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(endpoint) = set("PICFLY_OCR_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(token) = set("PICFLY_OCR_TOKEN") {
            self.token = token;
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            token: String::new(),
            file_field: default_file_field(),
            text_pointer: default_text_pointer(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}
