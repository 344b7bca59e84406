use serde::{Deserialize, Serialize};

fn default_file_field() -> String {
    "file".to_string()
}

fn default_link_pointer() -> String {
    "/url".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Image host the captures and clipboard images are uploaded to
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct UploadConfig {
    pub endpoint: String,
    /// Sent as a bearer token when not empty
    pub token: String,
    #[serde(default = "default_file_field")]
    pub file_field: String,
    /// JSON pointer to the public link in the host's response
    #[serde(default = "default_link_pointer")]
    pub link_pointer: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl UploadConfig {
    /// Let a non-empty `PICFLY_UPLOAD_ENDPOINT` / `PICFLY_UPLOAD_TOKEN` win over the current values.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(endpoint) = set("PICFLY_UPLOAD_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(token) = set("PICFLY_UPLOAD_TOKEN") {
            self.token = token;
        }
    }
}

/// No endpoint and no token, nothing read from the environment
impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            token: String::new(),
            file_field: default_file_field(),
            link_pointer: default_link_pointer(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}
