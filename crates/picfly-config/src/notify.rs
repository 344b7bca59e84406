use serde::{Deserialize, Serialize};

/// AppUserModelID of PowerShell, which unpackaged desktop apps can borrow to raise toasts
pub const POWERSHELL_APP_ID: &str =
    "{1AC14E77-02E7-4E5D-B744-2EB1AE5198B7}\\WindowsPowerShell\\v1.0\\powershell.exe";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct NotifyConfig {
    pub enabled: bool,
    pub title: String,
    pub app_id: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "picfly".to_string(),
            app_id: POWERSHELL_APP_ID.to_string(),
        }
    }
}
