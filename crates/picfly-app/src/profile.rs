use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use picfly_config::Config;
use serde::{Deserialize, Serialize};

/// Windows Roaming folder
#[cfg(windows)]
fn roaming_dir() -> anyhow::Result<PathBuf> {
    use windows::Win32::System::Com::CoTaskMemFree;
    use windows::Win32::UI::Shell::{FOLDERID_RoamingAppData, KF_FLAG_DEFAULT, SHGetKnownFolderPath};

    unsafe {
        let path = SHGetKnownFolderPath(&FOLDERID_RoamingAppData, KF_FLAG_DEFAULT, None)
            .context("Failed to get RoamingAppData")?;
        let decoded = path.to_string();
        CoTaskMemFree(Some(path.0 as *const _));
        Ok(PathBuf::from(decoded.context("RoamingAppData path is not UTF-16")?))
    }
}

#[cfg(not(windows))]
fn roaming_dir() -> anyhow::Result<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .context("Neither XDG_CONFIG_HOME nor HOME is set")
}

fn profiles_dir() -> anyhow::Result<PathBuf> {
    Ok(roaming_dir()?.join("Picfly").join("profiles"))
}

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

/// Profile files may hold a named profile or a bare config
#[derive(Deserialize)]
#[serde(untagged)]
enum ProfileFile {
    Named(Profile),
    Bare(Config),
}

fn read_profile(path: &Path) -> anyhow::Result<Config> {
    let data = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file: ProfileFile =
        serde_json::from_str(&data).with_context(|| format!("Invalid profile {}", path.display()))?;
    Ok(match file {
        ProfileFile::Named(profile) => profile.value,
        ProfileFile::Bare(config) => config,
    })
}

/// Write the defaults as the `main` profile unless it already exists.
fn bootstrap(main_profile: &Path) -> anyhow::Result<()> {
    if main_profile.exists() {
        return Ok(());
    }
    if let Some(dir) = main_profile.parent() {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let profile = Profile {
        name: "main".into(),
        value: Config::default(),
    };
    fs::write(main_profile, serde_json::to_string_pretty(&profile)?)
        .with_context(|| format!("Failed to write {}", main_profile.display()))?;
    tracing::info!(path = %main_profile.display(), "created main profile");
    Ok(())
}

/// Load `explicit` if given, otherwise the `main` profile, creating it on first run.
///
/// `PICFLY_*` variables set in the environment (or `.env`) win over the file.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = match explicit {
        Some(path) => {
            tracing::info!(path = %path.display(), "using config override");
            read_profile(path)?
        }
        None => load_or_create(&profiles_dir()?.join("main.json"))?,
    };
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

fn load_or_create(main_profile: &Path) -> anyhow::Result<Config> {
    if let Err(e) = bootstrap(main_profile) {
        tracing::warn!("could not create main profile, using defaults: {e:#}");
        return Ok(Config::default());
    }
    read_profile(main_profile)
}
