// Copyright 2026 Saucesort Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

use crate::database::ALL_CODE;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub databases: u32,
    pub min_similarity: f64,
    pub title_min_similarity: f64,
    pub api_key: Option<String>,
    pub premium: bool,
    pub exclude_categories: Vec<String>,
    pub retry_cooldown_secs: u64,
    pub request_timeout_secs: u64,
    pub title_lookup_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "https://saucenao.com/search.php".to_string(),
            databases: ALL_CODE,
            min_similarity: 65.0,
            title_min_similarity: 95.0,
            api_key: None,
            premium: false,
            exclude_categories: Vec::new(),
            retry_cooldown_secs: 10,
            request_timeout_secs: 60,
            title_lookup_command: None,
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return Some(PathBuf::from(appdata));
        }
        if let Ok(profile) = std::env::var("USERPROFILE") {
            return Some(PathBuf::from(profile).join("AppData").join("Roaming"));
        }
        return None;
    }

    if cfg!(target_os = "macos") {
        let home = std::env::var("HOME").ok()?;
        return Some(
            PathBuf::from(home)
                .join("Library")
                .join("Application Support"),
        );
    }

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config"))
}

pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("saucesort").join("saucesort.toml"))
}

pub fn load_global_config() -> Result<Config> {
    let Some(path) = global_config_path() else {
        return Ok(Config::default());
    };
    if !path.exists() {
        return Ok(Config::default());
    }
    read_config(&path)
}

pub fn read_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut config: Config = toml::from_str(&text).context("parse saucesort.toml")?;
    config.min_similarity = clamp_percent(config.min_similarity);
    config.title_min_similarity = clamp_percent(config.title_min_similarity);
    Ok(config)
}

pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    let text = toml::to_string_pretty(config).context("serialize config")?;
    std::fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use tempfile::tempdir;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn config_path(config_root: &Path) -> PathBuf {
        let base = if cfg!(target_os = "macos") {
            config_root.join("Library").join("Application Support")
        } else {
            config_root.to_path_buf()
        };
        base.join("saucesort").join("saucesort.toml")
    }

    fn with_env<T>(config_root: &Path, f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().expect("env lock");
        let old_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        let old_home = std::env::var("HOME").ok();
        let old_appdata = std::env::var("APPDATA").ok();
        set_env_var("XDG_CONFIG_HOME", config_root);
        set_env_var("HOME", config_root);
        set_env_var("APPDATA", config_root);
        let result = f();
        match old_xdg {
            Some(val) => set_env_var("XDG_CONFIG_HOME", val),
            None => remove_env_var("XDG_CONFIG_HOME"),
        }
        match old_home {
            Some(val) => set_env_var("HOME", val),
            None => remove_env_var("HOME"),
        }
        match old_appdata {
            Some(val) => set_env_var("APPDATA", val),
            None => remove_env_var("APPDATA"),
        }
        result
    }

    fn set_env_var(key: &str, value: impl AsRef<std::ffi::OsStr>) {
        unsafe {
            std::env::set_var(key, value);
        }
    }

    fn remove_env_var(key: &str) {
        unsafe {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config_dir = tempdir().expect("config dir");
        with_env(config_dir.path(), || {
            let config = load_global_config().expect("load");
            assert_eq!(config, Config::default());
        });
    }

    #[test]
    fn partial_file_keeps_defaults_and_clamps() {
        let config_dir = tempdir().expect("config dir");
        let path = config_path(config_dir.path());
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(
            &path,
            "min_similarity = 140.0\napi_key = \"abc\"\nexclude_categories = [\"original\"]\n",
        )
        .expect("write");
        with_env(config_dir.path(), || {
            let config = load_global_config().expect("load");
            assert_eq!(config.min_similarity, 100.0);
            assert_eq!(config.api_key.as_deref(), Some("abc"));
            assert_eq!(config.exclude_categories, vec!["original".to_string()]);
            assert_eq!(config.retry_cooldown_secs, 10);
        });
    }

    #[test]
    fn written_config_reads_back() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("saucesort.toml");
        let mut config = Config::default();
        config.premium = true;
        config.title_lookup_command = Some("titlesearch --json".to_string());
        write_config(&path, &config).expect("write");
        assert_eq!(read_config(&path).expect("read"), config);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("saucesort.toml");
        std::fs::write(&path, "databases = \"many\"").expect("write");
        let err = read_config(&path).unwrap_err();
        assert!(err.to_string().contains("parse saucesort.toml"));
    }
}
