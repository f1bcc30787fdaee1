// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tienda_app::{PageSize, SelectionPolicy};
use tienda_tui::UiOptions;

const CONFIG_VERSION: i64 = 2;
const DEFAULT_STATUS_CLEAR_SECONDS: i64 = 4;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub ui: Ui,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            ui: Ui::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub page_size: Option<String>,
    pub status_clear_seconds: Option<i64>,
    pub selection_policy: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            page_size: Some(PageSize::default().as_str().to_owned()),
            status_clear_seconds: Some(DEFAULT_STATUS_CLEAR_SECONDS),
            selection_policy: Some(SelectionPolicy::default().as_str().to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("TIENDA_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set TIENDA_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(tienda_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned for config v2. Add `version = 2` and move values under [storage] and [ui]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 2. Migrate your config to the v2 schema",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "config {} has version {}; expected 2",
                path.display(),
                self.version
            );
        }

        if let Some(db_path) = &self.storage.db_path {
            tienda_db::validate_db_path(db_path)?;
        }

        if let Some(page_size) = &self.ui.page_size
            && PageSize::parse(page_size).is_none()
        {
            bail!(
                "ui.page_size in {} must be one of 10, 20, 50, 100, got {:?}",
                path.display(),
                page_size
            );
        }

        if let Some(seconds) = self.ui.status_clear_seconds
            && seconds <= 0
        {
            bail!(
                "ui.status_clear_seconds in {} must be positive, got {}",
                path.display(),
                seconds
            );
        }

        if let Some(policy) = &self.ui.selection_policy
            && SelectionPolicy::parse(policy).is_none()
        {
            bail!(
                "ui.selection_policy in {} must be \"page_scoped\" or \"global\", got {:?}",
                path.display(),
                policy
            );
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => tienda_db::default_db_path(),
        }
    }

    pub fn page_size(&self) -> PageSize {
        self.ui
            .page_size
            .as_deref()
            .and_then(PageSize::parse)
            .unwrap_or_default()
    }

    pub fn status_clear_seconds(&self) -> u64 {
        self.ui
            .status_clear_seconds
            .filter(|seconds| *seconds > 0)
            .unwrap_or(DEFAULT_STATUS_CLEAR_SECONDS) as u64
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        self.ui
            .selection_policy
            .as_deref()
            .and_then(SelectionPolicy::parse)
            .unwrap_or_default()
    }

    pub fn ui_options(&self) -> UiOptions {
        UiOptions {
            page_size: self.page_size(),
            status_clear_seconds: self.status_clear_seconds(),
            selection_policy: self.selection_policy(),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# tienda config\n# Place this file at: {}\n\nversion = 2\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/tienda/tienda.db)\n# db_path = \"/absolute/path/to/tienda.db\"\n\n[ui]\npage_size = \"{}\"\nstatus_clear_seconds = {}\nselection_policy = \"{}\"\n",
            path.display(),
            PageSize::default().as_str(),
            DEFAULT_STATUS_CLEAR_SECONDS,
            SelectionPolicy::default().as_str(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use tienda_app::{PageSize, SelectionPolicy};

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 2);
        assert_eq!(config.page_size(), PageSize::Ten);
        assert_eq!(config.status_clear_seconds(), 4);
        assert_eq!(config.selection_policy(), SelectionPolicy::PageScoped);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[ui]\npage_size = \"20\"\n")?;

        let error = Config::load(&path).expect_err("unversioned schema should fail");
        let message = error.to_string();
        assert!(message.contains("version = 2"));
        assert!(message.contains("[storage] and [ui]"));
        Ok(())
    }

    #[test]
    fn v2_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 2\n[ui]\npage_size = \"50\"\nstatus_clear_seconds = 2\nselection_policy = \"global\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.page_size(), PageSize::Fifty);
        assert_eq!(config.status_clear_seconds(), 2);
        assert_eq!(config.selection_policy(), SelectionPolicy::Global);
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n")?;
        let error = Config::load(&path).expect_err("v1 config should fail");
        assert!(error.to_string().contains("unsupported config version 1"));
        Ok(())
    }

    #[test]
    fn invalid_page_size_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n[ui]\npage_size = \"25\"\n")?;
        let error = Config::load(&path).expect_err("off-menu page size should fail");
        assert!(error.to_string().contains("10, 20, 50, 100"));
        Ok(())
    }

    #[test]
    fn invalid_selection_policy_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n[ui]\nselection_policy = \"sticky\"\n")?;
        let error = Config::load(&path).expect_err("unknown policy should fail");
        assert!(error.to_string().contains("page_scoped"));
        Ok(())
    }

    #[test]
    fn non_positive_status_clear_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n[ui]\nstatus_clear_seconds = 0\n")?;
        let error = Config::load(&path).expect_err("zero clear delay should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TIENDA_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TIENDA_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn db_path_prefers_storage_config_over_env_override() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) =
            write_config("version = 2\n[storage]\ndb_path = \"/explicit/from-config.db\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TIENDA_DB_PATH", "/from/env.db");
        }
        let config = Config::load(&path)?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TIENDA_DB_PATH");
        }
        assert_eq!(config.db_path()?, PathBuf::from("/explicit/from-config.db"));
        Ok(())
    }

    #[test]
    fn db_path_uses_env_override_when_storage_db_path_missing() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 2\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TIENDA_DB_PATH", "/from/env-only.db");
        }
        let config = Config::load(&path)?;
        let resolved = config.db_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TIENDA_DB_PATH");
        }
        assert_eq!(resolved, PathBuf::from("/from/env-only.db"));
        Ok(())
    }

    #[test]
    fn db_path_defaults_to_tienda_db_when_unset() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 2\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("TIENDA_DB_PATH");
        }
        let config = Config::load(&path)?;
        let resolved = config.db_path()?;
        assert!(
            resolved.ends_with("tienda.db"),
            "got {}",
            resolved.display()
        );
        Ok(())
    }

    #[test]
    fn db_path_rejects_uri_style_storage_value() -> Result<()> {
        let (_temp, path) =
            write_config("version = 2\n[storage]\ndb_path = \"https://evil.example/tienda.db\"\n")?;
        let error = Config::load(&path).expect_err("URI db_path should fail validation");
        let message = error.to_string();
        assert!(
            message.contains("looks like a URI") || message.contains("filesystem path"),
            "unexpected message: {message}"
        );
        Ok(())
    }

    #[test]
    fn example_config_includes_required_sections() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 2"));
        assert!(example.contains("[storage]"));
        assert!(example.contains("[ui]"));
        assert!(example.contains("selection_policy = \"page_scoped\""));
        Ok(())
    }
}
