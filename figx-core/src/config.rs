use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use anyhow::bail;
use config::Config as ConfigLoader;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::matchers::UrlSuffixMatcher;
use crate::split::SplitBoundaries;

/// Embedded template used to bootstrap the on-disk configuration when the
/// tool runs for the first time.
pub const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../default_config.toml");

/// Container returned after loading configuration data and resolving runtime
/// paths.
#[derive(Debug, Clone)]
pub struct ConfigBundle {
    pub config: AppConfig,
    pub paths: AppPaths,
}

/// Resolve and load the configuration for the provided application name. If
/// no config file exists yet, a default file is created from
/// [`DEFAULT_CONFIG_TEMPLATE`].
pub fn load_or_initialize_config(app_name: impl AsRef<str>) -> Result<ConfigBundle> {
    let app_name = app_name.as_ref();
    let mut paths = AppPaths::discover(app_name)?;
    paths.ensure_config_dir()?;

    if !paths.config_file.exists() {
        fs::write(&paths.config_file, DEFAULT_CONFIG_TEMPLATE).with_context(|| {
            format!(
                "failed to write default config to {}",
                paths.config_file.display()
            )
        })?;
    }

    let env_prefix = app_name
        .chars()
        .map(|ch| if ch == '-' { '_' } else { ch })
        .collect::<String>()
        .to_ascii_uppercase();

    let builder = ConfigLoader::builder()
        .add_source(File::from(paths.config_file.clone()))
        .add_source(
            Environment::with_prefix(&env_prefix)
                .separator("__")
                .try_parsing(true),
        );

    let config: AppConfig = builder
        .build()
        .with_context(|| {
            format!(
                "failed to parse configuration at {}",
                paths.config_file.display()
            )
        })?
        .try_deserialize()
        .context("failed to deserialize configuration into AppConfig")?;

    paths = paths.apply_storage_overrides(&config.storage)?;
    paths.ensure_runtime_dirs()?;

    config.normalize()?;

    Ok(ConfigBundle { config, paths })
}

/// Persistent runtime paths derived from XDG environment variables or
/// sensible fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub app_name: String,
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub data_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl AppPaths {
    pub fn discover(app_name: impl Into<String>) -> Result<Self> {
        let app_name = app_name.into();
        let home = home_dir().context("unable to determine home directory for XDG resolution")?;

        let config_base = xdg_dir("XDG_CONFIG_HOME", &home, ".config");
        let data_base = xdg_dir("XDG_DATA_HOME", &home, ".local/share");
        let state_base = xdg_dir("XDG_STATE_HOME", &home, ".local/state");

        let config_dir = config_base.join(&app_name);
        let data_dir = data_base.join(&app_name);
        let state_dir = state_base.join(&app_name);
        let config_file = config_dir.join("config.toml");

        Ok(Self {
            app_name,
            config_dir,
            config_file,
            data_dir,
            state_dir,
        })
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.config_dir).with_context(|| {
            format!(
                "failed to create config directory {}",
                self.config_dir.display()
            )
        })
    }

    pub fn ensure_runtime_dirs(&self) -> Result<()> {
        for dir in [&self.data_dir, &self.state_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create runtime directory {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn apply_storage_overrides(&self, storage: &StorageSettings) -> Result<Self> {
        let mut next = self.clone();

        if let Some(data_dir) = storage.data_dir.as_ref() {
            next.data_dir = resolve_path_value(data_dir, &self.config_dir)?;
        }

        if let Some(state_dir) = storage.state_dir.as_ref() {
            next.state_dir = resolve_path_value(state_dir, &self.config_dir)?;
        }

        Ok(next)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct AppConfig {
    pub corpus: CorpusSettings,
    pub split: SplitSettings,
    pub matcher: MatcherSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

impl AppConfig {
    pub fn normalize(&self) -> Result<()> {
        // Surface bad boundary fractions at load time, before any workflow
        // touches them.
        self.split
            .boundaries()
            .validate()
            .map_err(|err| anyhow!(err))?;

        if self.matcher.image_suffixes.is_empty() {
            bail!("matcher.image_suffixes must list at least one file suffix");
        }

        Ok(())
    }

    /// The corpus directory: an explicit `corpus.docs_dir` resolved against
    /// the config directory, else `<data>/corpus`.
    pub fn resolved_docs_dir(&self, paths: &AppPaths) -> Result<PathBuf> {
        match self.corpus.docs_dir.as_ref() {
            Some(value) => resolve_path_value(value, &paths.config_dir)
                .context("failed to resolve corpus.docs_dir"),
            None => Ok(paths.data_dir.join("corpus")),
        }
    }
}

/// Where the datasheets live and how many of them to take.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct CorpusSettings {
    pub docs_dir: Option<String>,
    pub max_docs: Option<usize>,
}

/// Cumulative train/dev cut fractions for corpus partitioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitSettings {
    pub train: f64,
    pub dev: f64,
}

impl SplitSettings {
    pub fn boundaries(&self) -> SplitBoundaries {
        SplitBoundaries {
            train: self.train,
            dev: self.dev,
        }
    }
}

impl Default for SplitSettings {
    fn default() -> Self {
        let defaults = SplitBoundaries::default();
        Self {
            train: defaults.train,
            dev: defaults.dev,
        }
    }
}

/// File suffixes the default image matcher accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherSettings {
    pub image_suffixes: Vec<String>,
}

impl MatcherSettings {
    pub fn matcher(&self) -> UrlSuffixMatcher {
        UrlSuffixMatcher::new(self.image_suffixes.iter().cloned())
    }
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            image_suffixes: ["png", "jpg", "jpeg", "gif", "bmp"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct StorageSettings {
    pub data_dir: Option<String>,
    pub state_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Env-filter directive applied when the CLI initializes tracing.
    pub directive: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directive: "figx_core=info".to_string(),
        }
    }
}

fn xdg_dir(var: &str, home: &Path, fallback_suffix: &str) -> PathBuf {
    env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home.join(fallback_suffix))
}

pub fn resolve_path_value(value: &str, base_dir: &Path) -> Result<PathBuf> {
    let expanded = expand_path(value)?;
    let mut path = PathBuf::from(&expanded);
    if path.is_absolute() {
        path = path.components().collect();
        Ok(path)
    } else {
        Ok(base_dir.join(path))
    }
}

fn expand_path(value: &str) -> Result<String> {
    let home = home_dir();
    let home_utf8 = match home.as_ref() {
        Some(path) => Some(
            path.to_str()
                .ok_or_else(|| anyhow!("home directory contains invalid UTF-8"))?
                .to_string(),
        ),
        None => None,
    };

    let expanded = shellexpand::full_with_context(
        value,
        || home_utf8.as_deref(),
        |var| Ok(env::var(var).ok()),
    )
    .map_err(|error: shellexpand::LookupError<std::env::VarError>| {
        anyhow!("failed to expand '{value}': {error}")
    })?;
    Ok(expanded.into_owned())
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::OnceLock;
    use tempfile::TempDir;

    fn set_env_path(var: &str, value: &Path) {
        // `std::env::set_var` mutates global process state; every test in
        // this module holds the env lock while touching XDG variables.
        unsafe { env::set_var(var, value) };
    }

    fn set_env(var: &str, value: &str) {
        unsafe { env::set_var(var, value) };
    }

    fn remove_env(var: &str) {
        unsafe { env::remove_var(var) };
    }

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn point_xdg_at(tmp: &TempDir) {
        set_env_path("XDG_CONFIG_HOME", &tmp.path().join("config"));
        set_env_path("XDG_DATA_HOME", &tmp.path().join("data"));
        set_env_path("XDG_STATE_HOME", &tmp.path().join("state"));
    }

    #[test]
    fn creates_config_when_missing() {
        let _guard = env_lock().lock().unwrap();
        let tmp = TempDir::new().unwrap();
        point_xdg_at(&tmp);

        let bundle = load_or_initialize_config("figx-test").unwrap();

        assert!(
            bundle.paths.config_file.exists(),
            "config file not created at {}",
            bundle.paths.config_file.display()
        );
        assert!(bundle.paths.data_dir.exists());
        assert!(bundle.paths.state_dir.exists());

        assert_eq!(bundle.config.split.boundaries(), SplitBoundaries::default());

        let docs_dir = bundle.config.resolved_docs_dir(&bundle.paths).unwrap();
        assert_eq!(docs_dir, bundle.paths.data_dir.join("corpus"));
    }

    #[test]
    fn respects_storage_overrides() {
        let _guard = env_lock().lock().unwrap();
        let tmp = TempDir::new().unwrap();
        point_xdg_at(&tmp);

        let app_dir = tmp.path().join("config/figx-override");
        fs::create_dir_all(&app_dir).unwrap();
        let mut file = fs::File::create(app_dir.join("config.toml")).unwrap();
        writeln!(
            file,
            r#"
                [storage]
                data_dir = "~/custom/data"
                state_dir = "~/custom/state"
            "#
        )
        .unwrap();

        let bundle = load_or_initialize_config("figx-override").unwrap();

        let expanded_home = home_dir().unwrap();
        assert_eq!(bundle.paths.data_dir, expanded_home.join("custom/data"));
        assert_eq!(bundle.paths.state_dir, expanded_home.join("custom/state"));
    }

    #[test]
    fn environment_overrides_split_boundaries() {
        let _guard = env_lock().lock().unwrap();
        let tmp = TempDir::new().unwrap();
        point_xdg_at(&tmp);

        set_env("FIGX_ENV__SPLIT__TRAIN", "0.5");
        set_env("FIGX_ENV__SPLIT__DEV", "0.75");
        let bundle = load_or_initialize_config("figx-env");
        remove_env("FIGX_ENV__SPLIT__TRAIN");
        remove_env("FIGX_ENV__SPLIT__DEV");

        let boundaries = bundle.unwrap().config.split.boundaries();
        assert_eq!(boundaries, SplitBoundaries::new(0.5, 0.75).unwrap());
    }

    #[test]
    fn rejects_unordered_boundaries_at_load() {
        let _guard = env_lock().lock().unwrap();
        let tmp = TempDir::new().unwrap();
        point_xdg_at(&tmp);

        let app_dir = tmp.path().join("config/figx-bad");
        fs::create_dir_all(&app_dir).unwrap();
        fs::write(
            app_dir.join("config.toml"),
            "[split]\ntrain = 0.9\ndev = 0.4\n",
        )
        .unwrap();

        let err = load_or_initialize_config("figx-bad").unwrap_err();
        assert!(err.to_string().contains("split boundaries"));
    }
}
