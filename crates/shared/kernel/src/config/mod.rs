use config::{Config, Environment, File, Map};
use imghub_domain::config::AppConfig;
use imghub_domain::constants::{DEFAULT_CONFIG_FILE, ENV_PREFIX};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Errors raised while assembling the configuration.
#[imghub_derive::imghub_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    /// The sources merged fine but the result breaks an invariant.
    #[error("Invalid configuration{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader that layers environment overrides over an optional file.
///
/// 1. **Base File**: settings from `path`, or `server.toml` in the working directory. A missing
///    file is not an error; every key has a default.
/// 2. **Environment Overrides**: variables prefixed with `IMGHUB__`, nested with double
///    underscores (`IMGHUB__FETCH__MAX_FILE_SIZE` maps to `fetch.max_file_size`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is malformed, a variable cannot be parsed, or the
/// merged values do not match `T`.
///
/// # Example
/// ```rust
/// use imghub_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct Settings {
///     #[serde(default)]
///     port: u16,
/// }
///
/// let cfg: Settings = load_config(Some("config/local.toml")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_config_with_env(path, None)
}

/// Same as [`load_config`], reading overrides from `env` instead of the process environment
/// when it is `Some`. Keys keep their `IMGHUB__` spelling.
///
/// # Errors
/// See [`load_config`].
pub fn load_config_with_env<T>(
    path: Option<impl AsRef<Path>>,
    env: Option<Map<String, String>>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .convert_case(config::Case::Snake)
                .try_parsing(true)
                .source(env),
        );

    info!(path = %effective_path.display(), exists = effective_path.exists(), "Loading config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Loads [`AppConfig`] and runs [`AppConfig::validate`] on the result.
///
/// # Errors
/// Returns [`ConfigError::Config`] for loading failures and [`ConfigError::Invalid`] for values
/// that parse but cannot be used.
pub fn load_app_config(path: Option<impl AsRef<Path>>) -> Result<AppConfig, ConfigError> {
    validated(load_config(path)?)
}

/// [`load_app_config`] with injected environment overrides.
///
/// # Errors
/// See [`load_app_config`].
pub fn load_app_config_with_env(
    path: Option<impl AsRef<Path>>,
    env: Map<String, String>,
) -> Result<AppConfig, ConfigError> {
    validated(load_config_with_env(path, Some(env))?)
}

fn validated(cfg: AppConfig) -> Result<AppConfig, ConfigError> {
    cfg.validate().map_err(|message| ConfigError::Invalid { message, context: None })?;
    Ok(cfg)
}
