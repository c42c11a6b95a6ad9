use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub commerce: CommerceConfig,
    pub rag: RagConfig,
    pub server: ServerConfig,
    pub tools_server: ToolsServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub base_url: String,
}

#[derive(Clone, Debug)]
pub struct CommerceConfig {
    pub api_base_url: String,
    pub access_token: Option<SecretString>,
    pub dummy_responses: bool,
    pub timeout_secs: u64,
    pub catalog_bypass: bool,
    pub catalog_url: Option<String>,
    pub local_tools: bool,
    pub tools_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RagConfig {
    pub api_key: Option<SecretString>,
    pub index_host: Option<String>,
    pub index_name: Option<String>,
    pub top_k: usize,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct ToolsServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub dummy_responses: Option<bool>,
    pub local_tools: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                api_key: None,
                model: "gemini-3-flash-preview".to_string(),
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            },
            commerce: CommerceConfig {
                api_base_url: "https://shop.example.com/admin/api/2025-07".to_string(),
                access_token: None,
                dummy_responses: false,
                timeout_secs: 30,
                catalog_bypass: true,
                catalog_url: None,
                local_tools: false,
                tools_url: Some("http://127.0.0.1:8010".to_string()),
            },
            rag: RagConfig { api_key: None, index_host: None, index_name: None, top_k: 8 },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8002 },
            tools_server: ToolsServerConfig { bind_address: "127.0.0.1".to_string(), port: 8010 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("shopfront.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(llm) = patch.llm {
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
        }

        if let Some(commerce) = patch.commerce {
            if let Some(api_base_url) = commerce.api_base_url {
                self.commerce.api_base_url = api_base_url;
            }
            if let Some(access_token_value) = commerce.access_token {
                self.commerce.access_token = Some(secret_value(access_token_value));
            }
            if let Some(dummy_responses) = commerce.dummy_responses {
                self.commerce.dummy_responses = dummy_responses;
            }
            if let Some(timeout_secs) = commerce.timeout_secs {
                self.commerce.timeout_secs = timeout_secs;
            }
            if let Some(catalog_bypass) = commerce.catalog_bypass {
                self.commerce.catalog_bypass = catalog_bypass;
            }
            if let Some(catalog_url) = commerce.catalog_url {
                self.commerce.catalog_url = Some(catalog_url);
            }
            if let Some(local_tools) = commerce.local_tools {
                self.commerce.local_tools = local_tools;
            }
            if let Some(tools_url) = commerce.tools_url {
                self.commerce.tools_url = Some(tools_url);
            }
        }

        if let Some(rag) = patch.rag {
            if let Some(rag_api_key_value) = rag.api_key {
                self.rag.api_key = Some(secret_value(rag_api_key_value));
            }
            if let Some(index_host) = rag.index_host {
                self.rag.index_host = Some(index_host);
            }
            if let Some(index_name) = rag.index_name {
                self.rag.index_name = Some(index_name);
            }
            if let Some(top_k) = rag.top_k {
                self.rag.top_k = top_k;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(tools_server) = patch.tools_server {
            if let Some(bind_address) = tools_server.bind_address {
                self.tools_server.bind_address = bind_address;
            }
            if let Some(port) = tools_server.port {
                self.tools_server.port = port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SHOPFRONT_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("SHOPFRONT_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("SHOPFRONT_LLM_BASE_URL") {
            self.llm.base_url = value;
        }

        if let Some(value) = read_env("SHOPFRONT_COMMERCE_API_BASE_URL") {
            self.commerce.api_base_url = value;
        }
        if let Some(value) = read_env("SHOPFRONT_COMMERCE_ACCESS_TOKEN") {
            self.commerce.access_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("SHOPFRONT_COMMERCE_DUMMY_RESPONSES") {
            self.commerce.dummy_responses =
                parse_bool("SHOPFRONT_COMMERCE_DUMMY_RESPONSES", &value)?;
        }
        if let Some(value) = read_env("SHOPFRONT_COMMERCE_TIMEOUT_SECS") {
            self.commerce.timeout_secs = parse_u64("SHOPFRONT_COMMERCE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("SHOPFRONT_COMMERCE_CATALOG_BYPASS") {
            self.commerce.catalog_bypass =
                parse_bool("SHOPFRONT_COMMERCE_CATALOG_BYPASS", &value)?;
        }
        if let Some(value) = read_env("SHOPFRONT_COMMERCE_CATALOG_URL") {
            self.commerce.catalog_url = Some(value);
        }
        if let Some(value) = read_env("SHOPFRONT_COMMERCE_LOCAL_TOOLS") {
            self.commerce.local_tools = parse_bool("SHOPFRONT_COMMERCE_LOCAL_TOOLS", &value)?;
        }
        if let Some(value) = read_env("SHOPFRONT_COMMERCE_TOOLS_URL") {
            self.commerce.tools_url = Some(value);
        }

        if let Some(value) = read_env("SHOPFRONT_RAG_API_KEY") {
            self.rag.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("SHOPFRONT_RAG_INDEX_HOST") {
            self.rag.index_host = Some(value);
        }
        if let Some(value) = read_env("SHOPFRONT_RAG_INDEX_NAME") {
            self.rag.index_name = Some(value);
        }
        if let Some(value) = read_env("SHOPFRONT_RAG_TOP_K") {
            self.rag.top_k = parse_usize("SHOPFRONT_RAG_TOP_K", &value)?;
        }

        if let Some(value) = read_env("SHOPFRONT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SHOPFRONT_SERVER_PORT") {
            self.server.port = parse_u16("SHOPFRONT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("SHOPFRONT_TOOLS_BIND_ADDRESS") {
            self.tools_server.bind_address = value;
        }
        if let Some(value) = read_env("SHOPFRONT_TOOLS_PORT") {
            self.tools_server.port = parse_u16("SHOPFRONT_TOOLS_PORT", &value)?;
        }

        let log_level =
            read_env("SHOPFRONT_LOGGING_LEVEL").or_else(|| read_env("SHOPFRONT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SHOPFRONT_LOGGING_FORMAT").or_else(|| read_env("SHOPFRONT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(dummy_responses) = overrides.dummy_responses {
            self.commerce.dummy_responses = dummy_responses;
        }
        if let Some(local_tools) = overrides.local_tools {
            self.commerce.local_tools = local_tools;
        }
    }

    /// Missing credentials are deliberately NOT validation errors: the
    /// runtime degrades (dummy adapter responses, canned info answers)
    /// instead of refusing to start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("llm.base_url", Some(&self.llm.base_url))?;
        validate_url("commerce.api_base_url", Some(&self.commerce.api_base_url))?;
        validate_url("commerce.catalog_url", self.commerce.catalog_url.as_deref())?;
        validate_url("commerce.tools_url", self.commerce.tools_url.as_deref())?;
        validate_url("rag.index_host", self.rag.index_host.as_deref())?;

        if self.commerce.timeout_secs == 0 || self.commerce.timeout_secs > 300 {
            return Err(ConfigError::Validation(
                "commerce.timeout_secs must be in range 1..=300".to_string(),
            ));
        }

        if !self.commerce.local_tools && self.commerce.tools_url.is_none() {
            return Err(ConfigError::Validation(
                "commerce.tools_url is required when commerce.local_tools is false".to_string(),
            ));
        }

        if self.rag.top_k == 0 || self.rag.top_k > 50 {
            return Err(ConfigError::Validation(
                "rag.top_k must be in range 1..=50".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port must be greater than zero".to_string(),
            ));
        }
        if self.tools_server.port == 0 {
            return Err(ConfigError::Validation(
                "tools_server.port must be greater than zero".to_string(),
            ));
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::Validation(
                "logging.level must be one of trace|debug|info|warn|error".to_string(),
            )),
        }
    }

    /// True when all three retrieval credentials are present.
    pub fn rag_ready(&self) -> bool {
        self.llm_key_present()
            && self.rag.api_key.is_some()
            && self.rag.index_host.is_some()
            && self.rag.index_name.is_some()
    }

    pub fn llm_key_present(&self) -> bool {
        self.llm
            .api_key
            .as_ref()
            .map(|key| !key.expose_secret().trim().is_empty())
            .unwrap_or(false)
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("shopfront.toml"), PathBuf::from("config/shopfront.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_url(field: &str, value: Option<&str>) -> Result<(), ConfigError> {
    let Some(url) = value else {
        return Ok(());
    };
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{field} must start with http:// or https://")))
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    llm: Option<LlmPatch>,
    commerce: Option<CommercePatch>,
    rag: Option<RagPatch>,
    server: Option<ServerPatch>,
    tools_server: Option<ToolsServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CommercePatch {
    api_base_url: Option<String>,
    access_token: Option<String>,
    dummy_responses: Option<bool>,
    timeout_secs: Option<u64>,
    catalog_bypass: Option<bool>,
    catalog_url: Option<String>,
    local_tools: Option<bool>,
    tools_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RagPatch {
    api_key: Option<String>,
    index_host: Option<String>,
    index_name: Option<String>,
    top_k: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct ToolsServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_validate_and_keep_degraded_modes_off() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(!config.commerce.dummy_responses, "dummy responses should default off")?;
        ensure(config.commerce.catalog_bypass, "catalog bypass should default on")?;
        ensure(!config.rag_ready(), "rag should not be ready without credentials")?;
        ensure(config.commerce.timeout_secs == 30, "default commerce timeout should be 30s")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_COMMERCE_TOKEN", "shpat-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("shopfront.toml");
            fs::write(
                &path,
                r#"
[commerce]
access_token = "${TEST_COMMERCE_TOKEN}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            let token = config
                .commerce
                .access_token
                .as_ref()
                .ok_or_else(|| "token should be set".to_string())?;
            ensure(
                token.expose_secret() == "shpat-from-env",
                "access token should be loaded from environment",
            )
        })();

        clear_vars(&["TEST_COMMERCE_TOKEN"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SHOPFRONT_LLM_MODEL", "model-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("shopfront.toml");
            fs::write(
                &path,
                r#"
[llm]
model = "model-from-file"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.llm.model == "model-from-env", "env model should win over file")?;
            ensure(config.logging.level == "debug", "programmatic log level should win over file")
        })();

        clear_vars(&["SHOPFRONT_LLM_MODEL"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SHOPFRONT_LOG_LEVEL", "warn");
        env::set_var("SHOPFRONT_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "log level alias should be honored")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "log format alias should be honored",
            )
        })();

        clear_vars(&["SHOPFRONT_LOG_LEVEL", "SHOPFRONT_LOG_FORMAT"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SHOPFRONT_COMMERCE_TIMEOUT_SECS", "0");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("timeout_secs")
            );
            ensure(has_message, "validation failure should mention timeout_secs")
        })();

        clear_vars(&["SHOPFRONT_COMMERCE_TIMEOUT_SECS"]);
        result
    }

    #[test]
    fn remote_tools_without_url_is_rejected() -> Result<(), String> {
        let mut config = AppConfig::default();
        config.commerce.local_tools = false;
        config.commerce.tools_url = None;

        match config.validate() {
            Err(ConfigError::Validation(message)) if message.contains("tools_url") => Ok(()),
            other => Err(format!("expected tools_url validation failure, got {other:?}")),
        }
    }

    #[test]
    fn rag_readiness_requires_all_three_credentials() -> Result<(), String> {
        let mut config = AppConfig::default();
        ensure(!config.rag_ready(), "no credentials means not ready")?;

        config.llm.api_key = Some("llm-key".to_string().into());
        config.rag.api_key = Some("vector-key".to_string().into());
        config.rag.index_host = Some("https://index.example.net".to_string());
        ensure(!config.rag_ready(), "missing index name means not ready")?;

        config.rag.index_name = Some("store-kb".to_string());
        ensure(config.rag_ready(), "all credentials present means ready")
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SHOPFRONT_LLM_API_KEY", "llm-secret-value");
        env::set_var("SHOPFRONT_COMMERCE_ACCESS_TOKEN", "token-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("llm-secret-value"), "debug output should not contain llm key")?;
            ensure(
                !debug.contains("token-secret-value"),
                "debug output should not contain access token",
            )
        })();

        clear_vars(&["SHOPFRONT_LLM_API_KEY", "SHOPFRONT_COMMERCE_ACCESS_TOKEN"]);
        result
    }
}
