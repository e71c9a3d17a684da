use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use serde::Deserialize;
use std::net::SocketAddr;
use switchboard::models::ToolEndpoint;
use switchboard::providers::configs::UpstreamConfig;
use url::Url;

/// How generation results are returned to the browser. Fixed per
/// process; one deployment picks one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Await the full generation, answer with one JSON object.
    Buffered,
    /// Write fragment text to a chunked plain-text body as it arrives.
    Stream,
    /// Server-sent events carrying `{chunk, done}` payloads.
    Sse,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Failed to parse socket address")
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpstreamSettings {
    #[serde(default = "default_upstream_host")]
    pub host: String,
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl UpstreamSettings {
    pub fn into_config(self) -> UpstreamConfig {
        UpstreamConfig::new(self.host, self.api_key, self.model)
    }
}

#[derive(Debug, Deserialize)]
pub struct ToolSettings {
    /// Comma-separated tool service names.
    #[serde(default)]
    pub services: String,
    /// Base URL under which each service name is resolved.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Present the upstream credential to tool services as a bearer token.
    #[serde(default = "default_true")]
    pub bearer_auth: bool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            services: String::new(),
            base_url: None,
            bearer_auth: true,
        }
    }
}

impl ToolSettings {
    fn service_names(&self) -> Vec<&str> {
        self.services
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Build the process-wide tool endpoint set. Each configured name is
    /// appended to the base URL as a path segment.
    pub fn endpoints(&self, api_key: &str) -> Result<Vec<ToolEndpoint>, ConfigError> {
        let names = self.service_names();
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let base_url = self.base_url.as_deref().ok_or_else(|| {
            ConfigError::MissingEnvVar {
                env_var: to_env_var("tools.base_url"),
            }
        })?;
        let base_url = base_url.trim_end_matches('/');

        names
            .into_iter()
            .map(|name| {
                let url = Url::parse(&format!("{base_url}/{name}")).map_err(|source| {
                    ConfigError::InvalidToolUrl {
                        name: name.to_string(),
                        source,
                    }
                })?;
                let endpoint = ToolEndpoint::new(name, url);
                Ok(if self.bearer_auth {
                    endpoint.with_bearer(api_key)
                } else {
                    endpoint
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub tools: ToolSettings,
    #[serde(default = "default_delivery")]
    pub delivery: DeliveryMode,
    #[serde(default)]
    pub log_upstream: bool,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("upstream.host", default_upstream_host())?
            .set_default("upstream.model", default_model())?
            .add_source(
                Environment::with_prefix("SWITCHBOARD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        // Surface missing required fields as the env var the user has to set
        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches("`");
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_upstream_host() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_delivery() -> DeliveryMode {
    DeliveryMode::Sse
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use switchboard::models::ToolAuth;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("SWITCHBOARD_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();
        env::set_var("SWITCHBOARD_UPSTREAM__API_KEY", "test-key");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.static_dir, "public");
        assert_eq!(settings.upstream.host, "https://api.openai.com");
        assert_eq!(settings.upstream.api_key, "test-key");
        assert_eq!(settings.upstream.model, "gpt-4o");
        assert_eq!(settings.delivery, DeliveryMode::Sse);
        assert!(!settings.log_upstream);
        assert!(settings.tools.endpoints("test-key").unwrap().is_empty());

        env::remove_var("SWITCHBOARD_UPSTREAM__API_KEY");
    }

    #[test]
    #[serial]
    fn test_missing_api_key() {
        clean_env();

        let err = Settings::new().unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar { .. }));
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("SWITCHBOARD_UPSTREAM__API_KEY", "test-key");
        env::set_var("SWITCHBOARD_UPSTREAM__HOST", "https://gateway.internal");
        env::set_var("SWITCHBOARD_UPSTREAM__MODEL", "gpt-4o-mini");
        env::set_var("SWITCHBOARD_SERVER__PORT", "8080");
        env::set_var("SWITCHBOARD_DELIVERY", "buffered");
        env::set_var("SWITCHBOARD_LOG_UPSTREAM", "true");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.upstream.host, "https://gateway.internal");
        assert_eq!(settings.upstream.model, "gpt-4o-mini");
        assert_eq!(settings.delivery, DeliveryMode::Buffered);
        assert!(settings.log_upstream);

        env::remove_var("SWITCHBOARD_UPSTREAM__API_KEY");
        env::remove_var("SWITCHBOARD_UPSTREAM__HOST");
        env::remove_var("SWITCHBOARD_UPSTREAM__MODEL");
        env::remove_var("SWITCHBOARD_SERVER__PORT");
        env::remove_var("SWITCHBOARD_DELIVERY");
        env::remove_var("SWITCHBOARD_LOG_UPSTREAM");
    }

    #[test]
    fn test_tool_endpoints_from_names() {
        let tools = ToolSettings {
            services: " weather, docs ,,".to_string(),
            base_url: Some("https://tools.internal/".to_string()),
            bearer_auth: true,
        };

        let endpoints = tools.endpoints("secret").unwrap();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].name, "weather");
        assert_eq!(endpoints[0].url.as_str(), "https://tools.internal/weather");
        assert_eq!(
            endpoints[0].auth,
            Some(ToolAuth::Bearer {
                token: "secret".to_string()
            })
        );
        assert_eq!(endpoints[1].name, "docs");
    }

    #[test]
    fn test_tool_endpoints_without_auth() {
        let tools = ToolSettings {
            services: "search".to_string(),
            base_url: Some("https://tools.internal".to_string()),
            bearer_auth: false,
        };

        let endpoints = tools.endpoints("secret").unwrap();
        assert!(endpoints[0].auth.is_none());
    }

    #[test]
    fn test_tool_names_require_base_url() {
        let tools = ToolSettings {
            services: "weather".to_string(),
            base_url: None,
            bearer_auth: true,
        };

        let err = tools.endpoints("secret").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar { env_var } if env_var == "SWITCHBOARD_TOOLS__BASE_URL"));
    }

    #[test]
    fn test_socket_addr_conversion() {
        let server_settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: "public".to_string(),
        };
        let addr = server_settings.socket_addr();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }
}
