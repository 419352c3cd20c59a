use drive_relay_auth::AuthConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub drive: DriveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Externally visible base URL, e.g. `https://relay.example.com`.
    /// Selects the OAuth redirect URI and whether cookies are secure.
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Base URL of the Google APIs host serving `drive/v3`
    #[serde(default = "default_drive_api_base")]
    pub api_base: String,
    /// Timeout for resource-creation calls
    #[serde(default = "default_drive_timeout")]
    pub timeout_seconds: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3333
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_drive_api_base() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_drive_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base: default_drive_api_base(),
            timeout_seconds: default_drive_timeout(),
        }
    }
}

impl ServerConfig {
    /// Public base URL, falling back to the local listener
    pub fn public_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.port))
    }
}

impl Config {
    /// Layered load: optional `server_config` file, `DRIVE_RELAY__*`
    /// variables, then the well-known deployment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("server_config").required(false))
            .add_source(config::Environment::with_prefix("DRIVE_RELAY").separator("__"))
            .set_override_option("server.port", env_var("PORT"))?
            .set_override_option("server.public_url", env_var("PUBLIC_URL"))?
            .set_override_option("auth.oauth.client_id", env_var("GOOGLE_OAUTH_CLIENT_ID"))?
            .set_override_option("auth.oauth.client_secret", env_var("GOOGLE_OAUTH_CLIENT_SECRET"))?
            .set_override_option("auth.session.secret", env_var("SESSION_SECRET"))?
            .build()?;

        config.try_deserialize()
    }

    /// Auth settings with the deployment's public URL applied
    pub fn resolved_auth(&self) -> AuthConfig {
        self.auth.clone().with_public_url(&self.server.public_url())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3333);
        assert_eq!(config.server.public_url(), "http://localhost:3333");
        assert_eq!(config.drive.timeout_seconds, 30);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_resolved_auth_uses_public_url() {
        let mut config = Config::default();
        config.server.public_url = Some("https://relay.example.com".to_string());
        let auth = config.resolved_auth();
        assert_eq!(
            auth.oauth.redirect_url.as_deref(),
            Some("https://relay.example.com/oauth2callback")
        );
        assert!(auth.session.secure);
    }

    #[test]
    fn test_toml_sections_deserialize() {
        let toml = r#"
            [server]
            port = 8080

            [auth.oauth]
            client_id = "abc"
            client_secret = "xyz"

            [drive]
            api_base = "http://127.0.0.1:9999"
        "#;
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.oauth.client_id.as_deref(), Some("abc"));
        assert_eq!(config.drive.api_base, "http://127.0.0.1:9999");
        assert_eq!(config.drive.timeout_seconds, 30);
    }
}
