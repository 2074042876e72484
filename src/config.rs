use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Empty token disables chat delivery; in-app notifications are still written.
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_telegram_api")]
    pub api_base_url: String,
    /// Shared operator group chat, notified alongside on-shift operators.
    #[serde(default)]
    pub operator_chat_id: Option<i64>,
    /// Upper bound for one Bot API call, in seconds.
    #[serde(default = "default_telegram_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base_url: default_telegram_api(),
            operator_chat_id: None,
            request_timeout_secs: default_telegram_timeout(),
        }
    }
}

fn default_telegram_timeout() -> u64 {
    10
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Read notifications kept per employee; older ones are pruned on poll.
    #[serde(default = "default_retain_per_employee")]
    pub retain_per_employee: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            retain_per_employee: default_retain_per_employee(),
        }
    }
}

fn default_retain_per_employee() -> u64 {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdminConfig {
    pub username: String,
    pub password: String,
    #[serde(default = "default_admin_name")]
    pub full_name: String,
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)
                .with_context(|| format!("Failed to parse config file {config_path}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // no file: build from environment variables and defaults
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL").ok_or_else(|| {
                    anyhow!("DATABASE_URL is not set and no config file was found at {config_path}")
                })?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 43_200i64),
                        refresh_token_expires_in: get_env_parse(
                            "JWT_REFRESH_EXPIRES_IN",
                            2_592_000i64,
                        ),
                    },
                    telegram: TelegramConfig::default(),
                    notifications: NotificationConfig::default(),
                    bootstrap_admin: None,
                }
            }
            Err(e) => {
                return Err(anyhow!("Cannot read config file {config_path}: {e}"));
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment variables override values from the file.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.refresh_token_expires_in = n;
        }

        // Telegram
        if let Ok(v) = env::var("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = v;
        }
        if let Ok(v) = env::var("TELEGRAM_API_BASE_URL") {
            self.telegram.api_base_url = v;
        }
        if let Ok(v) = env::var("TELEGRAM_OPERATOR_CHAT_ID")
            && let Ok(id) = v.parse()
        {
            self.telegram.operator_chat_id = Some(id);
        }
        if let Ok(v) = env::var("TELEGRAM_TIMEOUT_SECS")
            && let Ok(n) = v.parse()
        {
            self.telegram.request_timeout_secs = n;
        }

        if let Ok(v) = env::var("NOTIFICATIONS_RETAIN_PER_EMPLOYEE")
            && let Ok(n) = v.parse()
        {
            self.notifications.retain_per_employee = n;
        }

        if let (Ok(username), Ok(password)) = (
            env::var("BOOTSTRAP_ADMIN_USERNAME"),
            env::var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            self.bootstrap_admin = Some(BootstrapAdminConfig {
                username,
                password,
                full_name: env::var("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|_| default_admin_name()),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/bistro"
            max_connections = 5

            [jwt]
            secret = "s"
            access_token_expires_in = 60
            refresh_token_expires_in = 120
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.telegram.api_base_url, "https://api.telegram.org");
        assert!(config.telegram.bot_token.is_empty());
        assert_eq!(config.telegram.request_timeout_secs, 10);
        assert_eq!(config.notifications.retain_per_employee, 50);
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn test_parse_telegram_section() {
        let raw = r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            url = "postgres://localhost/bistro"
            max_connections = 10

            [jwt]
            secret = "s"
            access_token_expires_in = 60
            refresh_token_expires_in = 120

            [telegram]
            bot_token = "123:abc"
            operator_chat_id = -100200300

            [bootstrap_admin]
            username = "root"
            password = "secret"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.telegram.operator_chat_id, Some(-100200300));
        let admin = config.bootstrap_admin.unwrap();
        assert_eq!(admin.full_name, "Administrator");
    }
}
