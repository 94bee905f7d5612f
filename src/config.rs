use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub log_level: String,
}

/// Immutable auth settings, injected into the account manager and
/// credential service at construction. Business logic never reads the
/// process environment directly.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    /// HMAC secret for session and reset tokens.
    pub token_secret: String,
    /// The designated administrative email; a signup with this address is
    /// provisioned through the admin path instead of normal signup.
    pub admin_email: String,
    #[serde(default = "default_reset_ttl")]
    pub reset_token_ttl_secs: i64,
    /// Echo raw reset tokens in HTTP responses. Testing/debug affordance;
    /// keep off in production deployments.
    #[serde(default)]
    pub expose_reset_tokens: bool,
}

fn default_reset_ttl() -> i64 {
    3600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 8080,
                log_level: "info".to_string(),
            },
            auth: AuthConfig {
                token_secret: "change-me".to_string(),
                admin_email: "admin@inkpress.local".to_string(),
                reset_token_ttl_secs: 3600,
                expose_reset_tokens: false,
            },
        }
    }
}

impl AppConfig {
    pub fn load_or_default(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            match std::fs::read_to_string(path) {
                Ok(s) => match toml::from_str(&s) {
                    Ok(c) => {
                        println!("Config loaded from {}", path);
                        c
                    }
                    Err(e) => {
                        eprintln!("Error parsing config: {}. Using Defaults.", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    eprintln!("Error reading config: {}. Using Defaults.", e);
                    Self::default()
                }
            }
        } else {
            println!("Config file not found at '{}'. Creating default.", path);
            let config = Self::default();
            if let Ok(s) = toml::to_string_pretty(&config) {
                let _ = std::fs::write(path, s);
            }
            config
        }
    }
}
