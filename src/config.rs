use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

/// Upper bound for `auth.token_hours` (ten years).
pub const MAX_TOKEN_HOURS: u64 = 24 * 365 * 10;

#[derive(Parser, Debug, Default)]
#[command(name = "agora", about = "A threaded discussion forum backend")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Secret used to sign session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub policy: PolicyConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub token_hours: u64,
    pub bcrypt_cost: u32,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PolicyConfig {
    /// Only a post's author may edit or delete it
    pub enforce_post_ownership: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_hours: 720,
            bcrypt_cost: 10,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref secret) = cli.jwt_secret {
            config.auth.jwt_secret = Some(secret.clone());
        }

        if config.auth.token_hours == 0 || config.auth.token_hours > MAX_TOKEN_HOURS {
            anyhow::bail!(
                "auth.token_hours must be between 1 and {}, got {}",
                MAX_TOKEN_HOURS,
                config.auth.token_hours
            );
        }

        // Resolve paths relative to data dir
        if config.database.path.is_none() {
            config.database.path = Some(data_dir.join("agora.db"));
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".agora")
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("agora.db"))
    }

    pub fn jwt_secret(&self) -> anyhow::Result<&str> {
        self.auth
            .jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("No token signing secret configured (set JWT_SECRET or [auth] jwt_secret)")
            })
    }
}
