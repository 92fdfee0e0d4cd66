use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 每个集合保存为 `<data_dir>/<key>.json`
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

/// 业务参数，金额均以 kobo 计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_welcome_bonus")]
    pub welcome_bonus: i64,
    #[serde(default = "default_country_code")]
    pub phone_country_code: String,
    #[serde(default)]
    pub admin_phones: Vec<String>,
    #[serde(default = "default_min_withdrawal")]
    pub min_withdrawal: i64,
    #[serde(default = "default_accrual_interval")]
    pub accrual_interval_secs: u64,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_welcome_bonus() -> i64 {
    100_000 // ₦1,000
}

fn default_country_code() -> String {
    "+234".to_string()
}

fn default_min_withdrawal() -> i64 {
    100_000 // ₦1,000
}

fn default_accrual_interval() -> u64 {
    60
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            welcome_bonus: default_welcome_bonus(),
            phone_country_code: default_country_code(),
            admin_phones: Vec::new(),
            min_withdrawal: default_min_withdrawal(),
            accrual_interval_secs: default_accrual_interval(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)
                .with_context(|| format!("Failed to parse config file {config_path}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env_defaults(),
            Err(e) => {
                return Err(anyhow!("Failed to read config file {config_path}: {e}"));
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();
        Ok(config)
    }

    fn from_env_defaults() -> Self {
        fn get_env(name: &str) -> Option<String> {
            env::var(name).ok()
        }
        fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
            env::var(name)
                .ok()
                .and_then(|v| v.parse::<T>().ok())
                .unwrap_or(default)
        }

        Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
            },
            storage: StorageConfig {
                data_dir: get_env("DATA_DIR").unwrap_or_else(|| "./data".to_string()),
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET")
                    .unwrap_or_else(|| "change-me-in-production".to_string()),
                access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                refresh_token_expires_in: get_env_parse("JWT_REFRESH_EXPIRES_IN", 2_592_000i64),
            },
            platform: PlatformConfig::default(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATA_DIR") {
            self.storage.data_dir = v;
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
        if let Ok(v) = env::var("WELCOME_BONUS")
            && let Ok(n) = v.parse()
        {
            self.platform.welcome_bonus = n;
        }
        if let Ok(v) = env::var("PHONE_COUNTRY_CODE") {
            self.platform.phone_country_code = v;
        }
        // 逗号分隔
        if let Ok(v) = env::var("ADMIN_PHONES") {
            self.platform.admin_phones = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("MIN_WITHDRAWAL")
            && let Ok(n) = v.parse()
        {
            self.platform.min_withdrawal = n;
        }
        if let Ok(v) = env::var("ACCRUAL_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            self.platform.accrual_interval_secs = n;
        }
        if let Ok(v) = env::var("PUBLIC_BASE_URL") {
            self.platform.public_base_url = v;
        }
    }
}
