use std::path::Path;

use serde::Deserialize;

/// Secret shipped in `config/default.toml`. Only meant for local development.
pub const DEV_JWT_SECRET: &str = "brainvault-development-secret-change-me";

/// Environment variables understood by older deployments, mapped onto config keys.
/// The prefixed variable wins when both are set.
const LEGACY_ENV: [(&str, &str, &str); 2] = [
    ("DB_CONNECTION_URL", "database.url", "BRAINVAULT__DATABASE__URL"),
    ("JWT_SECRET_KEY", "auth.jwt_secret", "BRAINVAULT__AUTH__JWT_SECRET"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued tokens. `None` issues tokens without an `exp` claim.
    pub token_ttl_minutes: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CorsConfig {
    pub allowed_origin: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareConfig {
    /// Prefix the share hash is appended to when building a public link.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_seconds: u64,
    /// Per-IP budget for signup and signin, per minute.
    pub auth_max_requests: usize,
    /// Read the client IP from `X-Forwarded-For` / `X-Real-IP`. Enable only behind
    /// a reverse proxy that sets them; clients can forge them otherwise.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    pub enable_hsts: Option<bool>,
    pub hsts_max_age: Option<u64>,
    pub hsts_include_subdomains: Option<bool>,
    pub csp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    pub share: ShareConfig,
    pub rate_limit: RateLimitConfig,
    pub security: Option<SecurityConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        let defaults: &str = include_str!("../config/default.toml");
        match ::config::Config::builder()
            .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
        // Optional local file: brainvault.toml (in CWD)
        .add_source(::config::File::with_name("brainvault").required(false));

    if let Ok(custom_path) = std::env::var("BRAINVAULT_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(::config::Environment::with_prefix("BRAINVAULT").separator("__"));

    for (legacy, key, prefixed) in LEGACY_ENV {
        if std::env::var(prefixed).is_ok() {
            continue;
        }
        if let Ok(value) = std::env::var(legacy) {
            builder = builder.set_override(key, value)?;
        }
    }

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub(crate) fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    // Server
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    if cfg.database.url.trim().is_empty() {
        return Err(anyhow::anyhow!("database.url must not be empty"));
    }

    // Auth
    check_jwt_secret(&cfg.auth.jwt_secret, cfg!(debug_assertions))?;
    if let Some(ttl) = cfg.auth.token_ttl_minutes {
        if ttl <= 0 {
            return Err(anyhow::anyhow!("auth.token_ttl_minutes must be > 0 when set"));
        }
    }

    if cfg.share.base_url.trim().is_empty() {
        return Err(anyhow::anyhow!("share.base_url must not be empty"));
    }

    // Rate limiting
    if cfg.rate_limit.max_requests == 0 {
        return Err(anyhow::anyhow!("rate_limit.max_requests must be > 0"));
    }
    if cfg.rate_limit.window_seconds == 0 {
        return Err(anyhow::anyhow!("rate_limit.window_seconds must be > 0"));
    }
    if cfg.rate_limit.auth_max_requests == 0 {
        return Err(anyhow::anyhow!("rate_limit.auth_max_requests must be > 0"));
    }

    Ok(())
}

/// The development secret is public, so release builds refuse to start with it.
pub(crate) fn check_jwt_secret(secret: &str, allow_dev_secret: bool) -> anyhow::Result<()> {
    if secret.trim().is_empty() {
        return Err(anyhow::anyhow!("auth.jwt_secret must not be empty"));
    }
    if secret == DEV_JWT_SECRET {
        if !allow_dev_secret {
            return Err(anyhow::anyhow!(
                "auth.jwt_secret is the built-in development secret; set JWT_SECRET_KEY or BRAINVAULT__AUTH__JWT_SECRET"
            ));
        }
        tracing::warn!("auth.jwt_secret is the built-in development secret; set JWT_SECRET_KEY for production");
    }
    Ok(())
}

pub fn ensure_sqlite_parent_dir(url: &str) -> anyhow::Result<()> {
    if let Some(path) = url.strip_prefix("sqlite://") {
        let path = path.split('?').next().unwrap_or(path);
        let p = Path::new(path);
        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}
