#[cfg(test)]
mod tests {
    use crate::config::{self, AppConfig, DEV_JWT_SECRET};
    use std::env;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::{Builder, TempDir};

    // load() reads process-wide env vars; tests touching them take this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const TOUCHED_VARS: [&str; 7] = [
        "BRAINVAULT__SERVER__PORT",
        "BRAINVAULT__SERVER__HOST",
        "BRAINVAULT__AUTH__JWT_SECRET",
        "BRAINVAULT__RATE_LIMIT__MAX_REQUESTS",
        "BRAINVAULT_CONFIG",
        "JWT_SECRET_KEY",
        "DB_CONNECTION_URL",
    ];

    fn clear_env() {
        for var in TOUCHED_VARS {
            env::remove_var(var);
        }
    }

    /// Defaults with a non-development secret, valid in every build profile.
    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "test-secret".to_string();
        config
    }

    fn with_env<F: FnOnce()>(f: F) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        f();
        clear_env();
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite://data/brainvault.db");
        assert_eq!(config.auth.jwt_secret, DEV_JWT_SECRET);
        assert!(config.auth.token_ttl_minutes.is_none());
        assert!(config.cors.allowed_origin.is_none());
        assert_eq!(config.share.base_url, "http://localhost:5173/brain/");
        assert_eq!(config.rate_limit.max_requests, 1000);
        assert_eq!(config.rate_limit.window_seconds, 60);
        assert_eq!(config.rate_limit.auth_max_requests, 20);
        assert!(!config.rate_limit.trust_proxy_headers);
        assert_eq!(config.security.and_then(|s| s.enable_hsts), Some(false));
    }

    #[test]
    fn test_valid_config_does_not_error() {
        with_env(|| {
            env::set_var("JWT_SECRET_KEY", "test-secret");
            assert!(config::load().is_ok());
        });
    }

    #[test]
    fn test_config_from_env() {
        with_env(|| {
            env::set_var("JWT_SECRET_KEY", "test-secret");
            env::set_var("BRAINVAULT__SERVER__HOST", "127.0.0.1");
            env::set_var("BRAINVAULT__SERVER__PORT", "8081");
            env::set_var("BRAINVAULT__RATE_LIMIT__MAX_REQUESTS", "50");

            let config = config::load().unwrap();
            assert_eq!(config.server.host, "127.0.0.1");
            assert_eq!(config.server.port, 8081);
            assert_eq!(config.rate_limit.max_requests, 50);
            // Untouched keys keep their defaults
            assert_eq!(config.rate_limit.window_seconds, 60);
        });
    }

    #[test]
    fn test_invalid_server_port() {
        with_env(|| {
            env::set_var("BRAINVAULT__SERVER__PORT", "0");
            let result = config::load();
            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("invalid server.port"));
        });
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        with_env(|| {
            env::set_var("JWT_SECRET_KEY", "test-secret");
            env::set_var("BRAINVAULT__RATE_LIMIT__MAX_REQUESTS", "0");
            let err = config::load().unwrap_err();
            assert!(err.to_string().contains("rate_limit.max_requests must be > 0"));
        });
    }

    #[test]
    fn test_legacy_jwt_secret_variable() {
        with_env(|| {
            env::set_var("JWT_SECRET_KEY", "legacy-secret");
            let config = config::load().unwrap();
            assert_eq!(config.auth.jwt_secret, "legacy-secret");

            // The prefixed variable wins over the legacy one
            env::set_var("BRAINVAULT__AUTH__JWT_SECRET", "prefixed-secret");
            let config = config::load().unwrap();
            assert_eq!(config.auth.jwt_secret, "prefixed-secret");
        });
    }

    #[test]
    fn test_legacy_database_variable() {
        with_env(|| {
            env::set_var("JWT_SECRET_KEY", "test-secret");
            env::set_var("DB_CONNECTION_URL", "sqlite://legacy.db");
            let config = config::load().unwrap();
            assert_eq!(config.database.url, "sqlite://legacy.db");
        });
    }

    #[test]
    fn test_config_file_from_env_path() {
        with_env(|| {
            let file = Builder::new().suffix(".toml").tempfile().unwrap();
            fs::write(
                file.path(),
                r#"
[server]
port = 9090

[share]
base_url = "https://brain.example.com/b/"

[auth]
jwt_secret = "file-secret"
token_ttl_minutes = 60
"#,
            )
            .unwrap();
            env::set_var("BRAINVAULT_CONFIG", file.path());

            let config = config::load().unwrap();
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.share.base_url, "https://brain.example.com/b/");
            assert_eq!(config.auth.jwt_secret, "file-secret");
            assert_eq!(config.auth.token_ttl_minutes, Some(60));
        });
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = valid_config();
        config.auth.jwt_secret = "   ".to_string();
        let err = config::validate(&config).unwrap_err();
        assert!(err.to_string().contains("auth.jwt_secret"));

        let mut config = valid_config();
        config.auth.token_ttl_minutes = Some(0);
        assert!(config::validate(&config).is_err());

        let mut config = valid_config();
        config.share.base_url = String::new();
        let err = config::validate(&config).unwrap_err();
        assert!(err.to_string().contains("share.base_url"));

        let mut config = valid_config();
        config.database.url = String::new();
        assert!(config::validate(&config).is_err());

        assert!(config::validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_dev_secret_only_allowed_in_debug_builds() {
        assert!(config::check_jwt_secret(DEV_JWT_SECRET, true).is_ok());
        let err = config::check_jwt_secret(DEV_JWT_SECRET, false).unwrap_err();
        assert!(err.to_string().contains("development secret"));
        assert!(config::check_jwt_secret("a-real-secret", false).is_ok());
        assert!(config::check_jwt_secret("", true).is_err());

        // The shipped defaults carry the development secret
        assert_eq!(config::validate(&AppConfig::default()).is_ok(), cfg!(debug_assertions));
    }

    #[test]
    fn test_release_load_requires_real_secret() {
        with_env(|| {
            let result = config::load();
            assert_eq!(result.is_ok(), cfg!(debug_assertions));
            if let Err(e) = result {
                assert!(e.to_string().contains("development secret"));
            }
        });
    }

    #[test]
    fn test_ensure_sqlite_parent_dir() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("deeper").join("brain.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());

        config::ensure_sqlite_parent_dir(&url).unwrap();
        assert!(db_path.parent().unwrap().is_dir());

        // Non-file URLs are left alone
        config::ensure_sqlite_parent_dir("sqlite::memory:").unwrap();
    }
}
