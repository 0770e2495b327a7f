use std::env;

use shahin_gestao::config::Config;

/// A config literal for tests that never touches the environment.
#[allow(dead_code)]
pub fn test_config() -> Config {
    Config {
        database_url: "postgres://@localhost:5432/shahin_gestao_test".to_string(),
        jwt_secret: "test-jwt-secret-key-that-is-long-enough".to_string(),
        jwt_expiration_days: 1,
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        utc_offset_hours: -3,
    }
}

/// Clear the env vars the config reads so defaults are observable.
#[allow(dead_code)]
pub fn clear_config_env() {
    for key in [
        "DATABASE_URL",
        "JWT_SECRET",
        "JWT_EXPIRATION_DAYS",
        "HOST",
        "PORT",
        "ENVIRONMENT",
        "UTC_OFFSET_HOURS",
    ] {
        unsafe {
            env::remove_var(key);
        }
    }
}
