use std::env;

use pretty_assertions::assert_eq;
use serial_test::serial;
use shahin_gestao::config::Config;

mod common;

#[test]
#[serial]
fn test_config_from_env_with_defaults() {
    common::clear_config_env();

    let config = Config::from_env_only().unwrap();

    assert_eq!(
        config.database_url,
        "postgres://@localhost:5432/shahin_gestao"
    );
    assert_eq!(config.jwt_secret, "change-this-jwt-secret-before-deploying");
    assert_eq!(config.jwt_expiration_days, 30);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert_eq!(config.environment, "development");
    assert_eq!(config.utc_offset_hours, -3);
}

#[test]
#[serial]
fn test_config_from_env_with_custom_values() {
    common::clear_config_env();

    unsafe {
        env::set_var("DATABASE_URL", "postgres://test@db:5432/shahin_test");
        env::set_var("JWT_SECRET", "test-secret");
        env::set_var("JWT_EXPIRATION_DAYS", "7");
        env::set_var("HOST", "0.0.0.0");
        env::set_var("PORT", "3000");
        env::set_var("ENVIRONMENT", "production");
        env::set_var("UTC_OFFSET_HOURS", "0");
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.database_url, "postgres://test@db:5432/shahin_test");
    assert_eq!(config.jwt_secret, "test-secret");
    assert_eq!(config.jwt_expiration_days, 7);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 3000);
    assert_eq!(config.environment, "production");
    assert_eq!(config.utc_offset_hours, 0);

    common::clear_config_env();
}

#[test]
#[serial]
fn test_config_environment_detection() {
    let mut config = common::test_config();

    config.environment = "production".to_string();
    assert!(config.is_production());
    assert!(!config.is_development());

    config.environment = "development".to_string();
    assert!(!config.is_production());
    assert!(config.is_development());
}

#[test]
#[serial]
fn test_server_address_formatting() {
    let mut config = common::test_config();
    config.host = "192.168.1.1".to_string();
    config.port = 9000;

    assert_eq!(config.server_address(), "192.168.1.1:9000");
}

#[test]
#[serial]
fn test_config_invalid_port_falls_back() {
    common::clear_config_env();
    unsafe {
        env::set_var("PORT", "invalid_port");
    }

    let config = Config::from_env_only().unwrap();
    assert_eq!(config.port, 8080);

    common::clear_config_env();
}

#[test]
#[serial]
fn test_config_invalid_offset_falls_back() {
    common::clear_config_env();
    unsafe {
        env::set_var("UTC_OFFSET_HOURS", "brasilia");
    }

    let config = Config::from_env_only().unwrap();
    assert_eq!(config.utc_offset_hours, -3);

    common::clear_config_env();
}
