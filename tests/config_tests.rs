use std::io::Write;

use ledgerline::error::{ConfigError, Error};
use ledgerline::infrastructure::config::Config;
use rust_decimal_macros::dec;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn full_config_file_loads() {
    let file = write_temp_config(
        r#"
[gateway]
base_url = "https://api.exchange.test"
timeout_ms = 10000
max_retries = 2
base_delay_ms = 500
max_backoff_ms = 4000
max_jitter_ms = 250

[cache]
capacity = 50

[portfolio]
quote = "USD"
dust_threshold = "1"
branch_timeout_ms = 5000

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.gateway.base_url, "https://api.exchange.test");
    assert_eq!(config.gateway.max_retries, 2);
    assert_eq!(config.gateway.max_jitter_ms, 250);
    assert_eq!(config.cache.capacity, 50);
    assert_eq!(config.portfolio.quote, "USD");
    assert_eq!(config.portfolio.dust_threshold, dec!(1));
    assert_eq!(config.portfolio.branch_timeout_ms, 5000);
    assert_eq!(config.logging.format, "json");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.gateway.timeout_ms, 30_000);
    assert_eq!(config.portfolio.quote, "EUR");
}

#[test]
fn missing_file_is_an_error_for_load() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_temp_config("[gateway\nbase_url = ");
    let result = Config::load(file.path());
    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

#[test]
fn backoff_ceiling_below_base_delay_is_rejected() {
    let file = write_temp_config("[gateway]\nbase_delay_ms = 2000\nmax_backoff_ms = 1000\n");

    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "max_backoff_ms",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid max_backoff_ms error, got {err}"),
        Ok(_) => panic!("Expected invalid max_backoff_ms error, got Ok"),
    }
}

#[test]
fn zero_cache_capacity_is_rejected() {
    let file = write_temp_config("[cache]\ncapacity = 0\n");
    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "capacity",
            ..
        }))
    ));
}

#[test]
fn negative_dust_threshold_is_rejected() {
    let file = write_temp_config("[portfolio]\ndust_threshold = \"-0.5\"\n");
    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "dust_threshold",
            ..
        }))
    ));
}
