use super::{load_config, load_config_file, parse_basic_auth, parse_duration_value, parse_header};
use super::types::{DEFAULT_TIMEOUT, HttpMethod, RunConfig};
use crate::error::{AppError, AppResult, ConfigError};
use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::{TempDir, tempdir};

fn write_config(name: &str, content: &str) -> AppResult<(TempDir, PathBuf)> {
    let dir = tempdir()?;
    let path = dir.path().join(name);
    std::fs::write(&path, content)?;
    Ok((dir, path))
}

#[test]
fn parse_toml_config() -> AppResult<()> {
    let content = r#"
url = "http://localhost:3000/api"
method = "post"
headers = ["Content-Type: text/html", "X-Some: value"]
body = "payload"
basic_auth = "username:password"
requests = 20
concurrency = 2
qps = 5
timeout = "500ms"
disable_keepalive = true
read_all = true
"#;
    let (_dir, path) = write_config("volley.toml", content)?;

    let config = load_config_file(&path)?;
    if config.method != Some(HttpMethod::Post) {
        return Err(AppError::config("Unexpected method"));
    }

    let template = config.request_template()?;
    if template.method() != Method::POST {
        return Err(AppError::config("Template method mismatch"));
    }
    if template.url().as_str() != "http://localhost:3000/api" {
        return Err(AppError::config(template.url().to_string()));
    }
    let some = template.headers().get("x-some").map(|value| value.as_bytes());
    if some != Some(b"value".as_slice()) {
        return Err(AppError::config("Missing X-Some header"));
    }
    if template.headers().get(AUTHORIZATION).is_none() {
        return Err(AppError::config("Missing Authorization header"));
    }

    let options = config.run_options();
    if options.requests != 20 || options.concurrency != 2 || options.qps != 5 || !options.read_all
    {
        return Err(AppError::config(format!("{:?}", options)));
    }

    let transport = config.transport_options()?;
    if transport.timeout != Some(Duration::from_millis(500)) || !transport.disable_keep_alives {
        return Err(AppError::config(format!("{:?}", transport)));
    }
    Ok(())
}

#[test]
fn parse_json_config_with_aliases_and_defaults() -> AppResult<()> {
    let content = r#"{ "url": "http://localhost:3000", "n": 7, "c": 3, "timeout": 2 }"#;
    let (_dir, path) = write_config("volley.json", content)?;

    let config = load_config_file(&path)?;
    let options = config.run_options();
    if options.requests != 7 || options.concurrency != 3 || options.qps != 0 {
        return Err(AppError::config(format!("{:?}", options)));
    }
    if config.request_template()?.method() != Method::GET {
        return Err(AppError::config("Expected GET by default"));
    }
    let transport = config.transport_options()?;
    if transport.timeout != Some(Duration::from_secs(2)) || transport.allow_insecure {
        return Err(AppError::config(format!("{:?}", transport)));
    }
    Ok(())
}

#[test]
fn defaults_apply_to_empty_config() -> AppResult<()> {
    let config = RunConfig::default();
    let options = config.run_options();
    if options.requests != 200 || options.concurrency != 50 {
        return Err(AppError::config(format!("{:?}", options)));
    }
    if config.transport_options()?.timeout != Some(DEFAULT_TIMEOUT) {
        return Err(AppError::config("Expected default timeout"));
    }
    match config.request_template() {
        Err(AppError::Config(ConfigError::MissingUrl)) => Ok(()),
        Err(err) => Err(AppError::config(err.to_string())),
        Ok(_) => Err(AppError::config("Expected missing URL error")),
    }
}

#[test]
fn zero_timeout_disables_connect_timeout() -> AppResult<()> {
    let config = RunConfig {
        timeout: Some(super::DurationValue::Seconds(0)),
        ..RunConfig::default()
    };
    if config.transport_options()?.timeout.is_some() {
        return Err(AppError::config("Expected no timeout"));
    }
    Ok(())
}

#[test]
fn unsupported_extension_is_rejected() -> AppResult<()> {
    let (_dir, path) = write_config("volley.yaml", "url: http://localhost")?;
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "yaml" => Ok(()),
        Err(err) => Err(AppError::config(err.to_string())),
        Ok(_) => Err(AppError::config("Expected unsupported extension")),
    }
}

#[test]
fn explicit_missing_path_is_an_error() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("absent.toml");
    let path_str = path.to_string_lossy().into_owned();
    if load_config(Some(&path_str)).is_ok() {
        return Err(AppError::config("Expected read error"));
    }
    Ok(())
}

#[test]
fn malformed_header_is_rejected() -> AppResult<()> {
    let config = RunConfig {
        url: Some("http://localhost".to_owned()),
        headers: Some(vec!["no-colon".to_owned()]),
        ..RunConfig::default()
    };
    if config.request_template().is_ok() {
        return Err(AppError::config("Expected header error"));
    }
    Ok(())
}

#[test]
fn header_and_basic_auth_parsing() -> AppResult<()> {
    let (name, value) = parse_header("X-Trace :  abc:def ")?;
    if name != "X-Trace" || value != "abc:def" {
        return Err(AppError::config(format!("{}={}", name, value)));
    }
    let (username, password) = parse_basic_auth("user:pa:ss")?;
    if username != "user" || password != "pa:ss" {
        return Err(AppError::config(format!("{}:{}", username, password)));
    }
    if parse_basic_auth(":secret").is_ok() || parse_basic_auth("nocolon").is_ok() {
        return Err(AppError::config("Expected invalid basic auth"));
    }
    Ok(())
}

#[test]
fn parse_duration_units() -> AppResult<()> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("3", Duration::from_secs(3)),
        ("2s", Duration::from_secs(2)),
        ("1m", Duration::from_secs(60)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration_value(input).map_err(AppError::config)?;
        if parsed != expected {
            return Err(AppError::config(format!("{} parsed as {:?}", input, parsed)));
        }
    }
    if parse_duration_value("5x").is_ok() || parse_duration_value("ms").is_ok() {
        return Err(AppError::config("Expected invalid durations to fail"));
    }
    Ok(())
}
