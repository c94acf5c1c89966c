use super::*;

use std::{collections::HashMap, io::Write};

#[test]
fn normalizes_bare_host_and_trailing_slash() {
    assert_eq!(
        normalize_server_url(" localhost:5000/ ").expect("normalize"),
        "http://localhost:5000"
    );
    assert_eq!(
        normalize_server_url("https://docs.example.com/").expect("normalize"),
        "https://docs.example.com"
    );
    assert_eq!(
        normalize_server_url("").expect("normalize"),
        ClientSettings::default().server_url
    );
}

#[test]
fn rejects_non_http_scheme() {
    let err = normalize_server_url("ftp://files.example.com").expect_err("ftp rejected");
    assert!(err.to_string().contains("unsupported scheme"));
}

#[test]
fn file_settings_override_defaults() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        "server_url = \"http://10.0.0.5:8080/\"\nrequest_timeout_secs = 30"
    )
    .expect("write settings");

    let settings = load_settings(Some(file.path())).expect("load settings");
    assert_eq!(settings.server_url, "http://10.0.0.5:8080");
    assert_eq!(settings.request_timeout_secs, 30);
    assert_eq!(settings.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
}

#[test]
fn missing_settings_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = load_settings(Some(&dir.path().join("absent.toml"))).expect("load settings");
    assert_eq!(settings.request_timeout_secs, 120);
}

#[test]
fn malformed_settings_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "request_timeout_secs = \"soon\"").expect("write settings");

    let err = load_settings(Some(file.path())).expect_err("malformed settings");
    assert!(err.to_string().contains("invalid settings file"));
}

#[test]
fn env_overrides_take_precedence_and_skip_garbage() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("DOCCHAT_SERVER_URL", "http://ignored:1"),
        ("APP__SERVER_URL", "http://preferred:2"),
        ("DOCCHAT_REQUEST_TIMEOUT_SECS", "not-a-number"),
        ("DOCCHAT_MAX_UPLOAD_BYTES", "1024"),
    ]);
    let mut settings = ClientSettings::default();
    apply_env_overrides(&mut settings, |name| env.get(name).map(|v| v.to_string()));

    assert_eq!(settings.server_url, "http://preferred:2");
    assert_eq!(settings.request_timeout_secs, 120);
    assert_eq!(settings.max_upload_bytes, 1024);
}

#[test]
fn zero_timeout_in_settings_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "request_timeout_secs = 0").expect("write settings");

    let err = load_settings(Some(file.path())).expect_err("zero timeout");
    assert!(err.to_string().contains("request_timeout_secs must be at least 1 second"));
}

#[test]
fn validate_rejects_zero_timeout_override() {
    let mut settings = ClientSettings::default();
    assert!(settings.validate().is_ok());

    settings.request_timeout_secs = 0;
    let err = settings.validate().expect_err("zero timeout");
    assert!(err.to_string().contains("at least 1 second"));
}
