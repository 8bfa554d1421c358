use super::*;
use clap::Parser;
use std::collections::HashMap;

fn args(extra: &[&str]) -> Args {
    let mut argv = vec!["phonebook", "--config", "does-not-exist.toml"];
    argv.extend_from_slice(extra);
    Args::parse_from(argv)
}

#[test]
fn file_settings_override_defaults() {
    let mut settings = Settings::default();
    apply_file_settings(
        &mut settings,
        r#"
            server_url = "http://phonebook.internal:8080"
            request_timeout_secs = 3
            validation = "remote-only"
        "#,
    )
    .expect("valid file");

    assert_eq!(settings.server_url, "http://phonebook.internal:8080");
    assert_eq!(settings.base_path, "/api/persons");
    assert_eq!(settings.request_timeout, Duration::from_secs(3));
    assert_eq!(settings.validation, ValidationPolicy::RemoteOnly);
}

#[test]
fn unknown_file_keys_and_policies_are_rejected() {
    let mut settings = Settings::default();
    assert!(apply_file_settings(&mut settings, "colour = \"red\"").is_err());
    assert!(apply_file_settings(&mut settings, "validation = \"both\"").is_err());
}

#[test]
fn env_overrides_file_and_ignores_garbage() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("PHONEBOOK_SERVER_URL", "http://env:3001"),
        ("PHONEBOOK_REQUEST_TIMEOUT_SECS", "soon"),
        ("PHONEBOOK_VALIDATION", "remote"),
    ]);
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, "server_url = \"http://file:3001\"").expect("file");
    apply_env_settings(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings.server_url, "http://env:3001");
    assert_eq!(settings.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    assert_eq!(settings.validation, ValidationPolicy::RemoteOnly);
}

#[test]
fn flags_win_over_everything() {
    let args = args(&[
        "--server-url",
        "http://flag:9000",
        "--validation",
        "local",
        "--offline",
        "--timeout-secs",
        "1",
    ]);
    let mut settings = Settings::default();
    apply_env_settings(&mut settings, |key| {
        (key == "PHONEBOOK_SERVER_URL").then(|| "http://env:3001".to_string())
    });
    apply_args(&mut settings, &args);

    assert_eq!(settings.server_url, "http://flag:9000");
    assert_eq!(settings.validation, ValidationPolicy::Local);
    assert!(settings.offline);
    assert_eq!(settings.request_timeout, Duration::from_secs(1));
}

#[test]
fn zero_timeout_is_ignored_at_every_layer() {
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, "request_timeout_secs = 4").expect("file");
    apply_file_settings(&mut settings, "request_timeout_secs = 0").expect("file");
    assert_eq!(settings.request_timeout, Duration::from_secs(4));

    apply_env_settings(&mut settings, |key| {
        (key == "PHONEBOOK_REQUEST_TIMEOUT_SECS").then(|| "0".to_string())
    });
    assert_eq!(settings.request_timeout, Duration::from_secs(4));

    apply_args(&mut settings, &args(&["--timeout-secs", "0"]));
    assert_eq!(settings.request_timeout, Duration::from_secs(4));
}

#[test]
fn missing_settings_file_is_not_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let raw = read_settings_file(&dir.path().join("phonebook.toml")).expect("read");
    assert!(raw.is_none());
}

#[test]
fn load_settings_reads_file_named_by_flag() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("phonebook.toml");
    fs::write(&path, "base_path = \"/v2/persons\"\n").expect("write");
    let path_arg = path.to_string_lossy().to_string();

    let args = Args::parse_from(["phonebook", "--config", path_arg.as_str()]);
    let settings = load_settings(&args).expect("settings");
    assert_eq!(settings.base_path, "/v2/persons");
}
