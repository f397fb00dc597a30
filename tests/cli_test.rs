//! CLI configuration precedence tests.

use std::io::Write;
use std::time::Duration;
use vitals_lib::cli::Cli;

fn bare_cli() -> Cli {
    Cli {
        port: None,
        bind: None,
        capacity: None,
        retention_secs: None,
        sample_rate: None,
        admin_token: None,
        config: None,
        debug: false,
        check_config: false,
    }
}

#[tokio::test]
async fn test_defaults_without_config_file() {
    // An absent fallback path, so the ambient user config is never read
    let dir = tempfile::tempdir().unwrap();
    let absent = dir.path().join("config.yaml");

    let config = bare_cli().load_config_from(Some(absent)).await.unwrap();
    assert_eq!(config.server.port, 4630);
    assert_eq!(config.store.capacity, 10_000);
}

#[tokio::test]
async fn test_default_path_loaded_when_present() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "server:\n  port: 6161\n").unwrap();

    let config = bare_cli().load_config_from(Some(path)).await.unwrap();
    assert_eq!(config.server.port, 6161);
}

#[tokio::test]
async fn test_config_file_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "server:\n  port: 7777\nstore:\n  capacity: 321\n  retention: 2h\n"
    )
    .unwrap();

    let mut cli = bare_cli();
    cli.config = Some(file.path().to_path_buf());

    let config = cli.load_config().await.unwrap();
    assert_eq!(config.server.port, 7777);
    assert_eq!(config.store.capacity, 321);
    assert_eq!(config.store.retention, Duration::from_secs(7200));
}

#[tokio::test]
async fn test_cli_args_override_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "server:\n  port: 7777\nsampling:\n  rate: 0.9\n").unwrap();

    let mut cli = bare_cli();
    cli.config = Some(file.path().to_path_buf());
    cli.port = Some(8888);
    cli.sample_rate = Some(0.1);

    let config = cli.load_config().await.unwrap();
    // CLI wins over file
    assert_eq!(config.server.port, 8888);
    assert_eq!(config.sampling.rate, 0.1);
}

#[tokio::test]
async fn test_missing_explicit_config_file_is_an_error() {
    let mut cli = bare_cli();
    cli.config = Some("/definitely/not/here.yaml".into());
    assert!(cli.load_config().await.is_err());
}

#[tokio::test]
async fn test_invalid_config_file_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "store:\n  capacity: 0\n").unwrap();

    let mut cli = bare_cli();
    cli.config = Some(file.path().to_path_buf());
    assert!(cli.load_config().await.is_err());
}
