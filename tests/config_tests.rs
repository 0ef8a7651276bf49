// Integration tests for configuration loading

use std::fs;
use tempfile::TempDir;

#[test]
fn test_valid_config_loads() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dbackup.yaml");

    let config_content = r#"
db1:
  type: postgresql
  socket: /var/run/postgresql
  user: backup
  password: secret
maria:
  type: mariadb
  socket: /run/mysqld/mysqld.sock
  user: root
  password: hunter2
"#;
    fs::write(&config_path, config_content).unwrap();

    let config = dbackup::config::load_config(&config_path).unwrap();
    assert_eq!(config.len(), 2);
    assert_eq!(config["db1"].engine, dbackup::Engine::Postgresql);
    assert_eq!(config["maria"].engine, dbackup::Engine::Mariadb);
    assert_eq!(config["maria"].password, "hunter2");
}

#[test]
fn test_missing_file_is_a_read_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = dbackup::config::load_config(temp_dir.path().join("absent.yaml"));
    assert!(matches!(
        result,
        Err(dbackup::config::ConfigError::Read(_))
    ));
}

#[test]
fn test_unknown_engine_type_is_a_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dbackup.yaml");

    let config_content = r#"
db1:
  type: oracle
  socket: /tmp/oracle.sock
  user: u
  password: p
"#;
    fs::write(&config_path, config_content).unwrap();

    let err = dbackup::config::load_config(&config_path).unwrap_err();
    assert!(matches!(err, dbackup::config::ConfigError::Parse(_)));
    assert!(err.to_string().contains("oracle"));
}

#[test]
fn test_structurally_invalid_config_is_a_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dbackup.yaml");

    // A list where a mapping is expected.
    fs::write(&config_path, "- just\n- a\n- list\n").unwrap();

    let err = dbackup::config::load_config(&config_path).unwrap_err();
    assert!(matches!(err, dbackup::config::ConfigError::Parse(_)));
}

#[test]
fn test_executor_load_writes_credentials_for_postgres_targets() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dbackup.yaml");
    let creds_path = temp_dir.path().join("creds");

    let config_content = format!(
        r#"
pg1:
  type: postgresql
  socket: {socket}
  user: alice
  password: one
pg2:
  type: postgresql
  socket: {socket}
  user: bob
  password: two
"#,
        socket = temp_dir.path().display()
    );
    fs::write(&config_path, config_content).unwrap();

    let config = dbackup::config::load_config(&config_path).unwrap();
    let credentials = dbackup::CredentialsFile::acquire(&creds_path).unwrap();
    let executors = dbackup::executors::load(&config, &credentials).unwrap();

    assert_eq!(executors.len(), 2);
    let written = fs::read_to_string(&creds_path).unwrap();
    let expected = format!(
        "{socket}:*:*:alice:one\n{socket}:*:*:bob:two\n",
        socket = temp_dir.path().display()
    );
    assert_eq!(written, expected);

    drop(executors);
    drop(credentials);
    assert!(!creds_path.exists());
}
