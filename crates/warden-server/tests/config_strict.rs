#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use warden_server::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:50051"
  notify_qeue: 8 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:50051");
    assert_eq!(cfg.server.notify_queue, 1024);
    assert_eq!(cfg.server.max_body_bytes, 1024 * 1024);
}

#[test]
fn rejects_unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert!(err.to_string().contains("version"));
}

#[test]
fn rejects_out_of_range_values() {
    let zero_queue = "version: 1\nserver:\n  notify_queue: 0\n";
    assert!(config::load_from_str(zero_queue).is_err());

    let tiny_body = "version: 1\nserver:\n  max_body_bytes: 10\n";
    assert!(config::load_from_str(tiny_body).is_err());

    let bad_listen = "version: 1\nserver:\n  listen: \"not an address\"\n";
    assert!(config::load_from_str(bad_listen).is_err());
}

#[test]
fn load_from_file_reads_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warden.yaml");
    std::fs::write(&path, "version: 1\nserver:\n  listen: \"127.0.0.1:9000\"\n").unwrap();

    let cfg = config::load(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(cfg.server.listen, "127.0.0.1:9000");

    let missing = dir.path().join("absent.yaml");
    let err = config::load(Some(missing.to_str().unwrap())).expect_err("explicit path must exist");
    assert_eq!(err.client_code().as_str(), "INTERNAL");
}
