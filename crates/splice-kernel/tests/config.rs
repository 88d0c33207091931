//! Loading configuration files

use pretty_assertions::assert_eq;
use splice_kernel::{KernelConfig, KernelError, TargetConfig};
use std::io::Write;

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "default_target: node\nshutdown_grace_ms: 50\ntargets:\n  node:\n    command: [node, driver.js]"
    )
    .unwrap();

    let config = KernelConfig::load(file.path()).unwrap();
    assert_eq!(config.default_target, "node");
    assert_eq!(config.shutdown_grace_ms, 50);
    assert_eq!(config.target("node").unwrap(), &TargetConfig::new(["node", "driver.js"]));
    assert!(config.target("python3").is_ok());
}

#[test]
fn missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    let err = KernelConfig::load(&path).unwrap_err();
    assert!(matches!(err, KernelError::Config { .. }));
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn malformed_file_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "targets: [not, a, mapping]").unwrap();

    assert!(matches!(
        KernelConfig::load(file.path()),
        Err(KernelError::Config { .. })
    ));
}
