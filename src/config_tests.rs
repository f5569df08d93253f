use super::*;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = Config::resolve(ConfigFile::default(), Overrides::default());
    assert_eq!(config.directory, PathBuf::from("./travis/test"));
    assert_eq!(config.nasm, PathBuf::from("./nasm"));
    assert!(config.stop_on_failure);
}

#[test]
fn test_file_over_defaults() {
    let file = ConfigFile::parse(
        r#"
directory = "tests/asm"
nasm = "/usr/bin/nasm"
stop = false
"#,
    )
    .unwrap();
    let config = Config::resolve(file, Overrides::default());
    assert_eq!(config.directory, PathBuf::from("tests/asm"));
    assert_eq!(config.nasm, PathBuf::from("/usr/bin/nasm"));
    assert!(!config.stop_on_failure);
}

#[test]
fn test_flags_over_file() {
    let file = ConfigFile::parse("nasm = \"/usr/bin/nasm\"\nstop = false\n").unwrap();
    let overrides = Overrides {
        directory: None,
        nasm: Some(PathBuf::from("build/nasm")),
        stop: Some(true),
    };
    let config = Config::resolve(file, overrides);
    assert_eq!(config.nasm, PathBuf::from("build/nasm"));
    assert!(config.stop_on_failure);
    assert_eq!(config.directory, PathBuf::from(DEFAULT_DIRECTORY));
}

#[test]
fn test_unknown_key_rejected() {
    assert!(ConfigFile::parse("nasmm = \"x\"\n").is_err());
}

#[test]
fn test_explicit_missing_file_is_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("absent.toml");
    assert!(matches!(
        ConfigFile::discover(Some(&missing)),
        Err(HarnessError::Io { .. })
    ));
}

#[test]
fn test_explicit_invalid_file_is_config_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nasm-t.toml");
    std::fs::write(&path, "stop = \"sometimes\"\n").unwrap();
    let err = ConfigFile::discover(Some(&path)).unwrap_err();
    assert!(matches!(err, HarnessError::Config { .. }));
    assert_eq!(err.exit_code(), crate::error::EXIT_FAILURE);
}

#[test]
fn test_parse_yes_no() {
    assert_eq!(parse_yes_no("y"), Ok(true));
    assert_eq!(parse_yes_no("N"), Ok(false));
    assert!(parse_yes_no("maybe").is_err());
}
