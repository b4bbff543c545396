use super::*;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

#[test]
#[serial]
fn load_applies_process_environment() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    fs::write(
        temp_dir.path().join("config.toml"),
        "[server]\nport = 9000\n",
    )
    .expect("should write config");

    // SAFETY: serialized with every other test that touches the environment
    unsafe {
        std::env::set_var("COOKING_ASSISTANT_PORT", "9100");
        std::env::set_var("GOOGLE_API_KEY", "from-env");
    }

    let result = Config::load(temp_dir.path());

    // SAFETY: see above
    unsafe {
        std::env::remove_var("COOKING_ASSISTANT_PORT");
        std::env::remove_var("GOOGLE_API_KEY");
    }

    let config = result.expect("config should load");
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.generation.api_key.as_deref(), Some("from-env"));
}

#[test]
#[serial]
fn load_rejects_invalid_values() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    fs::write(
        temp_dir.path().join("config.toml"),
        "[chunking]\nchunk_size = 100\nchunk_overlap = 200\n",
    )
    .expect("should write config");

    assert!(Config::load(temp_dir.path()).is_err());
}

#[test]
fn rendered_config_hides_api_key() {
    let mut config = Config::default();
    config.generation.api_key = Some("do-not-print".to_string());

    let rendered = render_config(&config).expect("should render");
    assert!(rendered.contains("[vector_store]"));
    assert!(rendered.contains("cooking-assistant-unified"));
    assert!(!rendered.contains("do-not-print"));
}

#[test]
#[serial]
fn write_config_ignores_process_environment() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    fs::write(
        temp_dir.path().join("config.toml"),
        "[server]\nport = 9000\n",
    )
    .expect("should write config");

    // SAFETY: serialized with every other test that touches the environment
    unsafe {
        std::env::set_var("COOKING_ASSISTANT_PORT", "9100");
        std::env::set_var("OLLAMA_MODEL", "from-env-model");
    }

    let result = write_config(temp_dir.path());

    // SAFETY: see above
    unsafe {
        std::env::remove_var("COOKING_ASSISTANT_PORT");
        std::env::remove_var("OLLAMA_MODEL");
    }

    let path = result.expect("config should be written");
    assert_eq!(path, temp_dir.path().join("config.toml"));

    let written = Config::load_file(temp_dir.path()).expect("written config should load");
    assert_eq!(written.server.port, 9000);
    assert_eq!(written.ollama.model, OllamaConfig::default().model);
}

#[test]
#[serial]
fn write_config_creates_defaults() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config_dir = temp_dir.path().join("fresh");

    write_config(&config_dir).expect("config should be written");

    let written = Config::load_file(&config_dir).expect("written config should load");
    assert_eq!(
        Config {
            base_dir: config_dir.clone(),
            ..Config::default()
        },
        written
    );
}
