use docs_translate::config::Provider;
use docs_translate::load_config::load_config;
use serial_test::serial;
use std::fs::write;
use tempfile::NamedTempFile;

fn clear_env_overrides() {
    std::env::remove_var("TRANSLATION_PROVIDER");
    std::env::remove_var("TRANSLATION_MODEL");
    std::env::remove_var("TRANSLATION_DELAY");
}

fn write_config(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("creating temp config file failed");
    write(file.path(), yaml).expect("writing temp config failed");
    file
}

#[test]
#[serial]
fn full_config_is_loaded_and_merged() {
    clear_env_overrides();
    let config = write_config(
        "upstream:\n  repo_url: \"https://github.com/laravel/docs.git\"\n  branches: [\"master\", \"12.x\"]\ndocs_root: versioned_docs\nexcluded_files: [\"License.md\", \"readme.md\"]\ntranslation:\n  provider: azure\n  model: gpt-4.1\n  source_lang: en\n  target_lang: ko\n  delay_secs: 5\n",
    );

    let loaded = load_config(config.path()).expect("config should load");
    assert_eq!(loaded.upstream.repo_url, "https://github.com/laravel/docs.git");
    assert_eq!(loaded.upstream.branches, vec!["master", "12.x"]);
    // Excluded names are lowercased on load.
    assert_eq!(loaded.excluded_files, vec!["license.md", "readme.md"]);
    assert_eq!(loaded.translation.provider, Provider::Azure);
    assert_eq!(loaded.translation.delay_secs, 5);
    assert_eq!(loaded.translation.target_lang, "ko");
}

#[test]
#[serial]
fn defaults_fill_in_missing_translation_section() {
    clear_env_overrides();
    let config = write_config(
        "upstream:\n  repo_url: \"https://github.com/laravel/docs.git\"\n  branches: [\"master\"]\n",
    );

    let loaded = load_config(config.path()).expect("config should load");
    assert_eq!(loaded.translation.provider, Provider::OpenAi);
    assert_eq!(loaded.translation.model, "gpt-4.1");
    assert_eq!(loaded.translation.source_lang, "en");
    assert_eq!(loaded.translation.delay_secs, 10);
    assert_eq!(loaded.docs_root.to_string_lossy(), "versioned_docs");
}

#[test]
#[serial]
fn env_delay_overrides_config_and_invalid_value_falls_back() {
    clear_env_overrides();
    let config = write_config(
        "upstream:\n  repo_url: \"u\"\n  branches: [\"master\"]\ntranslation:\n  delay_secs: 7\n",
    );

    std::env::set_var("TRANSLATION_DELAY", "42");
    let loaded = load_config(config.path()).expect("config should load");
    assert_eq!(loaded.translation.delay_secs, 42);

    std::env::set_var("TRANSLATION_DELAY", "not-a-number");
    let loaded = load_config(config.path()).expect("config should load");
    assert_eq!(loaded.translation.delay_secs, 7);

    std::env::set_var("TRANSLATION_DELAY", "0");
    let loaded = load_config(config.path()).expect("config should load");
    assert_eq!(loaded.translation.delay_secs, 7);

    clear_env_overrides();
}

#[test]
#[serial]
fn unsupported_provider_is_rejected() {
    clear_env_overrides();
    let config = write_config(
        "upstream:\n  repo_url: \"u\"\n  branches: [\"master\"]\ntranslation:\n  provider: watson\n",
    );
    let err = load_config(config.path()).expect_err("provider should be rejected");
    assert!(err.to_string().contains("watson"));
}

#[test]
#[serial]
fn empty_branch_list_is_rejected() {
    clear_env_overrides();
    let config =
        write_config("upstream:\n  repo_url: \"u\"\n  branches: []\n");
    assert!(load_config(config.path()).is_err());
}

#[test]
#[serial]
fn missing_file_is_an_error() {
    clear_env_overrides();
    assert!(load_config("/definitely/not/here.yaml").is_err());
}
