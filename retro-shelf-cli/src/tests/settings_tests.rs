use super::*;

use std::fs;

#[test]
fn missing_file_yields_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let settings = load_settings_from(&tmp.path().join("settings.toml")).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn reads_launchbox_section() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("settings.toml");
    fs::write(
        &path,
        r#"
[launchbox]
installdir = "/games/LaunchBox"
launch_fallback = "emulator-params"

[library]
current_root = "/roms"
"#,
    )
    .unwrap();

    let settings = load_settings_from(&path).unwrap();
    assert_eq!(
        settings.launchbox.installdir.as_deref(),
        Some(Path::new("/games/LaunchBox"))
    );
    assert_eq!(
        settings.launchbox.launch_fallback,
        Some(LaunchFallback::EmulatorParams)
    );
}

#[test]
fn invalid_fallback_is_a_config_error() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("settings.toml");
    fs::write(&path, "[launchbox]\nlaunch_fallback = \"sometimes\"\n").unwrap();

    let err = load_settings_from(&path).unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
}

#[test]
fn flags_override_settings_file() {
    let settings = Settings {
        launchbox: LaunchboxSettings {
            installdir: Some(PathBuf::from("/from/file")),
            launch_fallback: Some(LaunchFallback::Empty),
        },
    };

    let resolved = resolve_options(
        Some(PathBuf::from("/from/flag")),
        None,
        &settings,
    );
    assert_eq!(resolved.options.installdir.as_deref(), Some(Path::new("/from/flag")));
    assert_eq!(resolved.installdir_source, Source::Flag);
    assert_eq!(resolved.options.launch_fallback, LaunchFallback::Empty);
    assert_eq!(resolved.fallback_source, Source::SettingsFile);
}

#[test]
fn nothing_set_uses_defaults() {
    let resolved = resolve_options(None, None, &Settings::default());
    assert!(resolved.options.installdir.is_none());
    assert_eq!(resolved.installdir_source, Source::Default);
    assert_eq!(resolved.options.launch_fallback, LaunchFallback::EmulatorPath);
    assert_eq!(resolved.fallback_source, Source::Default);
}
