use std::path::PathBuf;
use std::time::Duration;

use gpio_image_kiosk::config::Configuration;
use gpio_image_kiosk::debounce::DebouncePolicy;
use gpio_image_kiosk::processing::Anchor;

#[test]
fn empty_file_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.target_output, "HDMI-1");
    assert_eq!(cfg.chip_path, PathBuf::from("/dev/gpiochip0"));
    assert_eq!(cfg.line_offset, 17);
    assert_eq!(cfg.poll_interval, Duration::from_millis(5));
    assert_eq!(cfg.debounce_threshold, Duration::from_millis(20));
    assert_eq!(cfg.debounce_policy, DebouncePolicy::Strict);
    assert_eq!(cfg.anchor, Anchor::Center);
    assert_eq!(cfg.query_command, vec!["xrandr", "--query"]);
    assert!(cfg.images[0].ends_with("images/feg.png"));
    assert!(cfg.images[1].ends_with("images/test.png"));
    cfg.validated().unwrap();
}

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
target-output: DP-2
chip-path: /dev/gpiochip4
line-offset: 27
images: [/srv/kiosk/idle.jpg, /srv/kiosk/pressed.jpg]
poll-interval: 10ms
debounce-threshold: 30ms
debounce-policy: loose
anchor: top-left
query-command: [xrandr, --query, --current]
"#;
    let cfg = serde_yaml::from_str::<Configuration>(yaml)
        .unwrap()
        .validated()
        .unwrap();
    assert_eq!(cfg.target_output, "DP-2");
    assert_eq!(cfg.line().chip, PathBuf::from("/dev/gpiochip4"));
    assert_eq!(cfg.line().offset, 27);
    assert_eq!(cfg.images[1], PathBuf::from("/srv/kiosk/pressed.jpg"));
    assert_eq!(cfg.poll_interval, Duration::from_millis(10));
    assert_eq!(cfg.debounce_threshold, Duration::from_millis(30));
    assert_eq!(cfg.debounce_policy, DebouncePolicy::Loose);
    assert_eq!(cfg.anchor, Anchor::TopLeft);
    assert_eq!(cfg.query_command.len(), 3);
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(serde_yaml::from_str::<Configuration>("target-ouptut: HDMI-1\n").is_err());
}

#[test]
fn poll_interval_longer_than_threshold_is_invalid() {
    let yaml = "poll-interval: 50ms\ndebounce-threshold: 20ms\n";
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(err.to_string().contains("poll-interval"));
}

#[test]
fn zero_durations_are_invalid() {
    let cfg: Configuration = serde_yaml::from_str("debounce-threshold: 0s\n").unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn empty_query_command_is_invalid() {
    let cfg: Configuration = serde_yaml::from_str("query-command: []\n").unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn loads_from_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("kiosk.yaml");
    std::fs::write(&path, "target-output: HDMI-2\n")?;
    let cfg = Configuration::from_yaml_file(&path)?.validated()?;
    assert_eq!(cfg.target_output, "HDMI-2");
    Ok(())
}
