use crate::{CharacterConfig, Error, LedgeProbeConfig};

#[test]
fn defaults_are_valid() {
    assert!(CharacterConfig::default().validate().is_ok());
}

#[test]
fn ledge_heights_include_both_ends() {
    let heights: Vec<f32> = LedgeProbeConfig::default().heights().collect();
    assert_eq!(heights.len(), 13);
    assert_eq!(heights[0], 1.0);
    assert!((heights[12] - 4.0).abs() < 1.0e-6);

    let odd = LedgeProbeConfig {
        min_height: 0.0,
        max_height: 1.0,
        height_step: 0.1,
        ..LedgeProbeConfig::default()
    };
    assert_eq!(odd.heights().count(), 11);
}

#[test]
fn invalid_tuning_is_rejected() {
    let mut config = CharacterConfig::default();
    config.locomotion.walk_threshold = 0.9;
    assert!(matches!(config.validate(), Err(Error::InvalidValue { .. })));

    let mut config = CharacterConfig::default();
    config.ledge_probe.height_step = 0.0;
    assert!(config.validate().is_err());
    assert_eq!(config.ledge_probe.heights().count(), 1);

    let mut config = CharacterConfig::default();
    config.gravity = f32::NAN;
    assert!(config.validate().is_err());
}
