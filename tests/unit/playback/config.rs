use super::*;

#[test]
fn defaults_pace_two_phase_kinds_longer() {
    let cfg = PlaybackConfig::default();
    let base = cfg.delay_for(CommandKind::Append, false);
    assert_eq!(base, Duration::from_millis(400));
    for kind in [
        CommandKind::Swap,
        CommandKind::Replace,
        CommandKind::Remove,
        CommandKind::Delete,
    ] {
        assert!(cfg.delay_for(kind, false) > base, "{kind}");
    }
    assert_eq!(cfg.delay_for(CommandKind::Swap, true), base);
}

#[test]
fn speed_scales_delays() {
    let cfg = PlaybackConfig {
        speed: 2.0,
        ..PlaybackConfig::default()
    };
    assert_eq!(
        cfg.delay_for(CommandKind::Swap, false),
        Duration::from_millis(500)
    );
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg = PlaybackConfig::from_json_str(r#"{"timing": {"swap_ms": 1500}}"#).unwrap();
    assert_eq!(cfg.timing.swap_ms, 1500);
    assert_eq!(cfg.timing.append_ms, 400);
    assert_eq!(cfg.speed, 1.0);
}

#[test]
fn rejects_bad_speed_and_huge_delays() {
    for s in [r#"{"speed": 0}"#, r#"{"speed": -1.5}"#] {
        let err = PlaybackConfig::from_json_str(s).unwrap_err();
        assert_eq!(err.category(), "config", "{s}");
    }
    let err = PlaybackConfig::from_json_str(r#"{"timing": {"clear_ms": 600001}}"#).unwrap_err();
    assert!(err.to_string().contains("timing.clear_ms"));

    let nan = PlaybackConfig {
        speed: f64::NAN,
        ..PlaybackConfig::default()
    };
    assert!(nan.validate().is_err());
}
