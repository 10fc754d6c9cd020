//! Tests for YAML configuration loading and validation.

use qwalk_analysis::{
    AnalysisError, CoinPreset, CompareConfig, ParameterRange, SweepConfig, SweepKind, TimeGrid,
};
use qwalk_sim::observables::RegionBounds;
use qwalk_sim::state::Profile;
use qwalk_sim::{SimError, WalkKind};

const LOCALIZATION: &str = r#"
name: localization
walk:
  num_sites: 101
  kind: continuous
  initial:
    center: 50
  times:
    type: range
    t_max: 10
sweep:
  type: origin_probability
  strengths: { start: -15.0, stop: 15.0, num: 60 }
"#;

const DTQW_COINS: &str = r#"
name: coins
walk:
  num_sites: 81
  kind: discrete
  initial: { center: 40 }
  times: { type: range, t_max: 30 }
sweep:
  type: origin_probability
  strengths: { start: -3.14, stop: 3.14, num: 30 }
coins:
  - balanced
  - up
  - down
  - custom: [[0.6, 0.0], [0.0, 0.8]]
"#;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[test]
fn parses_continuous_sweep() {
    let config = SweepConfig::from_yaml(LOCALIZATION).unwrap();
    assert_eq!(config.name, "localization");
    assert_eq!(config.walk.num_sites, 101);
    assert_eq!(config.walk.kind, WalkKind::Continuous);
    assert_eq!(config.walk.initial.center, 50);
    assert_eq!(config.walk.initial.profile, Profile::Delta);
    assert!(config.walk.defects.is_empty());
    assert_eq!(config.walk.times, TimeGrid::Range { t_max: 10 });
    assert_eq!(
        config.sweep,
        SweepKind::OriginProbability {
            strengths: ParameterRange::new(-15.0, 15.0, 60)
        }
    );
    assert!(config.coins.is_empty());
}

#[test]
fn parses_coin_list() {
    let config = SweepConfig::from_yaml(DTQW_COINS).unwrap();
    assert_eq!(config.coins.len(), 4);
    assert_eq!(config.coins[0], CoinPreset::Balanced);
    let labels: Vec<String> = config
        .series_initial_states()
        .into_iter()
        .map(|(label, _)| label)
        .collect();
    assert_eq!(labels, vec!["balanced", "up", "down", "custom"]);
    let custom = config.coins[3].state();
    assert_eq!(custom.0[1].im, 0.8);
}

#[test]
fn parses_gaussian_momentum_sweep_with_defects() {
    let yaml = r#"
walk:
  num_sites: 201
  kind: continuous
  initial:
    center: 60
    profile: { type: gaussian, spread: 10.0, momentum: 0.0 }
  defects: { 20: 1.5 }
  times: { type: linspace, start: 0.0, stop: 40.0, num: 41 }
sweep:
  type: momentum_transmission
  defect_offset: 15
  strength: 2.0
  momenta: { start: 0.0, stop: 1.5707963, num: 20 }
"#;
    let config = SweepConfig::from_yaml(yaml).unwrap();
    assert_eq!(config.name, "");
    assert_eq!(config.walk.defects.strength(20), 1.5);
    assert_eq!(config.sweep.parameter_name(), "momentum");
    assert_eq!(config.sweep.measure_name(), "transmitted_mass");
}

#[test]
fn parses_compare_config() {
    let yaml = r#"
name: trapping
walk:
  num_sites: 201
  kind: discrete
  initial: { center: 100 }
  times: { type: explicit, values: [0, 10, 50, 100] }
defects: { 80: 2.618, 120: 2.618 }
regions: { lower: 80, upper: 120, buffer: 1 }
"#;
    let config = CompareConfig::from_yaml(yaml).unwrap();
    assert_eq!(config.defects.len(), 2);
    let regions = config.regions.unwrap();
    assert_eq!(regions.bounds(), RegionBounds::Pair { lower: 80, upper: 120 });
    assert_eq!(regions.buffer, 1);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn malformed_yaml_is_a_parse_error() {
    assert!(matches!(
        SweepConfig::from_yaml("walk: [unterminated"),
        Err(AnalysisError::Config(_))
    ));
    assert!(matches!(
        SweepConfig::from_yaml(&LOCALIZATION.replace("origin_probability", "nonsense")),
        Err(AnalysisError::Config(_))
    ));
}

#[test]
fn engine_errors_surface_at_load() {
    assert!(matches!(
        SweepConfig::from_yaml(&LOCALIZATION.replace("center: 50", "center: 101")),
        Err(AnalysisError::Sim(SimError::InvalidCenter { center: 101, .. }))
    ));
    assert!(matches!(
        SweepConfig::from_yaml(&LOCALIZATION.replace("num_sites: 101", "num_sites: 1")),
        Err(AnalysisError::Sim(SimError::InvalidLatticeSize(1)))
    ));
}

#[test]
fn discrete_walk_needs_integer_times() {
    let yaml = DTQW_COINS.replace(
        "{ type: range, t_max: 30 }",
        "{ type: linspace, start: 0.0, stop: 1.0, num: 3 }",
    );
    assert!(matches!(
        SweepConfig::from_yaml(&yaml),
        Err(AnalysisError::Sim(SimError::InvalidTimeSamples(_)))
    ));
}

#[test]
fn coins_are_rejected_for_continuous_walks() {
    let yaml = format!("{LOCALIZATION}coins: [up]\n");
    assert!(matches!(
        SweepConfig::from_yaml(&yaml),
        Err(AnalysisError::InvalidConfig(_))
    ));
}

#[test]
fn transmission_defect_must_fit_on_lattice() {
    let yaml = LOCALIZATION.replace(
        "type: origin_probability",
        "type: transmission\n  defect_offset: 60",
    );
    assert!(matches!(
        SweepConfig::from_yaml(&yaml),
        Err(AnalysisError::InvalidConfig(_))
    ));
}

#[test]
fn momentum_sweep_needs_gaussian_packet() {
    let yaml = r#"
walk:
  num_sites: 101
  kind: continuous
  initial: { center: 50 }
  times: { type: range, t_max: 5 }
sweep:
  type: momentum_transmission
  defect_offset: 10
  strength: 2.0
  momenta: { start: 0.0, stop: 1.0, num: 3 }
"#;
    assert!(matches!(
        SweepConfig::from_yaml(yaml),
        Err(AnalysisError::InvalidConfig(_))
    ));
}

#[test]
fn momentum_sweep_rejects_zone_edge() {
    let yaml = r#"
walk:
  num_sites: 101
  kind: continuous
  initial:
    center: 50
    profile: { type: gaussian, spread: 5.0, momentum: 0.0 }
  times: { type: range, t_max: 5 }
sweep:
  type: momentum_transmission
  defect_offset: 10
  strength: 2.0
  momenta: { start: 0.0, stop: 3.5, num: 3 }
"#;
    assert!(matches!(
        SweepConfig::from_yaml(yaml),
        Err(AnalysisError::Sim(SimError::InvalidMomentum(_)))
    ));
}

#[test]
fn trap_bounds_are_checked() {
    let yaml = LOCALIZATION.replace(
        "type: origin_probability\n  strengths: { start: -15.0, stop: 15.0, num: 60 }",
        "type: trapping\n  lower: 60\n  upper: 40\n  strength: 1.0",
    );
    assert!(matches!(
        SweepConfig::from_yaml(&yaml),
        Err(AnalysisError::InvalidConfig(_))
    ));
}

#[test]
fn empty_parameter_range_is_rejected() {
    let yaml = LOCALIZATION.replace("num: 60", "num: 0");
    assert!(matches!(
        SweepConfig::from_yaml(&yaml),
        Err(AnalysisError::InvalidConfig(_))
    ));
}

#[test]
fn compare_defects_are_validated() {
    let yaml = r#"
walk:
  num_sites: 50
  kind: continuous
  initial: { center: 25 }
  times: { type: range, t_max: 5 }
defects: { 50: 1.0 }
"#;
    assert!(matches!(
        CompareConfig::from_yaml(yaml),
        Err(AnalysisError::Sim(SimError::InvalidDefectSite { site: 50, .. }))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(
        SweepConfig::from_file("/nonexistent/qwalk/sweep.yaml"),
        Err(AnalysisError::Io(_))
    ));
}

#[test]
fn sweep_config_round_trips_through_yaml() {
    let config = SweepConfig::from_yaml(DTQW_COINS).unwrap();
    let text = serde_yaml_ng::to_string(&config).unwrap();
    assert_eq!(SweepConfig::from_yaml(&text).unwrap(), config);
}

#[test]
fn custom_coin_serialises_as_single_key_map() {
    let config = SweepConfig::from_yaml(DTQW_COINS).unwrap();
    let text = serde_yaml_ng::to_string(&config).unwrap();
    assert!(text.contains("custom:"), "{text}");
    assert!(!text.contains("!custom"), "{text}");
}

#[test]
fn custom_coin_parses_from_block_map() {
    let yaml = DTQW_COINS.replace(
        "  - custom: [[0.6, 0.0], [0.0, 0.8]]\n",
        "  - custom:\n      - [0.0, 1.0]\n      - [1.0, 0.0]\n",
    );
    let config = SweepConfig::from_yaml(&yaml).unwrap();
    assert_eq!(config.coins.len(), 4);
    assert_eq!(config.coins[3].label(), "custom");
    let coin = config.coins[3].state();
    assert_eq!(coin.0[0].im, 1.0);
    assert_eq!(coin.0[1].re, 1.0);
}

#[test]
fn prepare_returns_the_shared_walk() {
    let config = SweepConfig::from_yaml(DTQW_COINS).unwrap();
    let walk = config.prepare().unwrap();
    assert_eq!(walk.lattice().num_sites(), 81);
    assert_eq!(walk.kind(), WalkKind::Discrete);
    assert_eq!(walk.samples().as_slice().len(), 31);

    let mut bad = config.clone();
    bad.walk.initial.center = 81;
    assert!(matches!(
        bad.prepare(),
        Err(AnalysisError::Sim(SimError::InvalidCenter { .. }))
    ));
}
