//! Configuration parsing and validation tests.

use pretty_assertions::assert_eq;
use rstest::rstest;

use icsim_core::common::{FabricId, NetworkError};
use icsim_core::config::{Config, FlatFlyConfig, RoutingMode};

#[test]
fn default_config_validates() {
    let config = Config::default();
    config.validate().unwrap();
}

#[test]
fn default_shapes_agree_on_node_count() {
    let config = Config::default();
    assert_eq!(config.flatfly.num_nodes(), 64);
    assert_eq!(config.fattree.num_nodes(), 64);
}

#[test]
fn zero_vcs_rejected() {
    let config = Config {
        num_vcs: 0,
        ..Config::default()
    };
    assert_eq!(config.validate(), Err(NetworkError::InvalidVcCount(0)));
}

#[test]
fn degenerate_flatfly_rejected() {
    let config = Config {
        flatfly: FlatFlyConfig { radix: 1, dims: 2 },
        ..Config::default()
    };
    assert!(matches!(
        config.validate(),
        Err(NetworkError::InvalidTopology {
            fabric: FabricId::FlatFly,
            ..
        })
    ));
}

#[test]
fn degenerate_fattree_rejected() {
    let mut config = Config::default();
    config.fattree.levels = 0;
    assert!(matches!(
        config.validate(),
        Err(NetworkError::InvalidTopology {
            fabric: FabricId::FatTree,
            ..
        })
    ));
}

#[test]
fn shape_mismatch_rejected() {
    let config = Config {
        flatfly: FlatFlyConfig { radix: 4, dims: 2 },
        ..Config::default()
    };
    assert_eq!(
        config.validate(),
        Err(NetworkError::NodeCountMismatch {
            flatfly: 16,
            fattree: 64,
        })
    );
}

#[test]
fn out_of_range_injection_rate_rejected() {
    for rate in [1.5, -0.1, f64::NAN] {
        let mut config = Config::default();
        config.traffic.injection_rate = rate;
        assert!(
            matches!(config.validate(), Err(NetworkError::InvalidTraffic { .. })),
            "rate {rate} slipped through validation"
        );
    }
}

#[test]
fn boundary_injection_rates_accepted() {
    for rate in [0.0, 1.0] {
        let mut config = Config::default();
        config.traffic.injection_rate = rate;
        config.validate().unwrap();
    }
}

#[test]
fn zero_packet_length_rejected() {
    let mut config = Config::default();
    config.traffic.packet_length = 0;
    assert!(matches!(
        config.validate(),
        Err(NetworkError::InvalidTraffic { .. })
    ));
}

#[test]
fn partial_json_falls_back_to_defaults() {
    let config: Config = serde_json::from_str(r#"{"num_vcs": 2, "routing": "adaptive"}"#).unwrap();
    assert_eq!(config.num_vcs, 2);
    assert_eq!(config.routing, RoutingMode::Adaptive);
    assert_eq!(config.flatfly.num_nodes(), 64);
    assert_eq!(config.traffic.packet_length, 3);
    config.validate().unwrap();
}

#[test]
fn nested_shape_json_parses() {
    let config: Config = serde_json::from_str(
        r#"{"flatfly": {"radix": 4, "dims": 3}, "fattree": {"radix": 4, "levels": 3}}"#,
    )
    .unwrap();
    assert_eq!(config.flatfly.num_nodes(), 64);
    config.validate().unwrap();
}

#[test]
fn unknown_routing_mode_rejected() {
    let result = serde_json::from_str::<Config>(r#"{"routing": "fastest"}"#);
    assert!(result.is_err());
}

#[rstest]
#[case(RoutingMode::Deterministic, "xyyx", "nca")]
#[case(RoutingMode::Oblivious, "ran_min", "nca")]
#[case(RoutingMode::Adaptive, "ugal", "anca")]
fn routing_mode_selects_fabric_functions(
    #[case] mode: RoutingMode,
    #[case] fly_fn: &str,
    #[case] tree_fn: &str,
) {
    assert_eq!(mode.fabric_functions(), (fly_fn, tree_fn));
}
