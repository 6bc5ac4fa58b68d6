//! Shared builders for composite-network tests.

/// Scriptable test doubles.
pub mod mocks;

use icsim_core::composite::CompositeNetwork;
use icsim_core::Config;

use mocks::fabric::MockFabric;

/// A default config with the VC count overridden.
///
/// The shape sections are ignored by [`CompositeNetwork::with_fabrics`], so
/// tests that build around mocks only care about `num_vcs`, `routing` and
/// `seed`.
pub fn small_config(num_vcs: usize) -> Config {
    Config {
        num_vcs,
        ..Config::default()
    }
}

/// A composite network wired around two scripted mock fabrics.
///
/// Returns the network plus handles to both mocks; the handles share state
/// with the boxed copies inside the network, so tests can script ejections
/// and inspect writes after construction.
pub fn mock_network(
    num_nodes: usize,
    num_vcs: usize,
) -> (CompositeNetwork, MockFabric, MockFabric) {
    mock_network_with(num_nodes, &small_config(num_vcs))
}

/// Like [`mock_network`], but with full control over the config.
pub fn mock_network_with(num_nodes: usize, config: &Config) -> (CompositeNetwork, MockFabric, MockFabric) {
    let fly = MockFabric::new("flatfly", num_nodes);
    let tree = MockFabric::new("fattree", num_nodes);
    let net =
        CompositeNetwork::with_fabrics(Box::new(fly.clone()), Box::new(tree.clone()), config)
            .unwrap();
    (net, fly, tree)
}
