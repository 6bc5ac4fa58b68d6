//! Transit behavior of the fabric models: latency, ordering, credits.

use pretty_assertions::assert_eq;

use icsim_core::config::{FatTreeConfig, FlatFlyConfig};
use icsim_core::fabric::{Fabric, FatTree, FlatFly};
use icsim_core::flit::{Credit, Flit};

/// One full cycle of the three phases.
fn tick(fabric: &mut impl Fabric) {
    fabric.read_inputs();
    fabric.evaluate();
    fabric.write_outputs();
}

/// 2-ary 2-flat: 4 nodes, transit latency dims + 1 = 3 cycles.
fn small_fly() -> FlatFly {
    FlatFly::new(&FlatFlyConfig { radix: 2, dims: 2 }, "xyyx").unwrap()
}

/// 2-ary 2-level tree: 4 nodes, transit latency 2 * levels = 4 cycles.
fn small_tree() -> FatTree {
    FatTree::new(&FatTreeConfig { radix: 2, levels: 2 }, "nca").unwrap()
}

#[test]
fn flatfly_delivers_after_its_latency() {
    let mut fly = small_fly();
    let flit = Flit::single(0, 0, 0, 3);
    fly.write_flit(Some(flit.clone()), 0);

    tick(&mut fly);
    tick(&mut fly);
    assert_eq!(fly.read_flit(3), None);

    tick(&mut fly);
    assert_eq!(fly.read_flit(3), Some(flit));
    assert_eq!(fly.read_flit(3), None);
}

#[test]
fn fattree_delivers_after_its_latency() {
    let mut tree = small_tree();
    let flit = Flit::single(0, 1, 2, 1);
    tree.write_flit(Some(flit.clone()), 2);

    for _ in 0..3 {
        tick(&mut tree);
    }
    assert_eq!(tree.read_flit(1), None);

    tick(&mut tree);
    assert_eq!(tree.read_flit(1), Some(flit));
}

#[test]
fn credit_returned_when_flit_is_latched() {
    let mut fly = small_fly();
    fly.write_flit(Some(Flit::single(0, 2, 1, 3)), 1);
    assert_eq!(fly.read_credit(1), None);

    tick(&mut fly);
    assert_eq!(fly.read_credit(1), Some(Credit::one(2)));
    assert_eq!(fly.read_credit(1), None);
}

#[test]
fn null_write_transports_nothing() {
    let mut fly = small_fly();
    fly.write_flit(None, 0);

    for _ in 0..6 {
        tick(&mut fly);
    }
    for dest in 0..fly.num_nodes() {
        assert_eq!(fly.read_flit(dest), None);
    }
    assert_eq!(fly.read_credit(0), None);
}

#[test]
fn occupancy_counters_track_null_writes_and_absorbed_credits() {
    let mut fly = small_fly();
    fly.write_flit(None, 0);
    fly.write_flit(None, 1);
    assert_eq!(fly.null_writes(), 2);

    fly.write_credit(Credit { vcs: vec![0, 1] }, 3);
    fly.write_credit(Credit::one(0), 3);
    assert_eq!(fly.absorbed(3), 3);
    assert_eq!(fly.absorbed(0), 0);
}

#[test]
fn same_source_flits_keep_order() {
    let mut fly = small_fly();
    let head = Flit::head(4, 0, 0, 2);
    let tail = Flit::tail(4, 0, 0, 2, 1);
    fly.write_flit(Some(head.clone()), 0);
    fly.write_flit(Some(tail.clone()), 0);

    for _ in 0..3 {
        tick(&mut fly);
    }
    assert_eq!(fly.read_flit(2), Some(head));
    assert_eq!(fly.read_flit(2), Some(tail));
}

#[test]
fn staggered_injections_stay_in_order() {
    let mut fly = small_fly();
    fly.write_flit(Some(Flit::single(0, 1, 3, 0)), 3);
    tick(&mut fly);
    fly.write_flit(Some(Flit::single(1, 1, 3, 0)), 3);
    for _ in 0..3 {
        tick(&mut fly);
    }

    let first = fly.read_flit(0).unwrap();
    assert_eq!(first.packet, 0);
    let second = fly.read_flit(0).unwrap();
    assert_eq!(second.packet, 1);
}
