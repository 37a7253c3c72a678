//! Active-list enumeration against an in-memory registry.

use std::sync::Arc;

use vigil_nullables::NullRegistry;
use vigil_registry::{RegistryClient, RegistryError};
use vigil_types::{Address, NetworkParams, NodeId, PrivateKey};

const GENESIS: u64 = 100;
const HEIGHT: u64 = 50_000;

fn node_id(seed: u8) -> NodeId {
    vigil_crypto::node_id_from_private(&PrivateKey([seed; 32])).unwrap()
}

fn params() -> NetworkParams {
    NetworkParams {
        genesis_block: GENESIS,
        bootstrap_ids: vec!["aaaaaaaaaaaaaaaa".into(), "bbbbbbbbbbbbbbbb".into()],
        ..NetworkParams::default()
    }
}

fn client(registry: &Arc<NullRegistry>) -> RegistryClient {
    RegistryClient::new(registry.clone(), params())
}

#[tokio::test]
async fn bootstrap_list_before_cutoff() {
    let registry = Arc::new(NullRegistry::new());
    registry.push(node_id(1), Address::ZERO, 5_000, GENESIS);
    let client = client(&registry);

    let ids = client
        .get_ids_by_block_number(Some(GENESIS + 1_799))
        .await
        .unwrap();
    assert_eq!(ids, params().bootstrap_ids);
    assert_eq!(registry.node_reads(), 0);
}

#[tokio::test]
async fn missing_block_number_means_earliest() {
    let registry = Arc::new(NullRegistry::new());
    registry.push(node_id(1), Address::ZERO, 5_000, 0);
    let ids = client(&registry).get_ids_by_block_number(None).await.unwrap();
    assert_eq!(ids, params().bootstrap_ids);
}

#[tokio::test]
async fn walk_starts_at_cutoff() {
    let registry = Arc::new(NullRegistry::new());
    let id = node_id(1);
    registry.push(id, Address::ZERO, 900, GENESIS + 1_800);
    let ids = client(&registry)
        .get_ids_by_block_number(Some(GENESIS + 1_800))
        .await
        .unwrap();
    assert_eq!(ids, vec![id.short_id().to_hex()]);
}

#[tokio::test]
async fn liveness_filters_at_their_boundaries() {
    let registry = Arc::new(NullRegistry::new());
    let fresh = node_id(1);
    let stale = node_id(2);
    let low_credit = node_id(3);
    registry.push(fresh, Address::ZERO, 900, HEIGHT - 1_800);
    registry.push(stale, Address::ZERO, 900, HEIGHT - 1_801);
    registry.push(low_credit, Address::ZERO, 899, HEIGHT);

    let ids = client(&registry)
        .get_ids_by_block_number(Some(HEIGHT))
        .await
        .unwrap();
    assert_eq!(ids, vec![fresh.short_id().to_hex()]);
    // filtered nodes are still visited
    assert_eq!(registry.node_reads(), 3);
}

#[tokio::test]
async fn newest_entries_come_first() {
    let registry = Arc::new(NullRegistry::new());
    let ids: Vec<NodeId> = (1..=4).map(node_id).collect();
    for id in &ids {
        registry.push(*id, Address::ZERO, 1_000, HEIGHT);
    }

    let listed = client(&registry)
        .get_ids_by_block_number(Some(HEIGHT))
        .await
        .unwrap();
    let expected: Vec<String> = ids.iter().rev().map(|id| id.short_id().to_hex()).collect();
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn failed_read_returns_partial_list() {
    let registry = Arc::new(NullRegistry::new());
    let oldest = node_id(1);
    let broken = node_id(2);
    let newest = node_id(3);
    registry.push(oldest, Address::ZERO, 1_000, HEIGHT);
    registry.push(broken, Address::ZERO, 1_000, HEIGHT);
    registry.push(newest, Address::ZERO, 1_000, HEIGHT);
    registry.fail_reads_of(broken.short_id());

    let err = client(&registry)
        .get_ids_by_block_number(Some(HEIGHT))
        .await
        .unwrap_err();
    assert_eq!(err.partial, vec![newest.short_id().to_hex()]);
    assert!(matches!(err.source, RegistryError::CallFailed { .. }));
    // the walk stops at the failure, the oldest entry is never read
    assert_eq!(registry.node_reads(), 2);
}

#[tokio::test]
async fn failed_tail_read_returns_empty_partial() {
    let registry = Arc::new(NullRegistry::new());
    registry.push(node_id(1), Address::ZERO, 1_000, HEIGHT);
    registry.fail_last_id(RegistryError::call("getLastId", "node offline"));

    let err = client(&registry)
        .get_ids_by_block_number(Some(HEIGHT))
        .await
        .unwrap_err();
    assert!(err.partial.is_empty());
}

#[tokio::test]
async fn off_curve_entry_is_skipped() {
    let registry = Arc::new(NullRegistry::new());
    let good = node_id(1);
    let mut bad = node_id(2);
    bad.0[63] ^= 0x01;
    registry.push(good, Address::ZERO, 1_000, HEIGHT);
    registry.push(bad, Address::ZERO, 1_000, HEIGHT);

    let ids = client(&registry)
        .get_ids_by_block_number(Some(HEIGHT))
        .await
        .unwrap();
    assert_eq!(ids, vec![good.short_id().to_hex()]);
}

#[tokio::test]
async fn empty_registry_lists_nothing() {
    let registry = Arc::new(NullRegistry::new());
    let ids = client(&registry)
        .get_ids_by_block_number(Some(HEIGHT))
        .await
        .unwrap();
    assert!(ids.is_empty());
}

#[tokio::test]
async fn walk_is_fused_after_sentinel() {
    let registry = Arc::new(NullRegistry::new());
    registry.push(node_id(1), Address::ZERO, 1_000, HEIGHT);
    let client = client(&registry);

    let mut walk = client.walk(HEIGHT);
    assert!(walk.next().await.unwrap().is_ok());
    assert!(walk.next().await.is_none());
    assert!(walk.next().await.is_none());
    assert_eq!(walk.block(), HEIGHT);
}

#[tokio::test]
async fn governance_and_membership_pass_through() {
    let registry = Arc::new(NullRegistry::new());
    let governance = Address::new([7; 20]);
    registry.set_governance(governance);
    let id = node_id(5).short_id();
    registry.set_member(id, true);
    let client = client(&registry);

    assert_eq!(client.get_governance_address(None).await.unwrap(), governance);
    assert!(client.has(id).await.unwrap());
    assert!(!client.has(node_id(6).short_id()).await.unwrap());
}

#[tokio::test]
async fn ping_gas_is_estimated_against_registry() {
    let registry = Arc::new(NullRegistry::new());
    registry.set_gas_estimate(Ok(42_000));
    let client = client(&registry);
    let from = Address::new([3; 20]);

    assert_eq!(client.estimate_ping_gas(from).await.unwrap(), 42_000);
    let calls = registry.estimates();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].from, from);
    assert_eq!(calls[0].to, Some(params().registry_address));
    assert!(calls[0].data.is_empty());
}

#[tokio::test]
async fn cyclic_links_end_the_walk() {
    let registry = Arc::new(NullRegistry::new());
    let oldest = registry.push(node_id(1), Address::ZERO, 5_000, HEIGHT);
    let newest = registry.push(node_id(2), Address::ZERO, 5_000, HEIGHT);
    registry.relink(oldest, newest);

    let err = client(&registry)
        .get_ids_by_block_number(Some(HEIGHT))
        .await
        .unwrap_err();
    assert_eq!(err.source, RegistryError::LinkCycle(newest));
    assert_eq!(err.partial, vec![newest.to_hex(), oldest.to_hex()]);
    assert_eq!(registry.node_reads(), 2);
}
