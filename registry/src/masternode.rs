//! Masternode identity as decoded from the registry.

use std::fmt;

use vigil_crypto::secp256k1::PublicKey;
use vigil_types::params::{MIN_ONLINE_CREDIT, STALE_PING_WINDOW};
use vigil_types::{Address, NodeId, ShortId};

use crate::binding::NodeInfo;

/// Function selector of the registry's `register` entry point.
const REGISTER_SELECTOR: [u8; 4] = [0x2f, 0x92, 0x67, 0x32];

/// Lifecycle state of a masternode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MasternodeState {
    #[default]
    Initialized,
}

/// A registered participant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Masternode {
    /// The decoded public key, proof the identifier is on the curve.
    pub public_key: PublicKey,
    /// Lowercase hex of the first 8 bytes of `node_id`.
    pub id: String,
    pub node_id: NodeId,
    pub account: Address,
    pub origin_block: u64,
    pub state: MasternodeState,
    pub online_credit: u64,
    pub last_ping_block: u64,
}

impl Masternode {
    /// Build a masternode from its packed identifier.
    ///
    /// Returns `None` if the identifier is not a point on secp256k1; such an
    /// entry cannot be addressed or verified and is treated as unusable.
    pub fn from_packed(
        node_id: NodeId,
        account: Address,
        origin_block: u64,
        online_credit: u64,
        last_ping_block: u64,
    ) -> Option<Self> {
        let public_key = vigil_crypto::public_key_from_node_id(&node_id)?;
        Some(Self {
            public_key,
            id: masternode_id(&node_id),
            node_id,
            account,
            origin_block,
            state: MasternodeState::Initialized,
            online_credit,
            last_ping_block,
        })
    }

    pub fn short_id(&self) -> ShortId {
        self.node_id.short_id()
    }

    /// Whether this node counts as active at `block`: it pinged within the
    /// stale window and has accumulated enough online credit.
    pub fn is_active_at(&self, block: u64) -> bool {
        block.saturating_sub(self.last_ping_block) <= STALE_PING_WINDOW
            && self.online_credit >= MIN_ONLINE_CREDIT
    }

    /// Peer-to-peer descriptor for this node. No endpoint is known from the
    /// registry, so the address is unspecified.
    pub fn enode_url(&self) -> String {
        format!("enode://{}@0.0.0.0:0", self.node_id)
    }
}

impl fmt::Display for Masternode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node: {}", self.node_id)
    }
}

/// The printable masternode id of a packed identifier.
pub fn masternode_id(node_id: &NodeId) -> String {
    node_id.short_id().to_hex()
}

/// Call data for registering `node_id`, for manual submission.
pub fn registration_call_data(node_id: &NodeId) -> String {
    format!(
        "0x{}{}",
        hex::encode(REGISTER_SELECTOR),
        hex::encode(node_id.as_bytes())
    )
}

/// A transient view of one list entry and its neighbours.
///
/// Always rebuilt from a fresh read; never cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MasternodeContext {
    /// `None` when the stored identifier is off the curve.
    pub node: Option<Masternode>,
    pub prev: ShortId,
    pub next: ShortId,
}

impl From<NodeInfo> for MasternodeContext {
    fn from(info: NodeInfo) -> Self {
        let node_id = NodeId::from_halves(info.id1, info.id2);
        Self {
            node: Masternode::from_packed(
                node_id,
                info.account,
                info.origin_block,
                info.online_credit,
                info.last_ping_block,
            ),
            prev: info.prev,
            next: info.next,
        }
    }
}
