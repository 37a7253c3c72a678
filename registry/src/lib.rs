//! Masternode registry: identity and the read path over the on-chain list.
//!
//! The registry stores masternodes as a doubly linked list keyed by the first
//! eight bytes of each node's packed public key. This crate decodes entries
//! into [`Masternode`] values, walks the list backwards from its newest entry
//! and filters it down to the currently active set.
//!
//! ## Module overview
//!
//! - [`binding`]: The [`RegistryBinding`] collaborator trait and notification subscriptions.
//! - [`masternode`]: Masternode identity, list contexts, registration payload.
//! - [`walk`]: Lazy, fused traversal of the linked list.
//! - [`client`]: Active-list enumeration, membership and governance lookups.
//! - [`error`]: Registry error types.

pub mod binding;
pub mod client;
pub mod error;
pub mod masternode;
pub mod walk;

pub use binding::{NodeInfo, Notification, RegistryBinding, Subscription, SubscriptionSender};
pub use client::RegistryClient;
pub use error::{RegistryError, TraversalError};
pub use masternode::{
    masternode_id, registration_call_data, Masternode, MasternodeContext, MasternodeState,
};
pub use walk::RegistryWalk;
