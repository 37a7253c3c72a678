//! Lazy traversal of the registry's linked list.

use std::collections::HashSet;
use std::sync::Arc;

use vigil_types::ShortId;

use crate::binding::RegistryBinding;
use crate::error::RegistryError;
use crate::masternode::MasternodeContext;

enum Cursor {
    /// Tail id not fetched yet.
    Start,
    At(ShortId),
    Done,
}

/// A backward walk from the newest entry, pulled one context at a time.
///
/// The walk is finite and fused: after the zero sentinel or a failed read it
/// yields `None` forever. It cannot be rewound; start a new walk to re-read.
/// An id reached twice ends the walk with [`RegistryError::LinkCycle`].
pub struct RegistryWalk {
    binding: Arc<dyn RegistryBinding>,
    block: u64,
    cursor: Cursor,
    visited: HashSet<ShortId>,
}

impl RegistryWalk {
    pub fn new(binding: Arc<dyn RegistryBinding>, block: u64) -> Self {
        Self {
            binding,
            block,
            cursor: Cursor::Start,
            visited: HashSet::new(),
        }
    }

    /// Block height every read of this walk is made at.
    pub fn block(&self) -> u64 {
        self.block
    }

    /// Fetch the next context, following `prev` links.
    pub async fn next(&mut self) -> Option<Result<MasternodeContext, RegistryError>> {
        let id = match self.cursor {
            Cursor::Done => return None,
            Cursor::At(id) => id,
            Cursor::Start => match self.binding.last_id(self.block).await {
                Ok(id) => id,
                Err(err) => {
                    self.cursor = Cursor::Done;
                    return Some(Err(err));
                }
            },
        };
        if id.is_zero() {
            self.cursor = Cursor::Done;
            return None;
        }
        if !self.visited.insert(id) {
            self.cursor = Cursor::Done;
            return Some(Err(RegistryError::LinkCycle(id)));
        }
        match self.binding.node_info(id, self.block).await {
            Ok(info) => {
                let ctx = MasternodeContext::from(info);
                self.cursor = Cursor::At(ctx.prev);
                Some(Ok(ctx))
            }
            Err(err) => {
                self.cursor = Cursor::Done;
                Some(Err(err))
            }
        }
    }
}
