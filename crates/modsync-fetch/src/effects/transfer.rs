use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Identifier of one in-flight transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferId(Uuid);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// Registry of live, cancelable transfers owned by a fetch queue.
#[derive(Debug, Default)]
pub struct InFlight {
    transfers: Mutex<HashMap<TransferId, CancellationToken>>,
}

impl InFlight {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    /// Register a new transfer belonging to `batch`. Its token is a child of
    /// `batch`, so cancelling the batch cancels the transfer. It stays
    /// registered until the returned handle is dropped.
    pub fn begin(self: &Arc<Self>, batch: &CancellationToken) -> Transfer {
        let id = TransferId(Uuid::new_v4());
        let token = batch.child_token();
        self.lock().insert(id, token.clone());
        Transfer {
            id,
            token,
            registry: Arc::clone(self),
        }
    }

    /// Cancel `batch` and return how many of its live transfers were told to
    /// stop. Transfers of other batches are left running.
    ///
    /// Entries are removed by their handles as the transfers wind down, not
    /// here.
    pub fn cancel_batch(&self, batch: &CancellationToken) -> usize {
        let transfers = self.lock();
        let live: Vec<_> = transfers.values().filter(|t| !t.is_cancelled()).collect();
        batch.cancel();
        live.into_iter().filter(|t| t.is_cancelled()).count()
    }

    pub fn len(&self) -> usize { self.lock().len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    fn lock(&self) -> MutexGuard<'_, HashMap<TransferId, CancellationToken>> {
        self.transfers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle of one registered transfer.
#[derive(Debug)]
pub struct Transfer {
    id:       TransferId,
    token:    CancellationToken,
    registry: Arc<InFlight>,
}

impl Transfer {
    pub fn id(&self) -> TransferId { self.id }

    pub fn token(&self) -> &CancellationToken { &self.token }

    pub fn is_cancelled(&self) -> bool { self.token.is_cancelled() }
}

impl Drop for Transfer {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_register_and_deregister() {
        let registry = InFlight::new();
        let batch = CancellationToken::new();
        let a = registry.begin(&batch);
        let b = registry.begin(&batch);
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.len(), 2);

        drop(a);
        assert_eq!(registry.len(), 1);
        drop(b);
        assert!(registry.is_empty());
    }

    #[test]
    fn cancel_batch_only_reaches_its_own_transfers() {
        let registry = InFlight::new();
        let first = CancellationToken::new();
        let second = CancellationToken::new();
        let a = registry.begin(&first);
        let b = registry.begin(&first);
        let other = registry.begin(&second);

        assert_eq!(registry.cancel_batch(&first), 2);
        assert!(a.is_cancelled());
        assert!(b.is_cancelled());
        assert!(!other.is_cancelled());
        assert!(!second.is_cancelled());
        // Cancelled handles stay registered until dropped.
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn cancelling_a_batch_twice_counts_nothing_new() {
        let registry = InFlight::new();
        let batch = CancellationToken::new();
        let _a = registry.begin(&batch);

        assert_eq!(registry.cancel_batch(&batch), 1);
        assert_eq!(registry.cancel_batch(&batch), 0);
    }

    #[test]
    fn cancel_batch_on_empty_registry() {
        let batch = CancellationToken::new();
        assert_eq!(InFlight::new().cancel_batch(&batch), 0);
        assert!(batch.is_cancelled());
    }
}
