use futures::future::BoxFuture;

use crate::error::Result;

pub mod memory;
pub mod types;

pub use memory::InMemoryLedger;
pub use types::{DrawBatch, DrawPayload, TransactionHandle};

/// The external transaction system of record for canvas edits. The engine
/// only needs to hand over a draw batch and learn whether it landed;
/// everything else about the chain stays opaque behind this trait.
///
/// Implementations own any retry/timeout behavior of the transport. A
/// returned handle does not mean the edits are final - callers must await
/// `wait_for_confirmation` before treating the batch as committed.
pub trait LedgerClient: Send + Sync {
    fn submit_draw(
        &self,
        canvas_address: &str,
        batch: DrawBatch,
    ) -> BoxFuture<'_, Result<TransactionHandle>>;

    fn wait_for_confirmation(&self, handle: TransactionHandle) -> BoxFuture<'_, Result<()>>;
}
