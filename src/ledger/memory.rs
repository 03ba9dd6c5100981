use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::{
    error::{EngineError, Result},
    ledger::{
        LedgerClient,
        types::{DrawBatch, DrawPayload, TransactionHandle},
    },
};

/// Ledger that commits batches into process memory instead of a chain.
/// Backs the offline demo and the test suite; `fail_submissions` lets
/// callers exercise the retry path.
#[derive(Debug)]
pub struct InMemoryLedger {
    module_id: String,
    committed: Mutex<Vec<(TransactionHandle, DrawPayload)>>,
    fail_submissions: AtomicBool,
}

impl InMemoryLedger {
    pub fn new(module_id: &str) -> Self {
        Self {
            module_id: module_id.to_string(),
            committed: Mutex::new(Vec::new()),
            fail_submissions: AtomicBool::new(false),
        }
    }

    pub fn fail_submissions(&self, fail: bool) {
        self.fail_submissions.store(fail, Ordering::SeqCst);
    }

    pub fn committed(&self) -> Vec<DrawPayload> {
        self.committed
            .lock()
            .expect("ledger mutex poisoned")
            .iter()
            .map(|(_, payload)| payload.clone())
            .collect()
    }
}

impl LedgerClient for InMemoryLedger {
    fn submit_draw(
        &self,
        canvas_address: &str,
        batch: DrawBatch,
    ) -> BoxFuture<'_, Result<TransactionHandle>> {
        let payload = DrawPayload::new(&self.module_id, canvas_address, &batch);
        Box::pin(async move {
            if self.fail_submissions.load(Ordering::SeqCst) {
                return Err(EngineError::SubmissionFailed(
                    "In-memory ledger is configured to reject submissions".into(),
                ));
            }

            let handle = TransactionHandle(Uuid::new_v4().to_string());
            tracing::debug!(payload = %serde_json::to_string(&payload)?, "Signed draw payload");
            tracing::info!(
                txn = %handle,
                pixels = batch.len(),
                function = %payload.function,
                "Committed draw batch to in-memory ledger"
            );
            self.committed
                .lock()
                .expect("ledger mutex poisoned")
                .push((handle.clone(), payload));
            Ok(handle)
        })
    }

    fn wait_for_confirmation(&self, handle: TransactionHandle) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let known = self
                .committed
                .lock()
                .expect("ledger mutex poisoned")
                .iter()
                .any(|(committed_handle, _)| *committed_handle == handle);
            if known {
                Ok(())
            } else {
                Err(EngineError::ConfirmationFailed(format!(
                    "Unknown transaction {handle}"
                )))
            }
        })
    }
}
