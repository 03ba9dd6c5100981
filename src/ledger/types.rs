use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::canvas::pending::PendingEdits;

/// Pixel edits as the parallel column vectors the `draw` entry function
/// takes. Column order follows the pending map's sorted iteration, so the
/// same edits always produce the same batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawBatch {
    pub xs: Vec<u32>,
    pub ys: Vec<u32>,
    pub rs: Vec<u8>,
    pub gs: Vec<u8>,
    pub bs: Vec<u8>,
}

impl DrawBatch {
    pub fn from_pending(pending: &PendingEdits) -> Self {
        let mut batch = Self::default();
        for ((x, y), color) in pending.iter() {
            batch.xs.push(x);
            batch.ys.push(y);
            batch.rs.push(color.r);
            batch.gs.push(color.g);
            batch.bs.push(color.b);
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

/// Opaque reference to a submitted transaction, as issued by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHandle(pub String);

impl std::fmt::Display for TransactionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The entry-function payload a wallet signs for a draw call.
#[derive(Debug, Clone, Serialize)]
pub struct DrawPayload {
    #[serde(rename = "type")]
    pub payload_type: &'static str,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<serde_json::Value>,
}

impl DrawPayload {
    pub fn new(module_id: &str, canvas_address: &str, batch: &DrawBatch) -> Self {
        Self {
            payload_type: "entry_function_payload",
            function: format!("{module_id}::draw"),
            type_arguments: Vec::new(),
            arguments: vec![
                json!(canvas_address),
                json!(batch.xs),
                json!(batch.ys),
                json!(batch.rs),
                json!(batch.gs),
                json!(batch.bs),
            ],
        }
    }
}
