use std::collections::HashMap;
use std::sync::Arc;

use fieldbook_core::UserId;
use fieldbook_recon::WorkingSet;
use fieldbook_storage::DbPool;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Shared server state. Reconciliation working sets live here, in memory,
/// for the duration of one review session — a restart discards them.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    /// Acting user, stamped on every saved expense.
    pub user: UserId,
    pub sessions: Arc<Mutex<HashMap<Uuid, WorkingSet>>>,
}

impl AppState {
    pub fn new(db: DbPool, user: UserId) -> Self {
        Self {
            db,
            user,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}
