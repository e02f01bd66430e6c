use std::sync::Arc;

use sqlx::SqlitePool;

use crate::storage::ObjectStorage;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub storage: Arc<dyn ObjectStorage>,
}
