use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::session::SessionAuthority;

#[derive(Clone)]
pub struct AppState {
    pub orm: Arc<DatabaseConnection>,
    pub sessions: SessionAuthority,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, sessions: SessionAuthority) -> Self {
        Self {
            orm: Arc::new(orm),
            sessions,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// Statements recorded by a mock connection. The state must hold the last
    /// reference to it.
    pub fn into_transaction_log(self) -> Vec<sea_orm::Transaction> {
        Arc::try_unwrap(self.orm)
            .ok()
            .expect("connection is still shared")
            .into_transaction_log()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn clones_share_one_connection() {
        let state = AppState::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            SessionAuthority::new(&SessionConfig::with_secret("test-secret")),
        );
        let handler_copy = state.clone();
        assert!(Arc::ptr_eq(&state.orm, &handler_copy.orm));

        drop(handler_copy);
        assert!(state.into_transaction_log().is_empty());
    }
}
