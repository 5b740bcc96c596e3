//! Shared application state handed to every handler.

use std::sync::Arc;

use medipos_db::Database;

use crate::auth::JwtManager;

/// Application state: the database handle plus the JWT manager.
///
/// Cloning is cheap; axum clones this per request.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, jwt: JwtManager) -> Self {
        AppState {
            db,
            jwt: Arc::new(jwt),
        }
    }
}
