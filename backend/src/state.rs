// backend/src/state.rs

use crate::catalog::Catalog;

#[derive(Debug)]
pub struct AppState {
    /// Read-only for the server's lifetime.
    pub catalog: Catalog,
}
