use crate::auth::TokenSigner;
use crate::core::PipelineRunner;
use crate::db::{NoteStore, UserStore};
use crate::domain::ports::SnapshotStore;
use std::sync::Arc;

/// Shared application state for the serving layer.
pub struct AppState {
    pub snapshots: Arc<dyn SnapshotStore>,
    pub notes: NoteStore,
    pub users: UserStore,
    pub signer: TokenSigner,
    pub runner: Arc<PipelineRunner>,
    /// The one account that can never be deleted through the API.
    pub admin_name: String,
}

impl AppState {
    pub fn new(
        snapshots: Arc<dyn SnapshotStore>,
        notes: NoteStore,
        users: UserStore,
        signer: TokenSigner,
        runner: Arc<PipelineRunner>,
        admin_name: String,
    ) -> Self {
        Self {
            snapshots,
            notes,
            users,
            signer,
            runner,
            admin_name,
        }
    }
}
