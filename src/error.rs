#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),

    #[error("login failed: {0}")]
    Login(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("ledger rejected batch: {0}")]
    Ledger(String),
}
