use socialdash_client::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("unknown product: {0}")]
    UnknownProduct(String),
}
