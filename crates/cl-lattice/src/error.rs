use cl_core::ClError;
use cl_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LatticeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("routing failed: {0}")]
    Routing(#[from] SpatialError),

    #[error(transparent)]
    Config(#[from] ClError),
}

pub type LatticeResult<T> = Result<T, LatticeError>;
