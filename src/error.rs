use thiserror::Error;

use crate::api::ApiError;
use crate::scanner::DecoderError;

/// Every way a scan attempt can end without a result. None are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Please enter or scan a barcode to check.")]
    EmptyInput,
    #[error(transparent)]
    Lookup(#[from] ApiError),
    #[error("Error starting camera: {0}")]
    CameraInit(#[from] DecoderError),
}
