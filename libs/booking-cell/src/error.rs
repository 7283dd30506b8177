use thiserror::Error;

use directory_cell::DirectoryError;
use messaging_cell::GatewayError;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Clinic directory unavailable: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Messaging gateway unavailable: {0}")]
    Gateway(#[from] GatewayError),
}
