//! Domain-specific error types and error handling.

mod types;


pub use types::{
    LocationError, LocationErrorKind, OtpError, ProviderError, ProviderErrorKind,
};

pub type OtpResult<T> = Result<T, OtpError>;
pub type LocationResult<T> = Result<T, LocationError>;
