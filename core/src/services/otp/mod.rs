//! OTP dispatch: rate limiting, backoff and bounded provider retries

pub mod backoff;
pub mod controller;
pub mod rate_limit;
pub mod traits;

pub use backoff::ExponentialBackoff;
pub use controller::OtpDispatchController;
pub use rate_limit::RateLimitPolicy;
pub use traits::PhoneAuthProvider;

#[cfg(test)]
mod tests;
