//! Services containing the OTP and location use cases.

pub mod clock;
pub mod location;
pub mod otp;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use location::{
    address_label, filter_nearby, GeolocationProvider, Located, LocationResolver, LocationWatch,
    PositionSink, ReverseGeocoder, WatchEnd, WatchHandle,
};
pub use otp::{ExponentialBackoff, OtpDispatchController, PhoneAuthProvider, RateLimitPolicy};
