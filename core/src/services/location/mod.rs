//! Device location: one-shot refinement, bounded watches, address labels
//! and nearby filtering

pub mod address;
pub mod nearby;
pub mod resolver;
pub mod traits;
pub mod watch;

pub use address::address_label;
pub use nearby::{filter_nearby, Located};
pub use resolver::LocationResolver;
pub use traits::{GeolocationProvider, PositionSink, ReverseGeocoder};
pub use watch::{LocationWatch, WatchEnd, WatchHandle};

#[cfg(test)]
mod tests;
