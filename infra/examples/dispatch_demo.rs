//! Example wiring the OTP controller and location resolver to the
//! development adapters
//!
//! Run with: cargo run -p civic_infra --example dispatch_demo

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use civic_core::errors::ProviderErrorKind;
use civic_core::repositories::InMemoryRateLimitStore;
use civic_core::services::{LocationResolver, OtpDispatchController};
use civic_infra::auth::{create_phone_auth, PhoneAuthClient};
use civic_infra::geo::{SimulatedFix, SimulatedGeolocation};
use civic_infra::{load_config, telemetry};
use civic_shared::Coordinate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("loading configuration")?;
    telemetry::init_tracing(&config.app.logging).context("initialising tracing")?;

    // === OTP dispatch ===
    let client = Arc::new(create_phone_auth(&config)?);
    if let PhoneAuthClient::Dev(dev) = client.as_ref() {
        // Throttled once, so the first send retries after a backoff
        dev.queue_failures([ProviderErrorKind::TooManyRequests]);
    }
    let store = Arc::new(InMemoryRateLimitStore::new());
    let controller = OtpDispatchController::new(client.clone(), store, config.app.otp.clone());

    let phone = config.dev_auth.test_number.clone();
    println!("\n=== Sending OTP to {} ===", phone);
    let handle = controller.request_send(&phone).await?;
    println!("Session: {}", handle.verification_id);

    let session = controller
        .confirm_code(&handle, &config.dev_auth.test_code)
        .await?;
    println!("Signed in as {} (new user: {})", session.user_id, session.is_new_user);

    println!("\nHammering the same number with a failing network:");
    if let PhoneAuthClient::Dev(dev) = client.as_ref() {
        dev.queue_failures([ProviderErrorKind::Network; 5]);
    }
    for attempt in 1..=5 {
        match controller.request_send(&phone).await {
            Ok(_) => println!("Request {}: sent", attempt),
            Err(e) => println!("Request {}: {}", attempt, e.user_message()),
        }
    }

    // === Location ===
    let here = Coordinate::new(13.0418, 80.2341);
    let device = Arc::new(
        SimulatedGeolocation::new()
            .with_fixes([
                SimulatedFix::reading(Duration::from_millis(200), here, 640.0),
                SimulatedFix::reading(Duration::from_millis(400), here, 18.0),
            ])
            .with_watch_script([
                SimulatedFix::reading(Duration::from_millis(300), here, 220.0),
                SimulatedFix::reading(Duration::from_millis(300), here, 60.0),
                SimulatedFix::reading(Duration::from_millis(300), here, 9.0),
            ]),
    );
    let resolver = LocationResolver::new(device, config.app.location.clone());

    println!("\n=== Resolving position ===");
    let reading = resolver.resolve_once(None).await?;
    println!(
        "{} (±{:.0} m) -> {}",
        reading.coordinate(),
        reading.accuracy_meters,
        resolver.address_for(reading.coordinate()).await
    );

    println!("\n=== Watching until accurate ===");
    let mut watch = resolver.watch_until_accurate().await?;
    while let Some(update) = watch.next().await {
        let reading = update?;
        println!("  ±{:.0} m", reading.accuracy_meters);
    }
    println!("Watch ended: {:?}", watch.end_reason());

    Ok(())
}
