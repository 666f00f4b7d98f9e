use gattsense::{ConnectionParams, DeviceSession, Measurement, Result, SensorKind};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("❤️  Gattsense Heart Rate Monitor Example");
    info!("Searching for heart-rate sensors...");

    let session = DeviceSession::new(SensorKind::HeartRateMonitor)
        .with_measurement_callback(|measurement| match measurement {
            Measurement::HeartRate(sample) => {
                let contact = match sample.contact_detected {
                    Some(true) => "contact",
                    Some(false) => "no contact",
                    None => "-",
                };
                println!(
                    "💓 {:3} bpm  [{contact}]  RR: {:?}",
                    sample.heart_rate, sample.rr_intervals
                );
            }
            Measurement::Battery(level) => println!("🔋 Battery: {level}%"),
            Measurement::BodyLocation(location) => println!("📍 Worn on: {location}"),
            _ => {}
        });

    let mut connection = match session.connect_first(&ConnectionParams::default()).await {
        Ok(connection) => {
            info!("✅ Connected to: {}", connection.sensor().name);
            connection
        }
        Err(e) => {
            error!("❌ Failed to connect to sensor: {}", e);
            return Err(e);
        }
    };

    info!("Press Ctrl+C to stop monitoring");

    let monitoring = async {
        loop {
            match session.run(&mut connection).await {
                Ok(()) => break,
                Err(e) if e.is_recoverable() => warn!("⏳ {}, still waiting...", e),
                Err(e) => {
                    error!("❌ Notification stream failed: {}", e);
                    break;
                }
            }
        }
    };

    tokio::select! {
        () = monitoring => {}
        _ = tokio::signal::ctrl_c() => info!("Stopping..."),
    }

    info!("🔌 Disconnecting...");
    if let Err(e) = connection.disconnect().await {
        error!("❌ Failed to disconnect: {}", e);
    }

    let state = session.state().await;
    println!("\n📊 Last known values:");
    println!("  Heart rate: {:?} bpm", state.heart_rate);
    println!("  Energy expended: {:?} kJ", state.energy_expended);
    println!("  Battery: {:?}%", state.battery);

    Ok(())
}
