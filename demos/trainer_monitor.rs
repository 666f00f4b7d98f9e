use gattsense::{ConnectionParams, DeviceSession, Result, SensorKind};
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("🚴 Gattsense Trainer Monitor Example");
    info!("Searching for power meters and smart trainers...");

    let params = ConnectionParams {
        scan_timeout_ms: 8_000,
        ..Default::default()
    };

    let session = DeviceSession::new(SensorKind::PowerTrainer);
    let mut connection = match session.connect_first(&params).await {
        Ok(connection) => {
            info!("✅ Connected to: {}", connection.sensor().name);
            connection
        }
        Err(e) => {
            error!("❌ Failed to connect to trainer: {}", e);
            return Err(e);
        }
    };

    let state = session.shared_state();
    let display = tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(2));
        loop {
            ticker.tick().await;
            let state = state.read().await.clone();

            println!("\n📊 {}", state.name.as_deref().unwrap_or("Trainer"));
            println!("┌─────────────────────────────────────────┐");
            println!("│ Power:      {:>8?} W", state.power);
            println!("│ Bike power: {:>8?} W", state.instantaneous_power);
            println!(
                "│ Speed:      {:>8.2} km/h",
                state.speed.map_or(0.0, |s| f32::from(s) / 100.0)
            );
            println!(
                "│ Cadence:    {:>8.1} rpm",
                state.cadence.map_or(0.0, |c| f32::from(c) / 2.0)
            );
            if let Some(crank) = state.crank {
                println!("│ Crank revs: {:>8}", crank.revolutions);
            }
            if let Some(distance) = state.total_distance {
                println!("│ Distance:   {:>8} m", distance.meters());
            }
            println!("└─────────────────────────────────────────┘");
        }
    });

    let monitoring = async {
        loop {
            match session.run(&mut connection).await {
                Ok(()) => break,
                Err(e) if e.is_recoverable() => warn!("⏳ {}, is the trainer pedalled?", e),
                Err(e) if e.is_connection_error() => {
                    error!("❌ Lost connection to trainer: {}", e);
                    break;
                }
                Err(e) => {
                    warn!("❌ Notification stream failed: {}", e);
                    break;
                }
            }
        }
    };

    tokio::select! {
        () = monitoring => {}
        _ = tokio::signal::ctrl_c() => info!("Stopping..."),
    }

    display.abort();

    info!("🔌 Disconnecting...");
    if let Err(e) = connection.disconnect().await {
        error!("❌ Failed to disconnect: {}", e);
    } else {
        info!("✅ Disconnected successfully");
    }

    Ok(())
}
