// Demo: a complete roast driven by a manual clock
//
// This demo runs the full recorder lifecycle without real delays:
// 1. Configure a session (Ethiopia Guji, charge 195 °C)
// 2. Start the roast and advance simulated time second by second
// 3. Nudge the temperature along a rough roast curve
// 4. Mark first crack at 9:00 and end the roast at 11:00
// 5. Print the summary, its DTR color, and the CSV export
//
// Usage: cargo run --example simulated_roast

use anyhow::Result;
use roastlog::{export, ManualClock, RoastRecorder, SessionConfig, TemperatureUnit};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};

const FIRST_CRACK_AT: u64 = 540; // 9:00
const DROP_AT: u64 = 660; // 11:00

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let clock = Arc::new(ManualClock::new());
    let session = SessionConfig::new("Ethiopia Guji", 195.0, TemperatureUnit::Celsius)?;
    let recorder = RoastRecorder::new(session, clock.clone(), Duration::from_millis(100));

    recorder.start().await;
    // The real sampler polls on a wall-clock cadence; this demo drives the
    // same step by hand so eleven minutes pass instantly.
    recorder.stop_sampling().await;

    for second in 1..=DROP_AT {
        clock.advance_secs(1);
        recorder.tick().await;

        // Rough roast curve: drop toward the turning point, then climb.
        if second <= 90 {
            if second % 2 == 0 {
                recorder.decrease_temperature().await;
            }
        } else if second % 8 == 0 {
            recorder.increase_temperature().await;
        }

        if second == FIRST_CRACK_AT {
            recorder.mark_first_crack().await;
        }
    }

    let Some(summary) = recorder.end().await else {
        anyhow::bail!("roast did not end");
    };

    info!(
        "Summary: {} over {}s, DTR {:.1}% ({})",
        summary.bean_name,
        summary.total_elapsed_seconds,
        summary.development_time_ratio,
        summary.dtr_color().hex()
    );

    println!("{}", export::summary_csv(&summary));

    Ok(())
}
