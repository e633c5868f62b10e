use std::sync::Arc;
use std::time::Duration;

use sntp_rtc::{DnsResolver, Error, MemoryRtc, NetworkMonitor, SntpClient};
use tokio::time::sleep;

/// Converts a whole-hour timezone offset to seconds
fn tz_offset_seconds(hours: i32) -> sntp_rtc::Result<i32> {
    hours
        .checked_mul(3600)
        .ok_or_else(|| Error::config(format!("Timezone offset of {} hours is out of range", hours)))
}

#[tokio::main]
async fn main() -> sntp_rtc::Result<()> {
    tracing_subscriber::fmt::init();

    // Server and timezone offset (hours) from the command line
    let mut args = std::env::args().skip(1);
    let server = args.next();
    let tz_hours: i32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let tz_offset = tz_offset_seconds(tz_hours)?;

    let monitor = Arc::new(NetworkMonitor::new(false));
    let rtc = Arc::new(MemoryRtc::new());
    let client = SntpClient::new(
        monitor.clone(),
        Arc::new(DnsResolver::from_system_conf()?),
        rtc.clone(),
    );

    println!("Starting sync against {}", server.as_deref().unwrap_or("time1.google.com"));
    let handle = client.start(tz_offset, server.as_deref(), true)?;

    // Simulate the link coming up a moment later
    sleep(Duration::from_millis(500)).await;
    println!("- running: {}, synced: {}", client.is_running(), client.has_synced());
    monitor.set_up();

    let report = handle.join().await?;
    println!("\nRun finished after {:?}", report.elapsed);
    println!(
        "- states: {}",
        report
            .states
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    );
    match (&report.outcome, rtc.time()) {
        (Ok(synced), Some(time)) => {
            println!("- unix time: {}", synced.unix_seconds);
            println!("- clock set to: {} (weekday {})", time, time.weekday);
        }
        (Err(e), _) => println!("- failed: {}", e),
        (Ok(_), None) => println!("- clock was not written"),
    }
    println!("- running: {}, synced: {}", client.is_running(), client.has_synced());

    Ok(())
}
