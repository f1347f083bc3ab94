// src/main.rs
//! gps-decode - decode NMEA-0183 from stdin and print one JSON event per line

use gps_decoder::*;
use std::io::Write;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = DecoderConfig::load().unwrap_or_default();
    info!(max_pending_bytes = ?config.max_pending_bytes, "starting decoder");

    let mut decoder = NmeaDecoder::with_config(&config);
    let mut snapshot = GpsData::new();
    let mut events: Vec<NmeaEvent> = Vec::new();

    let mut stdin = tokio::io::stdin();
    let mut stdout = std::io::stdout().lock();
    let mut buffer = [0u8; 1024];

    loop {
        let n = stdin.read(&mut buffer).await?;
        if n == 0 {
            break; // EOF
        }

        decoder.feed(&buffer[..n], &mut events);
        for event in events.drain(..) {
            serde_json::to_writer(&mut stdout, &event)?;
            writeln!(stdout)?;
            event.deliver(&mut snapshot);
        }
        stdout.flush()?;
    }

    info!(
        fix = %snapshot.get_fix_description(),
        latitude = ?snapshot.latitude,
        longitude = ?snapshot.longitude,
        satellites_in_view = snapshot.satellites_info.len(),
        satellites_used = snapshot.satellites_used(),
        invalid_sentences = snapshot.invalid_sentences,
        pending_bytes = decoder.pending(),
        "end of input"
    );

    Ok(())
}
