//! Continuous inventory example
//!
//! Connects over TCP (`READER_IP`) or serial (`READER_PORT`) and prints the
//! tags seen in ten seconds.

use std::time::Duration;

use anyhow::Context;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

use cfrust::{InventoryRequest, Poll, Reader, ReaderConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ReaderConfig::default();
    let mut reader = match std::env::var("READER_PORT") {
        Ok(port) => {
            println!("Opening {}...", port);
            Reader::open_serial(port, 115_200, config).await?
        }
        Err(_) => {
            let ip = std::env::var("READER_IP").unwrap_or_else(|_| "192.168.1.200".to_string());
            println!("Connecting to {}...", ip);
            Reader::connect_tcp(ip, 4001, config).await?
        }
    };

    let info = reader.get_info().await.context("reading device info")?;
    println!("Reader: {}", info);
    println!("RF power: {}", reader.rf_power().await?);

    reader.start_inventory(InventoryRequest::default()).await?;

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut seen = 0usize;
    while Instant::now() < deadline {
        match reader.poll_tag().await {
            Ok(Poll::Tag(tag)) => {
                seen += 1;
                println!("{}", tag);
            }
            Ok(Poll::Empty(_)) => {}
            Err(e) => {
                eprintln!("Poll failed ({}): {}", e.code(), e);
                break;
            }
        }
    }

    if let Err(e) = reader.stop_inventory().await {
        if !e.is_warning() {
            return Err(e.into());
        }
        eprintln!("Warning: {}", e);
    }
    println!("{} tag reports", seen);

    reader.close().await?;
    Ok(())
}
