mod config;
mod telemetry;

use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use config::{AppConfig, CliArgs, Mode};
use flakekey::{Base63Ext, Config, KeyMinter, PrimaryKey, process_generator};
use telemetry::init_telemetry;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    init_telemetry()?;
    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;

    match config.mode {
        Mode::Decode { key } => decode(&key, &config.generator),
        Mode::Mint { prefix, count } => mint(&config.generator, prefix, count).await,
    }
}

async fn mint(config: &Config, prefix: String, count: usize) -> anyhow::Result<()> {
    let generator = process_generator(config);
    tracing::info!(
        node_id = generator.origin().node_id(),
        process_id = generator.origin().process_id(),
        %prefix,
        count,
        "minting keys"
    );

    let minter = KeyMinter::new(Arc::clone(&generator));
    let mut task = tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        for _ in 0..count {
            writeln!(out, "{}", minter.make_key(&prefix)?)?;
        }
        out.flush()?;
        Ok(())
    });

    tokio::select! {
        res = &mut task => res?,
        () = shutdown_signal() => {
            generator.interrupt();
            match task.await? {
                Err(e) if e.downcast_ref::<flakekey::Error>() == Some(&flakekey::Error::Interrupted) => {
                    tracing::info!("minting interrupted");
                    Ok(())
                }
                res => res,
            }
        }
    }
}

fn decode(key: &str, config: &Config) -> anyhow::Result<()> {
    let key = PrimaryKey::parse(key)?;
    let id = key.id();
    let unix_millis = id.timestamp() + config.clock().epoch_millis();

    let mut out = io::stdout().lock();
    writeln!(out, "prefix:     {}", key.prefix())?;
    writeln!(out, "id:         {id}")?;
    writeln!(out, "encoded:    {}", id.encode())?;
    writeln!(out, "timestamp:  {} (unix ms {unix_millis})", id.timestamp())?;
    writeln!(out, "node_id:    {}", id.node_id())?;
    writeln!(out, "process_id: {}", id.process_id())?;
    writeln!(out, "sequence:   {}", id.sequence())?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C signal");
}
