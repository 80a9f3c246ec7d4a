//! `apnatoon-pcm2wav`: wraps a raw narration PCM file in a WAV container.

use std::error::Error;

use apnatoon_core::config::EngineConfig;
use apnatoon_engine::pcm2wav::{Pcm2WavArgs, convert_file};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let args = Pcm2WavArgs::parse(std::env::args().skip(1))?;
    let config = EngineConfig::from_env()?;

    let written = convert_file(&args.input, &args.output, config.sample_rate).await?;
    tracing::info!(bytes = written, "done");

    Ok(())
}
