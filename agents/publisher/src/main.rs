//! The publisher walks an ordered topic list and registers generated
//! educational content on chain, one topic at a time

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

mod publisher;
mod settings;

use color_eyre::Result;

use learnfi_base::agent::LearnFiAgent;

use crate::{publisher::Publisher, settings::PublisherSettings as Settings};

async fn _main(settings: Settings) -> Result<()> {
    let publisher = Publisher::from_settings(settings).await?;
    publisher.run().await?;
    Ok(())
}

fn setup() -> Result<Settings> {
    color_eyre::install()?;

    let settings = Settings::new()?;
    settings.base.tracing.try_init_tracing()?;
    Ok(settings)
}

fn main() -> Result<()> {
    let settings = setup()?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(_main(settings))
}
