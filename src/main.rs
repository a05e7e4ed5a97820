pub mod action;
pub mod app;
pub mod cli;
pub mod clock;
pub mod components;
pub mod config;
pub mod constants;
pub mod pages;
pub mod storage;
pub mod tui;
pub mod utils;

use clap::Parser;
use color_eyre::eyre::Result;

use crate::{
    app::App,
    cli::Cli,
    config::Config,
    utils::{initialize_logging, initialize_panic_handler},
};

async fn tokio_main() -> Result<()> {
    let args = Cli::parse();

    initialize_logging()?;

    initialize_panic_handler()?;

    let mut config = Config::new()?;
    args.apply(&mut config.game);
    config.game = config.game.sanitized();
    tracing::info!("starting with {:?}", config.game);

    let mut app = App::new(config, args.seed)?;
    app.run().await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = tokio_main().await {
        eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
        Err(e)
    } else {
        Ok(())
    }
}
