#![doc = include_str!("../README.md")]

mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::command::{self, stdout};
use cli::config::{AppConfig, CliArgs, Command};
use cli::telemetry::init_telemetry;
use flakeuid::UidFacade;

// mimalloc keeps allocation cheap while many workers format ids at once.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;

    init_telemetry()?;

    if cfg!(debug_assertions) {
        tracing::debug!("starting with full config: {:#?}", config);
    }

    let facade = Arc::new(
        UidFacade::from_config(&config.uid).context("failed to build the uid generator")?,
    );

    match config.command {
        Command::Generate { count, workers } => {
            command::generate(&*facade, count, workers, stdout())
        }
        Command::Decompose { uid } => command::decompose(&facade, &uid, stdout()),
    }
}
