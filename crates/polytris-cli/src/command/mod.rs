use clap::{Parser, Subcommand};

use self::{auto_play::AutoPlayArg, catalog::CatalogArg};

mod auto_play;
mod catalog;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Let a strategy play a game on its own
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Print the pieces of a catalog with all their rotations
    Catalog(#[clap(flatten)] CatalogArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
        Mode::Catalog(arg) => catalog::run(&arg)?,
    }
    Ok(())
}
