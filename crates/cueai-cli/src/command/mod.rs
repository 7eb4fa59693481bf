use clap::{Parser, Subcommand};

use self::{choose_shot::ChooseShotArg, default_config::DefaultConfigArg};

mod choose_shot;
mod default_config;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Choose a shot for a board read from JSON
    ChooseShot(#[clap(flatten)] ChooseShotArg),
    /// Print the default AI configuration
    DefaultConfig(#[clap(flatten)] DefaultConfigArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args
        .mode
        .unwrap_or(Mode::DefaultConfig(DefaultConfigArg::default()))
    {
        Mode::ChooseShot(arg) => choose_shot::run(&arg)?,
        Mode::DefaultConfig(arg) => default_config::run(&arg)?,
    }
    Ok(())
}
