use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use cueai_engine::Shot;
use cueai_evaluator::{PoolAi, StrategyKind, config::AiConfig};
use serde::Serialize;
use tracing::info;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ChooseShotArg {
    /// Board JSON file
    #[arg(long)]
    board: PathBuf,
    /// AI variant: random, greedy, depth, nerfeddepth or biased
    #[arg(long, default_value = "greedy")]
    strategy: StrategyKind,
    /// AI configuration JSON file; omitted fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct ShotReport {
    shot: Shot,
    score: Option<f64>,
    candidates: usize,
    reachable: usize,
    elapsed_ms: u128,
}

pub(crate) fn run(arg: &ChooseShotArg) -> anyhow::Result<()> {
    let ChooseShotArg {
        board,
        strategy,
        config,
        output,
    } = arg;

    let board_file = util::read_board_file(board)?;
    let state = board_file
        .to_board_state()
        .with_context(|| format!("Invalid board in {}", board.display()))?;
    let config = match config {
        Some(path) => util::read_ai_config_file(path)?,
        None => AiConfig::default(),
    };
    info!(strategy = %strategy, board = %board.display(), "choosing shot");

    let ai = PoolAi::new(*strategy, config).context("Failed to set up AI")?;
    let decision = ai
        .decide(&Arc::new(state))
        .with_context(|| format!("Failed to choose a shot for {}", board.display()))?;

    let report = ShotReport {
        shot: decision.shot,
        score: decision.score,
        candidates: decision.candidates,
        reachable: decision.reachable,
        elapsed_ms: decision.elapsed.as_millis(),
    };
    Output::save_json(&report, output.clone())
}
