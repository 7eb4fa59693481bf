//! AI variants: which pipeline stages run for a decision.
//!
//! | [`StrategyKind`] | Simulation | Easy-shot bias | Look-ahead            |
//! |------------------|------------|----------------|-----------------------|
//! | `Random`         | no         | no             | no                    |
//! | `Greedy`         | yes        | no             | no                    |
//! | `Biased`         | yes        | yes            | no                    |
//! | `Depth`          | yes        | no             | full angle resolution |
//! | `NerfedDepth`    | yes        | no             | reduced resolution    |
//!
//! `Random` is the baseline: a uniform angle and one of the configured magnitudes drawn
//! from the decision's seeded generator. Every other variant shares the same generator,
//! filter and scoring code in [`crate::search`], so they differ only in the stages
//! listed above.
//!
//! All variants implement [`ShotSelector`], the common "pick a shot" capability used by
//! [`crate::DecisionWorker`].

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use cueai_engine::{BoardState, Shot, Simulator, StepParams, TableGeometry, TableSimulator};
use rand::{Rng as _, seq::IndexedRandom as _};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    SearchError,
    config::AiConfig,
    ranking::Ranked,
    search::{PlyOptions, ScoredCandidate, SearchResult, ShotSearch},
    shot_space::{decision_rng, respot_cue_ball},
};

/// Magnitude of the fallback shot when no magnitude is configured.
const SAFE_DEFAULT_MAGNITUDE: f64 = 75.0;

/// The closed set of AI variants.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Random,
    #[default]
    Greedy,
    Depth,
    NerfedDepth,
    Biased,
}

/// A chosen shot and how it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub shot: Shot,
    /// Ranking score of the shot; `None` for the random baseline.
    pub score: Option<f64>,
    /// Number of generated candidates.
    pub candidates: usize,
    /// Number of candidates that passed the reachability filter.
    pub reachable: usize,
    pub elapsed: Duration,
}

/// Anything that can pick a shot for a board.
pub trait ShotSelector {
    fn decide(&self, board: &Arc<BoardState>) -> Result<Decision, SearchError>;

    fn choose_shot(&self, board: &Arc<BoardState>) -> Result<Shot, SearchError> {
        Ok(self.decide(board)?.shot)
    }
}

/// A billiards AI of one [`StrategyKind`].
///
/// `S` is the physics engine; each search worker gets its own clone.
#[derive(Debug, Clone)]
pub struct PoolAi<S = TableSimulator> {
    kind: StrategyKind,
    config: AiConfig,
    simulator: S,
    table: TableGeometry,
    step: StepParams,
    pool: Option<Arc<ThreadPool>>,
}

impl PoolAi {
    /// Creates an AI backed by the built-in [`TableSimulator`].
    pub fn new(kind: StrategyKind, config: AiConfig) -> Result<Self, SearchError> {
        Self::with_simulator(kind, config, TableSimulator::new())
    }
}

impl<S> PoolAi<S>
where
    S: Simulator + Clone + Send + Sync,
{
    /// Creates an AI backed by `simulator`.
    ///
    /// Fails if the configuration is invalid or the dedicated thread pool cannot be
    /// built.
    pub fn with_simulator(
        kind: StrategyKind,
        config: AiConfig,
        simulator: S,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        let pool = match config.search.threads {
            Some(threads) => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("cueai-search-{i}"))
                    .build()
                    .map_err(|e| SearchError::ThreadPool {
                        message: e.to_string(),
                    })?;
                Some(Arc::new(pool))
            }
            None => None,
        };
        Ok(Self {
            kind,
            config,
            simulator,
            table: TableGeometry::STANDARD,
            step: StepParams::STANDARD,
            pool,
        })
    }

    #[must_use]
    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    #[must_use]
    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Picks a shot for the player to move on `board`.
    pub fn decide(&self, board: &Arc<BoardState>) -> Result<Decision, SearchError> {
        let start = Instant::now();
        let mut decision = match &self.pool {
            Some(pool) => pool.install(|| self.run(board)),
            None => self.run(board),
        }?;
        decision.elapsed = start.elapsed();
        info!(
            strategy = %self.kind,
            angle = decision.shot.angle,
            magnitude = decision.shot.magnitude,
            score = decision.score,
            candidates = decision.candidates,
            reachable = decision.reachable,
            elapsed_ms = decision.elapsed.as_millis(),
            "shot chosen"
        );
        Ok(decision)
    }

    /// Like [`ShotSelector::choose_shot`], but never fails.
    ///
    /// A failed decision is logged and replaced by [`Shot::safe_default`] so the player
    /// still acts.
    #[must_use]
    pub fn choose_shot_or_default(&self, board: &Arc<BoardState>) -> Shot {
        match self.decide(board) {
            Ok(decision) => decision.shot,
            Err(err) => {
                error!(%err, strategy = %self.kind, "decision failed, playing safe default");
                let magnitude = self
                    .config
                    .search
                    .magnitudes
                    .first()
                    .copied()
                    .unwrap_or(SAFE_DEFAULT_MAGNITUDE);
                Shot::safe_default(board.cue_ball().pocketed, magnitude, &self.table)
            }
        }
    }

    fn run(&self, board: &Arc<BoardState>) -> Result<Decision, SearchError> {
        let angle_count = self.config.search.angle_count;
        match self.kind {
            StrategyKind::Random => self.random(board),
            StrategyKind::Greedy => self.greedy(board, false),
            StrategyKind::Biased => self.greedy(board, true),
            StrategyKind::Depth => self.depth(board, angle_count),
            StrategyKind::NerfedDepth => {
                self.depth(board, self.config.search.lookahead_angle_count)
            }
        }
    }

    fn search(&self) -> ShotSearch<'_, S> {
        ShotSearch::new(&self.simulator, &self.config, self.table, self.step)
    }

    fn random(&self, board: &Arc<BoardState>) -> Result<Decision, SearchError> {
        let search = &self.config.search;
        let mut rng = decision_rng(search.seed, board);
        let placement = if board.cue_ball().pocketed {
            Some(respot_cue_ball(
                board,
                &self.table,
                &mut rng,
                search.respot_attempts,
            )?)
        } else {
            None
        };
        let angle = rng.random_range(0.0..360.0);
        let magnitude = *search
            .magnitudes
            .choose(&mut rng)
            .ok_or(SearchError::EmptyMagnitudes)?;
        let shot = Shot::new(angle, magnitude);
        Ok(Decision {
            shot: match placement {
                Some(position) => shot.with_cue_ball_position(position),
                None => shot,
            },
            score: None,
            candidates: 1,
            reachable: 1,
            elapsed: Duration::ZERO,
        })
    }

    fn greedy(&self, board: &Arc<BoardState>, biased: bool) -> Result<Decision, SearchError> {
        let result = self.search().run_ply(
            board,
            PlyOptions {
                angle_count: self.config.search.angle_count,
                biased,
            },
        )?;
        select(result.ranked.first(), result.candidates, result.reachable)
    }

    fn depth(
        &self,
        board: &Arc<BoardState>,
        lookahead_angle_count: u32,
    ) -> Result<Decision, SearchError> {
        let search = self.search();
        let result = search.run_ply(
            board,
            PlyOptions {
                angle_count: self.config.search.angle_count,
                biased: false,
            },
        )?;
        let SearchResult {
            ranked,
            candidates,
            reachable,
        } = result;
        let rescored = search.lookahead(board.turn(), ranked, lookahead_angle_count)?;
        select(rescored.first(), candidates, reachable)
    }
}

impl<S> ShotSelector for PoolAi<S>
where
    S: Simulator + Clone + Send + Sync,
{
    fn decide(&self, board: &Arc<BoardState>) -> Result<Decision, SearchError> {
        PoolAi::decide(self, board)
    }
}

fn select(
    best: Option<&Ranked<ScoredCandidate>>,
    candidates: usize,
    reachable: usize,
) -> Result<Decision, SearchError> {
    let best = best.ok_or(SearchError::NoCandidates)?;
    Ok(Decision {
        shot: best.item.shot,
        score: Some(best.score),
        candidates,
        reachable,
        elapsed: Duration::ZERO,
    })
}
