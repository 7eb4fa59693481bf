//! The simulate-and-score stage and the one-ply look-ahead.
//!
//! [`ShotSearch::run_ply`] performs GENERATE → FILTER → SIMULATE+SCORE for one board:
//!
//! 1. [`ShotSpace::generate`] builds the candidate list (and places an off-table cue
//!    ball); biased plies add easy-shot bonuses.
//! 2. [`ShotVerifier::is_reachable`] filters it. If nothing survives, the full list is
//!    used instead so the player still has something to play.
//! 3. Candidates are simulated in parallel. Each rayon worker clones its own simulator
//!    (`map_init`) and keeps a local [`TopK`] (`try_fold`); the partial rankings are
//!    merged with `try_reduce`. The first simulation error aborts the ply.
//!
//! A candidate scores
//!
//! ```text
//! board_evaluator(result, mover) + complexity · tracker.score() + easy-shot bonus
//! ```
//!
//! [`ShotSearch::lookahead`] then replaces each ranked candidate's score with the best
//! reply found on its resulting board, negated when the reply belongs to the opponent.
//! Terminal results keep their win/loss score.

use std::sync::Arc;

use cueai_engine::{BoardState, Player, Shot, Simulator, StepParams, TableGeometry};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    SearchError,
    board_evaluator::BoardEvaluator,
    complexity::ComplexityTracker,
    config::AiConfig,
    ranking::{Ranked, TopK},
    shot_space::{Candidate, ShotSpace, decision_rng},
    shot_verifier::ShotVerifier,
};

/// A simulated candidate.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub shot: Shot,
    pub score: f64,
    /// The resting board the shot produced.
    pub board: Arc<BoardState>,
    pub complexity: ComplexityTracker,
}

/// Resolution and bias of one ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlyOptions {
    pub angle_count: u32,
    pub biased: bool,
}

/// Result of one ply.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best first, at most `top_k` entries.
    pub ranked: Vec<Ranked<ScoredCandidate>>,
    /// Number of generated candidates.
    pub candidates: usize,
    /// Number of candidates that passed the reachability filter.
    pub reachable: usize,
}

impl SearchResult {
    #[must_use]
    pub fn best(&self) -> Option<&Ranked<ScoredCandidate>> {
        self.ranked.first()
    }

    /// `true` when nothing was reachable and unfiltered candidates were ranked.
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.reachable == 0
    }
}

/// Runs plies against one simulator prototype.
#[derive(Debug)]
pub struct ShotSearch<'a, S> {
    simulator: &'a S,
    config: &'a AiConfig,
    table: TableGeometry,
    step: StepParams,
    verifier: ShotVerifier,
    evaluator: BoardEvaluator,
}

impl<'a, S> ShotSearch<'a, S>
where
    S: Simulator + Clone + Send + Sync,
{
    /// Creates a search.
    ///
    /// # Arguments
    ///
    /// * `simulator` - Prototype cloned once per rayon worker
    /// * `config` - Weights and search parameters
    /// * `table` - Table dimensions shared by verifier, evaluator and generator
    /// * `step` - Integration parameters for every simulated shot
    #[must_use]
    pub fn new(
        simulator: &'a S,
        config: &'a AiConfig,
        table: TableGeometry,
        step: StepParams,
    ) -> Self {
        Self {
            simulator,
            config,
            table,
            step,
            verifier: ShotVerifier::new(table),
            evaluator: BoardEvaluator::new(config.weights, table),
        }
    }

    /// Generates, filters, simulates and ranks the candidates for the player to move.
    pub fn run_ply(
        &self,
        board: &Arc<BoardState>,
        options: PlyOptions,
    ) -> Result<SearchResult, SearchError> {
        let search = &self.config.search;
        let mut rng = decision_rng(search.seed, board);
        let mut space = ShotSpace::generate(
            board,
            &search.magnitudes,
            options.angle_count,
            &mut rng,
            search.respot_attempts,
            &self.table,
        )?;
        if options.biased {
            space = space.with_easy_shot_bias(board, &self.verifier, &self.config.weights);
        }
        debug!(
            candidates = space.len(),
            placement = ?space.placement(),
            "generated shot candidates"
        );

        let cue_position = space.cue_position();
        let reachable: Vec<&Candidate> = space
            .candidates()
            .par_iter()
            .filter(|c| {
                self.verifier
                    .is_reachable(&c.shot, cue_position, board.balls())
            })
            .collect();
        let reachable_count = reachable.len();
        debug!(reachable = reachable_count, "filtered unreachable shots");

        let pool = if reachable.is_empty() {
            warn!(
                candidates = space.len(),
                "no reachable shot, ranking unfiltered candidates"
            );
            space.candidates().iter().collect()
        } else {
            reachable
        };

        let top_k = search.top_k;
        let top = pool
            .par_iter()
            .map_init(
                || self.simulator.clone(),
                |simulator, candidate| self.evaluate(simulator, board, candidate),
            )
            .try_fold(
                || TopK::new(top_k),
                |mut top, scored| {
                    top.insert(scored?);
                    Ok::<_, SearchError>(top)
                },
            )
            .try_reduce(|| TopK::new(top_k), |left, right| Ok(left.merge(right)))?;

        let ranked = top.into_sorted_vec();
        debug!(
            ranked = ranked.len(),
            best = ranked.first().map(|r| r.score),
            "simulated and scored candidates"
        );
        Ok(SearchResult {
            ranked,
            candidates: space.len(),
            reachable: reachable_count,
        })
    }

    /// Simulates one candidate and scores the resting board for the player to move.
    pub fn evaluate(
        &self,
        simulator: &mut S,
        board: &Arc<BoardState>,
        candidate: &Candidate,
    ) -> Result<Ranked<ScoredCandidate>, SearchError> {
        simulator.load(board);
        simulator.shoot(&candidate.shot)?;
        let mut tracker = ComplexityTracker::new(board, &candidate.shot);
        simulator.simulate_until_still(&self.step, &mut tracker)?;
        let result = Arc::new(simulator.current_board_state()?);
        tracker.finish(&result);

        let weights = &self.config.weights;
        let score = self.evaluator.score(&result, board.turn())
            + weights.complexity * tracker.score(weights, self.table.diagonal())
            + candidate.bonus;
        Ok(Ranked {
            score,
            index: candidate.index,
            item: ScoredCandidate {
                shot: candidate.shot,
                score,
                board: result,
                complexity: tracker,
            },
        })
    }

    /// Rescores `ranked` by the best reply on each resulting board.
    ///
    /// # Arguments
    ///
    /// * `mover` - Player who chose the ranked shots
    /// * `ranked` - Candidates from [`Self::run_ply`]
    /// * `angle_count` - Angle resolution of the reply search
    ///
    /// # Returns
    ///
    /// The same candidates re-sorted best first by their corrected scores.
    pub fn lookahead(
        &self,
        mover: Player,
        ranked: Vec<Ranked<ScoredCandidate>>,
        angle_count: u32,
    ) -> Result<Vec<Ranked<ScoredCandidate>>, SearchError> {
        let options = PlyOptions {
            angle_count,
            biased: false,
        };
        let mut rescored = ranked
            .into_par_iter()
            .map(|mut entry| -> Result<_, SearchError> {
                let result = &entry.item.board;
                if result.is_terminal() {
                    return Ok(entry);
                }
                let reply = self.run_ply(result, options)?;
                if let Some(best) = reply.best() {
                    let score = if result.turn() == mover {
                        best.score
                    } else {
                        -best.score
                    };
                    entry.score = score;
                    entry.item.score = score;
                }
                Ok(entry)
            })
            .collect::<Result<Vec<_>, _>>()?;
        rescored.sort_by(|a, b| b.cmp(a));
        debug!(
            candidates = rescored.len(),
            best = rescored.first().map(|r| r.score),
            "look-ahead rescored candidates"
        );
        Ok(rescored)
    }
}

#[cfg(test)]
mod tests {
    use cueai_engine::{Ball, geometry::angle_towards};
    use glam::DVec2;

    use super::*;
    use crate::{config::SearchConfig, test_support::ScriptedSimulator};

    fn at(number: u8, x: f64, y: f64) -> Ball {
        Ball::new(number, DVec2::new(x, y))
    }

    fn config(angle_count: u32) -> AiConfig {
        AiConfig {
            search: SearchConfig {
                angle_count,
                lookahead_angle_count: angle_count,
                top_k: 3,
                ..SearchConfig::default()
            },
            ..AiConfig::default()
        }
    }

    fn searcher<'a, S>(simulator: &'a S, config: &'a AiConfig) -> ShotSearch<'a, S>
    where
        S: Simulator + Clone + Send + Sync,
    {
        ShotSearch::new(simulator, config, TableGeometry::STANDARD, StepParams::STANDARD)
    }

    fn ply(angle_count: u32) -> PlyOptions {
        PlyOptions {
            angle_count,
            biased: false,
        }
    }

    fn board() -> Arc<BoardState> {
        Arc::new(
            BoardState::new(
                Ball::cue(DVec2::new(1.0, 1.8)),
                vec![at(1, 3.0, 1.8), at(8, 5.0, 0.9), at(12, 4.0, 3.0)],
                Player::Player1,
            )
            .unwrap()
            .with_shot_index(4)
            .unwrap(),
        )
    }

    #[test]
    fn test_best_candidate_pots_own_ball() {
        let simulator = ScriptedSimulator::default();
        let config = config(360);
        let search = searcher(&simulator, &config);
        let result = search
            .run_ply(&board(), ply(360))
            .unwrap();

        assert_eq!(result.candidates, 3 * 360);
        assert!(!result.used_fallback());
        assert_eq!(result.ranked.len(), 3);
        let best = result.best().unwrap();
        assert_eq!(best.item.shot.angle, 0.0);
        assert!(best.item.shot.magnitude >= 100.0);
        assert!(best.item.board.ball(1).unwrap().pocketed);
        assert_eq!(best.item.board.turn(), Player::Player1);
    }

    #[test]
    fn test_ranking_is_best_first_and_ties_prefer_lower_index() {
        let simulator = ScriptedSimulator::default();
        let config = config(360);
        let search = searcher(&simulator, &config);
        let result = search
            .run_ply(&board(), ply(360))
            .unwrap();
        for pair in result.ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                assert!(pair[0].index < pair[1].index);
            }
        }
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let simulator = ScriptedSimulator::default();
        let config = config(120);
        let search = searcher(&simulator, &config);
        let board = board();
        let options = ply(120);
        let parallel = search.run_ply(&board, options).unwrap();
        let sequential = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap()
            .install(|| search.run_ply(&board, options))
            .unwrap();
        let indices = |r: &SearchResult| r.ranked.iter().map(|e| e.index).collect::<Vec<_>>();
        assert_eq!(indices(&parallel), indices(&sequential));
    }

    #[test]
    fn test_blocked_board_falls_back_to_unfiltered_candidates() {
        let center = DVec2::new(3.0, 1.8);
        // 15 balls on a ring block every back-swing cone
        let ring: Vec<Ball> = (1..=15u8)
            .map(|n| {
                let angle = (f64::from(n) * 24.0).to_radians();
                Ball::new(n, center + DVec2::new(angle.cos(), angle.sin()) * 0.5)
            })
            .collect();
        let board = Arc::new(
            BoardState::new(Ball::cue(center), ring, Player::Player2)
                .unwrap()
                .with_shot_index(3)
                .unwrap(),
        );
        let simulator = ScriptedSimulator::default();
        let config = config(72);
        let search = searcher(&simulator, &config);
        let result = search
            .run_ply(&board, ply(72))
            .unwrap();
        assert!(result.used_fallback());
        assert_eq!(result.candidates, 3 * 72);
        assert!(result.best().is_some());
    }

    #[test]
    fn test_biased_ply_prefers_easy_shot() {
        let simulator = ScriptedSimulator::default();
        let config = config(360);
        let search = searcher(&simulator, &config);
        let board = board();
        let plain = search
            .run_ply(&board, ply(360))
            .unwrap();
        let biased = search
            .run_ply(&board, PlyOptions {
                angle_count: 360,
                biased: true,
            })
            .unwrap();
        let easy = angle_towards(board.cue_ball().position, board.ball(1).unwrap().position);
        assert_eq!(biased.best().unwrap().item.shot.angle, easy);
        let bonus = config.weights.great_shot;
        assert!((biased.best().unwrap().score - plain.best().unwrap().score - bonus).abs() < 1e-9);
    }

    #[test]
    fn test_lookahead_scores_from_mover_perspective() {
        let simulator = ScriptedSimulator::default();
        let config = config(90);
        let search = searcher(&simulator, &config);
        let board = board();
        let first = search
            .run_ply(&board, ply(90))
            .unwrap();
        let rescored = search
            .lookahead(Player::Player1, first.ranked.clone(), 90)
            .unwrap();
        assert_eq!(rescored.len(), first.ranked.len());
        for entry in &rescored {
            let reply = search
                .run_ply(&entry.item.board, ply(90))
                .unwrap();
            let expected = if entry.item.board.turn() == Player::Player1 {
                reply.best().unwrap().score
            } else {
                -reply.best().unwrap().score
            };
            assert_eq!(entry.score, expected);
        }
        for pair in rescored.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn test_lookahead_keeps_terminal_scores() {
        // Player1's solids are all off the table, so potting the 8-ball wins.
        let board = Arc::new(
            BoardState::new(
                Ball::cue(DVec2::new(1.0, 1.8)),
                vec![at(8, 3.0, 1.8), at(12, 4.0, 3.0)],
                Player::Player1,
            )
            .unwrap()
            .with_shot_index(4)
            .unwrap(),
        );
        let simulator = ScriptedSimulator::default();
        let config = config(90);
        let search = searcher(&simulator, &config);
        let first = search.run_ply(&board, ply(90)).unwrap();
        let best = first.best().unwrap();
        assert_eq!(best.item.board.outcome(), cueai_engine::Outcome::Player1Win);
        assert!(first.ranked.iter().any(|e| !e.item.board.is_terminal()));

        let rescored = search
            .lookahead(Player::Player1, first.ranked.clone(), 90)
            .unwrap();
        assert_eq!(rescored.len(), first.ranked.len());
        for entry in &rescored {
            let before = first
                .ranked
                .iter()
                .find(|e| e.index == entry.index)
                .unwrap();
            if entry.item.board.is_terminal() {
                assert_eq!(entry.score, before.score);
            } else {
                let reply = search.run_ply(&entry.item.board, ply(90)).unwrap();
                let reply_score = reply.best().unwrap().score;
                let expected = if entry.item.board.turn() == Player::Player1 {
                    reply_score
                } else {
                    -reply_score
                };
                assert_eq!(entry.score, expected);
            }
        }
        assert_eq!(rescored[0].index, best.index);
        assert!(rescored[0].item.board.is_terminal());
    }

    #[test]
    fn test_simulation_errors_abort_the_ply() {
        #[derive(Debug, Clone)]
        struct Broken;
        impl Simulator for Broken {
            fn load(&mut self, _board: &Arc<BoardState>) {}
            fn shoot(&mut self, _shot: &Shot) -> Result<(), cueai_engine::SimulationError> {
                Err(cueai_engine::SimulationError::NoBoardLoaded)
            }
            fn step(
                &mut self,
                _params: &StepParams,
                _observer: &mut dyn cueai_engine::ContactObserver,
            ) -> Result<bool, cueai_engine::SimulationError> {
                Ok(false)
            }
            fn current_board_state(&self) -> Result<BoardState, cueai_engine::SimulationError> {
                Err(cueai_engine::SimulationError::NoBoardLoaded)
            }
        }
        let config = config(8);
        let search = searcher(&Broken, &config);
        let err = search
            .run_ply(&board(), ply(8))
            .unwrap_err();
        assert_eq!(
            err,
            SearchError::Simulation(cueai_engine::SimulationError::NoBoardLoaded)
        );
    }
}
