//! Running decisions off the caller's thread.
//!
//! A [`DecisionWorker`] owns one AI on a background thread. The caller hands it a board
//! with [`DecisionWorker::request`] and later collects the result with
//! [`DecisionWorker::try_take`] (non-blocking, for a render loop) or
//! [`DecisionWorker::wait`]. At most one decision is outstanding at a time and every
//! result is delivered exactly once.
//!
//! ```
//! use std::sync::Arc;
//!
//! use cueai_engine::{Ball, BoardState, Player};
//! use cueai_evaluator::{DecisionWorker, PoolAi, StrategyKind, config::AiConfig};
//! use glam::DVec2;
//!
//! let board = Arc::new(
//!     BoardState::new(
//!         Ball::cue(DVec2::new(1.5, 1.8)),
//!         vec![Ball::new(1, DVec2::new(3.0, 1.8)), Ball::new(8, DVec2::new(5.0, 1.0))],
//!         Player::Player1,
//!     )
//!     .unwrap(),
//! );
//! let ai = PoolAi::new(StrategyKind::Random, AiConfig::default()).unwrap();
//!
//! let mut worker = DecisionWorker::spawn(ai);
//! worker.request(Arc::clone(&board)).unwrap();
//! let decision = worker.wait().unwrap();
//! assert!((0.0..360.0).contains(&decision.shot.angle));
//! ```

use std::{
    sync::{
        Arc,
        mpsc::{self, TryRecvError},
    },
    thread::{self, JoinHandle},
};

use cueai_engine::BoardState;
use tracing::debug;

use crate::{
    DecisionError, SearchError,
    strategy::{Decision, ShotSelector},
};

type DecisionResult = Result<Decision, SearchError>;

/// Single-slot handoff to an AI running on its own thread.
#[derive(Debug)]
pub struct DecisionWorker {
    tx: Option<mpsc::Sender<Arc<BoardState>>>,
    rx: mpsc::Receiver<DecisionResult>,
    outstanding: bool,
    handle: Option<JoinHandle<()>>,
}

impl DecisionWorker {
    /// Moves `ai` onto a new worker thread.
    pub fn spawn<A>(ai: A) -> Self
    where
        A: ShotSelector + Send + 'static,
    {
        let (tx_request, rx_request) = mpsc::channel();
        let (tx_result, rx_result) = mpsc::channel();
        let handle = thread::spawn(move || worker_thread(&ai, &rx_request, &tx_result));
        Self {
            tx: Some(tx_request),
            rx: rx_result,
            outstanding: false,
            handle: Some(handle),
        }
    }

    /// `true` while a requested decision has not been taken yet.
    #[must_use]
    pub fn is_outstanding(&self) -> bool {
        self.outstanding
    }

    /// Starts deciding on `board`.
    ///
    /// Fails with [`DecisionError::Outstanding`] if the previous result has not been
    /// taken.
    pub fn request(&mut self, board: Arc<BoardState>) -> Result<(), DecisionError> {
        if self.outstanding {
            return Err(DecisionError::Outstanding);
        }
        let tx = self.tx.as_ref().ok_or(DecisionError::WorkerStopped)?;
        tx.send(board).map_err(|_| DecisionError::WorkerStopped)?;
        self.outstanding = true;
        Ok(())
    }

    /// Returns the decision if it is ready, `None` if it is still running.
    pub fn try_take(&mut self) -> Result<Option<Decision>, DecisionError> {
        if !self.outstanding {
            return Err(DecisionError::NotRequested);
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.outstanding = false;
                Ok(Some(result?))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                self.outstanding = false;
                Err(DecisionError::WorkerStopped)
            }
        }
    }

    /// Blocks until the outstanding decision is ready.
    pub fn wait(&mut self) -> Result<Decision, DecisionError> {
        if !self.outstanding {
            return Err(DecisionError::NotRequested);
        }
        let result = self.rx.recv().map_err(|_| DecisionError::WorkerStopped);
        self.outstanding = false;
        Ok(result??)
    }
}

impl Drop for DecisionWorker {
    fn drop(&mut self) {
        // closing the request channel ends the worker loop
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_thread<A>(
    ai: &A,
    rx: &mpsc::Receiver<Arc<BoardState>>,
    tx: &mpsc::Sender<DecisionResult>,
) where
    A: ShotSelector,
{
    for board in rx {
        debug!(shot_index = board.shot_index(), "decision requested");
        if tx.send(ai.decide(&board)).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicU32, Ordering},
        time::Duration,
    };

    use cueai_engine::{Ball, Player, Shot};
    use glam::DVec2;

    use super::*;

    /// Echoes the board's shot index as the shot angle.
    #[derive(Debug, Default)]
    struct Echo {
        calls: Arc<AtomicU32>,
    }

    impl ShotSelector for Echo {
        fn decide(&self, board: &Arc<BoardState>) -> Result<Decision, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if board.shot_index() == 99 {
                return Err(SearchError::NoCandidates);
            }
            Ok(Decision {
                shot: Shot::new(f64::from(board.shot_index()), 75.0),
                score: Some(0.0),
                candidates: 1,
                reachable: 1,
                elapsed: Duration::ZERO,
            })
        }
    }

    fn board(shot_index: u32) -> Arc<BoardState> {
        Arc::new(
            BoardState::new(
                Ball::cue(DVec2::new(1.0, 1.0)),
                vec![Ball::new(8, DVec2::new(3.0, 2.0))],
                Player::Player1,
            )
            .unwrap()
            .with_shot_index(shot_index)
            .unwrap(),
        )
    }

    #[test]
    fn test_request_then_wait() {
        let mut worker = DecisionWorker::spawn(Echo::default());
        worker.request(board(3)).unwrap();
        assert!(worker.is_outstanding());
        assert_eq!(worker.wait().unwrap().shot.angle, 3.0);
        assert!(!worker.is_outstanding());
    }

    #[test]
    fn test_second_request_while_outstanding_is_rejected() {
        let mut worker = DecisionWorker::spawn(Echo::default());
        worker.request(board(1)).unwrap();
        assert_eq!(worker.request(board(2)), Err(DecisionError::Outstanding));
        assert_eq!(worker.wait().unwrap().shot.angle, 1.0);
        worker.request(board(2)).unwrap();
        assert_eq!(worker.wait().unwrap().shot.angle, 2.0);
    }

    #[test]
    fn test_result_is_delivered_once() {
        let echo = Echo::default();
        let calls = Arc::clone(&echo.calls);
        let mut worker = DecisionWorker::spawn(echo);
        assert_eq!(worker.try_take(), Err(DecisionError::NotRequested));

        worker.request(board(5)).unwrap();
        let decision = loop {
            if let Some(decision) = worker.try_take().unwrap() {
                break decision;
            }
            thread::sleep(Duration::from_millis(1));
        };
        assert_eq!(decision.shot.angle, 5.0);
        assert_eq!(worker.try_take(), Err(DecisionError::NotRequested));
        assert_eq!(worker.wait(), Err(DecisionError::NotRequested));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_search_errors_are_forwarded() {
        let mut worker = DecisionWorker::spawn(Echo::default());
        worker.request(board(99)).unwrap();
        assert_eq!(
            worker.wait(),
            Err(DecisionError::Search(SearchError::NoCandidates))
        );
        worker.request(board(4)).unwrap();
        assert!(worker.wait().is_ok());
    }
}
