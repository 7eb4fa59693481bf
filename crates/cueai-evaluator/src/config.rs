//! AI configuration: heuristic weights plus search parameters.
//!
//! Both halves deserialize with `#[serde(default)]`, so a config file only needs the
//! fields it changes:
//!
//! ```
//! use cueai_evaluator::config::AiConfig;
//!
//! let config: AiConfig =
//!     serde_json::from_str(r#"{ "search": { "angle_count": 360, "top_k": 3 } }"#).unwrap();
//! assert_eq!(config.search.angle_count, 360);
//! assert_eq!(config.search.magnitudes, [75.0, 100.0, 125.0]);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::{SearchError, weights::HeuristicWeights};

/// Parameters of the candidate search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Discrete shot strengths tried for every angle.
    pub magnitudes: Vec<f64>,
    /// Number of evenly spaced aim angles over the full circle.
    pub angle_count: u32,
    /// Angle resolution of the reduced look-ahead ply.
    pub lookahead_angle_count: u32,
    /// Candidates kept in the ranking, and re-evaluated by look-ahead.
    pub top_k: usize,
    /// Seed for cue-ball re-spotting and the random strategy.
    pub seed: u64,
    /// Rejection-sampling budget when placing the cue ball.
    pub respot_attempts: u32,
    /// Worker threads for the search; `None` uses the global rayon pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            magnitudes: vec![75.0, 100.0, 125.0],
            angle_count: 1080,
            lookahead_angle_count: 120,
            top_k: 5,
            seed: 0,
            respot_attempts: 10_000,
            threads: None,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.magnitudes.is_empty() {
            return Err(SearchError::EmptyMagnitudes);
        }
        if let Some(&value) = self
            .magnitudes
            .iter()
            .find(|m| !m.is_finite() || **m <= 0.0)
        {
            return Err(SearchError::InvalidMagnitude { value });
        }
        if self.angle_count == 0 || self.lookahead_angle_count == 0 {
            return Err(SearchError::EmptyAngles);
        }
        if self.top_k == 0 {
            return Err(SearchError::ZeroTopK);
        }
        if self.respot_attempts == 0 {
            return Err(SearchError::NoRespotPosition { attempts: 0 });
        }
        Ok(())
    }
}

/// Everything that tunes the AI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub weights: HeuristicWeights,
    pub search: SearchConfig,
}

impl AiConfig {
    pub fn validate(&self) -> Result<(), SearchError> {
        self.search.validate()
    }
}
