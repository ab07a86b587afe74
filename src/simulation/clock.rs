use serde::{Deserialize, Serialize};
use std::fmt;

/// How many steps the driver issues before stopping on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StepLimitRepr", into = "StepLimitRepr")]
pub enum StepLimit {
    Bounded(u64),
    /// Run until cancelled
    Unbounded,
}

impl StepLimit {
    pub fn is_reached(&self, step_count: u64) -> bool {
        match self {
            StepLimit::Bounded(limit) => step_count >= *limit,
            StepLimit::Unbounded => false,
        }
    }
}

impl fmt::Display for StepLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepLimit::Bounded(limit) => write!(f, "{} steps", limit),
            StepLimit::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Settings-file form: a step count or the word "unbounded"
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StepLimitRepr {
    Steps(u64),
    Word(String),
}

impl TryFrom<StepLimitRepr> for StepLimit {
    type Error = String;

    fn try_from(repr: StepLimitRepr) -> Result<Self, Self::Error> {
        match repr {
            StepLimitRepr::Steps(limit) => Ok(StepLimit::Bounded(limit)),
            StepLimitRepr::Word(word) if word.eq_ignore_ascii_case("unbounded") => Ok(StepLimit::Unbounded),
            StepLimitRepr::Word(word) => Err(format!(
                "step limit must be a step count or \"unbounded\", got \"{}\"",
                word
            )),
        }
    }
}

impl From<StepLimit> for StepLimitRepr {
    fn from(limit: StepLimit) -> Self {
        match limit {
            StepLimit::Bounded(limit) => StepLimitRepr::Steps(limit),
            StepLimit::Unbounded => StepLimitRepr::Word("unbounded".to_string()),
        }
    }
}

/// Steps issued so far against a fixed timestep.
///
/// Elapsed simulated time is always derived as `step_count * timestep`, never
/// accumulated, so it cannot drift from the step count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    fixed_timestep_seconds: f64,
    step_count: u64,
}

impl SimulationClock {
    pub fn new(fixed_timestep_seconds: f64) -> Self {
        Self {
            fixed_timestep_seconds,
            step_count: 0,
        }
    }

    pub fn fixed_timestep_seconds(&self) -> f64 {
        self.fixed_timestep_seconds
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn tick(&mut self) {
        self.step_count += 1;
    }

    pub fn elapsed_sim_time(&self) -> f64 {
        self.step_count as f64 * self.fixed_timestep_seconds
    }
}
