//! Random gate throttling answers to ambient group messages.

use rand::Rng;

pub trait SamplingGate: Send + Sync {
    /// Whether this ambient message should be answered.
    fn should_answer(&self) -> bool;
}

/// Answers when a uniform draw from `[0, 1)` exceeds the threshold.
///
/// A threshold of `0.5` answers about half the time; `1.0` never answers.
#[derive(Debug, Clone, Copy)]
pub struct RandomGate {
    threshold: f64,
}

impl RandomGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl SamplingGate for RandomGate {
    fn should_answer(&self) -> bool {
        rand::thread_rng().gen::<f64>() > self.threshold
    }
}

/// Gate with a fixed decision.
#[derive(Debug, Clone, Copy)]
pub struct FixedGate(pub bool);

impl SamplingGate for FixedGate {
    fn should_answer(&self) -> bool {
        self.0
    }
}
