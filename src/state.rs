//! Owned engine instance behind the C ABI handle.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::PottsConfig;
use crate::error::PottsError;
use crate::potts::{MonteCarloStepper, PottsCell, TickSummary};

/// A lattice, its cells, and the random source that drives them.
pub struct State {
    pub stepper: MonteCarloStepper<PottsCell>,
    pub rng: SmallRng,
    pub tick: u64,
}

impl State {
    pub fn new(config: PottsConfig) -> Result<Self, PottsError> {
        let rng = SmallRng::seed_from_u64(config.seed());
        let stepper = MonteCarloStepper::new(config)?;
        Ok(Self {
            stepper,
            rng,
            tick: 0,
        })
    }

    /// Advance one tick and bump the tick counter.
    pub fn tick(&mut self) -> TickSummary {
        let summary = self.stepper.tick(&mut self.rng);
        self.tick += 1;
        summary
    }
}
