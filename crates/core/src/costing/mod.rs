pub mod allocation;
pub mod line_item;
pub mod simulation;
pub mod validation;

use crate::domain::import::{LineItem, SimulationConfig, SimulationResult};
use crate::errors::ConfigurationError;

pub use self::{
    allocation::allocate, line_item::compute_line_item, simulation::compute_simulation,
    validation::validate_config,
};

pub trait CostingEngine: Send + Sync {
    fn simulate(
        &self,
        config: &SimulationConfig,
        items: &[LineItem],
    ) -> Result<SimulationResult, ConfigurationError>;
}

#[derive(Default)]
pub struct DeterministicCostingEngine;

impl CostingEngine for DeterministicCostingEngine {
    fn simulate(
        &self,
        config: &SimulationConfig,
        items: &[LineItem],
    ) -> Result<SimulationResult, ConfigurationError> {
        compute_simulation(config, items)
    }
}
