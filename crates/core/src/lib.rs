pub mod config;
pub mod costing;
pub mod domain;
pub mod errors;
pub mod investment;

pub use costing::{
    allocate, compute_line_item, compute_simulation, validate_config, CostingEngine,
    DeterministicCostingEngine,
};
pub use domain::import::{
    AllocationBasis, FreightCurrency, LineItem, LineItemId, LineItemResult, SimulationConfig,
    SimulationResult, SimulationTotals,
};
pub use domain::investment::{CycleInput, CycleResult, InvestmentSummary};
pub use domain::scenario::{ImportScenario, InvestmentScenario, ScenarioConfig, ScenarioError};
pub use errors::{ConfigViolation, ConfigurationError};
pub use investment::compute_cycles;
