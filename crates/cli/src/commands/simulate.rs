use std::path::Path;

use landed_core::config::AppConfig;
use landed_core::costing::{CostingEngine, DeterministicCostingEngine};
use landed_core::ImportScenario;
use tracing::info;

use crate::commands::CommandResult;

const COMMAND: &str = "simulate";

pub fn run(scenario_path: &Path, config: &AppConfig) -> CommandResult {
    run_with_engine(&DeterministicCostingEngine, scenario_path, config)
}

pub fn run_with_engine(
    engine: &dyn CostingEngine,
    scenario_path: &Path,
    config: &AppConfig,
) -> CommandResult {
    let scenario = match ImportScenario::from_path(scenario_path) {
        Ok(scenario) => scenario,
        Err(error) => return CommandResult::scenario_failure(COMMAND, &error),
    };

    let simulation_config = match scenario.config.resolve(&config.defaults) {
        Ok(simulation_config) => simulation_config,
        Err(error) => return CommandResult::invalid_configuration(COMMAND, &error),
    };

    let result = match engine.simulate(&simulation_config, &scenario.items) {
        Ok(result) => result,
        Err(error) => return CommandResult::invalid_configuration(COMMAND, &error),
    };

    info!(
        event_name = "cli.simulate.completed",
        scenario = %scenario_path.display(),
        line_count = result.line_item_results.len(),
        "simulation completed"
    );

    let rounded = result.round_dp(config.output.decimal_places);
    CommandResult::success_with(
        COMMAND,
        format!("computed {} line item(s)", rounded.line_item_results.len()),
        &rounded,
    )
}
