use std::path::Path;

use landed_core::config::AppConfig;
use landed_core::investment::compute_cycles;
use landed_core::InvestmentScenario;
use tracing::info;

use crate::commands::CommandResult;

const COMMAND: &str = "cycles";

pub fn run(plan_path: &Path, config: &AppConfig) -> CommandResult {
    let plan = match InvestmentScenario::from_path(plan_path) {
        Ok(plan) => plan,
        Err(error) => return CommandResult::scenario_failure(COMMAND, &error),
    };

    let summary = match compute_cycles(plan.initial_balance, &plan.cycles) {
        Ok(summary) => summary,
        Err(error) => return CommandResult::invalid_configuration(COMMAND, &error),
    };

    info!(
        event_name = "cli.cycles.completed",
        plan = %plan_path.display(),
        cycle_count = summary.cycles.len(),
        "investment cycles completed"
    );

    let rounded = summary.round_dp(config.output.decimal_places);
    CommandResult::success_with(
        COMMAND,
        format!("computed {} cycle(s)", rounded.cycles.len()),
        &rounded,
    )
}
