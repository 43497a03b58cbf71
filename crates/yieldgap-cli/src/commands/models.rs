use serde::Serialize;
use yieldgap_core::ProjectionModel;

use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ModelEntry {
    id: &'static str,
    description: &'static str,
}

fn describe(model: ProjectionModel) -> &'static str {
    match model {
        ProjectionModel::Conservative => "10% annual growth",
        ProjectionModel::Planb => "doubling every 4-year halving cycle plus 15% a year within the cycle",
        ProjectionModel::Flat => "price stays at the last observed close",
    }
}

pub fn run() -> Result<CommandResult, CliError> {
    let entries: Vec<ModelEntry> = ProjectionModel::ALL
        .into_iter()
        .map(|model| ModelEntry {
            id: model.as_str(),
            description: describe(model),
        })
        .collect();

    let text = entries
        .iter()
        .map(|entry| format!("{:<14}{}\n", entry.id, entry.description))
        .collect::<String>();

    Ok(CommandResult::ok("models", serde_json::to_value(entries)?, text))
}
