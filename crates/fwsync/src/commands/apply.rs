//! `fwsync apply` -- run one reconciliation pass.

use fwsync_api::{FirewallClient, IpListClient};
use fwsync_core::{ComputeRuleStore, Orchestrator};

use crate::cli::{ApplyArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: ApplyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load_config(global)?;
    let payload = super::read_payload(&args.payload)?;
    tracing::debug!(specs = payload.configs.len(), "loaded payload");

    // Every spec needs at least one target project up front; failing here
    // beats a report full of identical per-rule config errors.
    let has_global_targets = !config.projects.is_empty();
    if !has_global_targets && payload.configs.iter().any(|spec| spec.project.is_none()) {
        return Err(CliError::NoProjects);
    }

    let token = fwsync_config::resolve_token(&config.provider)
        .map_err(|source| CliError::NoToken { source })?;

    let transport = config.transport();
    let fetcher = IpListClient::new(&transport).map_err(|e| CliError::Transport {
        message: e.to_string(),
    })?;
    let client = FirewallClient::new(&config.provider.base_url, &token, &transport).map_err(
        |e| CliError::Transport {
            message: e.to_string(),
        },
    )?;
    let store = ComputeRuleStore::new(client)
        .with_network(config.provider.network.clone())
        .with_priority(config.provider.priority);

    let orchestrator = Orchestrator::new(fetcher, store, config.batch_options());
    let report = orchestrator.run(&config.projects, &payload.configs).await;

    output::print_output(&output::render_report(&report, &global.output), global.quiet);

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            failed: report.failed_count(),
            total: report.entries.len(),
        })
    }
}
