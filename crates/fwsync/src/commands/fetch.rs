//! `fwsync fetch` -- fetch one IP list and print it (operator debugging).

use fwsync_api::IpListClient;

use crate::cli::{FetchArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: FetchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load_config(global)?;

    let url: url::Url = args.url.parse().map_err(|e| CliError::Fetch {
        message: format!("invalid URL {:?}: {e}", args.url),
    })?;

    let fetcher = IpListClient::new(&config.transport()).map_err(|e| CliError::Transport {
        message: e.to_string(),
    })?;
    let entries = fetcher.fetch(&url).await.map_err(|e| CliError::Fetch {
        message: e.to_string(),
    })?;

    let body = entries.iter().cloned().collect::<Vec<_>>().join("\n");
    output::print_output(&body, global.quiet);
    eprintln!("{} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" });
    Ok(())
}
