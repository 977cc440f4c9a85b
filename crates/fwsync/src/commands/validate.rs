//! `fwsync validate` -- payload checks with zero network traffic.

use owo_colors::OwoColorize;

use fwsync_core::validate_specs;

use crate::cli::{GlobalOpts, ValidateArgs};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ValidateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let payload = super::read_payload(&args.payload)?;
    let issues = validate_specs(&payload.configs);

    if issues.is_empty() {
        output::print_output(
            &format!("{} spec(s) OK", payload.configs.len()),
            global.quiet,
        );
        return Ok(());
    }

    for issue in &issues {
        let name = if issue.rule_name.is_empty() {
            format!("#{}", issue.index)
        } else {
            issue.rule_name.clone()
        };
        eprintln!("{}: {name} -- {}", "error".red(), issue.message);
    }

    Err(CliError::PayloadInvalid {
        count: issues.len(),
    })
}
