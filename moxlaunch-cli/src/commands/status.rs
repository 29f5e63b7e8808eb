//! Status command - show installed and required versions.

use console::style;
use moxlaunch::provision::{Provisioner, ResourceStatus};

use super::common::{load_config, GlobalArgs};
use crate::error::CliError;

/// Print the version table.
pub fn run(args: &GlobalArgs) -> Result<(), CliError> {
    let config = load_config(args)?;
    println!("Data directory: {}", config.data_dir.display());
    let provisioner = Provisioner::new(config).map_err(CliError::Setup)?;

    println!();
    println!(
        "  {:<20} {:<20} {:<10} {:<10} STATUS",
        "RESOURCE", "DIRECTORY", "INSTALLED", "REQUIRED"
    );
    for status in provisioner.status() {
        println!("{}", format_row(&status));
    }
    Ok(())
}

fn format_row(status: &ResourceStatus) -> String {
    let state = if status.update_pending {
        style("update pending").yellow().to_string()
    } else {
        style("up to date").green().to_string()
    };
    format!(
        "  {:<20} {:<20} {:<10} {:<10} {}",
        status.kind.label(),
        status.name,
        status.installed,
        status.required,
        state
    )
}
