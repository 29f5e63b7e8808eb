//! Run command - provision every resource and show progress.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use moxlaunch::provision::{
    format_bytes, spawn_provisioning, LaunchEvent, ProvisionReport, Provisioner, ResourceOutcome,
    PROGRESS_MAX,
};

use super::common::{load_config, start_logging, GlobalArgs};
use crate::error::CliError;

/// Run the provisioning pipeline.
pub fn run(args: &GlobalArgs) -> Result<(), CliError> {
    let config = load_config(args)?;
    let logging = start_logging(args)?;

    println!("Data directory: {}", config.data_dir.display());
    println!("Log file: {}", logging.log_path().display());
    let provisioner = Provisioner::new(config).map_err(CliError::Setup)?;
    let (handle, mut events) = spawn_provisioning(provisioner).map_err(CliError::Spawn)?;

    let display = ProgressDisplay::new();
    while let Some(event) = events.blocking_recv() {
        display.handle(&event);
    }

    let report = handle.join().map_err(|_| CliError::WorkerPanicked)??;
    tracing::info!(updated = report.updated_count(), "Launch checks complete");
    print_report(&report);
    Ok(())
}

/// Single progress bar over the run's step scale.
struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    fn new() -> Self {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let bar = ProgressBar::new(PROGRESS_MAX as u64);
        bar.set_style(style);
        Self { bar }
    }

    fn handle(&self, event: &LaunchEvent) {
        match event {
            LaunchEvent::Progress(p) => {
                self.bar.set_position(p.value as u64);
                self.bar.set_message(format!("{} {}", p.tip, p.detail));
                self.bar.tick();
            }
            LaunchEvent::Failed(f) => {
                self.bar.set_position(f.value as u64);
                self.bar.abandon_with_message(format!(
                    "{} {}",
                    style(&f.tip).red().bold(),
                    f.detail
                ));
            }
            LaunchEvent::End => {
                self.bar
                    .finish_with_message(style("All resources ready").green().to_string());
            }
        }
    }
}

fn print_report(report: &ProvisionReport) {
    println!();
    for resource in &report.resources {
        match &resource.outcome {
            ResourceOutcome::Current { installed } => {
                println!("  {:<20} {} (up to date)", resource.name, installed);
            }
            ResourceOutcome::Updated {
                from,
                to,
                bytes_downloaded,
                files_extracted,
            } => {
                println!(
                    "  {:<20} {} -> {} ({}, {} files)",
                    resource.name,
                    from,
                    style(to).green(),
                    format_bytes(*bytes_downloaded),
                    files_extracted
                );
            }
        }
    }
}
