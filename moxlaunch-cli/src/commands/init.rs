//! Init command - write a default configuration file.

use moxlaunch::config::LaunchConfig;

use super::common::GlobalArgs;
use crate::error::CliError;

/// Run the init command.
pub fn run(args: &GlobalArgs, force: bool) -> Result<(), CliError> {
    let path = args.config_path();

    let mut config = LaunchConfig::default();
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }

    if force {
        config.save_to(&path)?;
    } else if !config.ensure_exists_at(&path)? {
        println!("Configuration file already exists: {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    println!("Configuration file: {}", path.display());
    println!();
    println!("Edit this file to change download URLs, versions and checksums.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_and_respects_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("launch.ini");
        let args = GlobalArgs {
            config: Some(path.clone()),
            data_dir: Some(temp.path().join("data")),
            ..Default::default()
        };

        run(&args, false).unwrap();
        let written = LaunchConfig::load_from(&path).unwrap();
        assert_eq!(written.data_dir, temp.path().join("data"));

        fs::write(&path, "[launch]\nkeep_archives = true\n").unwrap();
        run(&args, false).unwrap();
        assert!(LaunchConfig::load_from(&path).unwrap().keep_archives);

        run(&args, true).unwrap();
        assert!(!LaunchConfig::load_from(&path).unwrap().keep_archives);
    }
}
