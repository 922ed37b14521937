//! sshgen
//!
//! Generates an SSH client config from devices and virtual machines tagged
//! in Netbox. Meant to run from cron:
//!
//! ```text
//! 30 08 * * * sshgen -u admin -p /home/user/.ssh/config.d/netbox
//! ```

use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use eyre::WrapErr;
use sshgen_core::{Generator, Renderer, is_config_token};
use sshgen_netbox::NetboxClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

/// Name written into the managed-file banner
const TOOL_NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Parser, Debug)]
#[command(name = "sshgen", version)]
#[command(about = "SSH config generator.", long_about = None)]
struct Cli {
    /// Set your username (used for hosts without a username override)
    #[arg(short, long, value_parser = validate_username)]
    username: String,

    /// Path to ssh config file
    #[arg(short, long, value_parser = validate_path)]
    path: PathBuf,

    /// Settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn validate_username(raw: &str) -> std::result::Result<String, String> {
    if is_config_token(raw) {
        Ok(raw.to_string())
    } else {
        Err("username must be a single word".to_string())
    }
}

/// Accept an existing file, or a new file in an existing directory
fn validate_path(raw: &str) -> std::result::Result<PathBuf, String> {
    if raw.trim().is_empty() {
        return Err("path is empty".to_string());
    }
    let path = PathBuf::from(raw);
    if path.is_dir() {
        return Err(format!("{raw} is a directory"));
    }
    if path.exists() {
        return Ok(path);
    }
    match path.parent() {
        Some(dir) if dir.as_os_str().is_empty() || dir.is_dir() => Ok(path),
        Some(dir) => Err(format!("directory {} does not exist", dir.display())),
        None => Err(format!("{raw} is not a file path")),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = config::resolve(cli.config.as_deref())?;
    let client = NetboxClient::new(&settings.netbox.url, &settings.netbox.token, settings.timeout())
        .wrap_err("cannot create Netbox client")?;
    info!(url = %client.base_url(), tag = %settings.tag, "using netbox");

    let renderer = Renderer::new(TOOL_NAME, cli.username);
    let summary = Generator::new(&client, &settings, renderer)
        .run(&cli.path)
        .await
        .wrap_err_with(|| format!("cannot generate {}", cli.path.display()))?;

    if !summary.skipped.is_empty() {
        info!(skipped = summary.skipped.len(), "some assets were left out, see warnings above");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_short_flags() {
        let cli = Cli::try_parse_from(["sshgen", "-u", "admin", "-p", "netbox"]).unwrap();
        assert_eq!(cli.username, "admin");
        assert_eq!(cli.path, PathBuf::from("netbox"));
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_long_flags() {
        let cli = Cli::try_parse_from([
            "sshgen",
            "--username",
            "ops",
            "--path",
            "netbox",
            "--config",
            "/etc/sshgen/sshgen.toml",
            "--verbose",
        ])
        .unwrap();
        assert_eq!(cli.username, "ops");
        assert_eq!(cli.config, Some(PathBuf::from("/etc/sshgen/sshgen.toml")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_missing_required_arguments() {
        let err = Cli::try_parse_from(["sshgen", "-u", "admin"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Cli::try_parse_from(["sshgen", "-p", "netbox"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_empty_username() {
        let err = Cli::try_parse_from(["sshgen", "-u", "", "-p", "netbox"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let err = Cli::try_parse_from(["sshgen", "-u", "ops team", "-p", "netbox"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_help_exits_cleanly() {
        let err = Cli::try_parse_from(["sshgen", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn test_validate_path() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("netbox");
        std::fs::write(&existing, "").unwrap();
        let new_file = dir.path().join("new");
        let missing_dir = dir.path().join("missing").join("netbox");

        assert_eq!(
            validate_path(existing.to_str().unwrap()),
            Ok(existing.clone())
        );
        assert_eq!(validate_path(new_file.to_str().unwrap()), Ok(new_file));
        assert_eq!(validate_path("netbox"), Ok(PathBuf::from("netbox")));
        assert!(validate_path(missing_dir.to_str().unwrap()).is_err());
        assert!(validate_path(dir.path().to_str().unwrap()).is_err());
        assert!(validate_path("").is_err());
    }
}
