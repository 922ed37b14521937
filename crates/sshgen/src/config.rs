//! Settings file discovery and loading

use std::path::{Path, PathBuf};

use eyre::WrapErr;
use sshgen_core::Settings;

/// Environment variable naming the settings file
pub const CONFIG_ENV: &str = "SSHGEN_CONFIG";

/// Environment variable overriding `netbox.token`
pub const TOKEN_ENV: &str = "SSHGEN_NETBOX_TOKEN";

/// Parse settings from TOML text
///
/// # Errors
/// Returns error if the text is not valid settings TOML
pub fn parse(content: &str) -> eyre::Result<Settings> {
    Ok(toml::from_str(content)?)
}

/// Load settings from a file
///
/// # Errors
/// Returns error if file cannot be read or parsed
pub fn load(path: &Path) -> eyre::Result<Settings> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("cannot read settings file {}", path.display()))?;
    parse(&content).wrap_err_with(|| format!("invalid settings file {}", path.display()))
}

/// Candidate settings paths, most specific first
fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("sshgen.toml"),
        PathBuf::from("/etc/sshgen/sshgen.toml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("sshgen/sshgen.toml"));
    }
    paths
}

/// Resolve and load settings, then apply environment overrides
///
/// An explicit path wins over `SSHGEN_CONFIG`, which wins over the
/// default locations. A missing file is an error since there is no
/// usable default Netbox.
///
/// # Errors
/// Returns error if no file is found, it cannot be parsed, or the
/// resulting settings are invalid
pub fn resolve(explicit: Option<&Path>) -> eyre::Result<Settings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => default_paths()
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| {
                    eyre::eyre!("no settings file found; pass --config or set {CONFIG_ENV}")
                })?,
        },
    };

    tracing::debug!(path = %path.display(), "loading settings");
    let mut settings = load(&path)?;
    apply_env(&mut settings, std::env::var(TOKEN_ENV).ok());
    settings.validate()?;
    Ok(settings)
}

/// Apply environment overrides
fn apply_env(settings: &mut Settings, token: Option<String>) {
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        settings.netbox.token = token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
tag = "gen_ssh_config"
statuses = ["active", "staged"]
service_names = ["ssh"]
user_field = "login"
short_names = false
page_size = 250

[netbox]
url = "https://netbox.example.com"
token = "0123456789abcdef"
timeout_secs = 10
"#;

    #[test]
    fn test_parse_full() {
        let settings = parse(FULL).unwrap();
        assert_eq!(settings.tag, "gen_ssh_config");
        assert_eq!(settings.statuses, vec!["active", "staged"]);
        assert_eq!(settings.service_names, vec!["ssh"]);
        assert_eq!(settings.user_field, "login");
        assert!(!settings.short_names);
        assert_eq!(settings.page_size, 250);
        assert_eq!(settings.netbox.timeout_secs, 10);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_uses_defaults() {
        let settings = parse(
            r#"
tag = "t"
[netbox]
url = "https://netbox"
token = "x"
"#,
        )
        .unwrap();
        assert!(settings.statuses.is_empty());
        assert_eq!(settings.service_names, vec!["ssh", "sshd"]);
        assert_eq!(settings.user_field, "ssh_user");
        assert!(settings.short_names);
        assert_eq!(settings.page_size, 100);
        assert_eq!(settings.netbox.timeout_secs, 30);
    }

    #[test]
    fn test_parse_missing_tag() {
        assert!(parse("[netbox]\nurl = \"https://netbox\"\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("cannot read settings file"));
    }

    #[test]
    fn test_resolve_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sshgen.toml");
        std::fs::write(&path, FULL).unwrap();

        let settings = resolve(Some(&path)).unwrap();
        assert_eq!(settings.netbox.url, "https://netbox.example.com");
    }

    #[test]
    fn test_resolve_rejects_blank_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sshgen.toml");
        std::fs::write(&path, FULL.replace("0123456789abcdef", "")).unwrap();

        // only holds when the token is not supplied through the environment
        if std::env::var_os(TOKEN_ENV).is_none() {
            assert!(resolve(Some(&path)).is_err());
        }
    }

    #[test]
    fn test_env_token_override() {
        let mut settings = parse(FULL).unwrap();

        apply_env(&mut settings, Some("from-env".to_string()));
        assert_eq!(settings.netbox.token, "from-env");

        apply_env(&mut settings, Some("  ".to_string()));
        assert_eq!(settings.netbox.token, "from-env");

        apply_env(&mut settings, None);
        assert_eq!(settings.netbox.token, "from-env");
    }
}
