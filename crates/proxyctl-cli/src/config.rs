//! Client configuration.
//!
//! Turns the parsed global options into the host list and execution policy
//! the engine works with.

use std::time::Duration;

use proxyctl_core::{Credentials, CtlError, ExecutionPolicy, Host, Mode};
use tracing::debug;

use crate::cli::{Cli, Format};

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Candidate hosts in failover order.
    pub hosts: Vec<Host>,
    /// Policy applied to every request.
    pub policy: ExecutionPolicy,
    /// Output format.
    pub format: Format,
}

impl Config {
    /// Build the configuration from parsed options.
    ///
    /// Blank host entries are ignored, so an empty `--hosts` leaves no
    /// candidate hosts at all.
    ///
    /// # Errors
    ///
    /// Returns [`CtlError::Config`] for malformed hosts or a zero timeout.
    pub fn from_cli(cli: &Cli) -> Result<Self, CtlError> {
        if cli.timeout == 0 {
            return Err(CtlError::Config("timeout must be greater than zero".into()));
        }

        let credentials = Credentials::new(&cli.user, &cli.password);
        let hosts = cli
            .hosts
            .iter()
            .map(|raw| raw.trim())
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                normalize_host(raw, cli.secure)
                    .map(|url| Host::new(url).with_credentials(credentials.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mode = if cli.fan_out {
            Mode::FanOut
        } else {
            Mode::Sequential
        };
        let policy = ExecutionPolicy::default()
            .with_mode(mode)
            .with_timeout(Duration::from_millis(cli.timeout))
            .with_retries(cli.retries);

        debug!(hosts = hosts.len(), ?policy, "Loaded configuration");

        Ok(Self {
            hosts,
            policy,
            format: cli.format,
        })
    }
}

/// Prefix a scheme when none is given and validate the result.
fn normalize_host(raw: &str, secure: bool) -> Result<String, CtlError> {
    if raw.chars().any(char::is_whitespace) {
        return Err(CtlError::Config(format!("invalid host '{raw}': contains whitespace")));
    }

    let url = match raw.split_once("://") {
        Some(("http" | "https", "")) => {
            return Err(CtlError::Config(format!("invalid host '{raw}': missing address")));
        }
        Some(("http" | "https", _)) => raw.to_string(),
        Some((scheme, _)) => {
            return Err(CtlError::Config(format!(
                "invalid host '{raw}': unsupported scheme '{scheme}', must be http or https"
            )));
        }
        None if secure => format!("https://{raw}"),
        None => format!("http://{raw}"),
    };
    Ok(url.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use proxyctl_core::ErrorKind;
    use test_case::test_case;

    #[test_case("10.0.0.1:8989", false, "http://10.0.0.1:8989" ; "bare address")]
    #[test_case("10.0.0.1:8989", true, "https://10.0.0.1:8989" ; "bare address secure")]
    #[test_case("https://proxy:8989/", false, "https://proxy:8989" ; "explicit scheme trailing slash")]
    #[test_case("http://proxy:8989", true, "http://proxy:8989" ; "explicit scheme wins")]
    fn normalizes_hosts(raw: &str, secure: bool, expected: &str) {
        assert_eq!(normalize_host(raw, secure).expect("valid host"), expected);
    }

    #[test_case("ftp://proxy" ; "bad scheme")]
    #[test_case("http://" ; "missing address")]
    #[test_case("pro xy:8989" ; "whitespace")]
    fn rejects_bad_hosts(raw: &str) {
        assert_eq!(normalize_host(raw, false).unwrap_err().kind(), ErrorKind::Config);
    }

    #[test]
    fn from_cli_builds_hosts_in_order_with_credentials() {
        let cli = Cli::parse_from(["proxyctl", "-h", "a:1, b:2", "-u", "ops", "-p", "pw", "list", "servers"]);
        let config = Config::from_cli(&cli).expect("valid config");

        let urls: Vec<&str> = config.hosts.iter().map(Host::base_url).collect();
        assert_eq!(urls, vec!["http://a:1", "http://b:2"]);
        assert!(config.hosts.iter().all(|h| h.credentials().user() == "ops"));
        assert_eq!(config.policy.mode, Mode::Sequential);
    }

    #[test]
    fn from_cli_policy_flags() {
        let cli = Cli::parse_from(["proxyctl", "--fan-out", "-t", "250", "--retries", "1", "list", "servers"]);
        let config = Config::from_cli(&cli).expect("valid config");
        assert_eq!(config.policy.mode, Mode::FanOut);
        assert_eq!(config.policy.timeout, Duration::from_millis(250));
        assert_eq!(config.policy.retries, 1);
    }

    #[test]
    fn blank_hosts_leave_an_empty_list() {
        let cli = Cli::parse_from(["proxyctl", "--hosts", "", "list", "servers"]);
        let config = Config::from_cli(&cli).expect("valid config");
        assert!(config.hosts.is_empty());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cli = Cli::parse_from(["proxyctl", "-t", "0", "list", "servers"]);
        assert_eq!(Config::from_cli(&cli).unwrap_err().kind(), ErrorKind::Config);
    }
}
