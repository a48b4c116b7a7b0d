//! CLI command definitions and handlers.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

/// Load configuration with graceful fallback to defaults.
///
/// A missing file means defaults; an unreadable or invalid one is reported
/// and ignored.
pub fn load_config() -> bytepipe_core::config::Config {
    bytepipe_core::config::Config::load().unwrap_or_else(|e| {
        tracing::warn!("Ignoring configuration file: {e}");
        bytepipe_core::config::Config::default()
    })
}

pub mod bridge;
pub mod completions;
pub mod config;
pub mod copy;
pub mod probe;

/// bytepipe - copy a byte stream in 4 KiB chunks, logging every chunk
///
/// Positional arguments are always paths. The network tools and housekeeping
/// actions are selected with flags, so a file named like one of them still
/// copies.
#[derive(Parser)]
#[command(name = "bytepipe")]
#[command(author, version = bytepipe_core::VERSION, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode").args(["bridge", "probe", "config", "completions"])
))]
pub struct Cli {
    /// Input path (default: standard input; `-` also selects it)
    #[arg(conflicts_with = "mode")]
    pub input: Option<PathBuf>,

    /// Output path (default: standard output; `-` also selects it)
    #[arg(conflicts_with = "mode")]
    pub output: Option<PathBuf>,

    /// Send stdin to a TCP port and print the reply
    #[arg(long, value_name = "PORT", help_heading = "Bridge")]
    pub bridge: Option<u16>,

    /// Host to connect to (default from config, normally 127.0.0.1)
    #[arg(long, requires = "bridge", help_heading = "Bridge")]
    pub host: Option<String>,

    /// Probe ephemeral ports for collisions with other processes
    #[arg(long, help_heading = "Probe")]
    pub probe: bool,

    /// Number of ports to probe (default from config)
    #[arg(short = 'n', long, requires = "probe", help_heading = "Probe")]
    pub iterations: Option<u32>,

    /// Address probe sockets are bound to (default from config)
    #[arg(long, requires = "probe", help_heading = "Probe")]
    pub bind: Option<IpAddr>,

    /// Output the probe report in JSON format
    #[arg(long, requires = "probe", help_heading = "Probe")]
    pub json: bool,

    /// Show the effective configuration or its file location
    #[arg(long, value_enum, value_name = "ACTION")]
    pub config: Option<ConfigAction>,

    /// Generate shell completions
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<ShellType>,
}

impl Cli {
    /// Resolve the parsed flags into the operation to run.
    #[must_use]
    pub fn into_mode(self) -> Mode {
        if let Some(port) = self.bridge {
            return Mode::Bridge(BridgeArgs {
                port,
                host: self.host,
            });
        }
        if self.probe {
            return Mode::Probe(ProbeArgs {
                iterations: self.iterations,
                bind: self.bind,
                json: self.json,
            });
        }
        if let Some(action) = self.config {
            return Mode::Config(action);
        }
        if let Some(shell) = self.completions {
            return Mode::Completions(shell);
        }
        Mode::Copy(CopyArgs {
            input: self.input,
            output: self.output,
        })
    }
}

/// Operation selected on the command line
#[derive(Debug)]
pub enum Mode {
    /// Copy input to output (the default)
    Copy(CopyArgs),
    /// Bridge stdin and stdout through a TCP socket
    Bridge(BridgeArgs),
    /// Probe ephemeral ports
    Probe(ProbeArgs),
    /// Configuration housekeeping
    Config(ConfigAction),
    /// Shell completion script
    Completions(ShellType),
}

/// Arguments for the default copy operation
#[derive(Debug, Default)]
pub struct CopyArgs {
    /// Input path, `None` for standard input
    pub input: Option<PathBuf>,
    /// Output path, `None` for standard output
    pub output: Option<PathBuf>,
}

/// Arguments for the bridge
#[derive(Debug)]
pub struct BridgeArgs {
    /// TCP port to connect to
    pub port: u16,
    /// Host override
    pub host: Option<String>,
}

/// Arguments for the probe
#[derive(Debug)]
pub struct ProbeArgs {
    /// Iteration count override
    pub iterations: Option<u32>,
    /// Bind address override
    pub bind: Option<IpAddr>,
    /// Emit JSON instead of text
    pub json: bool,
}

/// Config actions
#[derive(Clone, Copy, ValueEnum, Debug, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Print the configuration file location
    Path,
}

/// Supported shell types for completions
#[derive(Clone, Copy, ValueEnum, Debug, PartialEq, Eq)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell
    Elvish,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    fn copy_args(args: &[&str]) -> CopyArgs {
        match Cli::try_parse_from(args).unwrap().into_mode() {
            Mode::Copy(copy) => copy,
            other => panic!("expected copy, got {other:?}"),
        }
    }

    #[test]
    fn test_no_arguments_copies_standard_streams() {
        let copy = copy_args(&["bytepipe"]);
        assert!(copy.input.is_none());
        assert!(copy.output.is_none());
    }

    #[test]
    fn test_positional_paths() {
        let copy = copy_args(&["bytepipe", "in.bin", "out.bin"]);
        assert_eq!(copy.input, Some(PathBuf::from("in.bin")));
        assert_eq!(copy.output, Some(PathBuf::from("out.bin")));

        let copy = copy_args(&["bytepipe", "in.bin"]);
        assert_eq!(copy.input, Some(PathBuf::from("in.bin")));
        assert!(copy.output.is_none());
    }

    #[test]
    fn test_paths_named_like_tools_are_copied() {
        for name in ["probe", "bridge", "config", "completions", "help"] {
            let copy = copy_args(&["bytepipe", name]);
            assert_eq!(copy.input, Some(PathBuf::from(name)));
            assert!(copy.output.is_none());
        }

        let copy = copy_args(&["bytepipe", "config", "out.bin"]);
        assert_eq!(copy.input, Some(PathBuf::from("config")));
        assert_eq!(copy.output, Some(PathBuf::from("out.bin")));

        let copy = copy_args(&["bytepipe", "--", "--probe"]);
        assert_eq!(copy.input, Some(PathBuf::from("--probe")));
    }

    #[test]
    fn test_too_many_paths_rejected() {
        assert!(Cli::try_parse_from(["bytepipe", "a", "b", "c"]).is_err());
    }

    #[test]
    fn test_paths_conflict_with_tools() {
        assert!(Cli::try_parse_from(["bytepipe", "--probe", "in.bin"]).is_err());
        assert!(Cli::try_parse_from(["bytepipe", "in.bin", "--bridge", "80"]).is_err());
        assert!(Cli::try_parse_from(["bytepipe", "--probe", "--bridge", "80"]).is_err());
    }

    #[test]
    fn test_tool_options_require_their_tool() {
        assert!(Cli::try_parse_from(["bytepipe", "--json"]).is_err());
        assert!(Cli::try_parse_from(["bytepipe", "-n", "5"]).is_err());
        assert!(Cli::try_parse_from(["bytepipe", "--host", "localhost"]).is_err());
    }

    #[test]
    fn test_probe_flags() {
        let cli = Cli::try_parse_from(["bytepipe", "--probe", "-n", "50", "--bind", "127.0.0.1"])
            .unwrap();
        let Mode::Probe(args) = cli.into_mode() else {
            panic!("expected probe");
        };
        assert_eq!(args.iterations, Some(50));
        assert_eq!(args.bind, Some(IpAddr::from([127, 0, 0, 1])));
        assert!(!args.json);
    }

    #[test]
    fn test_bridge_flags() {
        let cli = Cli::try_parse_from(["bytepipe", "--bridge", "8080"]).unwrap();
        let Mode::Bridge(args) = cli.into_mode() else {
            panic!("expected bridge");
        };
        assert_eq!(args.port, 8080);
        assert!(args.host.is_none());

        assert!(Cli::try_parse_from(["bytepipe", "--bridge", "not-a-port"]).is_err());
    }

    #[test]
    fn test_config_and_completions_flags() {
        let cli = Cli::try_parse_from(["bytepipe", "--config", "path"]).unwrap();
        assert!(matches!(cli.into_mode(), Mode::Config(ConfigAction::Path)));

        let cli = Cli::try_parse_from(["bytepipe", "--completions", "zsh"]).unwrap();
        assert!(matches!(cli.into_mode(), Mode::Completions(ShellType::Zsh)));
    }

    #[test]
    fn test_version_matches_library() {
        let cli = Cli::command();
        assert_eq!(cli.get_version(), Some(bytepipe_core::VERSION));
    }
}
