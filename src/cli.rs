use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Schema-driven form engine and record service
#[derive(Parser, Debug, Clone)]
#[command(name = "dynform", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "DYNFORM_CONFIG", default_value = "dynform.toml", global = true)]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "DYNFORM_HOST", global = true)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "DYNFORM_PORT", global = true)]
    pub port: Option<u16>,

    /// Record store connection URL
    #[arg(long, env = "DYNFORM_DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Configuration map file or directory
    #[arg(long, env = "DYNFORM_CONFIGS", global = true)]
    pub configs: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Print the render tree of a form as JSON
    Render {
        /// Field schema file; the configured market form when omitted
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Existing record to seed the form from
        #[arg(long)]
        record: Option<PathBuf>,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["dynform"]);
        assert_eq!(cli.config, PathBuf::from("dynform.toml"));
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert!(cli.database_url.is_none());
        assert_eq!(cli.command(), Command::Serve);
    }

    #[test]
    fn test_cli_with_args() {
        let cli = Cli::parse_from([
            "dynform",
            "--config",
            "custom.toml",
            "--host",
            "0.0.0.0",
            "--port",
            "9090",
            "--database-url",
            "sqlite://forms.db",
            "serve",
        ]);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(9090));
        assert_eq!(cli.database_url.as_deref(), Some("sqlite://forms.db"));
    }

    #[test]
    fn test_render_subcommand() {
        let cli = Cli::parse_from([
            "dynform",
            "render",
            "--schema",
            "person.json",
            "--configs",
            "markets.yaml",
        ]);
        assert_eq!(
            cli.command(),
            Command::Render {
                schema: Some(PathBuf::from("person.json")),
                record: None,
            }
        );
        assert_eq!(cli.configs, Some(PathBuf::from("markets.yaml")));
    }
}
