use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::LicenseOrigin;

#[derive(Parser, Debug)]
#[command(
    name = "license-expr",
    about = "Validate SPDX license expressions against a license registry",
    version
)]
pub struct Cli {
    /// Config file [default: ./.license-expr/config.toml, fallback ~/.config/license-expr/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Only print errors and the final result
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Listen address, overrides `server.bind`
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Validate a license expression
    Validate {
        /// Expression, e.g. "MIT OR Apache-2.0 WITH LLVM-exception"
        expression: String,

        /// Print the API response body as JSON
        #[arg(long)]
        json: bool,

        /// Exit with code 1 when the expression contains unknown licenses
        #[arg(long)]
        strict: bool,
    },

    /// List registered licenses
    List {
        /// Only show licenses of this origin
        #[arg(long, value_name = "ORIGIN")]
        origin: Option<OriginArg>,

        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OriginArg {
    Spdx,
    Custom,
}

impl From<&OriginArg> for LicenseOrigin {
    fn from(arg: &OriginArg) -> Self {
        match arg {
            OriginArg::Spdx => LicenseOrigin::Spdx,
            OriginArg::Custom => LicenseOrigin::Custom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_validate() {
        let cli = Cli::parse_from(["license-expr", "validate", "MIT OR Zlib", "--strict"]);
        match cli.command {
            Command::Validate {
                expression,
                json,
                strict,
            } => {
                assert_eq!(expression, "MIT OR Zlib");
                assert!(!json);
                assert!(strict);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_with_global_flags() {
        let cli = Cli::parse_from(["license-expr", "list", "--origin", "custom", "-q"]);
        assert!(cli.quiet);
        match cli.command {
            Command::List { origin, json } => {
                assert!(matches!(origin, Some(OriginArg::Custom)));
                assert!(!json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
