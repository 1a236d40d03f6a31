//! Command-line interface parsing for the SWAPI explorer
//!
//! This module handles parsing of CLI arguments using clap. Each subcommand
//! maps onto one lookup of the [`Explorer`](crate::explorer::Explorer).

use clap::{Parser, Subcommand};
use thiserror::Error;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// `--all` cannot be combined with a search or a page number
    #[error("--all cannot be combined with --search or --page")]
    ConflictingPagination,

    /// Page numbers start at 1
    #[error("Invalid page: {0}. Pages start at 1")]
    InvalidPage(u32),

    /// Ids start at 1
    #[error("Invalid id: {0}. Ids start at 1")]
    InvalidId(u32),
}

/// Star Wars API explorer - browse characters, films and planets
#[derive(Parser, Debug)]
#[command(name = "swapi-explorer")]
#[command(about = "Browse characters, films and planets from the Star Wars API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// What to look up
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List or search characters
    People {
        /// Page number of the listing
        #[arg(long)]
        page: Option<u32>,
        /// Search characters by name
        #[arg(long, short)]
        search: Option<String>,
        /// Walk every page of the listing
        #[arg(long)]
        all: bool,
    },
    /// Show one character with resolved homeworld and films
    Person {
        /// Character id
        id: u32,
    },
    /// List or search films
    Films {
        /// Search films by title
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Show one film with its opening crawl
    Film {
        /// Film id
        id: u32,
    },
    /// List or search planets
    Planets {
        /// Page number of the listing
        #[arg(long)]
        page: Option<u32>,
        /// Search planets by name
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Show one planet with its resolved films
    Planet {
        /// Planet id
        id: u32,
    },
}

impl Command {
    /// Checks argument combinations clap cannot express on its own
    pub fn validate(&self) -> Result<(), CliError> {
        match self {
            Command::People { page, search, all } => {
                if *all && (page.is_some() || search.is_some()) {
                    return Err(CliError::ConflictingPagination);
                }
                validate_page(*page)
            }
            Command::Planets { page, .. } => validate_page(*page),
            Command::Person { id } | Command::Film { id } | Command::Planet { id } => {
                if *id == 0 {
                    Err(CliError::InvalidId(*id))
                } else {
                    Ok(())
                }
            }
            Command::Films { .. } => Ok(()),
        }
    }
}

fn validate_page(page: Option<u32>) -> Result<(), CliError> {
    match page {
        Some(0) => Err(CliError::InvalidPage(0)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_people_defaults() {
        let cli = Cli::parse_from(["swapi-explorer", "people"]);
        assert_eq!(
            cli.command,
            Command::People {
                page: None,
                search: None,
                all: false
            }
        );
    }

    #[test]
    fn test_cli_parse_people_search() {
        let cli = Cli::parse_from(["swapi-explorer", "people", "--search", "luke"]);
        match cli.command {
            Command::People { search, .. } => assert_eq!(search.as_deref(), Some("luke")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_person_id() {
        let cli = Cli::parse_from(["swapi-explorer", "person", "4"]);
        assert_eq!(cli.command, Command::Person { id: 4 });
    }

    #[test]
    fn test_cli_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["swapi-explorer", "film", "one"]).is_err());
    }

    #[test]
    fn test_validate_all_with_search_conflicts() {
        let cli = Cli::parse_from(["swapi-explorer", "people", "--all", "-s", "r2"]);
        assert!(matches!(
            cli.command.validate(),
            Err(CliError::ConflictingPagination)
        ));
    }

    #[test]
    fn test_validate_page_zero() {
        let cli = Cli::parse_from(["swapi-explorer", "planets", "--page", "0"]);
        let err = cli.command.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid page"));
    }

    #[test]
    fn test_validate_id_zero() {
        let cli = Cli::parse_from(["swapi-explorer", "planet", "0"]);
        assert!(matches!(cli.command.validate(), Err(CliError::InvalidId(0))));
    }

    #[test]
    fn test_validate_accepts_plain_commands() {
        let cli = Cli::parse_from(["swapi-explorer", "films", "--search", "hope"]);
        assert!(cli.command.validate().is_ok());
    }
}
