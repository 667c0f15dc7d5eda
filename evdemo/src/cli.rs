//! Command-line interface definition and parsing.

use clap::{Parser, Subcommand};
use ev_core::models::VoterToken;
use std::path::PathBuf;

/// Command-line arguments for the contest server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file.
    #[arg(short, long, env = "APP_CONFIG")]
    pub config: Option<PathBuf>,

    /// The HMAC secret for signing and verifying admin tokens.
    #[arg(short, long, env = "APP_SECRET")]
    pub secret: Option<String>,

    /// What to do (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// The actions of the binary
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the REST API
    Serve,

    /// Follow the contest like a device would, logging the leaderboard on
    /// every poll
    Watch {
        /// The voter token of the watching device (a fresh one if omitted)
        #[arg(long)]
        voter: Option<VoterToken>,
    },

    /// Print a signed token for the API
    Token {
        /// Grant admin rights
        #[arg(long)]
        admin: bool,

        /// How long the token stays valid, in hours
        #[arg(long, default_value_t = 24)]
        hours: u64,
    },
}

impl Cli {
    /// Parse command-line arguments.
    ///
    /// This method parses the command-line arguments according to the defined
    /// structure, including validation and help text generation.
    pub fn import() -> Result<Self, clap::Error> {
        Self::try_parse()
    }
}
