use clap::Subcommand;
use std::path::PathBuf;

pub mod cache;
pub mod files;
pub mod replay;

use self::cache::CacheCommands;

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect and edit the local file cache
    #[command(visible_alias = "c")]
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Fetch a file from the API and reconcile it with the local cache
    Open {
        /// File path as the API knows it
        path: String,
    },

    /// Save the locally cached content of a file to the API
    Save {
        /// File path as the API knows it
        path: String,
    },

    /// Feed a JSON-lines log of execution results through the aggregator
    Replay {
        /// One execution result JSON object per line
        events: PathBuf,

        /// List groups in descending uuid order
        #[arg(long)]
        descending: bool,

        /// Fetch the complete output of every group that has one
        #[arg(long)]
        fetch_outputs: bool,
    },
}
