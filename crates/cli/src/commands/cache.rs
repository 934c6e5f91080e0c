use crate::context::AppContext;
use clap::Subcommand;
use std::io::Read;
use workbench_core::{FilePatch, FileUpdate};

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Print the cached client/server snapshots of a file
    Show { path: String },
    /// Report whether local edits differ from the server copy
    Stale { path: String },
    /// Forget a file's cached snapshots
    Remove { path: String },
    /// List every cached file with its staleness
    List,
    /// Record a local edit (reads stdin when --content is omitted)
    Edit {
        path: String,
        #[arg(long)]
        content: Option<String>,
    },
}

impl CacheCommands {
    pub fn execute(self, context: &AppContext) -> eyre::Result<()> {
        let cache = context.cache()?;
        match self {
            CacheCommands::Show { path } => match cache.get(&path)? {
                Some(entry) => println!("{}", serde_json::to_string_pretty(&entry)?),
                None => eyre::bail!("'{path}' is not cached"),
            },
            CacheCommands::Stale { path } => {
                println!("{}", cache.is_stale(&path)?);
            }
            CacheCommands::Remove { path } => {
                if cache.remove(&path)? {
                    tracing::info!(path = %path, "removed cache entry");
                } else {
                    tracing::warn!(path = %path, "no cache entry to remove");
                }
            }
            CacheCommands::List => {
                let entries = cache.list()?;
                tracing::debug!(
                    namespace = %context.config().cache.namespace,
                    count = entries.len(),
                    "listing cache entries"
                );
                for entry in entries {
                    let marker = if entry.is_stale() { "stale" } else { "fresh" };
                    println!("{marker}\t{}", entry.path);
                }
            }
            CacheCommands::Edit { path, content } => {
                let content = match content {
                    Some(content) => content,
                    None => {
                        let mut buffer = String::new();
                        std::io::stdin().read_to_string(&mut buffer)?;
                        buffer
                    }
                };
                let entry = cache.update(FileUpdate::client(FilePatch::content(&path, content)))?;
                println!("{}", serde_json::to_string_pretty(&entry)?);
            }
        }
        Ok(())
    }
}
