use crate::commands::Commands;
use crate::context::AppContext;

impl Commands {
    pub async fn execute(self, context: AppContext) -> eyre::Result<()> {
        match self {
            Commands::Cache { command } => command.execute(&context),
            Commands::Open { path } => crate::commands::files::open(&context, &path).await,
            Commands::Save { path } => crate::commands::files::save(&context, &path).await,
            Commands::Replay {
                events,
                descending,
                fetch_outputs,
            } => crate::commands::replay::execute(&context, &events, descending, fetch_outputs).await,
        }
    }
}
