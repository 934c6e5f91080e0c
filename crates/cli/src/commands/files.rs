use crate::context::AppContext;

/// Hydrate `path` from the API and print the reconciled view
pub async fn open(context: &AppContext, path: &str) -> eyre::Result<()> {
    let reconciler = context.reconciler()?;
    let (_, view) = reconciler.open_hydrated(path).await?;
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

/// Push the cached content of `path` to the API
pub async fn save(context: &AppContext, path: &str) -> eyre::Result<()> {
    let reconciler = context.reconciler()?;
    let session = reconciler.open(path);
    let view = session.save().await?;
    reconciler.close(path);

    tracing::info!(path = %path, stale = view.stale, "saved");
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
