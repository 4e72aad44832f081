use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let registry = Arc::new(workspace_inputs::PluginRegistry::with_defaults(
        workspace_inputs::GlobOptions::default(),
    ));
    let aggregation = workspace_inputs::TaskAggregator::new(registry)
        .aggregate(&PathBuf::from("/path-to-your-monorepo/packages/package-a"))
        .await;
    println!("{}", aggregation.files.to_payload()?);
    Ok(())
}
