use nd_config::NightdumpConfig;
use nd_mongo::{MongoTools, ProcessRunner, select_secondary};

/// Handle `nightdump probe`: print the first secondary found.
pub async fn handle(config: &NightdumpConfig) -> anyhow::Result<()> {
    let runner = ProcessRunner::new(config.export.timeout());
    let tools = MongoTools::new(config.mongo.tools.clone());
    let host = select_secondary(&runner, &tools, &config.mongo.hosts, &config.mongo.admin).await?;
    println!("{host}");
    Ok(())
}
