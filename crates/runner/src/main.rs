//! Repo Pulse metrics runner
//!
//! Runs every pipeline once over the configured repositories and reports the
//! outcome to the notification webhook. Scheduling (cron, timers) lives
//! outside this binary; deterministic record identity makes re-invocation
//! safe after any failure.

use std::sync::Arc;

use chrono::Utc;
use github::RosterClient;
use notify::Notifier;
use pipelines::{
    GeneralMetricsPipeline, LabelMetricsPipeline, MaintainerMetricsPipeline,
    ReleaseMetricsPipeline,
};
use search::SearchClient;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("runner=debug".parse()?)
                .add_directive("pipelines=debug".parse()?),
        )
        .init();

    info!("Starting Repo Pulse metrics run");

    let config = common::Config::from_env();
    if config.repos.is_empty() {
        anyhow::bail!("No repositories configured; set REPOS");
    }

    let search = Arc::new(SearchClient::new(
        &config.search_url,
        config.search_username.clone(),
        config.search_password.clone(),
    ));
    let roster = RosterClient::new(&config.github_org);
    let notifier = Notifier::new(config.webhook_url.clone());

    // One timestamp for the whole run keeps every record mutually consistent
    // and every same-day re-run an overwrite.
    let run_at = Utc::now();

    let result = run_pipelines(search, roster, run_at, &config.repos).await;
    match result {
        Ok(()) => {
            info!("Metrics run complete for {} repositories", config.repos.len());
            notifier
                .send(&format!(
                    "Metrics run complete for {} repositories",
                    config.repos.len()
                ))
                .await;
            Ok(())
        }
        Err(e) => {
            error!("Metrics run failed: {}", e);
            notifier.send(&format!("Metrics run failed: {}", e)).await;
            Err(e.into())
        }
    }
}

async fn run_pipelines(
    search: Arc<SearchClient>,
    roster: RosterClient,
    run_at: chrono::DateTime<Utc>,
    repos: &[String],
) -> common::Result<()> {
    GeneralMetricsPipeline::new(search.clone(), run_at)
        .run(repos)
        .await?;
    LabelMetricsPipeline::new(search.clone(), run_at)
        .run(repos)
        .await?;
    ReleaseMetricsPipeline::new(search.clone(), run_at)
        .run()
        .await?;
    MaintainerMetricsPipeline::new(search, roster, run_at)
        .run(repos)
        .await?;
    Ok(())
}
