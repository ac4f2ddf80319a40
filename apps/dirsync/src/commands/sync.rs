//! `dirsync sync`: one reconciliation pass.

use clap::Args;
use tracing::info;

use dirsync_core::Reconciler;
use dirsync_db::{run_migrations, PgMembershipCache};
use dirsync_google::DirectoryClient;
use dirsync_scim_client::{RetryPolicy, ScimAuth, ScimClient};

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use crate::output;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Compute and print the plan without changing anything (overrides DRY_RUN)
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the sync command
pub async fn execute(args: SyncArgs) -> CliResult<()> {
    let mut config = AppConfig::from_env()?;
    if args.dry_run {
        config.sync.dry_run = true;
    }

    let directory = DirectoryClient::new(
        &config.google_admin_base_url,
        &config.google_customer_id,
        &config.google_access_token,
        config.http_timeout,
    )
    .map_err(|e| CliError::ClientSetup(e.to_string()))?;

    let scim = ScimClient::new(
        &config.scim_endpoint,
        ScimAuth::bearer(config.scim_access_token.clone()),
        config.http_timeout,
    )
    .map_err(|e| CliError::ClientSetup(e.to_string()))?
    .with_retry_policy(RetryPolicy {
        max_retries: config.scim_max_retries,
        ..RetryPolicy::default()
    });

    let cache = match &config.database_url {
        Some(url) => {
            let cache = PgMembershipCache::connect(url).await?;
            run_migrations(cache.pool()).await?;
            Some(cache)
        }
        None => None,
    };

    info!(
        scim_endpoint = %config.scim_endpoint,
        customer = %config.google_customer_id,
        cache = cache.is_some(),
        dry_run = config.sync.dry_run,
        "Starting sync"
    );

    let mut reconciler = Reconciler::new(&directory, &scim, config.sync.clone());
    if let Some(cache) = &cache {
        reconciler = reconciler.with_cache(cache);
    }

    let report = reconciler.run().await?;
    output::print_report(&report, args.json)
}
