//! `airing`: watches the catalog site's latest updates and records newly
//! published episodes in a local SQLite database.

mod cli;
mod schedule;

use crate::cli::{Args, Command};
use airing_config::Config;
use airing_extract::Site;
use airing_metadata::{Resolver, Tmdb};
use airing_render::{RenderOptions, Renderer};
use airing_store::{Database, Repository, SeriesId};
use airing_sync::{Reconciler, SyncOptions};
use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use std::fmt::Debug;
use std::sync::Arc;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const TIMESTAMP: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Renders an error tree (with locations) as a diagnostic.
fn report(error: impl Debug) -> miette::Report {
    miette!("{error:?}")
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter())))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The local offset can only be read soundly while the process is still
    // single-threaded, so before the runtime starts.
    let offset = UtcOffset::current_local_offset().unwrap_or_else(|_| {
        tracing::warn!("Could not determine the local UTC offset; schedule times are interpreted as UTC");
        UtcOffset::UTC
    });

    let config = Config::load(args.config.as_deref()).map_err(report)?;
    tracing::debug!(?config.database.path, site = %config.site.base_url, "Configuration loaded");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()?
        .block_on(execute(args.command, &config, offset))
}

async fn execute(command: Command, config: &Config, offset: UtcOffset) -> Result<()> {
    let db = Database::connect(&config.database.path).await.map_err(report)?;
    let result = match command {
        Command::Sync => sync(config, &db).await,
        Command::Watch => watch(config, &db, offset).await,
        Command::Stats => stats(&db).await,
        Command::Series => series(&db, offset).await,
        Command::Episodes { series_id } => episodes(&db, SeriesId(series_id), offset).await,
    };
    db.close().await;
    result
}

fn reconciler(config: &Config, db: &Database) -> Result<Reconciler> {
    let options = RenderOptions {
        user_agent: config.site.user_agent.clone(),
        locale: config.site.locale.clone(),
        timeout: config.site.timeout(),
        settle: config.site.settle(),
        ..RenderOptions::default()
    };
    let renderer = match &config.site.chrome {
        Some(path) => Renderer::with_chrome(path, options),
        None => Renderer::new(options),
    }
    .map_err(report)?;
    let site = Site::new(config.site.base_url().map_err(report)?, renderer);
    Ok(Reconciler::new(
        Repository::from(db),
        Arc::new(site),
        resolver(config),
        SyncOptions {
            preferred_country: config.sync.preferred_country.clone(),
            fallback_country: config.sync.fallback_country.clone(),
        },
    ))
}

fn resolver(config: &Config) -> Resolver {
    let Some(api_key) = config.metadata.api_key() else {
        tracing::warn!("No TMDB API key configured; new series are stored without metadata");
        return Resolver::disabled();
    };
    let tmdb = config
        .metadata
        .base_url()
        .map_err(report)
        .and_then(|base_url| Tmdb::new(api_key, base_url.as_str(), config.metadata.timeout()).map_err(report));
    match tmdb {
        Ok(tmdb) => Resolver::new(Arc::new(tmdb), config.metadata.language.as_str()),
        Err(error) => {
            tracing::warn!(%error, "Metadata provider unavailable; new series are stored without metadata");
            Resolver::disabled()
        },
    }
}

async fn sync(config: &Config, db: &Database) -> Result<()> {
    let summary = reconciler(config, db)?.run().await.map_err(report)?;
    println!("{summary}");
    Ok(())
}

/// Runs at every configured time of day; a failed run is logged and the
/// loop waits for the next slot. Ctrl-C stops the loop, also mid-run.
async fn watch(config: &Config, db: &Database, offset: UtcOffset) -> Result<()> {
    let reconciler = reconciler(config, db)?;
    let times = &config.schedule.times;
    if times.is_empty() {
        return Err(miette!("no schedule times configured"));
    }
    let mut due_now = config.schedule.run_on_start;
    loop {
        if !due_now {
            let now = OffsetDateTime::now_utc().to_offset(offset);
            let Some(next) = schedule::next_run(now, times) else {
                return Err(miette!("no schedule times configured"));
            };
            tracing::info!(next = %next.format(TIMESTAMP).into_diagnostic()?, "Waiting for the next scheduled run");
            tokio::select! {
                _ = tokio::time::sleep(schedule::wait_until(now, next)) => {},
                _ = tokio::signal::ctrl_c() => break,
            }
        }
        due_now = false;
        tokio::select! {
            result = reconciler.run() => match result {
                Ok(summary) => tracing::info!(%summary, "Scheduled run finished"),
                Err(error) => tracing::error!(error = ?error, "Scheduled run failed; retrying at the next slot"),
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    tracing::info!("Interrupted; stopping");
    Ok(())
}

async fn stats(db: &Database) -> Result<()> {
    let stats = Repository::from(db).stats().await.map_err(report)?;
    println!("{} series | {} episodes", stats.series, stats.episodes);
    Ok(())
}

async fn series(db: &Database, offset: UtcOffset) -> Result<()> {
    for series in Repository::from(db).list_all_series().await.map_err(report)? {
        let checked = series.updated_at.to_offset(offset).format(TIMESTAMP).into_diagnostic()?;
        let tmdb = series.tmdb_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
        let origin = series.origin_country.as_deref().unwrap_or("-");
        println!("{:>5}  {checked}  tmdb:{tmdb:<8} {origin:<3} {}", series.id, series.title);
    }
    Ok(())
}

async fn episodes(db: &Database, series_id: SeriesId, offset: UtcOffset) -> Result<()> {
    let repository = Repository::from(db);
    let series = repository
        .get_series(series_id)
        .await
        .map_err(report)?
        .ok_or_else(|| miette!("no series with id {series_id}"))?;
    println!("{}", series.title);
    for episode in repository.list_episodes(series_id).await.map_err(report)? {
        let added = episode.added_at.to_offset(offset).format(TIMESTAMP).into_diagnostic()?;
        println!("  S{:02}E{:02}  {added}  {}", episode.season, episode.number, episode.source_url);
    }
    match repository.latest_episode(series_id).await.map_err(report)? {
        Some(latest) => println!("latest: S{:02}E{:02}", latest.season, latest.number),
        None => println!("no episodes recorded"),
    }
    Ok(())
}
