//! Command handlers for the CLI.
//!
//! These drive the same engine entry points the server uses; a manual
//! `run-now` has identical semantics to a scheduled run. Upstream
//! failures surface as printed errors rather than silent retries, since
//! the operator is watching.

use std::sync::Arc;

use chrono::Utc;

use promobot_copy::CopyClient;
use promobot_core::{AppConfig, ConfigStore, Platform};
use promobot_engine::{
    next_daily_occurrence, PromotionJob, Publisher, RunOutcome, TriggerSpec,
};
use promobot_storefront::{audit_product, StorefrontClient};

/// Overrides collected from `configure` flags; unset flags keep the
/// previously persisted (or default) value.
#[derive(Debug)]
pub(crate) struct ConfigureArgs {
    pub platform: Option<Platform>,
    pub tone: Option<String>,
    pub collection: Option<String>,
    pub items_per_run: Option<u32>,
    pub time: Option<String>,
    pub timezone: Option<String>,
}

fn store_for(config: &AppConfig) -> ConfigStore {
    ConfigStore::new(config.config_path.clone())
}

fn build_job(config: &AppConfig) -> anyhow::Result<PromotionJob> {
    let storefront = Arc::new(StorefrontClient::from_app_config(config)?);
    let copy = Arc::new(CopyClient::from_app_config(config)?);
    let publisher = Arc::new(Publisher::from_app_config(config)?);
    Ok(PromotionJob::new(storefront, copy, publisher))
}

pub(crate) fn status(config: &AppConfig) -> anyhow::Result<()> {
    let Some(saved) = store_for(config).load() else {
        println!("robot idle: no promotion configuration saved");
        return Ok(());
    };

    println!(
        "robot configured: {} post(s) to {} from collection '{}', tone {}",
        saved.items_per_run, saved.platform, saved.collection_id, saved.tone
    );

    match TriggerSpec::from_config(&saved) {
        Ok(TriggerSpec::Daily { hour, minute, tz }) => {
            match next_daily_occurrence(hour, minute, tz, Utc::now()) {
                Some(next) => println!("next scheduled run: {}", next.to_rfc3339()),
                None => println!("no computable next run for {hour:02}:{minute:02} in {tz}"),
            }
        }
        Ok(TriggerSpec::Every { interval, .. }) => {
            println!(
                "fires on a fixed interval of {}h (no fire time configured)",
                interval.as_secs() / 3600
            );
        }
        Err(e) => println!("saved configuration is not schedulable: {e}"),
    }
    Ok(())
}

pub(crate) async fn run_now(config: &AppConfig) -> anyhow::Result<()> {
    let Some(saved) = store_for(config).load() else {
        anyhow::bail!("no promotion configuration saved; run `configure` first");
    };

    let job = build_job(config)?;
    match job.run(&saved).await {
        RunOutcome::Completed(summary) => {
            println!(
                "run complete: selected {}, published {}, errors {}",
                summary.selected, summary.published, summary.errors
            );
        }
        RunOutcome::Skipped { reason } => println!("run skipped: {reason}"),
    }
    Ok(())
}

pub(crate) fn configure(config: &AppConfig, args: ConfigureArgs) -> anyhow::Result<()> {
    let store = store_for(config);
    let mut cfg = store.load().unwrap_or_default();

    if let Some(platform) = args.platform {
        cfg.platform = platform;
    }
    if let Some(tone) = args.tone {
        cfg.tone = tone;
    }
    if let Some(collection) = args.collection {
        cfg.collection_id = collection;
    }
    if let Some(items_per_run) = args.items_per_run {
        cfg.items_per_run = items_per_run;
    }
    if let Some(time) = args.time {
        cfg.time_of_day = time;
    }
    if let Some(timezone) = args.timezone {
        cfg.timezone = timezone;
    }

    if cfg.items_per_run == 0 {
        anyhow::bail!("--items-per-run must be at least 1");
    }
    // Reject an unschedulable configuration before persisting it.
    let spec = TriggerSpec::from_config(&cfg)?;

    store.save(&cfg)?;
    println!(
        "configuration saved: {} post(s) to {} from collection '{}'",
        cfg.items_per_run, cfg.platform, cfg.collection_id
    );
    if let TriggerSpec::Daily { hour, minute, tz } = spec {
        if let Some(next) = next_daily_occurrence(hour, minute, tz, Utc::now()) {
            println!("next run once the server picks this up: {}", next.to_rfc3339());
        }
    }
    Ok(())
}

pub(crate) async fn collections(config: &AppConfig) -> anyhow::Result<()> {
    let storefront = StorefrontClient::from_app_config(config)?;
    let collections = storefront.list_collections().await?;

    if collections.is_empty() {
        println!("no collections found; use 'all' to promote the whole catalog");
        return Ok(());
    }
    for collection in collections {
        println!("{}\t{}", collection.id, collection.title);
    }
    Ok(())
}

pub(crate) async fn seo_audit(config: &AppConfig) -> anyhow::Result<()> {
    let storefront = StorefrontClient::from_app_config(config)?;
    let products = storefront.list_products("all").await?;

    if products.is_empty() {
        println!("no products to audit");
        return Ok(());
    }
    for product in &products {
        let audit = audit_product(product);
        let issues = if audit.issues.is_empty() {
            "ok".to_string()
        } else {
            audit.issues.join(", ")
        };
        println!("{:>3}/100\t{}\t{}", audit.score, product.title, issues);
    }
    Ok(())
}

pub(crate) async fn alt_text(config: &AppConfig, title: &str) -> anyhow::Result<()> {
    let copy = CopyClient::from_app_config(config)?;
    println!("{}", copy.generate_alt_text(title).await);
    Ok(())
}
