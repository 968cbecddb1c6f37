use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use sitemap_catalog::archiver;
use sitemap_catalog::cli::{Cli, Commands};
use sitemap_catalog::config::Config;
use sitemap_catalog::curate::{self, CurateContext};
use sitemap_catalog::domain;
use sitemap_catalog::extract::Extractor;
use sitemap_catalog::fetcher::Fetcher;
use sitemap_catalog::harvest;
use sitemap_catalog::session::CurationSession;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("loading config")?;
    let mut config = cli.apply_globals(config);

    match cli.command {
        Commands::Scrape { sitemap_url, timeout, user_agent, preview } => {
            if let Some(secs) = timeout {
                config.timeout_secs = secs;
            }
            if let Some(ua) = user_agent {
                config.user_agent = ua;
            }
            scrape(&config, &sitemap_url, preview)
        }
        Commands::Render { input, html, title, contact } => {
            let ctx = curate_context(&config, &input, title, contact);
            let mut session = CurationSession::new();
            curate::load_source(&mut session, &ctx)
                .with_context(|| format!("could not read {}", input.display()))?;
            let path = html.unwrap_or_else(|| ctx.default_html_path());
            curate::write_html(&session, &ctx, &path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Commands::Curate { input, delete, html, save, title, contact } => {
            let ctx = curate_context(&config, &input, title, contact);
            let mut session = CurationSession::new();
            curate::load_source(&mut session, &ctx)
                .with_context(|| format!("could not read {}", input.display()))?;

            if let Some(list) = delete {
                let outcome =
                    curate::apply_batch(&mut session, &ctx, &list, html.as_deref(), save)?;
                println!("Deleted {}, {} left.", outcome.removed, session.catalog().len());
                for path in &outcome.written {
                    println!("Wrote {}", path.display());
                }
                return Ok(());
            }

            let stdin = std::io::stdin();
            curate::run(&mut session, &ctx, stdin.lock(), std::io::stdout())?;

            if let Some(path) = html {
                curate::write_html(&session, &ctx, &path)?;
                println!("Wrote {}", path.display());
            }
            if save {
                let path = ctx.default_json_path(&session);
                archiver::save_to_file(session.catalog().records(), &path)?;
                println!("Wrote {}", path.display());
            }
            Ok(())
        }
    }
}

fn scrape(config: &Config, sitemap_url: &str, preview: usize) -> Result<()> {
    let fetcher = Fetcher::new(config)?;
    let extractor = Extractor::new()?;

    let report = harvest::harvest(&fetcher, &extractor, sitemap_url)
        .with_context(|| format!("harvesting {sitemap_url}"))?;

    println!(
        "Found {} products ({} product pages, {} skipped).",
        report.records.len(),
        report.product_url_count,
        report.skipped.len()
    );
    let shown = &report.records[..preview.min(report.records.len())];
    if !shown.is_empty() {
        println!("{}", archiver::to_json(shown)?);
    }

    let path = config.output_dir.join(domain::json_file_name(sitemap_url));
    archiver::save_to_file(&report.records, &path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn curate_context(
    config: &Config,
    input: &Path,
    title: Option<String>,
    contact: Option<String>,
) -> CurateContext {
    CurateContext {
        source: input.to_path_buf(),
        output_dir: config.output_dir.clone(),
        title: title.unwrap_or_else(|| config.title.clone()),
        contact: contact.or_else(|| config.contact.clone()),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
