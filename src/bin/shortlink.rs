//! Interactive terminal client for the short-link registry.
//!
//! Runs an in-process registry configured from the same environment
//! variables as the HTTP service, and reads commands from a prompt.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin shortlink
//! cargo run --bin shortlink -- --seed 42   # reproducible identifiers
//! ```
//!
//! # Commands
//!
//! ```text
//! create <url> [--minutes N | --days N] [--code C]
//! batch <url>... [--minutes N]
//! open <code>
//! list
//! events
//! quit
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use std::sync::Arc;

use shortlink_registry::application::services::{BatchOutcome, CreationRequest, LinkRegistry};
use shortlink_registry::config::{self, Config};
use shortlink_registry::domain::entities::{EventKind, Link, NewLink, Validity, ValidityUnit};
use shortlink_registry::domain::event_log::TracingEventSink;
use shortlink_registry::error::AppError;

/// Interactive client for the short-link registry.
#[derive(Parser)]
#[command(name = "shortlink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Seed for identifier generation (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

/// One line typed at the prompt.
#[derive(Parser)]
#[command(name = "shortlink", no_binary_name = true, disable_version_flag = true)]
struct PromptLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register one link
    Create {
        url: String,

        /// Validity in minutes
        #[arg(long, conflicts_with = "days")]
        minutes: Option<i64>,

        /// Validity in days
        #[arg(long)]
        days: Option<i64>,

        /// Preferred shortcode
        #[arg(long)]
        code: Option<String>,
    },

    /// Validate and register several links at once
    Batch {
        #[arg(required = true)]
        urls: Vec<String>,

        /// Validity in minutes, applied to every URL
        #[arg(long)]
        minutes: Option<String>,
    },

    /// Resolve a link and count one access
    Open { code: String },

    /// List all links
    List,

    /// Show the event log
    Events,

    /// Leave the prompt
    #[command(alias = "exit")]
    Quit,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let registry = build_registry(&config, cli.seed);

    println!("{}", "🔗 Shortlink Registry".bright_blue().bold());
    println!(
        "  Type {} for commands, {} to leave.",
        "help".bright_cyan(),
        "quit".bright_cyan()
    );
    println!();

    loop {
        let line = match Input::<String>::new()
            .with_prompt("shortlink")
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => line,
            Err(_) => break,
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let command = match PromptLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                let _ = e.print();
                continue;
            }
        };

        match command {
            Command::Create {
                url,
                minutes,
                days,
                code,
            } => handle_create(&registry, &config, url, minutes, days, code),
            Command::Batch { urls, minutes } => handle_batch(&registry, &config, urls, minutes),
            Command::Open { code } => handle_open(&registry, &config, &code),
            Command::List => handle_list(&registry, &config),
            Command::Events => handle_events(&registry),
            Command::Quit => break,
        }
        println!();
    }

    println!("{}", "👋 Bye".bright_black());
    Ok(())
}

fn build_registry(config: &Config, seed: Option<u64>) -> LinkRegistry {
    let generator = match seed {
        Some(seed) => config.seeded_code_generator(seed),
        None => config.code_generator(),
    };
    LinkRegistry::from_config(config, generator, Arc::new(TracingEventSink))
}

fn short_url(config: &Config, short_id: &str) -> String {
    format!("{}/{}", config.base_url, short_id)
}

fn print_error(err: &AppError) {
    println!("{} {}", "❌".red(), err.to_string().red());
    if !err.details().is_null() {
        println!("   {}", err.details().to_string().bright_black());
    }
}

fn print_created(config: &Config, link: &Link) {
    println!(
        "{} {} {} {}",
        "✅".green(),
        short_url(config, &link.short_id).bright_yellow().bold(),
        "→".bright_black(),
        link.target_url.cyan()
    );
    println!(
        "   expires {}",
        link.expires_at
            .format("%Y-%m-%d %H:%M UTC")
            .to_string()
            .bright_black()
    );
}

fn handle_create(
    registry: &LinkRegistry,
    config: &Config,
    url: String,
    minutes: Option<i64>,
    days: Option<i64>,
    code: Option<String>,
) {
    let validity = match (minutes, days) {
        (Some(m), _) => Some((m, ValidityUnit::Minutes)),
        (None, Some(d)) => Some((d, ValidityUnit::Days)),
        (None, None) => None,
    };

    let mut new_link = NewLink::new(url);
    if let Some((amount, unit)) = validity {
        match Validity::new(amount, unit) {
            Some(validity) => new_link = new_link.with_validity(validity),
            None => {
                println!("{} {}", "❌".red(), "Enter positive number".red());
                return;
            }
        }
    }
    if let Some(code) = code {
        new_link = new_link.with_preferred_code(code);
    }

    match registry.create(new_link) {
        Ok(link) => print_created(config, &link),
        Err(err) => print_error(&err),
    }
}

fn handle_batch(
    registry: &LinkRegistry,
    config: &Config,
    urls: Vec<String>,
    minutes: Option<String>,
) {
    let batch: Vec<CreationRequest> = urls
        .into_iter()
        .map(|url| {
            let request = CreationRequest::new(url);
            match &minutes {
                Some(m) => request.with_validity(m.clone()),
                None => request,
            }
        })
        .collect();

    match registry.create_batch(&batch, ValidityUnit::Minutes) {
        BatchOutcome::Rejected(report) => {
            println!("{}", "❌ Batch rejected, nothing was created".red().bold());
            if let Some(err) = report.batch_error {
                println!("   {}", err.to_string().red());
            }
            for (i, item) in report.items.iter().enumerate() {
                let problems: Vec<String> = [
                    item.errors.url.map(|e| e.to_string()),
                    item.errors.validity.map(|e| e.to_string()),
                    item.errors.shortcode.map(|e| e.to_string()),
                ]
                .into_iter()
                .flatten()
                .collect();
                if !problems.is_empty() {
                    println!(
                        "   #{} {}: {}",
                        i + 1,
                        item.request.url.cyan(),
                        problems.join(", ").red()
                    );
                }
            }
        }
        BatchOutcome::Processed(results) => {
            for item in results {
                match item.result {
                    Ok(link) => print_created(config, &link),
                    Err(err) => print_error(&err),
                }
            }
        }
    }
}

fn handle_open(registry: &LinkRegistry, config: &Config, code: &str) {
    let result = registry
        .resolve(code)
        .and_then(|link| registry.record_access(&link.short_id));

    match result {
        Ok(link) => {
            println!(
                "{} {} {}",
                short_url(config, &link.short_id).bright_yellow(),
                "→".bright_black(),
                link.target_url.cyan().bold()
            );
            println!(
                "   accesses: {}",
                link.access_count.to_string().bright_green().bold()
            );
        }
        Err(err) => print_error(&err),
    }
}

/// Prints all links as a table.
///
/// ```text
///   Short ID     Target                                   Expires            Hits
///   ───────────────────────────────────────────────────────────────────────────────
///   abc12        https://example.com                      2026-03-31 12:00   3
/// ```
fn handle_list(registry: &LinkRegistry, config: &Config) {
    println!("{}", "📋 Links".bright_blue().bold());

    let links = registry.list();
    if links.is_empty() {
        println!("{}", "  No links yet".yellow());
        return;
    }

    println!(
        "  {:<12} {:<40} {:<18} {}",
        "Short ID".bright_white().bold(),
        "Target".bright_white().bold(),
        "Expires".bright_white().bold(),
        "Hits".bright_white().bold()
    );
    println!("  {}", "─".repeat(79).bright_black());

    let now = registry.now();
    for link in &links {
        let expires = link.expires_at.format("%Y-%m-%d %H:%M").to_string();
        let expires = if link.is_expired_at(now) {
            expires.red()
        } else {
            expires.bright_black()
        };
        println!(
            "  {:<12} {:<40} {:<18} {}",
            link.short_id.bright_yellow(),
            link.target_url.cyan(),
            expires,
            link.access_count.to_string().bright_green()
        );
    }

    println!();
    println!(
        "  Total: {}  ({})",
        links.len().to_string().bright_white().bold(),
        short_url(config, "<id>").bright_black()
    );
}

fn handle_events(registry: &LinkRegistry) {
    println!("{}", "📜 Events".bright_blue().bold());

    let events = registry.events();
    if events.is_empty() {
        println!("{}", "  No events yet".yellow());
        return;
    }

    for event in &events {
        let kind = match event.kind {
            EventKind::Create => event.kind.as_str().green(),
            EventKind::Access => event.kind.as_str().cyan(),
        };
        println!(
            "  {} {:<6} {} {}",
            event.timestamp.to_rfc3339().bright_black(),
            kind,
            event.message,
            event.metadata.to_string().bright_black()
        );
    }
}
