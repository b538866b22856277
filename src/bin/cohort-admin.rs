use std::panic::{catch_unwind, AssertUnwindSafe};

use anyhow::Result;
use chrono::{Days, Local};
use clap::{Parser, Subcommand};
use rand::RngExt;
use tokio::sync::{mpsc, watch};

use cohort::fetch::{ApiClient, ChangeListener, Orchestrator};
use cohort::models::ClientRecord;
use cohort::state::{Action, Dashboard, DashboardState, Lifecycle};
use cohort::store::{FileStore, RecordStore};

#[derive(Parser)]
#[command(name = "cohort-admin")]
#[command(about = "Cohort dashboard admin CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a record database with plausible sample data
    Seed {
        /// Number of client records
        #[arg(long, default_value_t = 100)]
        count: usize,
        /// Output path for the flat-file database
        #[arg(long, default_value = "db.json")]
        out: String,
        /// Fraction of flagged records marked active
        #[arg(long, default_value_t = 0.8)]
        active_ratio: f64,
    },
    /// Fetch one dashboard snapshot and print it
    Summary {
        #[arg(long, default_value = "http://127.0.0.1:3001")]
        base_url: String,
        /// Name search term
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        /// Subscription tier
        #[arg(long)]
        tier: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        per_page: u32,
    },
    /// Run a headless dashboard session, re-rendering on every change
    Watch {
        #[arg(long, default_value = "http://127.0.0.1:3001")]
        base_url: String,
    },
}

const FIRST_WORDS: &[&str] = &[
    "Acme", "Apex", "Atlas", "Borealis", "Cascade", "Cobalt", "Crestline", "Delta", "Evergreen",
    "Falcon", "Granite", "Harbor", "Juniper", "Keystone", "Lakeside", "Meridian", "Northwind",
    "Orchard", "Pinnacle", "Quartz", "Redwood", "Sterling", "Summit", "Vertex", "Willow",
];

const SECOND_WORDS: &[&str] = &[
    "Analytics", "Consulting", "Dynamics", "Group", "Holdings", "Industries", "Labs",
    "Logistics", "Partners", "Solutions", "Systems", "Ventures",
];

const INDUSTRIES: &[&str] = &[
    "Technology", "Finance", "Healthcare", "Retail", "Manufacturing", "Education",
];

const TIERS: &[&str] = &["Basic", "Standard", "Premium"];

const LOCATIONS: &[&str] = &[
    "Austin", "Berlin", "Chicago", "Denver", "Lisbon", "London", "Madrid", "New York", "Oslo",
    "Portland", "Seattle", "Toronto",
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Seed {
            count,
            out,
            active_ratio,
        } => {
            let records = seed_records(count, active_ratio);
            let store = FileStore::new(&out);
            store.replace(records).await?;
            println!("✓ Wrote {count} client records to {out}");
        }
        Commands::Summary {
            base_url,
            search,
            industry,
            tier,
            page,
            per_page,
        } => {
            let dashboard = Dashboard::new();
            if let Some(term) = search {
                dashboard.dispatch(Action::CommitSearch(term));
            }
            dashboard.dispatch(Action::SetIndustry(industry));
            dashboard.dispatch(Action::SetTier(tier));
            // per-page before page: changing the page size resets to page 1
            dashboard.dispatch(Action::SetPerPage(per_page));
            dashboard.dispatch(Action::SetPage(page));

            let api = ApiClient::new(&base_url)?;
            let orchestrator = Orchestrator::new(dashboard.clone(), api);
            orchestrator.fetch_once().await;

            let state = dashboard.snapshot();
            render_guarded(&state);
            if let Lifecycle::Failed(reason) = &state.lifecycle {
                anyhow::bail!("fetch failed: {reason}");
            }
        }
        Commands::Watch { base_url } => {
            let dashboard = Dashboard::new();
            let api = ApiClient::new(&base_url)?;
            let orchestrator = Orchestrator::new(dashboard.clone(), api);

            let (ping_tx, ping_rx) = mpsc::channel(1);
            let (shutdown_tx, shutdown_rx) = watch::channel(false);

            let listener = ChangeListener::new(&base_url)?;
            tokio::spawn(listener.run(ping_tx, shutdown_rx.clone()));
            tokio::spawn(orchestrator.run(ping_rx, shutdown_rx));

            println!("Watching {base_url}; press Ctrl-C to stop.");
            let mut states = dashboard.subscribe();
            loop {
                tokio::select! {
                    changed = states.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let state = states.borrow_and_update().clone();
                        render_guarded(&state);
                    }
                    _ = tokio::signal::ctrl_c() => {
                        println!("Stopping.");
                        break;
                    }
                }
            }
            let _ = shutdown_tx.send(true);
        }
    }

    Ok(())
}

fn seed_records(count: usize, active_ratio: f64) -> Vec<ClientRecord> {
    let mut rng = rand::rng();
    let today = Local::now().date_naive();

    (1..=count)
        .map(|id| {
            let name = format!(
                "{} {}",
                FIRST_WORDS[rng.random_range(0..FIRST_WORDS.len())],
                SECOND_WORDS[rng.random_range(0..SECOND_WORDS.len())],
            );
            let signup = today - Days::new(rng.random_range(0..1460));
            // a few records predate the active flag and carry none
            let is_active = if rng.random_range(0.0..1.0) < 0.03 {
                None
            } else {
                Some(rng.random_range(0.0..1.0) < active_ratio)
            };

            ClientRecord {
                id: id as i64,
                name,
                industry: INDUSTRIES[rng.random_range(0..INDUSTRIES.len())].to_string(),
                location: LOCATIONS[rng.random_range(0..LOCATIONS.len())].to_string(),
                subscription_tier: TIERS[rng.random_range(0..TIERS.len())].to_string(),
                signup_date: signup.to_string(),
                is_active,
            }
        })
        .collect()
}

/// Render inside a panic guard: a formatting bug degrades to a notice
/// instead of taking down a watch session.
fn render_guarded(state: &DashboardState) {
    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| render(state))) {
        let detail = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        println!("⚠ Something went wrong rendering the dashboard: {detail}");
    }
}

fn render(state: &DashboardState) {
    println!();
    println!("{}", "=".repeat(76));
    match &state.lifecycle {
        Lifecycle::Idle => println!("(waiting for the first fetch)"),
        Lifecycle::Loading => println!("(loading...)"),
        Lifecycle::Succeeded => {}
        Lifecycle::Failed(reason) => println!("⚠ Fetch failed: {reason}"),
    }

    println!(
        "Clients: {} matching | {} active / {} inactive | avg tenure {:.1} months",
        state.result.total,
        state.counts.active_clients,
        state.counts.inactive_clients,
        state.metrics.avg_tenure_months,
    );

    if !state.metrics.industry_distribution.is_empty() {
        let mut industries: Vec<_> = state.metrics.industry_distribution.iter().collect();
        industries.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        let line = industries
            .iter()
            .map(|(name, count)| format!("{name} {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Industries on this page: {line}");
    }

    if !state.metrics.monthly_growth.is_empty() {
        let line = state
            .metrics
            .monthly_growth
            .iter()
            .map(|point| format!("{} {}", point.month, point.count))
            .collect::<Vec<_>>()
            .join(" | ");
        println!("Signups by month: {line}");
    }

    println!("{}", "-".repeat(76));
    println!(
        "{:<5} {:<26} {:<14} {:<12} {:<9} {}",
        "ID", "Name", "Industry", "Location", "Tier", "Signed up"
    );
    for record in &state.result.records {
        println!(
            "{:<5} {:<26} {:<14} {:<12} {:<9} {}",
            record.id,
            record.name,
            record.industry,
            record.location,
            record.subscription_tier,
            record.signup_date,
        );
    }

    let pages = state.result.total.div_ceil(state.result.per_page.max(1) as u64);
    println!(
        "Page {} of {} ({} per page)",
        state.result.page,
        pages.max(1),
        state.result.per_page
    );
}
