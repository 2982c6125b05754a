use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use nexus_analytics::ingestion::FileSource;
use nexus_analytics::{build_snapshot, export, DashboardConfig, DatasetCache, FilterSpec};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nexus")]
#[command(about = "Sales analytics over order and product exports")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ClapArgs)]
struct SourceArgs {
    /// Order transactions CSV (or set NEXUS_ORDERS_PATH)
    #[arg(long)]
    orders: Option<PathBuf>,

    /// Product catalog CSV (or set NEXUS_PRODUCTS_PATH)
    #[arg(long)]
    products: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print KPIs and table sizes, optionally exporting every table
    Report {
        #[command(flatten)]
        sources: SourceArgs,

        /// Only include these countries (repeatable)
        #[arg(long = "country")]
        countries: Vec<String>,

        /// Only include these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Directory to write CSV tables and snapshot.json into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// List the countries and categories available for filtering
    Options {
        #[command(flatten)]
        sources: SourceArgs,
    },
}

struct Resolved {
    config: DashboardConfig,
    orders: FileSource,
    products: FileSource,
}

fn resolve(sources: SourceArgs) -> Result<Resolved> {
    let config = match &sources.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DashboardConfig::default(),
    }
    .with_env_overrides();

    let orders = sources
        .orders
        .or_else(|| config.sources.orders.clone())
        .context("No orders source: pass --orders or set NEXUS_ORDERS_PATH")?;
    let products = sources
        .products
        .or_else(|| config.sources.products.clone())
        .context("No products source: pass --products or set NEXUS_PRODUCTS_PATH")?;

    Ok(Resolved {
        config,
        orders: FileSource::new("orders", orders),
        products: FileSource::new("products", products),
    })
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Report {
            sources,
            countries,
            categories,
            output_dir,
        } => run_report(sources, countries, categories, output_dir),
        Commands::Options { sources } => run_options(sources),
    }
}

fn run_report(
    sources: SourceArgs,
    countries: Vec<String>,
    categories: Vec<String>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let resolved = resolve(sources)?;
    let cache = DatasetCache::new(resolved.config);
    let dataset = cache.get_or_load(&resolved.orders, &resolved.products)?;

    let filter = FilterSpec::new()
        .with_countries(countries)
        .with_categories(categories);
    let snapshot = build_snapshot(&dataset, &filter, &cache.config().limits)?;

    let kpis = &snapshot.kpis;
    println!("\n=== NEXUS Report ===");
    println!("Total Revenue : ${:.1}M", kpis.total_revenue / 1e6);
    println!("Net Profit    : ${:.1}M", kpis.total_profit / 1e6);
    println!("Profit Margin : {:.1}%", kpis.margin_percent);
    println!("Total Orders  : {}", kpis.order_count);
    println!();
    println!("Trend months      : {}", snapshot.trend.len());
    println!("Mix slices        : {}", snapshot.category_mix.len());
    println!(
        "Demographic grid  : {} x {}",
        snapshot.demographics.categories.len(),
        snapshot.demographics.age_groups.len()
    );
    println!("Top territories   : {}", snapshot.territories.len());
    for territory in snapshot.territories.iter().rev() {
        println!("  {:<24} ${:>14.2}  margin {:>6.1}%", territory.country, territory.revenue, territory.mean_margin);
    }
    println!("Products          : {}", snapshot.products.len());
    println!("Transactions      : {}", snapshot.transactions.len());

    if let Some(dir) = output_dir {
        let written = export::write_snapshot(&snapshot, &dir)?;
        info!(files = written.len(), "export complete");
        println!("\nWrote {} files to {}", written.len(), dir.display());
    }

    Ok(())
}

fn run_options(sources: SourceArgs) -> Result<()> {
    let resolved = resolve(sources)?;
    let cache = DatasetCache::new(resolved.config);
    let dataset = cache.get_or_load(&resolved.orders, &resolved.products)?;
    let options = dataset.filter_options();

    println!("Countries ({}):", options.countries.len());
    for country in &options.countries {
        println!("  {}", country);
    }
    println!("Categories ({}):", options.categories.len());
    for category in &options.categories {
        println!("  {}", category);
    }

    Ok(())
}
