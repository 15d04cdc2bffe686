use anyhow::Context;
use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use placecheck::config::parse_now;
use placecheck::models::{BuildingFactsResult, FactCheckResult, LocationQuery};
use placecheck::pipeline::fetch::SearxSearch;
use placecheck::pipeline::mock::StaticSearch;
use placecheck::pipeline::osm::{NominatimGeocoder, OverpassFootprints};
use placecheck::pipeline::wiki::{WikidataGraph, WikipediaSummaries};
use placecheck::pipeline::{
    BuildingResolver, FactCheckPipeline, OpenedPage, SearchHit, SearchOptions, WebSearchTool,
};
use placecheck::{PipelineConfig, ProviderResult};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "placecheck")]
#[command(about = "Verifiable building facts and fact checks for place narratives", long_about = None)]
#[command(version)]
struct Cli {
    /// Sources needed before a fact or claim reads as confirmed
    #[arg(long, global = true)]
    min_sources: Option<usize>,

    /// Fixed clock for evidence access dates (RFC 3339 or YYYY-MM-DD)
    #[arg(long, global = true)]
    now: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve facts about the building at an address or coordinate
    Facts {
        #[arg(long)]
        address: Option<String>,

        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        #[arg(long, default_value = "en")]
        locale: String,
    },

    /// Fact-check a narrative paragraph
    Check { paragraph: String },

    /// Print the JSON schema of a result
    Schema {
        #[arg(value_enum)]
        kind: SchemaKind,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaKind {
    Facts,
    Check,
}

/// Web search backend; offline when no search endpoint is configured.
enum Search {
    Searx(SearxSearch),
    Offline(StaticSearch),
}

#[async_trait]
impl WebSearchTool for Search {
    async fn search(&self, query: &str, options: &SearchOptions) -> ProviderResult<Vec<SearchHit>> {
        match self {
            Search::Searx(s) => s.search(query, options).await,
            Search::Offline(s) => s.search(query, options).await,
        }
    }

    async fn open_url(&self, url: &str) -> ProviderResult<OpenedPage> {
        match self {
            Search::Searx(s) => s.open_url(url).await,
            Search::Offline(s) => s.open_url(url).await,
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("placecheck=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = PipelineConfig::from_env();
    if let Some(n) = cli.min_sources {
        config.min_sources = n.max(1);
    }
    if let Some(raw) = &cli.now {
        config.now = Some(parse_now(raw).with_context(|| format!("invalid --now value {raw:?}"))?);
    }

    match cli.command {
        Commands::Facts {
            address,
            lat,
            lon,
            locale,
        } => {
            if address.is_none() && lat.is_none() {
                anyhow::bail!("pass --address or --lat/--lon");
            }
            let query = LocationQuery {
                address,
                lat,
                lon,
                locale,
            };
            let resolver = BuildingResolver {
                geocoder: NominatimGeocoder::new(&config)?,
                footprints: OverpassFootprints::new(&config)?,
                knowledge_graph: WikidataGraph::new(&config)?,
                summaries: WikipediaSummaries::new(&config)?,
                config,
            };
            print_json(&resolver.resolve(&query).await)
        }
        Commands::Check { paragraph } => {
            let search = match SearxSearch::new(&config) {
                Ok(s) => Search::Searx(s),
                Err(err) => {
                    warn!(error = %err, "searching offline; every claim will be uncertain");
                    Search::Offline(StaticSearch::default())
                }
            };
            let pipeline = FactCheckPipeline::new(search, config);
            print_json(&pipeline.check(&paragraph).await)
        }
        Commands::Schema { kind } => match kind {
            SchemaKind::Facts => print_json(&schemars::schema_for!(BuildingFactsResult)),
            SchemaKind::Check => print_json(&schemars::schema_for!(FactCheckResult)),
        },
    }
}
