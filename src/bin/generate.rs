//! CLI tool that generates walking routes from a SQLite graph database and
//! writes them as GeoJSON.
//!
//! ```text
//! cargo run --bin generate -- \
//!     --graph=regions/irvine.db --lat=33.646117 --lon=-117.843058 \
//!     --min=1000 --max=2000 --tag=paved --time-budget=20
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::{env, fs};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walkroute::config::RouteBuilderConfig;
use walkroute::constants::{MILES_TO_METERS, ROUTE_PRINT_ID_LIMIT};
use walkroute::db::{self, SqliteFeatureIndex, SqliteGraphProvider};
use walkroute::models::{Coordinates, EdgeId, Route, RouteParams};
use walkroute::services::geojson_export::routes_to_geojson;
use walkroute::services::route_generator::RouteGenerator;

const DEFAULT_TOP: usize = 10;
const DEFAULT_OUTPUT: &str = "routes.geojson";

fn print_help() {
    eprintln!(
        "\
Usage: generate [OPTIONS]

Generate walking routes near a point and write them as GeoJSON.

Options:
  --graph=PATH          SQLite database with nodes, edges and edge_features (required)
  --lat=DEG             Query latitude (required)
  --lon=DEG             Query longitude (required)
  --min=M               Minimum route distance in meters (default: 1000)
  --max=M               Maximum route distance in meters (default: 2000)
  --max-start=M         Max distance from the query point to a start node
  --tag=TAG             Rank routes by the share of distance carrying TAG
  --similarity=R        Overlap ratio in (0, 1] treated as a near-duplicate
  --time-budget=S       Keep searching for S seconds
  --attempts=N          Max synthesis attempts
  --workers=N           Parallel synthesis workers
  --seed=N              Fixed random seed
  --top=N               Number of routes to keep (default: {DEFAULT_TOP})
  --out=PATH            Output file (default: {DEFAULT_OUTPUT})
  --help                Show this help message"
    );
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter().find_map(|a| a.strip_prefix(name))
}

fn parse_flag<T: std::str::FromStr>(args: &[String], name: &str) -> Result<Option<T>, String> {
    flag(args, name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| format!("Invalid value for {}{}", name, raw))
        })
        .transpose()
}

fn format_ids(ids: &[i64]) -> String {
    let shown: Vec<String> = ids
        .iter()
        .take(ROUTE_PRINT_ID_LIMIT)
        .map(|id| id.to_string())
        .collect();
    if ids.len() > ROUTE_PRINT_ID_LIMIT {
        format!("[{}, ...]", shown.join(", "))
    } else {
        format!("[{}]", shown.join(", "))
    }
}

fn print_route(rank: usize, route: &Route, score: Option<f64>) {
    match score {
        Some(score) => println!("Route {} (score {:.3})", rank, score),
        None => println!("Route {}", rank),
    }
    println!(
        "  distance: {:.1} m ({:.2} mi)",
        route.distance_m,
        route.distance_m / MILES_TO_METERS
    );
    println!("  nodes ({}): {}", route.node_ids.len(), format_ids(&route.node_ids));
    println!("  edges ({}): {}", route.edge_ids.len(), format_ids(&route.edge_ids));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "walkroute=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--help") {
        print_help();
        return Ok(());
    }

    let graph_path = flag(&args, "--graph=").ok_or("Missing --graph=PATH argument")?;
    let lat: f64 = parse_flag(&args, "--lat=")?.ok_or("Missing --lat=DEG argument")?;
    let lon: f64 = parse_flag(&args, "--lon=")?.ok_or("Missing --lon=DEG argument")?;
    let start = Coordinates::new(lat, lon)?;

    let defaults = RouteBuilderConfig::from_env()?;
    let mut params = RouteParams::new(
        start,
        parse_flag(&args, "--min=")?.unwrap_or(1_000.0),
        parse_flag(&args, "--max=")?.unwrap_or(2_000.0),
        &defaults,
    );
    if let Some(max_start) = parse_flag(&args, "--max-start=")? {
        params.max_start_distance_m = max_start;
    }
    if let Some(similarity) = parse_flag(&args, "--similarity=")? {
        params.route_similarity_threshold = similarity;
    }
    if let Some(attempts) = parse_flag(&args, "--attempts=")? {
        params.max_attempts = attempts;
    }
    if let Some(workers) = parse_flag(&args, "--workers=")? {
        params.workers = workers;
    }
    params.time_budget_s = parse_flag(&args, "--time-budget=")?;
    params.score_tag = flag(&args, "--tag=").map(str::to_string);
    params.seed = parse_flag(&args, "--seed=")?.or(params.seed);

    let top: usize = parse_flag(&args, "--top=")?.unwrap_or(DEFAULT_TOP);
    let output = flag(&args, "--out=").unwrap_or(DEFAULT_OUTPUT);

    let pool = db::create_pool(graph_path).await?;
    let generator = RouteGenerator::new(
        Arc::new(SqliteGraphProvider::new(pool.clone())),
        Arc::new(SqliteFeatureIndex::new(pool)),
    );

    let (graph, batch) = generator.build_route_batch(&params).await?;
    println!(
        "Generated {} routes in {} attempts ({} dead ends, {} step limits)",
        batch.routes.len(),
        batch.stats.attempts,
        batch.stats.dead_ends,
        batch.stats.step_limits
    );

    let scored: Vec<(Route, Option<f64>)> = match params.ranking_tag() {
        Some(tag) => generator
            .score_routes_for_tag(batch.routes, tag, None)
            .await?
            .into_iter()
            .take(top)
            .map(|(route, score)| (route, Some(score)))
            .collect(),
        None => batch.routes.into_iter().take(top).map(|r| (r, None)).collect(),
    };

    for (i, (route, score)) in scored.iter().enumerate() {
        print_route(i + 1, route, *score);
    }

    let routes: Vec<Route> = scored.iter().map(|(route, _)| route.clone()).collect();
    let scores: Option<HashMap<Vec<EdgeId>, f64>> = params.ranking_tag().map(|_| {
        scored
            .iter()
            .map(|(route, score)| (route.edge_ids.clone(), score.unwrap_or(0.0)))
            .collect()
    });
    let collection = routes_to_geojson(&routes, &graph, scores.as_ref());
    fs::write(output, collection.to_string())?;
    println!("Wrote {} routes to {}", routes.len(), output);

    Ok(())
}
