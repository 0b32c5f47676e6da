use anyhow::Result;
use clap::Parser;
use components::LocationSearch;
use config::{Args, Command};
use dotenvy::dotenv;
use model::{Place, TripId};
use planner::{LocationState, TripPlanner, trip_request::save_log_sheet};
use services::{GEOLOCATION_TIMEOUT, Geocoder, NominatimClient, TripApiClient};
use session::Session;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::info;

mod components;
mod config;
mod model;
mod planner;
mod services;
mod session;
mod telemetry;
mod utils;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    _ = dotenv();
    let args = Args::parse();

    let _telemetry = telemetry::init(&args.log_dir, args.otlp_endpoint.as_deref())?;
    info!("OTLP_ENDPOINT: {:?}", args.otlp_endpoint);

    let geocoder: Arc<dyn Geocoder> = Arc::new(NominatimClient::new(
        &args.nominatim_url,
        &args.user_agent,
        args.request_timeout(),
    )?);
    let trip_api = TripApiClient::new(&args.trip_api_url, &args.user_agent, args.request_timeout())?;

    match args.command.clone().unwrap_or(Command::Plan) {
        Command::Plan => plan(&args, geocoder, trip_api).await,
        Command::Search { query } => search(&args, geocoder, &query).await,
        Command::Logsheet { trip_id } => {
            let trip_id: TripId = trip_id.parse()?;
            let path = save_log_sheet(&trip_api, &trip_id, &args.output_dir).await?;
            println!("log sheet saved to {}", path.display());
            Ok(())
        }
    }
}

async fn plan(args: &Args, geocoder: Arc<dyn Geocoder>, trip_api: TripApiClient) -> Result<()> {
    let mut state = LocationState::default();
    state
        .initialize(
            args.geolocator().as_ref(),
            geocoder.as_ref(),
            GEOLOCATION_TIMEOUT,
        )
        .await;

    let planner = TripPlanner::new(trip_api, args.output_dir.clone());

    Session::new(
        state,
        planner,
        geocoder,
        args.search_options(),
        args.output_dir.clone(),
    )
    .run()
    .await
}

/// Runs `query` through a search field and prints what comes back
async fn search(args: &Args, geocoder: Arc<dyn Geocoder>, query: &str) -> Result<()> {
    let options = args.search_options();
    let mut field = LocationSearch::new("Search", geocoder, options, Box::new(|_: Place| {}));
    let mut changes = field.subscribe();

    field.set_query(query);

    if timeout(options.debounce + args.request_timeout(), changes.changed())
        .await
        .is_err()
        || field.suggestions().is_empty()
    {
        println!("no suggestions for {query:?}");
        return Ok(());
    }

    for line in field.render_lines() {
        println!("{line}");
    }

    Ok(())
}
