use clap::{Parser, Subcommand};
use std::{path::PathBuf, time::Duration};

use crate::{
    components::SearchOptions,
    model::Coordinates,
    services::{DeniedGeolocation, FixedPosition, Geolocator, NoGeolocation, UnreadablePosition},
    utils::parse_coordinate_pair,
};

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_TRIP_API_URL: &str = "https://trip-planner-api-rc1h.onrender.com";

/// Plan a trip and fetch its driver log sheet.
///
/// Every option can also be set in the environment or in a `.env` file.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[arg(long, env = "NOMINATIM_URL", default_value = DEFAULT_NOMINATIM_URL, global = true)]
    pub nominatim_url: String,

    #[arg(long, env = "TRIP_API_URL", default_value = DEFAULT_TRIP_API_URL, global = true)]
    pub trip_api_url: String,

    /// Nominatim rejects requests without an identifying user agent
    #[arg(
        long,
        env = "USER_AGENT",
        default_value = concat!("trip_planner/", env!("CARGO_PKG_VERSION")),
        global = true
    )]
    pub user_agent: String,

    /// Current position as "lat,lon". Without it the current location is searched for by hand.
    #[arg(long, env = "CURRENT_POSITION", global = true)]
    pub position: Option<String>,

    /// Don't use the current position even if one is configured
    #[arg(long, global = true)]
    pub deny_location: bool,

    #[arg(long, env = "DEBOUNCE_MS", default_value_t = 300, global = true)]
    pub debounce_ms: u64,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "LOG_DIR", default_value = "./logs", global = true)]
    pub log_dir: PathBuf,

    /// Where log sheets and route GeoJSON files are written
    #[arg(long, env = "OUTPUT_DIR", default_value = ".", global = true)]
    pub output_dir: PathBuf,

    /// Spans are exported over OTLP/gRPC when set
    #[arg(long, env = "OTLP_ENDPOINT", global = true)]
    pub otlp_endpoint: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Fill in the trip form interactively (default)
    Plan,
    /// Print the suggestions for a query
    Search { query: String },
    /// Download the log sheet of an existing trip
    Logsheet { trip_id: String },
}

impl Args {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            ..SearchOptions::default()
        }
    }

    pub fn geolocator(&self) -> Box<dyn Geolocator> {
        if self.deny_location {
            return Box::new(DeniedGeolocation);
        }

        match &self.position {
            None => Box::new(NoGeolocation),
            Some(position) => match parse_coordinate_pair(position) {
                Some((lat, lon)) => Box::new(FixedPosition(Coordinates { lat, lon })),
                None => Box::new(UnreadablePosition(position.clone())),
            },
        }
    }
}
