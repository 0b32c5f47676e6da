//! Submits the collected locations and keeps what the trip service planned
use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::location_state::LocationState;
use crate::{
    components::MapView,
    model::{Coordinates, TripId, TripResponse},
    services::{TripApiClient, TripApiError, trip_api::log_sheet_file_name},
};

pub const MISSING_LOCATIONS_MESSAGE: &str =
    "Please ensure current, pickup, and dropoff locations are set.";

#[derive(Debug)]
pub struct TripPlanner {
    client: TripApiClient,
    output_dir: PathBuf,
    trip: Option<TripResponse>,
}

impl TripPlanner {
    pub fn new(client: TripApiClient, output_dir: impl Into<PathBuf>) -> Self {
        TripPlanner {
            client,
            output_dir: output_dir.into(),
            trip: None,
        }
    }

    /// The last successfully planned trip
    pub fn trip(&self) -> Option<&TripResponse> {
        self.trip.as_ref()
    }

    /// Sends the trip request. Nothing is sent unless all three locations are set.
    /// A failed request leaves the previous trip in place.
    #[tracing::instrument(err, skip_all)]
    pub async fn submit(&mut self, state: &LocationState) -> Result<&TripResponse, SubmitError> {
        let payload = state.payload().ok_or(SubmitError::MissingLocations)?;

        let trip = self.client.create_trip(&payload).await.map_err(|e| {
            error!("Error fetching route: {e}");
            e
        })?;

        Ok(self.trip.insert(trip))
    }

    pub fn map_view(&self, current: Option<Coordinates>) -> Option<MapView> {
        self.trip
            .as_ref()
            .map(|trip| MapView::new(&trip.route_geometry, &trip.stops, current))
    }

    /// Saves the log sheet of the planned trip, if there is one
    pub async fn download_log_sheet(&self) -> Result<Option<PathBuf>, LogSheetError> {
        let Some(trip) = &self.trip else {
            return Ok(None);
        };

        save_log_sheet(&self.client, &trip.id, &self.output_dir)
            .await
            .map(Some)
    }
}

/// Fetches the log sheet of `trip_id` and writes it to `dir` as `logsheet_trip_<id>.pdf`
#[tracing::instrument(err, skip(client, trip_id), fields(trip_id = %trip_id))]
pub async fn save_log_sheet(
    client: &TripApiClient,
    trip_id: &TripId,
    dir: &Path,
) -> Result<PathBuf, LogSheetError> {
    let bytes = client.fetch_log_sheet(trip_id).await?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(log_sheet_file_name(trip_id));
    tokio::fs::write(&path, bytes).await?;

    info!("log sheet saved to {}", path.display());

    Ok(path)
}

#[derive(thiserror::Error, Debug)]
pub enum SubmitError {
    #[error("Please ensure current, pickup, and dropoff locations are set.")]
    MissingLocations,

    #[error(transparent)]
    TripApi(#[from] TripApiError),
}

#[derive(thiserror::Error, Debug)]
pub enum LogSheetError {
    #[error("error downloading the log sheet: {0}")]
    TripApi(#[from] TripApiError),

    #[error("error saving the log sheet: {0}")]
    Io(#[from] std::io::Error),
}
