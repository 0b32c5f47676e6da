//! Client for the remote trip-planning service
use reqwest::{Client, header::CONTENT_TYPE};
use std::time::Duration;
use tracing::{Instrument, info, info_span};

use crate::model::{TripId, TripRequestPayload, TripResponse};

#[derive(Debug, Clone)]
pub struct TripApiClient {
    client: Client,
    base_url: String,
}

impl TripApiClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, TripApiError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(TripApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Plans a trip. The response carries the route geometry and the stops.
    #[tracing::instrument(err, skip(self))]
    pub async fn create_trip(
        &self,
        payload: &TripRequestPayload,
    ) -> Result<TripResponse, TripApiError> {
        let body = serde_json::to_string(payload)?;

        let response = self
            .client
            .post(format!("{}/api/create_trip/", self.base_url))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .instrument(info_span!("Creating trip"))
            .await?
            .error_for_status()?;

        let trip_string = response
            .text()
            .instrument(info_span!("Reading body of response"))
            .await?;

        let trip: TripResponse =
            serde_json::from_str(&trip_string).map_err(|e| TripApiError::ParsingError {
                source: e,
                body: trip_string,
            })?;

        info!(
            "trip {} planned with {} route points and {} stops",
            trip.id,
            trip.route_geometry.coordinates.len(),
            trip.stops.len()
        );

        Ok(trip)
    }

    /// Raw bytes of the trip's log sheet PDF
    #[tracing::instrument(err, skip(self, trip_id), fields(trip_id = %trip_id))]
    pub async fn fetch_log_sheet(&self, trip_id: &TripId) -> Result<Vec<u8>, TripApiError> {
        let response = self
            .client
            .get(format!("{}/api/logsheet/", self.base_url))
            .query(&[("trip_id", trip_id.to_string())])
            .send()
            .instrument(info_span!("Fetching log sheet"))
            .await?
            .error_for_status()?;

        let bytes = response
            .bytes()
            .instrument(info_span!("Reading body of response"))
            .await?;

        info!("got a {} byte log sheet", bytes.len());

        Ok(bytes.to_vec())
    }
}

/// File name the log sheet of `trip_id` is saved under
pub fn log_sheet_file_name(trip_id: &TripId) -> String {
    format!("logsheet_trip_{}.pdf", trip_id.file_stem())
}

#[derive(thiserror::Error, Debug)]
pub enum TripApiError {
    #[error("error talking to the trip service: {0}")]
    HttpRequestError(#[from] reqwest::Error),

    #[error("error encoding the trip request: {0}")]
    EncodingError(#[from] serde_json::Error),

    #[error("error parsing the trip response: {source} \n{body}")]
    ParsingError {
        source: serde_json::Error,
        body: String,
    },
}
