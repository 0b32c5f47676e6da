//! Forward and reverse geocoding against a Nominatim instance
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{Instrument, info, info_span};

use crate::model::{
    Coordinates,
    nominatim_api_model::{NominatimReverse, NominatimSuggestion},
};

/// Source of place candidates for free text and of names for coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Ranked candidates for `query`, best match first
    async fn search(&self, query: &str, limit: usize)
    -> Result<Vec<NominatimSuggestion>, GeocodeError>;

    /// Display name of the place at `coordinates`, if the provider knows one
    async fn reverse(&self, coordinates: Coordinates) -> Result<Option<String>, GeocodeError>;
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(NominatimClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_text(&self, path: &str, params: &[(&str, String)]) -> Result<String, GeocodeError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .query(params)
            .send()
            .instrument(info_span!("Querying nominatim", path))
            .await?
            .error_for_status()?;

        let text = response
            .text()
            .instrument(info_span!("Reading body of response"))
            .await?;

        Ok(text)
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    #[tracing::instrument(err, skip(self))]
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<NominatimSuggestion>, GeocodeError> {
        let body = self
            .get_text(
                "search",
                &[
                    ("q", query.to_string()),
                    ("format", "json".to_string()),
                    ("addressdetails", "1".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let suggestions: Vec<NominatimSuggestion> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::ParsingError { source: e, body })?;

        info!("got {} suggestions", suggestions.len());

        Ok(suggestions)
    }

    #[tracing::instrument(err, skip(self))]
    async fn reverse(&self, coordinates: Coordinates) -> Result<Option<String>, GeocodeError> {
        let body = self
            .get_text(
                "reverse",
                &[
                    ("lat", coordinates.lat.to_string()),
                    ("lon", coordinates.lon.to_string()),
                    ("format", "json".to_string()),
                ],
            )
            .await?;

        let reverse: NominatimReverse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::ParsingError { source: e, body })?;

        if let Some(error) = &reverse.error {
            info!("nominatim couldn't name the position: {error}");
        }

        Ok(reverse.display_name)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GeocodeError {
    #[error("error querying the geocoder: {0}")]
    HttpRequestError(#[from] reqwest::Error),

    #[error("error parsing the geocoder response: {source} \n{body}")]
    ParsingError {
        source: serde_json::Error,
        body: String,
    },
}
