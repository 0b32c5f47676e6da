//! The three locations a trip needs and where each came from
use std::time::Duration;
use tracing::{info, warn};

use crate::{
    model::{Coordinates, Place, TripRequestPayload},
    services::{Geocoder, Geolocator, geolocation::locate},
};

pub const UNKNOWN_LOCATION: &str = "Unknown Location";
pub const FETCHING_LOCATION: &str = "Fetching current location...";
pub const MANUAL_ENTRY_LABEL: &str = "Current Location (Manual Entry)";
pub const PICKUP_LABEL: &str = "Pickup Location";
pub const DROPOFF_LABEL: &str = "Dropoff Location";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Current,
    Pickup,
    Dropoff,
}

impl Slot {
    pub fn label(&self) -> &'static str {
        match self {
            Slot::Current => MANUAL_ENTRY_LABEL,
            Slot::Pickup => PICKUP_LABEL,
            Slot::Dropoff => DROPOFF_LABEL,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct LocationState {
    current_coordinates: Option<Coordinates>,
    current_address: String,
    /// Set when the position or its name couldn't be determined; the current
    /// location then has to be searched for by hand
    fallback_mode: bool,
    pickup: Option<Place>,
    dropoff: Option<Place>,
    cycle_hours: String,
}

impl LocationState {
    /// Looks up the device position and names it.
    ///
    /// Any failure switches to manual entry. If only the naming fails the
    /// coordinates are kept.
    pub async fn initialize(
        &mut self,
        geolocator: &dyn Geolocator,
        geocoder: &dyn Geocoder,
        limit: Duration,
    ) {
        let coordinates = match locate(geolocator, limit).await {
            Ok(coordinates) => coordinates,
            Err(e) => {
                warn!("Geolocation error. Manual entry required. {e}");
                self.fallback_mode = true;
                return;
            }
        };

        self.current_coordinates = Some(coordinates);

        match geocoder.reverse(coordinates).await {
            Ok(name) => {
                self.current_address = name.unwrap_or_else(|| UNKNOWN_LOCATION.to_string());
                info!("current location is {}", self.current_address);
            }
            Err(e) => {
                warn!("Error fetching address, manual entry required. {e}");
                self.fallback_mode = true;
            }
        }
    }

    pub fn set(&mut self, slot: Slot, place: Place) {
        match slot {
            Slot::Current => self.set_current(place),
            Slot::Pickup => self.set_pickup(place),
            Slot::Dropoff => self.set_dropoff(place),
        }
    }

    pub fn set_current(&mut self, place: Place) {
        self.current_coordinates = Some(place.coordinates());
        self.current_address = place.display_name;
    }

    pub fn set_pickup(&mut self, place: Place) {
        self.pickup = Some(place);
    }

    pub fn set_dropoff(&mut self, place: Place) {
        self.dropoff = Some(place);
    }

    /// Stores the hours as typed. Blank clears them; anything else has to be a number.
    pub fn set_cycle_hours(&mut self, hours: &str) -> Result<(), InvalidCycleHours> {
        let hours = hours.trim();
        if !hours.is_empty() && !hours.parse::<f64>().is_ok_and(f64::is_finite) {
            return Err(InvalidCycleHours(hours.to_string()));
        }

        self.cycle_hours = hours.to_string();
        Ok(())
    }

    pub fn is_fallback_mode(&self) -> bool {
        self.fallback_mode
    }

    pub fn current_coordinates(&self) -> Option<Coordinates> {
        self.current_coordinates
    }

    /// What to show for the current location outside of manual entry
    pub fn current_display(&self) -> &str {
        if self.current_address.is_empty() {
            FETCHING_LOCATION
        } else {
            &self.current_address
        }
    }

    pub fn pickup(&self) -> Option<&Place> {
        self.pickup.as_ref()
    }

    pub fn dropoff(&self) -> Option<&Place> {
        self.dropoff.as_ref()
    }

    pub fn cycle_hours(&self) -> &str {
        &self.cycle_hours
    }

    pub fn missing_slots(&self) -> Vec<Slot> {
        let mut missing = vec![];
        if self.current_coordinates.is_none() {
            missing.push(Slot::Current);
        }
        if self.pickup.is_none() {
            missing.push(Slot::Pickup);
        }
        if self.dropoff.is_none() {
            missing.push(Slot::Dropoff);
        }
        missing
    }

    /// `None` until current, pickup and dropoff are all set
    pub fn payload(&self) -> Option<TripRequestPayload> {
        Some(TripRequestPayload::new(
            self.current_coordinates.as_ref()?,
            &self.current_address,
            self.pickup.as_ref()?,
            self.dropoff.as_ref()?,
            &self.cycle_hours,
        ))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("cycle hours must be a number, got {0:?}")]
pub struct InvalidCycleHours(pub String);
