pub mod location_state;
pub mod trip_request;

pub use location_state::{LocationState, Slot};
pub use trip_request::{SubmitError, TripPlanner};
