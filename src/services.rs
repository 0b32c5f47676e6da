pub mod geocoder;
pub mod geolocation;
pub mod trip_api;

pub use geocoder::*;
pub use geolocation::*;
pub use trip_api::*;
