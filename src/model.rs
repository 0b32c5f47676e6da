pub mod nominatim_api_model;
pub mod place;
pub mod trip;

pub use place::*;
pub use trip::*;
