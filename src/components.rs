pub mod debounce;
pub mod location_search;
pub mod map;

pub use location_search::{Key, LocationSearch, SearchOptions};
pub use map::MapView;
