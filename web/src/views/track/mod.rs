pub mod details;
pub mod live;
pub mod markers;
pub mod page;
pub mod trip_map;

pub use page::TrackingPage;
