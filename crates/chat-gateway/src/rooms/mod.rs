//! Room membership

mod tracker;

pub use tracker::RoomTracker;
