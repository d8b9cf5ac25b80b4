pub mod segment;

pub use segment::{sort_by_capture_time, PhotoSegment};
