//! Bounded sample history shared by several consumers

pub mod ring;

pub use ring::{CircularSampleBuffer, CopyPolicy, Cursor};
