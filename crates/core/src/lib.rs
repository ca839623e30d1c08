//! Dwell-gated face capture.
//!
//! A session samples the latest camera frame on a fixed tick, detects faces,
//! and counts how long one stays centered inside an oval guide. Once the
//! dwell threshold is reached it takes a display-sized snapshot and hands
//! it to a sink that saves it locally or uploads it.

pub mod capture;
pub mod config;
pub mod detection;
pub mod gate;
pub mod pipeline;
pub mod rendering;
pub mod shared;
pub mod video;
