pub mod frame_provider;
pub mod video_reader;
pub mod video_source;
