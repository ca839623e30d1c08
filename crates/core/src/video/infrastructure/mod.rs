pub mod ffmpeg_reader;
pub mod live_frame_feed;
