use crate::shared::frame::Frame;
use crate::video::domain::video_source::{StreamMetadata, VideoSource};

/// Pulls decoded frames from a camera or a recorded video.
///
/// Failing to open is the "no camera / no permission" case: the session
/// never starts.
pub trait VideoReader: Send {
    fn open(&mut self, source: &VideoSource) -> Result<StreamMetadata, Box<dyn std::error::Error>>;

    /// Frames in decode order. Ends when the stream does.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    fn close(&mut self);
}
