use crate::shared::frame::Frame;

/// Hands the session whatever frame is current when a tick fires.
///
/// Ticks never wait for a new frame; they look at the latest one.
pub trait FrameProvider: Send {
    /// The most recent frame, or `None` if nothing has been decoded yet.
    fn latest(&mut self) -> Option<Frame>;

    /// True once the source has ended and no further frames will arrive.
    fn is_exhausted(&self) -> bool;
}
