use crate::gate::domain::dwell_gate::TickOutcome;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;
use crate::shared::oval_region::OvalRegion;

/// Presents the session's view on the display surface.
///
/// `begin` receives the guide oval once, before the first tick. Each
/// `render` then gets the display-sized frame, that tick's boxes in display
/// coordinates, and the gate's outcome.
pub trait OverlayRenderer: Send {
    fn begin(
        &mut self,
        oval: &OvalRegion,
        display_width: u32,
        display_height: u32,
    ) -> Result<(), Box<dyn std::error::Error>>;

    fn render(
        &mut self,
        frame: &Frame,
        boxes: &[BoundingBox],
        outcome: &TickOutcome,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
