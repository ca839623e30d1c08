use std::path::{Path, PathBuf};

use crate::capture::infrastructure::png_encoder::encode_png;
use crate::gate::domain::dwell_gate::TickOutcome;
use crate::rendering::domain::overlay_renderer::OverlayRenderer;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;
use crate::shared::oval_region::OvalRegion;

use super::overlay_painter::{oval_outline_pixels, paint_overlay, STROKE_WIDTH};

/// Writes the annotated view to a PNG file, refreshed every `every` renders
/// and on every capture.
///
/// The guide oval is rasterized once in `begin`. The image is written beside the target and renamed over it, so viewers
/// polling the file never see a half-written PNG.
pub struct LiveViewRenderer {
    path: PathBuf,
    every: u64,
    renders: u64,
    written: u64,
    guide: Option<Vec<(u32, u32)>>,
}

impl LiveViewRenderer {
    pub fn new(path: impl Into<PathBuf>, every: u64) -> Self {
        Self {
            path: path.into(),
            every: every.max(1),
            renders: 0,
            written: 0,
            guide: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of times the file has been refreshed.
    pub fn written(&self) -> u64 {
        self.written
    }

    fn write_atomically(&self, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let part = self.path.with_extension("png.part");
        std::fs::write(&part, bytes)?;
        std::fs::rename(&part, &self.path)
    }
}

impl OverlayRenderer for LiveViewRenderer {
    fn begin(
        &mut self,
        oval: &OvalRegion,
        display_width: u32,
        display_height: u32,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let guide = oval_outline_pixels(oval, display_width, display_height, STROKE_WIDTH);
        log::debug!("Guide oval rasterized: {} pixels", guide.len());
        self.guide = Some(guide);
        Ok(())
    }

    fn render(
        &mut self,
        frame: &Frame,
        boxes: &[BoundingBox],
        outcome: &TickOutcome,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let guide = self
            .guide
            .as_deref()
            .ok_or("live view rendered before begin")?;

        self.renders += 1;
        if (self.renders - 1) % self.every != 0 && !outcome.is_capture() {
            return Ok(());
        }

        let mut annotated = frame.clone();
        paint_overlay(&mut annotated, guide, boxes);
        let bytes = encode_png(&annotated)?;
        self.write_atomically(&bytes)?;
        self.written += 1;
        log::debug!("Live view refreshed: {}", self.path.display());
        Ok(())
    }
}
