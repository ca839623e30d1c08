use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::capture::domain::capture_dispatcher::CaptureDispatcher;
use crate::capture::domain::capture_sink::Snapshot;
use crate::detection::domain::face_detector::FaceDetector;
use crate::gate::domain::dwell_gate::{DwellGate, TickOutcome};
use crate::rendering::domain::overlay_renderer::OverlayRenderer;
use crate::shared::bounding_box::{BoundingBox, DisplayMapping};
use crate::shared::frame::Frame;
use crate::video::domain::frame_provider::FrameProvider;

use super::domain::tick_source::TickSource;
use super::session_logger::{NullSessionLogger, SessionLogger};

/// Totals for one session run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub ticks: u64,
    pub captures: usize,
    /// Captures the dispatcher refused because its queue was full.
    pub dropped_captures: usize,
    pub detection_failures: usize,
    pub ticks_without_frame: u64,
}

/// Runs the dwell loop: every tick samples the latest frame, detects faces,
/// maps them to display space, advances the gate, and hands a display-sized
/// snapshot to the dispatcher when the gate fires.
///
/// Layout: `tick → frame → detect → map → gate → [render] → [dispatch]`
///
/// Detection failures fail open: the tick is treated as having no faces,
/// which resets any dwell in progress.
pub struct CaptureSession {
    frames: Box<dyn FrameProvider>,
    detector: Box<dyn FaceDetector>,
    gate: DwellGate,
    dispatcher: Box<dyn CaptureDispatcher>,
    renderer: Option<Box<dyn OverlayRenderer>>,
    logger: Box<dyn SessionLogger>,
    display_width: u32,
    display_height: u32,
    max_captures: Option<usize>,
    cancelled: Arc<AtomicBool>,
    report: SessionReport,
}

impl CaptureSession {
    pub fn new(
        frames: Box<dyn FrameProvider>,
        detector: Box<dyn FaceDetector>,
        gate: DwellGate,
        dispatcher: Box<dyn CaptureDispatcher>,
        display_width: u32,
        display_height: u32,
    ) -> Self {
        Self {
            frames,
            detector,
            gate,
            dispatcher,
            renderer: None,
            logger: Box::new(NullSessionLogger),
            display_width,
            display_height,
            max_captures: None,
            cancelled: Arc::new(AtomicBool::new(false)),
            report: SessionReport::default(),
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn OverlayRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn SessionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_max_captures(mut self, max_captures: Option<usize>) -> Self {
        self.max_captures = max_captures.filter(|&n| n > 0);
        self
    }

    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Flag that stops `run` at the next tick boundary once set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn report(&self) -> SessionReport {
        self.report
    }

    pub fn gate(&self) -> &DwellGate {
        &self.gate
    }

    /// Ticks until cancelled, the source ends, the tick source stops, or
    /// the capture limit is reached.
    ///
    /// Every run starts from a fresh gate and report, and the gate is reset
    /// again when the run ends.
    pub fn run(&mut self, ticks: &mut dyn TickSource) -> SessionReport {
        self.gate.reset();
        self.report = SessionReport::default();

        let policy = *self.gate.policy();
        self.logger.info(&format!(
            "Dwell gate armed: {} ms threshold ({} ticks of {} ms), {} ms cooldown",
            policy.threshold_ms(),
            policy.ticks_to_capture(),
            policy.tick_period_ms(),
            policy.cooldown_ms()
        ));
        self.begin_rendering();

        while !self.is_cancelled() && ticks.wait_next() {
            if self.is_cancelled() {
                break;
            }
            if self.frames.is_exhausted() {
                self.logger.info("Video source ended");
                break;
            }

            self.step();

            if self.limit_reached() {
                self.logger.info(&format!(
                    "Reached capture limit of {}",
                    self.report.captures
                ));
                break;
            }
        }

        self.gate.reset();
        self.logger.summary();
        self.report
    }

    /// Processes exactly one tick.
    pub fn step(&mut self) -> TickOutcome {
        self.report.ticks += 1;

        let Some(frame) = self.frames.latest() else {
            self.report.ticks_without_frame += 1;
            let outcome = self.gate.on_tick(&[]);
            self.logger.tick(self.report.ticks, self.report.captures);
            return outcome;
        };

        let boxes = self.detect(&frame);
        let mapping = DisplayMapping::new(
            frame.width(),
            frame.height(),
            self.display_width,
            self.display_height,
        );
        let display_boxes = mapping.to_display(&boxes);

        let outcome = self.gate.on_tick(&display_boxes);
        self.logger.metric("faces", display_boxes.len() as f64);
        self.logger
            .metric("dwell_ms", self.gate.state().accumulated_ms() as f64);

        if self.renderer.is_some() || outcome.is_capture() {
            let display_frame = frame.resized(self.display_width, self.display_height);
            self.render(&display_frame, &display_boxes, &outcome);
            if outcome.is_capture() {
                self.capture(display_frame);
            }
        }

        self.logger.tick(self.report.ticks, self.report.captures);
        outcome
    }

    fn detect(&mut self, frame: &Frame) -> Vec<BoundingBox> {
        let start = Instant::now();
        let result = self.detector.detect(frame);
        self.logger
            .timing("detect", start.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(boxes) => boxes,
            Err(e) => {
                self.report.detection_failures += 1;
                log::warn!("Detection failed on frame {}: {e}", frame.sequence());
                Vec::new()
            }
        }
    }

    /// Hands the guide oval to the renderer. A renderer that cannot start
    /// is dropped for the rest of the session.
    fn begin_rendering(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if let Err(e) = renderer.begin(self.gate.oval(), self.display_width, self.display_height) {
            log::warn!("Overlay disabled: {e}");
            self.renderer = None;
        }
    }

    fn render(&mut self, display_frame: &Frame, boxes: &[BoundingBox], outcome: &TickOutcome) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let start = Instant::now();
        if let Err(e) = renderer.render(display_frame, boxes, outcome) {
            log::warn!("Overlay render failed: {e}");
        }
        self.logger
            .timing("render", start.elapsed().as_secs_f64() * 1000.0);
    }

    fn capture(&mut self, display_frame: Frame) {
        self.report.captures += 1;
        let number = self.report.captures;
        if self.dispatcher.dispatch(Snapshot::new(display_frame, number)) {
            self.logger.info(&format!(
                "Capture #{number} queued at tick {}",
                self.report.ticks
            ));
        } else {
            self.report.dropped_captures += 1;
            log::warn!("Capture #{number} dropped: delivery queue full");
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn limit_reached(&self) -> bool {
        self.max_captures
            .is_some_and(|max| self.report.captures >= max)
    }
}
