pub mod live_view_renderer;
pub mod overlay_painter;
