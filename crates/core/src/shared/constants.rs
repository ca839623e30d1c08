pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// Directory name used under the platform cache and config dirs.
pub const APP_DIR_NAME: &str = "Dwellcam";

pub const DEFAULT_TICK_PERIOD_MS: u64 = 100;
pub const DEFAULT_DWELL_THRESHOLD_MS: u64 = 3000;
pub const DEFAULT_COOLDOWN_MS: u64 = 500;

/// Display surface the oval is laid out on.
pub const DEFAULT_DISPLAY_WIDTH: u32 = 720;
pub const DEFAULT_DISPLAY_HEIGHT: u32 = 560;

pub const DEFAULT_OVAL_RADIUS_X: f64 = 150.0;
pub const DEFAULT_OVAL_RADIUS_Y: f64 = 200.0;

pub const CAPTURE_FILE_NAME: &str = "captured_image.png";
pub const UPLOAD_FIELD_NAME: &str = "image";
pub const UPLOAD_CONTENT_TYPE: &str = "image/png";
