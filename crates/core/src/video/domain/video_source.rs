use std::fmt;
use std::path::{Path, PathBuf};

/// Where frames come from.
#[derive(Clone, Debug, PartialEq)]
pub enum VideoSource {
    /// A capture device such as `/dev/video0`, opened through an ffmpeg
    /// input device format (`v4l2`, `avfoundation`, `dshow`).
    Device {
        path: String,
        format: String,
    },
    /// A recorded video file, played back as if it were live.
    File(PathBuf),
}

impl VideoSource {
    /// Input device format for the current platform.
    pub fn platform_device_format() -> &'static str {
        if cfg!(target_os = "macos") {
            "avfoundation"
        } else if cfg!(target_os = "windows") {
            "dshow"
        } else {
            "v4l2"
        }
    }

    /// Interprets a user-supplied source string.
    ///
    /// An explicit `format` always means a device. Otherwise `/dev/*`
    /// paths are devices and anything else is a file.
    pub fn parse(source: &str, format: Option<&str>) -> Self {
        match format {
            Some(fmt) => VideoSource::Device {
                path: source.to_string(),
                format: fmt.to_string(),
            },
            None if source.starts_with("/dev/") => VideoSource::Device {
                path: source.to_string(),
                format: Self::platform_device_format().to_string(),
            },
            None => VideoSource::File(PathBuf::from(source)),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            VideoSource::Device { path, .. } => Path::new(path),
            VideoSource::File(path) => path,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, VideoSource::Device { .. })
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoSource::Device { path, format } => write!(f, "{path} ({format})"),
            VideoSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// What the source reported when it was opened.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub codec: String,
}
