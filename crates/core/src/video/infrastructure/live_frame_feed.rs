use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::shared::frame::Frame;
use crate::video::domain::frame_provider::FrameProvider;
use crate::video::domain::video_reader::VideoReader;

type Slot = Arc<Mutex<Option<Frame>>>;

/// Decodes on a background thread and keeps only the newest frame.
///
/// Layout: `reader thread → latest-frame slot ← session tick`
///
/// Recorded files are paced at their frame rate so they behave like a
/// camera; live devices are read as fast as they deliver.
pub struct LiveFrameFeed {
    slot: Slot,
    exhausted: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl LiveFrameFeed {
    pub fn start(reader: Box<dyn VideoReader>, pace: Option<Duration>) -> Self {
        let slot: Slot = Arc::new(Mutex::new(None));
        let exhausted = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = spawn_reader(reader, pace, slot.clone(), exhausted.clone(), stop.clone());

        Self {
            slot,
            exhausted,
            stop,
            handle: Some(handle),
        }
    }

    /// Playback interval for a recorded file, `None` when the rate is unknown.
    pub fn frame_interval(fps: f64) -> Option<Duration> {
        if fps.is_finite() && fps > 0.0 {
            Some(Duration::from_secs_f64(1.0 / fps))
        } else {
            None
        }
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Frame reader thread panicked");
            }
        }
    }
}

impl FrameProvider for LiveFrameFeed {
    fn latest(&mut self) -> Option<Frame> {
        lock(&self.slot).clone()
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Acquire)
    }
}

impl Drop for LiveFrameFeed {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock(slot: &Slot) -> MutexGuard<'_, Option<Frame>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn spawn_reader(
    mut reader: Box<dyn VideoReader>,
    pace: Option<Duration>,
    slot: Slot,
    exhausted: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut decode_errors = 0usize;
        for frame_result in reader.frames() {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            match frame_result {
                Ok(frame) => *lock(&slot) = Some(frame),
                Err(e) => {
                    decode_errors += 1;
                    log::warn!("Dropping undecodable frame: {e}");
                }
            }
            if let Some(interval) = pace {
                std::thread::sleep(interval);
            }
        }
        reader.close();
        if decode_errors > 0 {
            log::debug!("Frame reader finished with {decode_errors} decode errors");
        }
        exhausted.store(true, Ordering::Release);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::domain::video_source::{StreamMetadata, VideoSource};
    use std::time::Instant;

    struct ScriptedReader {
        frames: Vec<Result<Frame, String>>,
        closed: Arc<AtomicBool>,
    }

    impl VideoReader for ScriptedReader {
        fn open(
            &mut self,
            _source: &VideoSource,
        ) -> Result<StreamMetadata, Box<dyn std::error::Error>> {
            Ok(StreamMetadata {
                width: 4,
                height: 4,
                fps: 30.0,
                codec: String::new(),
            })
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            Box::new(self.frames.drain(..).map(|r| r.map_err(|e| e.into())))
        }

        fn close(&mut self) {
            self.closed.store(true, Ordering::Relaxed);
        }
    }

    fn frame(sequence: u64) -> Frame {
        Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, sequence)
    }

    fn wait_until_exhausted(feed: &LiveFrameFeed) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !feed.is_exhausted() {
            assert!(Instant::now() < deadline, "feed never finished");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_latest_is_last_decoded_frame() {
        let closed = Arc::new(AtomicBool::new(false));
        let reader = ScriptedReader {
            frames: (0..5).map(|i| Ok(frame(i))).collect(),
            closed: closed.clone(),
        };
        let mut feed = LiveFrameFeed::start(Box::new(reader), None);
        wait_until_exhausted(&feed);

        assert_eq!(feed.latest().unwrap().sequence(), 4);
        assert!(closed.load(Ordering::Relaxed));
    }

    #[test]
    fn test_decode_errors_are_skipped() {
        let reader = ScriptedReader {
            frames: vec![Ok(frame(0)), Err("corrupt".into()), Ok(frame(2))],
            closed: Arc::new(AtomicBool::new(false)),
        };
        let mut feed = LiveFrameFeed::start(Box::new(reader), None);
        wait_until_exhausted(&feed);

        assert_eq!(feed.latest().unwrap().sequence(), 2);
    }

    #[test]
    fn test_empty_source_has_no_frame() {
        let reader = ScriptedReader {
            frames: vec![],
            closed: Arc::new(AtomicBool::new(false)),
        };
        let mut feed = LiveFrameFeed::start(Box::new(reader), None);
        wait_until_exhausted(&feed);

        assert!(feed.latest().is_none());
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(
            LiveFrameFeed::frame_interval(25.0),
            Some(Duration::from_millis(40))
        );
        assert_eq!(LiveFrameFeed::frame_interval(0.0), None);
        assert_eq!(LiveFrameFeed::frame_interval(f64::NAN), None);
    }

    #[test]
    fn test_drop_stops_a_paced_reader() {
        let reader = ScriptedReader {
            frames: (0..1000).map(|i| Ok(frame(i))).collect(),
            closed: Arc::new(AtomicBool::new(false)),
        };
        let started = Instant::now();
        let feed = LiveFrameFeed::start(Box::new(reader), Some(Duration::from_millis(10)));
        std::thread::sleep(Duration::from_millis(30));
        drop(feed);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
