use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use mandelset_core::{Complex, Extent, PixelSize, RenderParameters, Viewport};
use mandelset_render::{
    ExportError, FrameWriter, Purpose, Raster, RenderEngine, RenderObserver, SessionState,
    PROGRESS_IDLE,
};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Progress(Purpose, i32),
    Frame(u32, u32),
    Error(String),
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn progress(&self, purpose: Purpose) -> Vec<i32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Progress(p, v) if p == purpose => Some(v),
                _ => None,
            })
            .collect()
    }

    fn frames(&self) -> Vec<(u32, u32)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Frame(w, h) => Some((w, h)),
                _ => None,
            })
            .collect()
    }

    fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Error(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// Poll until `purpose` has reported at least one column.
    fn wait_for_progress(&self, purpose: Purpose) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !self.progress(purpose).iter().any(|&v| v >= 0) {
            assert!(Instant::now() < deadline, "render never reported progress");
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

impl RenderObserver for Recorder {
    fn on_progress(&self, percent: i32, purpose: Purpose) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Progress(purpose, percent));
    }

    fn on_frame_ready(&self, raster: Raster) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Frame(raster.width(), raster.height()));
    }

    fn on_error(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Error(message.to_string()));
    }
}

/// A [`Recorder`] that, once armed, panics the first time progress reaches `at`.
struct PanickingRecorder {
    inner: Recorder,
    at: i32,
    armed: AtomicBool,
}

impl PanickingRecorder {
    fn new(at: i32) -> Self {
        Self {
            inner: Recorder::default(),
            at,
            armed: AtomicBool::new(false),
        }
    }

    fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

impl RenderObserver for PanickingRecorder {
    fn on_progress(&self, percent: i32, purpose: Purpose) {
        self.inner.on_progress(percent, purpose);
        if percent >= self.at && self.armed.swap(false, Ordering::SeqCst) {
            panic!("pixel blew up");
        }
    }

    fn on_frame_ready(&self, raster: Raster) {
        self.inner.on_frame_ready(raster);
    }

    fn on_error(&self, message: &str) {
        self.inner.on_error(message);
    }
}

#[derive(Default)]
struct MemoryWriter {
    written: Mutex<Vec<(u32, u32)>>,
}

impl FrameWriter for MemoryWriter {
    fn write_frame(&self, raster: &Raster, _: &RenderParameters) -> Result<(), ExportError> {
        self.written
            .lock()
            .unwrap()
            .push((raster.width(), raster.height()));
        Ok(())
    }
}

struct FailingWriter;

impl FrameWriter for FailingWriter {
    fn write_frame(&self, _: &Raster, _: &RenderParameters) -> Result<(), ExportError> {
        Err(ExportError::Io {
            path: "output.png".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

fn quick(width: u32, height: u32) -> RenderParameters {
    RenderParameters::new(Viewport::default_mandelbrot(width, height)).with_max_iterations(100)
}

/// A render that takes seconds to finish: a threshold just below 2 skips
/// the interior shortcut, so every member pixel runs the full bound.
fn slow() -> RenderParameters {
    let viewport = Viewport::new(
        PixelSize::new(200, 140),
        Complex::new(-0.5, 0.0),
        Extent::new(3.0, 2.1),
    );
    RenderParameters::new(viewport)
        .with_max_iterations(2_000_000)
        .with_threshold(1.999)
        .unwrap()
}

/// Too large to allocate, so assembly fails before any column runs.
fn unallocatable() -> RenderParameters {
    quick(u32::MAX, u32::MAX)
}

fn engine_with(writer: Arc<dyn FrameWriter>) -> (RenderEngine, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let engine = RenderEngine::new(2, recorder.clone(), writer).unwrap();
    (engine, recorder)
}

#[test]
fn successful_preview_reports_progress_then_frame() {
    let (mut engine, recorder) = engine_with(Arc::new(MemoryWriter::default()));

    engine.trigger(Purpose::Preview, quick(30, 20)).unwrap();
    assert_eq!(engine.wait(Purpose::Preview), SessionState::Completed);

    let progress = recorder.progress(Purpose::Preview);
    assert_eq!(progress.len(), 31);
    let (last, during) = progress.split_last().unwrap();
    assert_eq!(*last, PROGRESS_IDLE);
    assert!(during.iter().all(|v| (0..100).contains(v)));
    assert!(during.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(recorder.frames(), vec![(30, 20)]);
    assert!(recorder.errors().is_empty());
}

#[test]
fn superseded_render_stops_before_the_next_one_starts() {
    let (mut engine, recorder) = engine_with(Arc::new(MemoryWriter::default()));

    engine.trigger(Purpose::Preview, slow()).unwrap();
    recorder.wait_for_progress(Purpose::Preview);
    engine.trigger(Purpose::Preview, quick(24, 16)).unwrap();
    assert_eq!(engine.wait(Purpose::Preview), SessionState::Completed);

    let progress = recorder.progress(Purpose::Preview);
    let first_idle = progress
        .iter()
        .position(|&v| v == PROGRESS_IDLE)
        .expect("cancelled render must reset progress");
    let (old, new) = progress.split_at(first_idle + 1);

    assert!(old[..old.len() - 1].windows(2).all(|w| w[0] <= w[1]));
    // Nothing from the old render after its reset: the new run is one clean sequence.
    assert_eq!(new.len(), 25);
    assert_eq!(new.last(), Some(&PROGRESS_IDLE));
    assert!(new[..24].windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(new[0], 0);

    assert_eq!(recorder.frames(), vec![(24, 16)]);
    assert_eq!(engine.cache().get().map(|r| r.width()), Some(24));
}

#[test]
fn cancelling_leaves_the_cache_untouched() {
    let (mut engine, recorder) = engine_with(Arc::new(MemoryWriter::default()));

    engine.trigger(Purpose::Preview, quick(16, 12)).unwrap();
    engine.wait(Purpose::Preview);
    let before = engine.cache().get().expect("first render should be cached");

    engine.trigger(Purpose::Preview, slow()).unwrap();
    recorder.wait_for_progress(Purpose::Preview);
    assert_eq!(engine.cancel(Purpose::Preview), SessionState::Cancelled);

    assert_eq!(engine.cache().get(), Some(before));
    assert_eq!(recorder.frames().len(), 1);
    assert_eq!(
        recorder.progress(Purpose::Preview).last(),
        Some(&PROGRESS_IDLE)
    );
}

#[test]
fn degraded_preview_falls_back_to_the_cached_frame() {
    let (mut engine, recorder) = engine_with(Arc::new(MemoryWriter::default()));

    engine.trigger(Purpose::Preview, quick(10, 8)).unwrap();
    engine.wait(Purpose::Preview);
    let before = engine.cache().get();

    engine.trigger(Purpose::Preview, unallocatable()).unwrap();
    assert_eq!(engine.wait(Purpose::Preview), SessionState::Failed);

    assert_eq!(recorder.frames(), vec![(10, 8), (10, 8)]);
    assert_eq!(recorder.errors().len(), 1);
    assert_eq!(engine.cache().get(), before);

    // Rendering keeps working afterwards.
    engine.trigger(Purpose::Preview, quick(12, 8)).unwrap();
    assert_eq!(engine.wait(Purpose::Preview), SessionState::Completed);
}

#[test]
fn degraded_preview_without_cache_only_reports() {
    let (mut engine, recorder) = engine_with(Arc::new(MemoryWriter::default()));

    engine.trigger(Purpose::Preview, unallocatable()).unwrap();
    assert_eq!(engine.wait(Purpose::Preview), SessionState::Failed);

    assert!(recorder.frames().is_empty());
    assert_eq!(recorder.errors().len(), 1);
}

#[test]
fn panic_mid_render_falls_back_to_the_cached_frame() {
    let observer = Arc::new(PanickingRecorder::new(50));
    let mut engine =
        RenderEngine::new(2, observer.clone(), Arc::new(MemoryWriter::default())).unwrap();

    engine.trigger(Purpose::Preview, quick(10, 8)).unwrap();
    assert_eq!(engine.wait(Purpose::Preview), SessionState::Completed);
    let before = engine.cache().get();

    observer.arm();
    engine.trigger(Purpose::Preview, quick(10, 8)).unwrap();
    assert_eq!(engine.wait(Purpose::Preview), SessionState::Failed);

    let recorder = &observer.inner;
    assert_eq!(recorder.frames(), vec![(10, 8), (10, 8)]);
    assert_eq!(recorder.errors(), vec!["render failed: pixel blew up".to_string()]);
    assert_eq!(engine.cache().get(), before);
    assert_eq!(
        recorder.progress(Purpose::Preview).last(),
        Some(&PROGRESS_IDLE)
    );

    // The session recovers on the next trigger.
    engine.trigger(Purpose::Preview, quick(12, 8)).unwrap();
    assert_eq!(engine.wait(Purpose::Preview), SessionState::Completed);
    assert_eq!(recorder.frames().last(), Some(&(12, 8)));
}

#[test]
fn save_writes_the_frame_without_caching_it() {
    let writer = Arc::new(MemoryWriter::default());
    let (mut engine, recorder) = engine_with(writer.clone());

    engine.trigger(Purpose::Save, quick(18, 12)).unwrap();
    assert_eq!(engine.wait(Purpose::Save), SessionState::Completed);

    assert_eq!(*writer.written.lock().unwrap(), vec![(18, 12)]);
    assert!(engine.cache().is_empty());
    assert!(recorder.frames().is_empty());
    assert_eq!(recorder.progress(Purpose::Save).last(), Some(&PROGRESS_IDLE));
    assert!(recorder.progress(Purpose::Preview).is_empty());
}

#[test]
fn save_failure_is_reported_and_preview_is_unaffected() {
    let (mut engine, recorder) = engine_with(Arc::new(FailingWriter));

    engine.trigger(Purpose::Save, quick(8, 8)).unwrap();
    assert_eq!(engine.wait(Purpose::Save), SessionState::Failed);
    let errors = recorder.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("read-only"));

    engine.trigger(Purpose::Preview, quick(8, 8)).unwrap();
    assert_eq!(engine.wait(Purpose::Preview), SessionState::Completed);
}

#[test]
fn preview_and_save_run_independently() {
    let writer = Arc::new(MemoryWriter::default());
    let (mut engine, recorder) = engine_with(writer.clone());

    engine.trigger(Purpose::Preview, slow()).unwrap();
    recorder.wait_for_progress(Purpose::Preview);

    engine.trigger(Purpose::Save, quick(20, 10)).unwrap();
    assert_eq!(engine.wait(Purpose::Save), SessionState::Completed);
    assert_eq!(engine.state(Purpose::Preview), SessionState::Running);
    assert_eq!(*writer.written.lock().unwrap(), vec![(20, 10)]);

    engine.shutdown();
    assert_eq!(engine.state(Purpose::Preview), SessionState::Cancelled);
    assert!(engine.cache().is_empty());
}
