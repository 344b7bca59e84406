use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use picfly_config::selector::SelectorConfig;
use tokio_util::sync::CancellationToken;

use crate::CaptureError;
use crate::backdrop::{CapturedRegion, ScreenCapturer};
use crate::overlay::{OverlayFrames, OverlaySurface};
use crate::session::{SelectionOutcome, SelectionSession, Step};

/// Interactive drag-to-select over a frozen snapshot of the desktop.
pub struct RegionSelector {
    capturer: Arc<dyn ScreenCapturer>,
    overlay: Arc<dyn OverlaySurface>,
    config: SelectorConfig,
    busy: AtomicBool,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, CaptureError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CaptureError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RegionSelector {
    pub fn new(
        capturer: Arc<dyn ScreenCapturer>,
        overlay: Arc<dyn OverlaySurface>,
        config: SelectorConfig,
    ) -> Self {
        Self {
            capturer,
            overlay,
            config,
            busy: AtomicBool::new(false),
        }
    }

    /// True from the moment a `select` starts until its overlay is gone.
    pub fn is_active(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run one selection to completion. Blocks the calling thread.
    ///
    /// `Ok(None)` means the user (or `cancel`) aborted. The overlay and backdrop are released
    /// before this returns, whatever the outcome.
    pub fn select(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<CapturedRegion>, CaptureError> {
        let _busy = BusyGuard::acquire(&self.busy)?;
        if cancel.is_cancelled() {
            return Ok(None);
        }

        let backdrop = self.capturer.capture_backdrop()?;
        let bounds = backdrop.bounds();
        tracing::debug!(?bounds, "backdrop captured");

        let frames = OverlayFrames::prepare(&backdrop, self.config.dim_alpha);
        let mut overlay = self.overlay.open(bounds, frames)?;

        let mut session = SelectionSession::new(backdrop.extent(), self.config.min_extent);
        session.activate();
        let poll = Duration::from_millis(self.config.poll_interval_ms.max(1));

        let outcome = loop {
            if cancel.is_cancelled() {
                session.cancel();
                break SelectionOutcome::Cancelled;
            }

            let Some(event) = overlay.next_event(poll) else {
                continue;
            };
            match session.handle(event) {
                Step::Ignored => {}
                Step::Redraw { selection, damage } => overlay.render(Some(selection), damage),
                Step::Finished(outcome) => break outcome,
            }
        };

        drop(overlay);
        session.reset();

        match outcome {
            SelectionOutcome::Selected(rect) => {
                let region = backdrop.crop(rect);
                if let Some(region) = &region {
                    tracing::info!(rect = ?region.rect, "region selected");
                }
                Ok(region)
            }
            SelectionOutcome::Cancelled => {
                tracing::info!("selection cancelled");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    use image::Rgba;
    use picfly_types::{OverlayEvent, Point, ScreenBounds, SelectionRect};

    use super::*;
    use crate::backdrop::Backdrop;
    use crate::overlay::OverlaySession;
    use crate::testing::coordinate_image;

    struct FakeCapturer {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeCapturer {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: true,
            })
        }
    }

    impl ScreenCapturer for FakeCapturer {
        fn capture_backdrop(&self) -> Result<Backdrop, CaptureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CaptureError::Backdrop("display went away".into()));
            }
            Ok(Backdrop::new(coordinate_image(400, 300), Point::new(0, 0)))
        }
    }

    /// Replays scripted events; once the script runs dry it idles like a user who walked away.
    #[derive(Default)]
    struct FakeOverlay {
        script: Mutex<VecDeque<OverlayEvent>>,
        opened: AtomicUsize,
        closed: Arc<AtomicUsize>,
        renders: Arc<Mutex<Vec<(Option<SelectionRect>, SelectionRect)>>>,
        bounds: Mutex<Option<ScreenBounds>>,
    }

    impl FakeOverlay {
        fn scripted(events: Vec<OverlayEvent>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(events.into()),
                ..Default::default()
            })
        }
    }

    struct FakeSession {
        events: VecDeque<OverlayEvent>,
        closed: Arc<AtomicUsize>,
        renders: Arc<Mutex<Vec<(Option<SelectionRect>, SelectionRect)>>>,
    }

    impl OverlaySurface for FakeOverlay {
        fn open(
            &self,
            bounds: ScreenBounds,
            _frames: OverlayFrames,
        ) -> Result<Box<dyn OverlaySession>, CaptureError> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            *self.bounds.lock().unwrap() = Some(bounds);
            Ok(Box::new(FakeSession {
                events: std::mem::take(&mut *self.script.lock().unwrap()),
                closed: self.closed.clone(),
                renders: self.renders.clone(),
            }))
        }
    }

    impl OverlaySession for FakeSession {
        fn next_event(&mut self, timeout: Duration) -> Option<OverlayEvent> {
            let event = self.events.pop_front();
            if event.is_none() {
                thread::sleep(timeout);
            }
            event
        }

        fn render(&mut self, selection: Option<SelectionRect>, damage: SelectionRect) {
            self.renders.lock().unwrap().push((selection, damage));
        }
    }

    impl Drop for FakeSession {
        fn drop(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn selector(capturer: Arc<FakeCapturer>, overlay: Arc<FakeOverlay>) -> RegionSelector {
        RegionSelector::new(capturer, overlay, SelectorConfig::default())
    }

    fn down(x: i32, y: i32) -> OverlayEvent {
        OverlayEvent::PointerDown(Point::new(x, y))
    }

    fn mv(x: i32, y: i32) -> OverlayEvent {
        OverlayEvent::PointerMove(Point::new(x, y))
    }

    fn up(x: i32, y: i32) -> OverlayEvent {
        OverlayEvent::PointerUp(Point::new(x, y))
    }

    #[test]
    fn drag_produces_cropped_region() {
        let overlay = FakeOverlay::scripted(vec![down(100, 100), mv(200, 80), up(300, 50)]);
        let s = selector(FakeCapturer::new(), overlay.clone());

        let region = s.select(&CancellationToken::new()).unwrap().unwrap();
        assert_eq!(
            region.rect,
            SelectionRect {
                x0: 100,
                y0: 50,
                x1: 300,
                y1: 100
            }
        );
        assert_eq!(region.image.dimensions(), (200, 50));
        assert_eq!(region.image.get_pixel(0, 0), &Rgba([100, 50, 0, 255]));

        assert_eq!(overlay.closed.load(Ordering::SeqCst), 1);
        assert_eq!(overlay.renders.lock().unwrap().len(), 2);
        assert_eq!(
            *overlay.bounds.lock().unwrap(),
            Some(ScreenBounds {
                x: 0,
                y: 0,
                width: 400,
                height: 300
            })
        );
        assert!(!s.is_active());
    }

    #[test]
    fn zero_area_drag_is_a_cancel() {
        let overlay = FakeOverlay::scripted(vec![down(50, 50), up(50, 50)]);
        let s = selector(FakeCapturer::new(), overlay.clone());

        assert!(s.select(&CancellationToken::new()).unwrap().is_none());
        assert_eq!(overlay.closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn escape_cancels_while_active_and_dragging() {
        for script in [
            vec![OverlayEvent::Cancel],
            vec![down(10, 10), mv(90, 90), OverlayEvent::Cancel],
        ] {
            let overlay = FakeOverlay::scripted(script);
            let s = selector(FakeCapturer::new(), overlay.clone());
            assert!(s.select(&CancellationToken::new()).unwrap().is_none());
            assert_eq!(overlay.closed.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn token_cancels_an_idle_overlay() {
        let overlay = FakeOverlay::scripted(vec![down(10, 10), mv(90, 90)]);
        let s = Arc::new(selector(FakeCapturer::new(), overlay.clone()));
        let token = CancellationToken::new();

        let worker = {
            let s = s.clone();
            let token = token.clone();
            thread::spawn(move || s.select(&token))
        };

        while overlay.renders.lock().unwrap().len() < 2 {
            thread::sleep(Duration::from_millis(1));
        }
        token.cancel();

        assert!(worker.join().unwrap().unwrap().is_none());
        assert_eq!(overlay.closed.load(Ordering::SeqCst), 1);
        assert!(!s.is_active());
    }

    #[test]
    fn already_cancelled_token_touches_nothing() {
        let capturer = FakeCapturer::new();
        let overlay = FakeOverlay::scripted(vec![]);
        let s = selector(capturer.clone(), overlay.clone());
        let token = CancellationToken::new();
        token.cancel();

        assert!(s.select(&token).unwrap().is_none());
        assert_eq!(capturer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(overlay.opened.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn capture_failure_opens_no_overlay() {
        let overlay = FakeOverlay::scripted(vec![]);
        let s = selector(FakeCapturer::failing(), overlay.clone());

        let result = s.select(&CancellationToken::new());
        assert!(matches!(result, Err(CaptureError::Backdrop(_))));
        assert_eq!(overlay.opened.load(Ordering::SeqCst), 0);
        assert!(!s.is_active());
    }

    #[test]
    fn nested_select_is_busy() {
        let capturer = FakeCapturer::new();
        let overlay = FakeOverlay::scripted(vec![]);
        let s = Arc::new(selector(capturer.clone(), overlay.clone()));
        let token = CancellationToken::new();

        let worker = {
            let s = s.clone();
            let token = token.clone();
            thread::spawn(move || s.select(&token))
        };

        while overlay.opened.load(Ordering::SeqCst) == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(s.is_active());
        assert!(matches!(
            s.select(&CancellationToken::new()),
            Err(CaptureError::Busy)
        ));
        assert_eq!(capturer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(overlay.opened.load(Ordering::SeqCst), 1);

        token.cancel();
        assert!(worker.join().unwrap().unwrap().is_none());
        assert!(!s.is_active());
    }

    #[test]
    fn selection_is_clamped_to_the_backdrop() {
        let overlay = FakeOverlay::scripted(vec![down(350, 250), up(900, 900)]);
        let s = selector(FakeCapturer::new(), overlay);

        let region = s.select(&CancellationToken::new()).unwrap().unwrap();
        assert_eq!(region.rect, SelectionRect::from_origin_size(350, 250, 50, 50));
        assert_eq!(region.image.dimensions(), (50, 50));
    }

    #[test]
    fn selector_can_be_reused() {
        let overlay = FakeOverlay::scripted(vec![OverlayEvent::Cancel]);
        let s = selector(FakeCapturer::new(), overlay.clone());
        assert!(s.select(&CancellationToken::new()).unwrap().is_none());

        *overlay.script.lock().unwrap() = vec![down(0, 0), up(10, 10)].into();
        assert!(s.select(&CancellationToken::new()).unwrap().is_some());
        assert_eq!(overlay.opened.load(Ordering::SeqCst), 2);
    }
}
