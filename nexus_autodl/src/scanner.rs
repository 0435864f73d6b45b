use {
    crate::{
        cancel::CancelToken,
        click::ClickExecutor,
        config::RunConfig,
        debug_sink::DebugSink,
        detector::Detector,
        dialog::ScanState,
        frame::FrameSource,
        template::TemplateLibrary,
        window::WindowPositioner,
    },
    std::time::Instant,
    tracing::{info, warn},
};

/// Owns one full scanning session: a frame source, a detector, the dialog
/// state and a click backend. At most one click is dispatched per cycle;
/// state advances only after a click dispatches successfully.
pub struct Scanner {
    config: RunConfig,
    library: TemplateLibrary,
    detector: Detector,
    frames: Box<dyn FrameSource>,
    clicker: Box<dyn ClickExecutor>,
    positioner: Box<dyn WindowPositioner>,
    debug_sink: Option<DebugSink>,
    state: ScanState,
    cycle: u64,
}

impl Scanner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: RunConfig,
        library: TemplateLibrary,
        detector: Detector,
        frames: Box<dyn FrameSource>,
        clicker: Box<dyn ClickExecutor>,
        positioner: Box<dyn WindowPositioner>,
        debug_sink: Option<DebugSink>,
    ) -> Self {
        Self {
            config,
            library,
            detector,
            frames,
            clicker,
            positioner,
            debug_sink,
            state: ScanState::new(),
            cycle: 0,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Runs one scan cycle: capture every monitor, detect, click at most
    /// once. Returns the number of clicks dispatched (0 or 1). Capture and
    /// click failures are logged and leave the state untouched.
    pub fn run_cycle(&mut self) -> usize {
        self.cycle += 1;
        let frames = match self.frames.capture() {
            Ok(frames) => frames,
            Err(error) => {
                warn!("capture failed: {}", error);
                return 0;
            }
        };
        let mut clicks = 0;
        for frame in &frames {
            let detections = self.detector.detect(
                &frame.image,
                self.library.templates(),
                self.config.min_matches,
                self.config.ratio,
            );
            if let Some(sink) = &self.debug_sink {
                if let Err(error) = sink.record(self.cycle, frame, &detections) {
                    warn!("failed to record debug frame: {:?}", error);
                }
            }
            if clicks > 0 {
                // Click budget for this cycle is spent; remaining monitors
                // are still recorded above.
                continue;
            }
            let Some(index) = self.state.select_action(&detections) else {
                continue;
            };
            let detection = &detections[index];
            let target = frame.monitor.origin() + detection.center();
            info!(
                "clicking {} at ({}, {}), {} matches on monitor {}",
                detection.role,
                target.x(),
                target.y(),
                detection.match_count,
                frame.monitor.index
            );
            match self.clicker.click(target) {
                Ok(()) => {
                    self.state.commit(detection.role, Instant::now());
                    clicks += 1;
                }
                Err(error) => warn!("{}", error),
            }
        }
        clicks
    }

    /// Runs cycles until the token is cancelled, suspending for the
    /// configured click delay between cycles. Window setup happens once up
    /// front.
    pub fn run(&mut self, cancel: &CancelToken) {
        self.positioner.setup();
        info!(
            "scanning with {} templates, cycle delay {:?}",
            self.library.len(),
            self.config.click_delay
        );
        loop {
            if cancel.is_cancelled() {
                break;
            }
            self.run_cycle();
            if cancel.wait_timeout(self.config.click_delay) {
                break;
            }
        }
        info!("stopped after {} cycles", self.cycle);
        info!("Total clicks: {}", self.state.clicks());
    }
}
