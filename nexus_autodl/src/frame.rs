use {
    crate::{template::ButtonRole, types::Point},
    chrono::{DateTime, Utc},
    deskctl::{Context, Display},
    image::{imageops, Rgba, RgbaImage},
    serde::Serialize,
    thiserror::Error,
    tracing::{debug, warn},
};

const SIM_BACKGROUND: Rgba<u8> = Rgba([190, 190, 190, 255]);

/// Placement of a monitor in the global desktop coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonitorInfo {
    pub index: usize,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl MonitorInfo {
    /// Top left corner in global coordinates. Frame-local positions are
    /// translated by this to produce click targets.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One captured screenshot of one monitor.
pub struct Frame {
    pub monitor: MonitorInfo,
    pub image: RgbaImage,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no monitors available")]
    NoMonitors,
    #[error("failed to enumerate monitors: {0}")]
    Enumerate(anyhow::Error),
    #[error("all {attempted} monitor captures failed")]
    AllFailed { attempted: usize },
}

/// Produces the batch of frames scanned in one cycle, one per monitor.
pub trait FrameSource {
    fn capture(&mut self) -> Result<Vec<Frame>, CaptureError>;
}

/// Captures the real displays through [`deskctl`].
pub struct DisplayFrameSource {
    context: Context,
    force_primary: bool,
}

impl DisplayFrameSource {
    pub fn new(context: Context, force_primary: bool) -> Self {
        Self {
            context,
            force_primary,
        }
    }
}

impl FrameSource for DisplayFrameSource {
    fn capture(&mut self) -> Result<Vec<Frame>, CaptureError> {
        let displays = self.context.displays().map_err(CaptureError::Enumerate)?;
        if displays.is_empty() {
            return Err(CaptureError::NoMonitors);
        }
        // Displays are sorted primary first.
        let wanted: &[Display] = if self.force_primary {
            &displays[..1]
        } else {
            &displays
        };
        let mut frames = Vec::new();
        for (index, display) in wanted.iter().enumerate() {
            match capture_display(index, display) {
                Ok(frame) => frames.push(frame),
                Err(error) => warn!("skipping monitor {}: {}", index, error),
            }
        }
        if frames.is_empty() {
            return Err(CaptureError::AllFailed {
                attempted: wanted.len(),
            });
        }
        Ok(frames)
    }
}

fn capture_display(index: usize, display: &Display) -> anyhow::Result<Frame> {
    let monitor = MonitorInfo {
        index,
        x: display.x()?,
        y: display.y()?,
        width: display.width()?,
        height: display.height()?,
    };
    let image = display.capture_image()?;
    debug!(
        "captured monitor {} at ({}, {}), {}x{}",
        index, monitor.x, monitor.y, monitor.width, monitor.height
    );
    Ok(Frame {
        monitor,
        image,
        captured_at: Utc::now(),
    })
}

/// The fixed desktop used in simulation: two full HD monitors side by side.
pub fn simulated_layout() -> Vec<MonitorInfo> {
    vec![
        MonitorInfo {
            index: 0,
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
        },
        MonitorInfo {
            index: 1,
            x: 1920,
            y: 0,
            width: 1920,
            height: 1080,
        },
    ]
}

/// One scripted screen arrangement served by [`SimulatedFrameSource`].
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub placements: Vec<Placement>,
}

/// A button pasted into a simulated frame. `position` is frame-local.
#[derive(Debug, Clone)]
pub struct Placement {
    pub role: ButtonRole,
    pub monitor: usize,
    pub position: Point,
}

/// Serves synthetic frames from a scene script instead of touching the
/// desktop. Each capture call advances one scene, repeating the script from
/// the start when it is exhausted; an empty script serves blank monitors.
pub struct SimulatedFrameSource {
    layout: Vec<MonitorInfo>,
    artwork: Vec<(ButtonRole, RgbaImage)>,
    scenes: Vec<Scene>,
    served: usize,
}

impl SimulatedFrameSource {
    pub fn new(
        artwork: Vec<(ButtonRole, RgbaImage)>,
        scenes: Vec<Scene>,
        force_primary: bool,
    ) -> Self {
        let mut layout = simulated_layout();
        if force_primary {
            layout.truncate(1);
        }
        Self {
            layout,
            artwork,
            scenes,
            served: 0,
        }
    }

    /// Number of capture calls answered so far.
    pub fn served(&self) -> usize {
        self.served
    }

    fn artwork_for(&self, role: ButtonRole) -> Option<&RgbaImage> {
        self.artwork
            .iter()
            .find(|(candidate, _)| *candidate == role)
            .map(|(_, image)| image)
    }
}

impl FrameSource for SimulatedFrameSource {
    fn capture(&mut self) -> Result<Vec<Frame>, CaptureError> {
        let scene_index = self.served;
        self.served += 1;
        let scene = if self.scenes.is_empty() {
            None
        } else {
            Some(&self.scenes[scene_index % self.scenes.len()])
        };
        let captured_at = Utc::now();
        let mut frames = Vec::new();
        for monitor in &self.layout {
            let mut canvas = RgbaImage::from_pixel(monitor.width, monitor.height, SIM_BACKGROUND);
            if let Some(scene) = scene {
                for placement in &scene.placements {
                    if placement.monitor != monitor.index {
                        continue;
                    }
                    match self.artwork_for(placement.role) {
                        Some(image) => imageops::overlay(
                            &mut canvas,
                            image,
                            i64::from(placement.position.x()),
                            i64::from(placement.position.y()),
                        ),
                        None => warn!("no artwork for {} in scene {}", placement.role, scene_index),
                    }
                }
            }
            frames.push(Frame {
                monitor: *monitor,
                image: canvas,
                captured_at,
            });
        }
        Ok(frames)
    }
}
