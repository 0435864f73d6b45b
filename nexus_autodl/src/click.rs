use {
    crate::types::Point,
    deskctl::Context,
    std::{
        sync::{Arc, Mutex},
        thread,
        time::Duration,
    },
    thiserror::Error,
    tracing::{debug, info},
};

/// How long the button is held between press and release.
const HOLD_DURATION: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
#[error("failed to dispatch click at ({x}, {y}): {reason}")]
pub struct ClickError {
    pub x: i32,
    pub y: i32,
    reason: anyhow::Error,
}

impl ClickError {
    pub fn new(target: Point, reason: anyhow::Error) -> Self {
        Self {
            x: target.x(),
            y: target.y(),
            reason,
        }
    }
}

/// Dispatches one left click at a global desktop position.
pub trait ClickExecutor {
    fn click(&mut self, target: Point) -> Result<(), ClickError>;
}

/// Drives the real cursor. By default the previous cursor position is
/// restored after the click so the user keeps control of the desktop.
pub struct DesktopClickExecutor {
    context: Context,
    restore_cursor: bool,
}

impl DesktopClickExecutor {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            restore_cursor: true,
        }
    }

    #[must_use]
    pub fn with_cursor_restore(mut self, restore_cursor: bool) -> Self {
        self.restore_cursor = restore_cursor;
        self
    }

    fn perform(&self, target: Point) -> anyhow::Result<()> {
        let saved = if self.restore_cursor {
            Some(self.context.cursor_position()?)
        } else {
            None
        };
        self.context.mouse_move_global(target.x(), target.y())?;
        self.context.mouse_left_press()?;
        thread::sleep(HOLD_DURATION);
        self.context.mouse_left_release()?;
        match saved {
            Some((x, y)) => {
                self.context.mouse_move_global(x, y)?;
                debug!(
                    "clicked at ({}, {}), cursor restored to ({}, {})",
                    target.x(),
                    target.y(),
                    x,
                    y
                );
            }
            None => debug!("clicked at ({}, {})", target.x(), target.y()),
        }
        Ok(())
    }
}

impl ClickExecutor for DesktopClickExecutor {
    fn click(&mut self, target: Point) -> Result<(), ClickError> {
        self.perform(target)
            .map_err(|reason| ClickError::new(target, reason))
    }
}

/// Records click targets instead of moving the real cursor.
#[derive(Clone, Default)]
pub struct SimulatedClickExecutor {
    clicks: Arc<Mutex<Vec<Point>>>,
}

impl SimulatedClickExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Targets recorded so far, in dispatch order.
    pub fn clicks(&self) -> Vec<Point> {
        self.clicks.lock().unwrap().clone()
    }
}

impl ClickExecutor for SimulatedClickExecutor {
    fn click(&mut self, target: Point) -> Result<(), ClickError> {
        info!("simulated click at ({}, {})", target.x(), target.y());
        self.clicks.lock().unwrap().push(target);
        Ok(())
    }
}
