use {
    crate::config::RunConfig,
    anyhow::Context as _,
    deskctl::{Browser, Context, Display, Window},
    std::{thread, time::Duration},
    tracing::{info, warn},
};

/// Title fragment of the Vortex mod manager main window.
const VORTEX_TITLE: &str = "Vortex";

/// Grace period for a freshly launched browser to create its window.
const LAUNCH_WAIT: Duration = Duration::from_secs(3);

/// Arranges the desktop once before scanning starts. Best effort: every
/// failure is logged and scanning proceeds regardless.
pub trait WindowPositioner {
    fn setup(&mut self);
}

pub struct DesktopWindowPositioner {
    context: Context,
    browser: Option<Browser>,
    vortex: bool,
    window_title: Option<String>,
}

impl DesktopWindowPositioner {
    pub fn new(context: Context, config: &RunConfig) -> Self {
        Self {
            context,
            browser: config.browser.map(Into::into),
            vortex: config.vortex,
            window_title: config.window_title.clone(),
        }
    }

    fn place_browser(&self, browser: Browser) -> anyhow::Result<()> {
        self.context.launch_browser(browser)?;
        thread::sleep(LAUNCH_WAIT);
        let window = self
            .context
            .find_window_by_title(browser.title_fragment())?
            .with_context(|| format!("no window matching {:?}", browser.title_fragment()))?;
        let displays = self.context.displays()?;
        let display = displays.first().context("no displays")?;
        fill_display(&window, display)
    }

    fn place_vortex(&self) -> anyhow::Result<()> {
        let window = self
            .context
            .find_window_by_title(VORTEX_TITLE)?
            .context("no Vortex window")?;
        let displays = self.context.displays()?;
        // The second monitor when present, so the browser keeps the primary.
        let display = displays
            .get(1)
            .or_else(|| displays.first())
            .context("no displays")?;
        fill_display(&window, display)
    }

    fn place_titled(&self, title: &str) -> anyhow::Result<()> {
        let window = self
            .context
            .find_window_by_title(title)?
            .with_context(|| format!("no window matching {:?}", title))?;
        let displays = self.context.displays()?;
        let display = displays.first().context("no displays")?;
        fill_display(&window, display)
    }
}

fn fill_display(window: &Window, display: &Display) -> anyhow::Result<()> {
    window.activate()?;
    window.move_resize(
        display.x()?,
        display.y()?,
        display.width()?,
        display.height()?,
    )?;
    Ok(())
}

impl WindowPositioner for DesktopWindowPositioner {
    fn setup(&mut self) {
        if let Some(browser) = self.browser {
            info!("launching {:?} on the primary monitor", browser);
            if let Err(error) = self.place_browser(browser) {
                warn!("browser setup failed: {:?}", error);
            }
        }
        if self.vortex {
            if let Err(error) = self.place_vortex() {
                warn!("Vortex window setup failed: {:?}", error);
            }
        }
        if let Some(title) = self.window_title.clone() {
            if let Err(error) = self.place_titled(&title) {
                warn!("setup of window {:?} failed: {:?}", title, error);
            }
        }
    }
}

/// Logs the arrangement that would happen instead of touching the desktop.
pub struct SimulatedWindowPositioner {
    browser: Option<Browser>,
    vortex: bool,
    window_title: Option<String>,
}

impl SimulatedWindowPositioner {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            browser: config.browser.map(Into::into),
            vortex: config.vortex,
            window_title: config.window_title.clone(),
        }
    }
}

impl WindowPositioner for SimulatedWindowPositioner {
    fn setup(&mut self) {
        if let Some(browser) = self.browser {
            info!("simulated launch of {:?} filling the primary monitor", browser);
        }
        if self.vortex {
            info!("simulated Vortex placement on the secondary monitor");
        }
        if let Some(title) = &self.window_title {
            info!("simulated placement of window {:?} on the primary monitor", title);
        }
    }
}
