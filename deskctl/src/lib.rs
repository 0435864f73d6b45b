#[cfg(all(unix, not(target_os = "macos")))]
mod linux;

#[cfg(all(unix, not(target_os = "macos")))]
use crate::linux as imp;

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
use crate::windows as imp;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "macos")]
use crate::macos as imp;

use {
    enigo::{Button, Direction, Enigo, Mouse},
    image::RgbaImage,
    std::sync::{Arc, Mutex},
    tracing::debug,
};

pub use xcap::{XCapError, XCapResult};

/// Browsers that can be launched and positioned for a download session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Firefox,
}

impl Browser {
    /// Substring expected in the launched browser's window title.
    pub fn title_fragment(self) -> &'static str {
        match self {
            Browser::Chrome => "Chrome",
            Browser::Firefox => "Firefox",
        }
    }
}

struct ContextData {
    imp: imp::Context,
    enigo: Mutex<Enigo>,
}

#[derive(Clone)]
pub struct Context(Arc<ContextData>);

impl Context {
    #[allow(clippy::new_without_default)]
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self(Arc::new(ContextData {
            imp: imp::Context::new()?,
            enigo: Mutex::new(Enigo::new(&enigo::Settings::default())?),
        })))
    }

    pub fn cursor_position(&self) -> anyhow::Result<(i32, i32)> {
        Ok(self.0.enigo.lock().unwrap().location()?)
    }

    pub fn mouse_move_global(&self, x: i32, y: i32) -> anyhow::Result<()> {
        self.0
            .enigo
            .lock()
            .unwrap()
            .move_mouse(x, y, enigo::Coordinate::Abs)?;
        Ok(())
    }

    pub fn mouse_left_press(&self) -> anyhow::Result<()> {
        self.0
            .enigo
            .lock()
            .unwrap()
            .button(Button::Left, Direction::Press)?;
        Ok(())
    }

    pub fn mouse_left_release(&self) -> anyhow::Result<()> {
        self.0
            .enigo
            .lock()
            .unwrap()
            .button(Button::Left, Direction::Release)?;
        Ok(())
    }

    pub fn mouse_left_click(&self) -> anyhow::Result<()> {
        self.0
            .enigo
            .lock()
            .unwrap()
            .button(Button::Left, Direction::Click)?;
        Ok(())
    }

    /// All attached displays, primary display first.
    pub fn displays(&self) -> anyhow::Result<Vec<Display>> {
        let mut displays: Vec<Display> = xcap::Monitor::all()?
            .into_iter()
            .map(|inner| Display { inner })
            .collect();
        // Enumeration order is not guaranteed by the OS.
        displays.sort_by_key(|display| match display.is_primary() {
            Ok(true) => 0,
            _ => 1,
        });
        Ok(displays)
    }

    pub fn all_windows(&self) -> anyhow::Result<Vec<Window>> {
        let mut windows = Vec::new();
        for inner in xcap::Window::all()? {
            match Window::new(self.clone(), inner) {
                Ok(window) => windows.push(window),
                Err(err) => {
                    debug!("skipping window without id: {:?}", err);
                }
            }
        }
        Ok(windows)
    }

    /// First visible window whose title contains `fragment` (case-insensitive).
    pub fn find_window_by_title(&self, fragment: &str) -> anyhow::Result<Option<Window>> {
        let needle = fragment.to_lowercase();
        for window in self.all_windows()? {
            let title = match window.title() {
                Ok(title) => title,
                Err(err) => {
                    debug!("skipping window without title: {:?}", err);
                    continue;
                }
            };
            if !title.is_empty() && title.to_lowercase().contains(&needle) {
                return Ok(Some(window));
            }
        }
        Ok(None)
    }

    pub fn launch_browser(&self, browser: Browser) -> anyhow::Result<()> {
        self.0.imp.launch_browser(browser)
    }
}

pub struct Display {
    inner: xcap::Monitor,
}

impl Display {
    /// The display x coordinate in the global desktop.
    pub fn x(&self) -> XCapResult<i32> {
        self.inner.x()
    }
    /// The display y coordinate in the global desktop.
    pub fn y(&self) -> XCapResult<i32> {
        self.inner.y()
    }
    /// The display pixel width.
    pub fn width(&self) -> XCapResult<u32> {
        self.inner.width()
    }
    /// The display pixel height.
    pub fn height(&self) -> XCapResult<u32> {
        self.inner.height()
    }
    pub fn is_primary(&self) -> XCapResult<bool> {
        self.inner.is_primary()
    }

    pub fn capture_image(&self) -> anyhow::Result<RgbaImage> {
        Ok(self.inner.capture_image()?)
    }
}

#[derive(Clone)]
pub struct Window {
    id: u32,
    inner: xcap::Window,
    context: Context,
}

impl Window {
    pub(crate) fn new(context: Context, inner: xcap::Window) -> anyhow::Result<Self> {
        Ok(Self {
            id: inner.id()?,
            inner,
            context,
        })
    }

    /// The window id
    pub fn id(&self) -> u32 {
        self.id
    }
    /// The window app name
    pub fn app_name(&self) -> XCapResult<String> {
        self.inner.app_name()
    }
    /// The window title
    pub fn title(&self) -> XCapResult<String> {
        self.inner.title()
    }
    /// The window x coordinate.
    pub fn x(&self) -> XCapResult<i32> {
        self.inner.x()
    }
    /// The window y coordinate.
    pub fn y(&self) -> XCapResult<i32> {
        self.inner.y()
    }
    /// The window pixel width.
    pub fn width(&self) -> XCapResult<u32> {
        self.inner.width()
    }
    /// The window pixel height.
    pub fn height(&self) -> XCapResult<u32> {
        self.inner.height()
    }

    pub fn activate(&self) -> anyhow::Result<()> {
        self.context.0.imp.activate_window(self)
    }

    pub fn move_resize(&self, x: i32, y: i32, width: u32, height: u32) -> anyhow::Result<()> {
        self.context.0.imp.move_resize_window(self, x, y, width, height)
    }
}
