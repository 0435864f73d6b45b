use {
    anyhow::{bail, Context as _},
    std::process::Command,
    tracing::info,
};

pub struct Context {}

impl Context {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {})
    }

    // Window manipulation goes through osascript because AppKit APIs require
    // a running event loop in this process.
    fn run_osascript(&self, script: &str) -> anyhow::Result<()> {
        let output = Command::new("osascript")
            .args(["-e", script])
            .output()
            .context("failed to execute osascript")?;
        if !output.status.success() {
            bail!("osascript failed: {:?}", output);
        }
        Ok(())
    }

    pub fn activate_window(&self, window: &crate::Window) -> anyhow::Result<()> {
        let app = window.app_name()?;
        self.run_osascript(&format!("tell application \"{}\" to activate", app))
    }

    pub fn move_resize_window(
        &self,
        window: &crate::Window,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> anyhow::Result<()> {
        let app = window.app_name()?;
        self.run_osascript(&format!(
            "tell application \"System Events\" to tell (first process whose name is \"{}\") \
             to set position of front window to {{{}, {}}}",
            app, x, y
        ))?;
        self.run_osascript(&format!(
            "tell application \"System Events\" to tell (first process whose name is \"{}\") \
             to set size of front window to {{{}, {}}}",
            app, width, height
        ))
    }

    pub fn launch_browser(&self, browser: crate::Browser) -> anyhow::Result<()> {
        let args: &[&str] = match browser {
            crate::Browser::Chrome => &["-a", "Google Chrome", "about:blank"],
            crate::Browser::Firefox => &["-a", "Firefox"],
        };
        Command::new("open")
            .args(args)
            .spawn()
            .context("failed to launch browser")?;
        info!("launched browser: {:?}", browser);
        Ok(())
    }
}
