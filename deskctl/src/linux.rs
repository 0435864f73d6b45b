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

    // https://manpages.ubuntu.com/manpages/trusty/man1/xdotool.1.html
    fn run_xdotool(&self, args: &[&str]) -> anyhow::Result<()> {
        let status = Command::new("xdotool")
            .args(args)
            .status()
            .with_context(|| format!("failed to execute command: xdotool {:?}", args))?;
        if !status.success() {
            bail!("xdotool failed with status {:?}", status);
        }
        Ok(())
    }

    pub fn activate_window(&self, window: &crate::Window) -> anyhow::Result<()> {
        self.run_xdotool(&["windowactivate", "--sync", &window.id().to_string()])
    }

    pub fn move_resize_window(
        &self,
        window: &crate::Window,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> anyhow::Result<()> {
        let id = window.id().to_string();
        self.run_xdotool(&["windowmove", "--sync", &id, &x.to_string(), &y.to_string()])?;
        self.run_xdotool(&[
            "windowsize",
            "--sync",
            &id,
            &width.to_string(),
            &height.to_string(),
        ])
    }

    pub fn launch_browser(&self, browser: crate::Browser) -> anyhow::Result<()> {
        let (program, args): (&str, &[&str]) = match browser {
            crate::Browser::Chrome => ("google-chrome", &["about:blank"]),
            crate::Browser::Firefox => ("firefox", &[]),
        };
        let child = Command::new(program)
            .args(args)
            .spawn()
            .with_context(|| format!("failed to launch {}", program))?;
        info!("launched {} (pid {})", program, child.id());
        Ok(())
    }
}
