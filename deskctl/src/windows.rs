use {
    anyhow::{bail, Context as _},
    std::{ffi::c_void, process::Command},
    tracing::info,
    windows_sys::Win32::{
        Foundation::GetLastError,
        UI::WindowsAndMessaging::{
            SetForegroundWindow, SetWindowPos, ShowWindow, SWP_NOZORDER, SW_SHOWNORMAL,
        },
    },
};

pub struct Context {}

impl Context {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {})
    }

    pub fn activate_window(&self, window: &crate::Window) -> anyhow::Result<()> {
        // xcap returns HWND pointer as window id.
        let ret = unsafe { SetForegroundWindow(window.id() as *mut c_void) };
        if ret == 0 {
            bail!("failed to activate window (error code: {})", unsafe {
                GetLastError()
            });
        }
        Ok(())
    }

    pub fn move_resize_window(
        &self,
        window: &crate::Window,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> anyhow::Result<()> {
        let hwnd = window.id() as *mut c_void;
        unsafe { ShowWindow(hwnd, SW_SHOWNORMAL) };
        let ret = unsafe {
            SetWindowPos(
                hwnd,
                std::ptr::null_mut(),
                x,
                y,
                width as i32,
                height as i32,
                SWP_NOZORDER,
            )
        };
        if ret == 0 {
            bail!("failed to move window (error code: {})", unsafe {
                GetLastError()
            });
        }
        Ok(())
    }

    pub fn launch_browser(&self, browser: crate::Browser) -> anyhow::Result<()> {
        let args: &[&str] = match browser {
            crate::Browser::Chrome => &["/C", "start", "chrome", "about:blank"],
            crate::Browser::Firefox => &["/C", "start", "firefox"],
        };
        Command::new("cmd")
            .args(args)
            .spawn()
            .context("failed to launch browser")?;
        info!("launched browser: {:?}", browser);
        Ok(())
    }
}
