pub mod cancel;
pub mod click;
pub mod config;
pub mod debug_sink;
pub mod descriptor;
pub mod detector;
pub mod dialog;
pub mod frame;
pub mod keypoint;
pub mod scanner;
pub mod template;
pub mod types;
pub mod window;

pub use crate::{
    cancel::CancelToken,
    click::{ClickError, ClickExecutor, DesktopClickExecutor, SimulatedClickExecutor},
    config::{BrowserKind, ConfigError, RunConfig},
    debug_sink::DebugSink,
    detector::{Detection, Detector},
    dialog::{ScanMode, ScanState},
    frame::{
        DisplayFrameSource, Frame, FrameSource, MonitorInfo, Placement, Scene,
        SimulatedFrameSource,
    },
    scanner::Scanner,
    template::{ButtonRole, Template, TemplateId, TemplateLibrary, TemplateLoadError},
    types::{Point, Rect, Size},
    window::{DesktopWindowPositioner, SimulatedWindowPositioner, WindowPositioner},
};
