use {
    anyhow::Context as _,
    clap::Parser,
    itertools::Itertools,
    nexus_autodl::{
        config::{DEFAULT_MIN_MATCHES, DEFAULT_RATIO},
        frame::{DisplayFrameSource, Placement, Scene, SimulatedFrameSource},
        BrowserKind, CancelToken, DebugSink, DesktopClickExecutor, DesktopWindowPositioner,
        Detector, Point, RunConfig, Scanner, SimulatedClickExecutor, SimulatedWindowPositioner,
        TemplateLibrary,
    },
    std::{path::PathBuf, time::Duration},
    tracing::info,
    tracing_subscriber::{filter::LevelFilter, EnvFilter},
};

/// Scans screenshots for download buttons and clicks them as they appear.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Browser to launch and position before scanning.
    #[clap(long, value_enum)]
    browser: Option<BrowserKind>,
    /// Scan for the Vortex mod manager's download button.
    #[clap(long)]
    vortex: bool,
    /// Use the legacy button artwork and the two step confirmation dialog.
    #[clap(long)]
    legacy: bool,
    /// Log at debug level by default.
    #[clap(long)]
    verbose: bool,
    /// Scan only the primary monitor.
    #[clap(long)]
    force_primary: bool,
    /// Also position the window with this title on the primary monitor.
    #[clap(long)]
    window_title: Option<String>,
    /// Minimum good keypoint matches for a detection.
    #[clap(long, default_value_t = DEFAULT_MIN_MATCHES)]
    min_matches: usize,
    /// Ratio test threshold for match filtering.
    #[clap(long, default_value_t = DEFAULT_RATIO)]
    ratio: f32,
    /// Seconds to suspend between scan cycles.
    #[clap(long, default_value_t = 2.0)]
    click_delay: f64,
    /// Run against synthetic frames instead of the real desktop.
    #[clap(long)]
    simulate: bool,
    /// Save annotated frames and detection records to this directory.
    #[clap(long)]
    debug_frame_dir: Option<PathBuf>,
    /// Directory with the button template images.
    #[clap(long, default_value = "assets")]
    assets_dir: PathBuf,
}

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env()?,
        )
        .init();

    let config = RunConfig {
        browser: args.browser,
        vortex: args.vortex,
        legacy: args.legacy,
        force_primary: args.force_primary,
        window_title: args.window_title,
        min_matches: args.min_matches,
        ratio: args.ratio,
        click_delay: Duration::from_secs_f64(args.click_delay),
        simulate: args.simulate,
        debug_frame_dir: args.debug_frame_dir,
        assets_dir: args.assets_dir,
    };
    config.validate()?;

    let detector = Detector::new();
    let library = TemplateLibrary::load(
        &config.assets_dir,
        &config.enabled_roles(),
        config.legacy,
        detector.extractor(),
    )
    .with_context(|| format!("failed to load templates from {:?}", config.assets_dir))?;

    info!(
        "loaded {} templates: {}",
        library.len(),
        library.templates().iter().map(|t| t.role()).join(", ")
    );

    let debug_sink = match &config.debug_frame_dir {
        Some(dir) => Some(DebugSink::new(dir)?),
        None => None,
    };

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            info!("stop requested, finishing the current cycle");
            cancel.cancel();
        })?;
    }

    let mut scanner = if config.simulate {
        let artwork = library
            .templates()
            .iter()
            .map(|template| (template.role(), template.image().clone()))
            .collect();
        let scenes = demo_scenes(&library);
        let frames = SimulatedFrameSource::new(artwork, scenes, config.force_primary);
        let clicker = SimulatedClickExecutor::new();
        let positioner = SimulatedWindowPositioner::new(&config);
        Scanner::new(
            config,
            library,
            detector,
            Box::new(frames),
            Box::new(clicker),
            Box::new(positioner),
            debug_sink,
        )
    } else {
        let context = deskctl::Context::new()?;
        let frames = DisplayFrameSource::new(context.clone(), config.force_primary);
        let clicker = DesktopClickExecutor::new(context.clone());
        let positioner = DesktopWindowPositioner::new(context, &config);
        Scanner::new(
            config,
            library,
            detector,
            Box::new(frames),
            Box::new(clicker),
            Box::new(positioner),
            debug_sink,
        )
    };
    scanner.run(&cancel);
    Ok(())
}

/// Scene script for simulated runs: each loaded template shows up once, in
/// library order, alternating between the two monitors.
fn demo_scenes(library: &TemplateLibrary) -> Vec<Scene> {
    library
        .templates()
        .iter()
        .enumerate()
        .map(|(index, template)| Scene {
            placements: vec![Placement {
                role: template.role(),
                monitor: index % 2,
                position: Point::new(300 + 40 * index as i32, 200 + 30 * index as i32),
            }],
        })
        .collect()
}
