#![allow(dead_code)]

use {
    image::{Rgba, RgbaImage},
    nexus_autodl::{
        frame::{Scene, SimulatedFrameSource},
        ButtonRole, ClickError, ClickExecutor, Detector, Point, RunConfig, Scanner,
        SimulatedClickExecutor, SimulatedWindowPositioner, TemplateLibrary,
    },
    rand::{rngs::StdRng, Rng, SeedableRng},
};

pub const BUTTON_WIDTH: u32 = 140;
pub const BUTTON_HEIGHT: u32 = 100;

const BLOCK: u32 = 4;

/// Deterministic button artwork: random gray blocks give the detector a
/// dense field of corners, and per-role seeds keep the patterns distinct.
pub fn synthetic_button(seed: u64) -> RgbaImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let blocks_x = BUTTON_WIDTH.div_ceil(BLOCK);
    let blocks_y = BUTTON_HEIGHT.div_ceil(BLOCK);
    let grays: Vec<u8> = (0..blocks_x * blocks_y)
        .map(|_| rng.random_range(0..=255))
        .collect();
    RgbaImage::from_fn(BUTTON_WIDTH, BUTTON_HEIGHT, |x, y| {
        let block = (y / BLOCK) * blocks_x + x / BLOCK;
        let gray = grays[block as usize];
        Rgba([gray, gray, gray, 255])
    })
}

pub fn seed_for(role: ButtonRole) -> u64 {
    role as u64 * 1000 + 17
}

pub fn artwork_for(roles: &[ButtonRole]) -> Vec<(ButtonRole, RgbaImage)> {
    roles
        .iter()
        .map(|&role| (role, synthetic_button(seed_for(role))))
        .collect()
}

pub fn library_for(roles: &[ButtonRole], detector: &Detector) -> TemplateLibrary {
    TemplateLibrary::from_images(artwork_for(roles), detector.extractor())
        .expect("synthetic buttons always have keypoints")
}

/// Scanner over a simulated desktop plus a handle to the recorded clicks.
pub fn sim_scanner(
    config: RunConfig,
    roles: &[ButtonRole],
    scenes: Vec<Scene>,
) -> (Scanner, SimulatedClickExecutor) {
    let detector = Detector::new();
    let library = library_for(roles, &detector);
    let frames = SimulatedFrameSource::new(artwork_for(roles), scenes, config.force_primary);
    let clicker = SimulatedClickExecutor::new();
    let handle = clicker.clone();
    let positioner = SimulatedWindowPositioner::new(&config);
    let scanner = Scanner::new(
        config,
        library,
        detector,
        Box::new(frames),
        Box::new(clicker),
        Box::new(positioner),
        None,
    );
    (scanner, handle)
}

/// Always fails; the scan state must not advance on a failed dispatch.
pub struct FailingClickExecutor;

impl ClickExecutor for FailingClickExecutor {
    fn click(&mut self, target: Point) -> Result<(), ClickError> {
        Err(ClickError::new(target, anyhow::anyhow!("injected failure")))
    }
}
