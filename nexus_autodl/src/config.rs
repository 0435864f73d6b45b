use {
    crate::template::ButtonRole,
    std::{path::PathBuf, time::Duration},
    thiserror::Error,
};

/// Minimum surviving descriptor matches before a template counts as found.
pub const DEFAULT_MIN_MATCHES: usize = 8;

/// Ratio-test threshold: the best neighbor must be closer than this fraction
/// of the second-best neighbor's distance.
pub const DEFAULT_RATIO: f32 = 0.75;

/// Pause between scan cycles.
pub const DEFAULT_CLICK_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BrowserKind {
    Chrome,
    Firefox,
}

impl From<BrowserKind> for deskctl::Browser {
    fn from(value: BrowserKind) -> Self {
        match value {
            BrowserKind::Chrome => deskctl::Browser::Chrome,
            BrowserKind::Firefox => deskctl::Browser::Firefox,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("a browser can only be used with Vortex integration or simulation")]
    BrowserWithoutVortex,
    #[error("min_matches must be at least 1")]
    ZeroMinMatches,
    #[error("ratio must be within (0, 1], got {0}")]
    RatioOutOfRange(f32),
}

/// Immutable snapshot of everything a run needs. Built once at startup,
/// validated, then only ever passed by reference.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub browser: Option<BrowserKind>,
    pub vortex: bool,
    pub legacy: bool,
    pub force_primary: bool,
    pub window_title: Option<String>,
    pub min_matches: usize,
    pub ratio: f32,
    pub click_delay: Duration,
    pub simulate: bool,
    pub debug_frame_dir: Option<PathBuf>,
    pub assets_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            browser: None,
            vortex: false,
            legacy: false,
            force_primary: false,
            window_title: None,
            min_matches: DEFAULT_MIN_MATCHES,
            ratio: DEFAULT_RATIO,
            click_delay: DEFAULT_CLICK_DELAY,
            simulate: false,
            debug_frame_dir: None,
            assets_dir: PathBuf::from("assets"),
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.browser.is_some() && !self.vortex && !self.simulate {
            return Err(ConfigError::BrowserWithoutVortex);
        }
        if self.min_matches == 0 {
            return Err(ConfigError::ZeroMinMatches);
        }
        if !(self.ratio > 0.0 && self.ratio <= 1.0) {
            return Err(ConfigError::RatioOutOfRange(self.ratio));
        }
        Ok(())
    }

    /// Roles whose templates take part in this run. Wabbajack is only
    /// targeted outside of Vortex integration; the confirmation dialog pair
    /// exists only in the legacy Vortex flow.
    pub fn enabled_roles(&self) -> Vec<ButtonRole> {
        let mut roles = vec![ButtonRole::WebsiteDownload];
        if self.vortex {
            roles.push(ButtonRole::VortexDownload);
            if self.legacy {
                roles.push(ButtonRole::VortexStaging);
                roles.push(ButtonRole::VortexUnderstood);
            }
        } else {
            roles.push(ButtonRole::WabbajackDownload);
        }
        roles
    }
}

#[test]
fn default_config_is_valid() {
    RunConfig::default().validate().unwrap();
}

#[test]
fn browser_requires_vortex_or_simulation() {
    let mut config = RunConfig {
        browser: Some(BrowserKind::Firefox),
        ..RunConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::BrowserWithoutVortex)
    ));
    config.vortex = true;
    config.validate().unwrap();
    config.vortex = false;
    config.simulate = true;
    config.validate().unwrap();
}

#[test]
fn zero_min_matches_is_rejected() {
    let config = RunConfig {
        min_matches: 0,
        ..RunConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::ZeroMinMatches)));
}

#[test]
fn ratio_must_be_within_unit_interval() {
    for ratio in [0.0, -0.5, 1.5] {
        let config = RunConfig {
            ratio,
            ..RunConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RatioOutOfRange(_))
        ));
    }
    let config = RunConfig {
        ratio: 1.0,
        ..RunConfig::default()
    };
    config.validate().unwrap();
}

#[test]
fn website_button_is_always_enabled() {
    for config in [
        RunConfig::default(),
        RunConfig {
            vortex: true,
            ..RunConfig::default()
        },
    ] {
        assert!(config
            .enabled_roles()
            .contains(&ButtonRole::WebsiteDownload));
    }
}

#[test]
fn wabbajack_is_only_targeted_outside_vortex() {
    let standalone = RunConfig::default();
    assert!(standalone
        .enabled_roles()
        .contains(&ButtonRole::WabbajackDownload));

    let vortex = RunConfig {
        vortex: true,
        ..RunConfig::default()
    };
    assert!(!vortex
        .enabled_roles()
        .contains(&ButtonRole::WabbajackDownload));
}

#[test]
fn dialog_pair_needs_legacy_vortex() {
    let modern = RunConfig {
        vortex: true,
        ..RunConfig::default()
    };
    assert!(!modern
        .enabled_roles()
        .contains(&ButtonRole::VortexStaging));

    let legacy = RunConfig {
        vortex: true,
        legacy: true,
        ..RunConfig::default()
    };
    let roles = legacy.enabled_roles();
    assert!(roles.contains(&ButtonRole::VortexStaging));
    assert!(roles.contains(&ButtonRole::VortexUnderstood));
}
