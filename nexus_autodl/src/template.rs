use {
    crate::{
        descriptor::{Descriptor, DescriptorExtractor},
        keypoint::{detect_keypoints, Keypoint, DEFAULT_FAST_THRESHOLD},
    },
    derive_more::{From, Into},
    image::{imageops, ImageError, ImageReader, RgbaImage},
    serde::Serialize,
    std::path::{Path, PathBuf},
    strum::{Display, EnumIter, IntoStaticStr},
    thiserror::Error,
    tracing::{debug, info},
};

/// What a reference image points at on screen.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    Display,
    IntoStaticStr,
    Serialize,
)]
pub enum ButtonRole {
    WebsiteDownload,
    WabbajackDownload,
    VortexDownload,
    VortexStaging,
    VortexUnderstood,
}

impl ButtonRole {
    /// Tie-break rank when detection confidences are equal. Lower wins:
    /// confirmation dialogs must be cleared before fresh downloads are queued.
    pub fn priority(self) -> u8 {
        match self {
            ButtonRole::VortexStaging | ButtonRole::VortexUnderstood => 0,
            ButtonRole::VortexDownload => 1,
            ButtonRole::WebsiteDownload => 2,
            ButtonRole::WabbajackDownload => 3,
        }
    }

    /// A sub-step of the legacy confirmation dialog episode.
    pub fn is_confirmation_step(self) -> bool {
        matches!(self, ButtonRole::VortexStaging | ButtonRole::VortexUnderstood)
    }

    /// The step that must be clicked after this one opens a dialog.
    pub fn confirmation_follow_up(self) -> Option<ButtonRole> {
        match self {
            ButtonRole::VortexStaging => Some(ButtonRole::VortexUnderstood),
            _ => None,
        }
    }

    /// Steps that only ever close a dialog another step opened.
    pub fn is_follow_up_step(self) -> bool {
        matches!(self, ButtonRole::VortexUnderstood)
    }

    /// Whether two detections of these roles cannot both be valid at
    /// overlapping screen positions: duplicates of one role, or the two
    /// sub-steps of one confirmation episode.
    pub fn is_mutually_exclusive_with(self, other: Self) -> bool {
        self == other || (self.is_confirmation_step() && other.is_confirmation_step())
    }

    fn asset_file(self, legacy: bool) -> &'static str {
        match (self, legacy) {
            (ButtonRole::WebsiteDownload, true) => "WebsiteDownloadButton.png",
            (ButtonRole::WebsiteDownload, false) => "WebsiteDownloadButtonNew.png",
            (ButtonRole::VortexDownload, true) => "VortexDownloadButton.png",
            (ButtonRole::VortexDownload, false) => "VortexDownloadButtonNew.png",
            (ButtonRole::WabbajackDownload, _) => "WabbajackDownloadButton.png",
            (ButtonRole::VortexStaging, _) => "StagingButton.png",
            (ButtonRole::VortexUnderstood, _) => "UnderstoodButton.png",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into, Serialize,
)]
pub struct TemplateId(u16);

#[derive(Debug, Error)]
pub enum TemplateLoadError {
    #[error("failed to load template for {role} from {path:?}")]
    Unreadable {
        role: ButtonRole,
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("template for {role} produced no keypoints")]
    NoKeypoints { role: ButtonRole },
}

/// A reference image with its precomputed keypoints and descriptors.
/// Immutable after construction.
#[derive(Debug)]
pub struct Template {
    id: TemplateId,
    role: ButtonRole,
    image: RgbaImage,
    keypoints: Vec<Keypoint>,
    descriptors: Vec<Descriptor>,
}

impl Template {
    pub fn from_image(
        id: TemplateId,
        role: ButtonRole,
        image: RgbaImage,
        extractor: &DescriptorExtractor,
    ) -> Result<Self, TemplateLoadError> {
        let gray = imageops::grayscale(&image);
        let keypoints = detect_keypoints(&gray, DEFAULT_FAST_THRESHOLD);
        if keypoints.is_empty() {
            return Err(TemplateLoadError::NoKeypoints { role });
        }
        let descriptors = extractor.describe(&gray, &keypoints);
        debug!(
            "prepared template {:?} for {}: {} keypoints",
            id,
            role,
            keypoints.len()
        );
        Ok(Self {
            id,
            role,
            image,
            keypoints,
            descriptors,
        })
    }

    pub fn id(&self) -> TemplateId {
        self.id
    }

    pub fn role(&self) -> ButtonRole {
        self.role
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }
}

/// The set of templates enabled for a run. Loaded once, read-only afterwards.
#[derive(Debug)]
pub struct TemplateLibrary {
    templates: Vec<Template>,
}

impl TemplateLibrary {
    /// Loads the reference image for every given role from `dir`, choosing
    /// legacy or modern asset variants. Every file is required.
    pub fn load(
        dir: &Path,
        roles: &[ButtonRole],
        legacy: bool,
        extractor: &DescriptorExtractor,
    ) -> Result<Self, TemplateLoadError> {
        let mut templates = Vec::with_capacity(roles.len());
        for (index, &role) in roles.iter().enumerate() {
            let path = dir.join(role.asset_file(legacy));
            let image = read_rgba(&path).map_err(|source| TemplateLoadError::Unreadable {
                role,
                path: path.clone(),
                source,
            })?;
            let template =
                Template::from_image(TemplateId(index as u16), role, image, extractor)?;
            info!(
                "loaded template for {} from {:?} ({} keypoints)",
                role,
                path,
                template.keypoints().len()
            );
            templates.push(template);
        }
        Ok(Self { templates })
    }

    /// Builds a library from in-memory images; used by simulation and tests.
    pub fn from_images(
        images: Vec<(ButtonRole, RgbaImage)>,
        extractor: &DescriptorExtractor,
    ) -> Result<Self, TemplateLoadError> {
        let mut templates = Vec::with_capacity(images.len());
        for (index, (role, image)) in images.into_iter().enumerate() {
            templates.push(Template::from_image(
                TemplateId(index as u16),
                role,
                image,
                extractor,
            )?);
        }
        Ok(Self { templates })
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn get(&self, id: TemplateId) -> Option<&Template> {
        self.templates.iter().find(|template| template.id() == id)
    }

    pub fn by_role(&self, role: ButtonRole) -> Option<&Template> {
        self.templates.iter().find(|template| template.role() == role)
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }
}

fn read_rgba(path: &Path) -> Result<RgbaImage, ImageError> {
    Ok(ImageReader::open(path)
        .map_err(ImageError::IoError)?
        .decode()?
        .to_rgba8())
}

#[test]
fn dialog_steps_outrank_download_buttons() {
    use strum::IntoEnumIterator;

    for role in ButtonRole::iter() {
        if role.is_confirmation_step() {
            assert_eq!(role.priority(), 0);
        } else {
            assert!(role.priority() > 0);
        }
    }
    assert!(ButtonRole::VortexDownload.priority() < ButtonRole::WebsiteDownload.priority());
    assert!(ButtonRole::WebsiteDownload.priority() < ButtonRole::WabbajackDownload.priority());
}

#[test]
fn staging_is_followed_by_understood() {
    use strum::IntoEnumIterator;

    assert_eq!(
        ButtonRole::VortexStaging.confirmation_follow_up(),
        Some(ButtonRole::VortexUnderstood)
    );
    for role in ButtonRole::iter().filter(|&role| role != ButtonRole::VortexStaging) {
        assert_eq!(role.confirmation_follow_up(), None);
    }
}

#[test]
fn only_understood_is_a_follow_up_step() {
    use strum::IntoEnumIterator;

    for role in ButtonRole::iter() {
        assert_eq!(role.is_follow_up_step(), role == ButtonRole::VortexUnderstood);
    }
}

#[test]
fn dialog_pair_is_mutually_exclusive() {
    assert!(ButtonRole::VortexStaging.is_mutually_exclusive_with(ButtonRole::VortexUnderstood));
    assert!(ButtonRole::WebsiteDownload.is_mutually_exclusive_with(ButtonRole::WebsiteDownload));
    assert!(!ButtonRole::WebsiteDownload.is_mutually_exclusive_with(ButtonRole::VortexDownload));
    assert!(!ButtonRole::WabbajackDownload.is_mutually_exclusive_with(ButtonRole::VortexStaging));
}

#[test]
fn legacy_flag_switches_download_button_artwork() {
    for role in [ButtonRole::WebsiteDownload, ButtonRole::VortexDownload] {
        assert_ne!(role.asset_file(true), role.asset_file(false));
    }
    for role in [
        ButtonRole::WabbajackDownload,
        ButtonRole::VortexStaging,
        ButtonRole::VortexUnderstood,
    ] {
        assert_eq!(role.asset_file(true), role.asset_file(false));
    }
}
