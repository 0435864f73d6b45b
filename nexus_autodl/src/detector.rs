use {
    crate::{
        descriptor::{hamming_distance, Descriptor, DescriptorExtractor},
        keypoint::{detect_keypoints, Keypoint, DEFAULT_FAST_THRESHOLD},
        template::{ButtonRole, Template, TemplateId},
        types::{Point, Rect},
    },
    image::{imageops, RgbaImage},
    serde::Serialize,
    tracing::{debug, trace},
};

/// Overlap above this fraction marks two mutually exclusive detections as
/// claims on the same screen area.
pub const NMS_IOU_THRESHOLD: f32 = 0.3;

/// A template located inside a frame. Coordinates are frame-local.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub template_id: TemplateId,
    pub role: ButtonRole,
    pub bounds: Rect,
    /// Surviving good-match count; doubles as the detection confidence.
    pub match_count: usize,
}

impl Detection {
    pub fn confidence(&self) -> usize {
        self.match_count
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }
}

pub struct Detector {
    extractor: DescriptorExtractor,
    fast_threshold: u8,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector {
    pub fn new() -> Self {
        Self {
            extractor: DescriptorExtractor::new(),
            fast_threshold: DEFAULT_FAST_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_fast_threshold(mut self, threshold: u8) -> Self {
        self.fast_threshold = threshold;
        self
    }

    /// Templates must be built with the same sampling pattern that will
    /// describe the frames.
    pub fn extractor(&self) -> &DescriptorExtractor {
        &self.extractor
    }

    /// Locates the given templates inside the frame. Frame descriptors are
    /// extracted once and matched against every template; results are gated
    /// by `min_matches`, suppressed against mutually exclusive overlaps, and
    /// ordered by descending confidence then ascending template id.
    pub fn detect(
        &self,
        frame: &RgbaImage,
        templates: &[Template],
        min_matches: usize,
        ratio: f32,
    ) -> Vec<Detection> {
        let gray = imageops::grayscale(frame);
        let frame_keypoints = detect_keypoints(&gray, self.fast_threshold);
        if frame_keypoints.is_empty() {
            trace!("no keypoints in frame, skipping detection");
            return Vec::new();
        }
        let frame_descriptors = self.extractor.describe(&gray, &frame_keypoints);
        let frame_bounds = Rect::from_xywh(0, 0, frame.width() as i32, frame.height() as i32);

        let mut detections: Vec<Detection> = templates
            .iter()
            .filter_map(|template| {
                match_template(
                    template,
                    &frame_keypoints,
                    &frame_descriptors,
                    frame_bounds,
                    min_matches,
                    ratio,
                )
            })
            .collect();
        detections.sort_by(|a, b| {
            b.match_count
                .cmp(&a.match_count)
                .then(a.template_id.cmp(&b.template_id))
        });
        suppress_overlapping(detections)
    }
}

fn match_template(
    template: &Template,
    frame_keypoints: &[Keypoint],
    frame_descriptors: &[Descriptor],
    frame_bounds: Rect,
    min_matches: usize,
    ratio: f32,
) -> Option<Detection> {
    // The ratio test needs a second-best neighbor to compare against.
    if frame_descriptors.len() < 2 {
        return None;
    }

    let mut matched = Vec::new();
    for descriptor in template.descriptors() {
        let mut best = u32::MAX;
        let mut second = u32::MAX;
        let mut best_index = 0usize;
        for (index, candidate) in frame_descriptors.iter().enumerate() {
            let distance = hamming_distance(descriptor, candidate);
            if distance < best {
                second = best;
                best = distance;
                best_index = index;
            } else if distance < second {
                second = distance;
            }
        }
        if (best as f32) < ratio * (second as f32) {
            matched.push(best_index);
        }
    }

    if matched.len() < min_matches {
        trace!(
            "template {:?} ({}): {} good matches, need {}",
            template.id(),
            template.role(),
            matched.len(),
            min_matches
        );
        return None;
    }

    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;
    for &index in &matched {
        let keypoint = &frame_keypoints[index];
        let x = keypoint.x.round() as i32;
        let y = keypoint.y.round() as i32;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let bounds = Rect::from_corners(Point::new(min_x, min_y), Point::new(max_x, max_y))
        .clamp_to(frame_bounds);

    debug!(
        "detected {} via template {:?}: {} matches, bounds {:?}",
        template.role(),
        template.id(),
        matched.len(),
        bounds
    );
    Some(Detection {
        template_id: template.id(),
        role: template.role(),
        bounds,
        match_count: matched.len(),
    })
}

/// Drops every detection whose bounds overlap a higher-ranked mutually
/// exclusive detection with IoU above [`NMS_IOU_THRESHOLD`]. Input must be
/// sorted best-first; ranking ties are already broken by lower template id.
pub fn suppress_overlapping(detections: Vec<Detection>) -> Vec<Detection> {
    let mut kept: Vec<Detection> = Vec::with_capacity(detections.len());
    for detection in detections {
        let suppressed_by = kept.iter().find(|kept_detection| {
            kept_detection
                .role
                .is_mutually_exclusive_with(detection.role)
                && kept_detection.bounds.iou(detection.bounds) > NMS_IOU_THRESHOLD
        });
        match suppressed_by {
            Some(winner) => debug!(
                "suppressed {} (template {:?}) overlapping {} (template {:?})",
                detection.role, detection.template_id, winner.role, winner.template_id
            ),
            None => kept.push(detection),
        }
    }
    kept
}
