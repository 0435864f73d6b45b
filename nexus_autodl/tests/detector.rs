mod common;

use {
    common::{library_for, seed_for, synthetic_button, BUTTON_HEIGHT, BUTTON_WIDTH},
    image::{imageops, Rgba, RgbaImage},
    nexus_autodl::{
        detector::{suppress_overlapping, Detection},
        ButtonRole, Detector, Rect, TemplateId, TemplateLibrary, TemplateLoadError,
    },
};

fn blank_frame() -> RgbaImage {
    RgbaImage::from_pixel(1280, 720, Rgba([190, 190, 190, 255]))
}

fn frame_with(placements: &[(ButtonRole, i32, i32)]) -> RgbaImage {
    let mut frame = blank_frame();
    for &(role, x, y) in placements {
        let button = synthetic_button(seed_for(role));
        imageops::overlay(&mut frame, &button, x as i64, y as i64);
    }
    frame
}

fn detection(id: u16, role: ButtonRole, bounds: Rect, match_count: usize) -> Detection {
    Detection {
        template_id: TemplateId::from(id),
        role,
        bounds,
        match_count,
    }
}

#[test]
fn locates_template_in_frame() {
    let detector = Detector::new();
    let library = library_for(&[ButtonRole::WebsiteDownload], &detector);
    let frame = frame_with(&[(ButtonRole::WebsiteDownload, 350, 200)]);

    let detections = detector.detect(&frame, library.templates(), 8, 0.75);
    assert_eq!(detections.len(), 1);
    let detection = &detections[0];
    assert_eq!(detection.role, ButtonRole::WebsiteDownload);
    assert!(detection.match_count >= 8);
    let pasted = Rect::from_xywh(350, 200, BUTTON_WIDTH as i32, BUTTON_HEIGHT as i32);
    assert!(pasted.contains(detection.center()));
    assert!(detection.bounds.left() >= pasted.left());
    assert!(detection.bounds.top() >= pasted.top());
    assert!(detection.bounds.right() <= pasted.right());
    assert!(detection.bounds.bottom() <= pasted.bottom());
}

#[test]
fn blank_frame_has_no_detections() {
    let detector = Detector::new();
    let library = library_for(&[ButtonRole::WebsiteDownload], &detector);
    let detections = detector.detect(&blank_frame(), library.templates(), 8, 0.75);
    assert!(detections.is_empty());
}

#[test]
fn min_matches_gates_detections() {
    let detector = Detector::new();
    let library = library_for(&[ButtonRole::WebsiteDownload], &detector);
    let frame = frame_with(&[(ButtonRole::WebsiteDownload, 350, 200)]);
    let detections = detector.detect(&frame, library.templates(), 100_000, 0.75);
    assert!(detections.is_empty());
}

#[test]
fn absent_roles_are_not_reported() {
    let detector = Detector::new();
    let library = library_for(
        &[ButtonRole::WebsiteDownload, ButtonRole::WabbajackDownload],
        &detector,
    );
    let frame = frame_with(&[(ButtonRole::WebsiteDownload, 500, 300)]);
    let detections = detector.detect(&frame, library.templates(), 8, 0.75);
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].role, ButtonRole::WebsiteDownload);
}

#[test]
fn detections_are_ordered_by_confidence() {
    let detector = Detector::new();
    let library = library_for(
        &[ButtonRole::WebsiteDownload, ButtonRole::WabbajackDownload],
        &detector,
    );
    let frame = frame_with(&[
        (ButtonRole::WebsiteDownload, 100, 100),
        (ButtonRole::WabbajackDownload, 700, 400),
    ]);
    let detections = detector.detect(&frame, library.templates(), 8, 0.75);
    assert_eq!(detections.len(), 2);
    assert!(detections[0].match_count >= detections[1].match_count);
    let roles: Vec<_> = detections.iter().map(|d| d.role).collect();
    assert!(roles.contains(&ButtonRole::WebsiteDownload));
    assert!(roles.contains(&ButtonRole::WabbajackDownload));
}

#[test]
fn uniform_template_is_rejected_at_load() {
    let detector = Detector::new();
    let image = RgbaImage::from_pixel(64, 64, Rgba([128, 128, 128, 255]));
    let error =
        TemplateLibrary::from_images(vec![(ButtonRole::WebsiteDownload, image)], detector.extractor())
            .unwrap_err();
    assert!(matches!(error, TemplateLoadError::NoKeypoints { .. }));
}

#[test]
fn overlapping_same_role_keeps_higher_confidence() {
    let a = detection(0, ButtonRole::WebsiteDownload, Rect::from_xywh(10, 10, 100, 50), 30);
    let b = detection(1, ButtonRole::WebsiteDownload, Rect::from_xywh(12, 12, 100, 50), 20);
    let kept = suppress_overlapping(vec![a, b]);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].template_id, TemplateId::from(0));
    assert_eq!(kept[0].match_count, 30);
}

#[test]
fn confirmation_steps_suppress_each_other() {
    let a = detection(0, ButtonRole::VortexStaging, Rect::from_xywh(40, 40, 80, 40), 25);
    let b = detection(1, ButtonRole::VortexUnderstood, Rect::from_xywh(42, 44, 80, 40), 12);
    let kept = suppress_overlapping(vec![a, b]);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].role, ButtonRole::VortexStaging);
}

#[test]
fn unrelated_roles_may_overlap() {
    let a = detection(0, ButtonRole::WebsiteDownload, Rect::from_xywh(10, 10, 100, 50), 30);
    let b = detection(1, ButtonRole::VortexDownload, Rect::from_xywh(10, 10, 100, 50), 20);
    let kept = suppress_overlapping(vec![a, b]);
    assert_eq!(kept.len(), 2);
}

#[test]
fn distant_same_role_detections_are_kept() {
    let a = detection(0, ButtonRole::WebsiteDownload, Rect::from_xywh(0, 0, 100, 50), 30);
    let b = detection(1, ButtonRole::WebsiteDownload, Rect::from_xywh(500, 300, 100, 50), 20);
    let kept = suppress_overlapping(vec![a, b]);
    assert_eq!(kept.len(), 2);
}

#[test]
fn confidence_tie_keeps_lower_template_id() {
    // Callers pass detections sorted by confidence, then template id.
    let a = detection(2, ButtonRole::WebsiteDownload, Rect::from_xywh(10, 10, 100, 50), 20);
    let b = detection(5, ButtonRole::WebsiteDownload, Rect::from_xywh(11, 11, 100, 50), 20);
    let kept = suppress_overlapping(vec![a, b]);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].template_id, TemplateId::from(2));
}

#[test]
fn marginal_overlap_is_not_suppressed() {
    // IoU just under the threshold: 100x50 boxes shifted by 60 share
    // 40x50 = 2000 of 8000, a quarter.
    let a = detection(0, ButtonRole::WebsiteDownload, Rect::from_xywh(0, 0, 100, 50), 30);
    let b = detection(1, ButtonRole::WebsiteDownload, Rect::from_xywh(60, 0, 100, 50), 20);
    let kept = suppress_overlapping(vec![a, b]);
    assert_eq!(kept.len(), 2);
}
