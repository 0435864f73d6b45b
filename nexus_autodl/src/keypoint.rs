use image::GrayImage;

/// Minimal brightness delta for a circle pixel to count as brighter or darker
/// than the candidate corner.
pub const DEFAULT_FAST_THRESHOLD: u8 = 20;

/// Keypoints are only produced at least this far from every image edge, so the
/// descriptor sampling patch always stays inside the image.
pub const BORDER: u32 = 16;

// Contiguous circle pixels required for a corner (FAST-9).
const ARC_LENGTH: u32 = 9;

// Radius of the square patch used for the intensity-centroid orientation.
const MOMENT_RADIUS: i32 = 7;

// Bresenham circle of radius 3, clockwise from the top.
const CIRCLE: [(i32, i32); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

/// A FAST corner with its intensity-centroid orientation in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

/// Detects FAST-9 corners with a 3x3 local non-max suppression on the corner
/// response. Returns an empty list for images too small to host a keypoint.
pub fn detect_keypoints(image: &GrayImage, threshold: u8) -> Vec<Keypoint> {
    let width = image.width() as i32;
    let height = image.height() as i32;
    let border = BORDER as i32;
    if width <= 2 * border || height <= 2 * border {
        return Vec::new();
    }
    let data = image.as_raw();
    let at = |x: i32, y: i32| -> i16 { data[(y * width + x) as usize] as i16 };

    let mut responses = vec![0.0f32; (width * height) as usize];
    for y in border..height - border {
        for x in border..width - border {
            if let Some(response) = corner_response(&at, x, y, threshold) {
                responses[(y * width + x) as usize] = response;
            }
        }
    }

    let mut keypoints = Vec::new();
    for y in border..height - border {
        for x in border..width - border {
            let response = responses[(y * width + x) as usize];
            if response <= 0.0 {
                continue;
            }
            let is_local_max = (-1..=1).all(|dy: i32| {
                (-1..=1).all(|dx: i32| {
                    (dx == 0 && dy == 0)
                        || responses[((y + dy) * width + x + dx) as usize] < response
                })
            });
            if is_local_max {
                keypoints.push(Keypoint {
                    x: x as f32,
                    y: y as f32,
                    angle: orientation(&at, x, y),
                });
            }
        }
    }
    keypoints
}

/// FAST-9 corner test. Returns the corner response (summed brightness excess
/// over the circle) or None when the pixel is not a corner.
fn corner_response(
    at: &impl Fn(i32, i32) -> i16,
    x: i32,
    y: i32,
    threshold: u8,
) -> Option<f32> {
    let center = at(x, y);
    let bright = center + threshold as i16;
    let dark = center - threshold as i16;

    // Compass pre-test: any arc of 9 covers at least 2 of the 4 cardinal
    // circle pixels.
    let mut compass_bright = 0;
    let mut compass_dark = 0;
    for index in [0usize, 4, 8, 12] {
        let (dx, dy) = CIRCLE[index];
        let value = at(x + dx, y + dy);
        if value > bright {
            compass_bright += 1;
        } else if value < dark {
            compass_dark += 1;
        }
    }
    if compass_bright < 2 && compass_dark < 2 {
        return None;
    }

    let mut bright_run = 0u32;
    let mut dark_run = 0u32;
    let mut max_bright_run = 0u32;
    let mut max_dark_run = 0u32;
    let mut bright_sum = 0i32;
    let mut dark_sum = 0i32;
    // Doubled iteration handles arcs that wrap around the circle start.
    for step in 0..CIRCLE.len() * 2 {
        let (dx, dy) = CIRCLE[step % CIRCLE.len()];
        let value = at(x + dx, y + dy);
        if value > bright {
            bright_run += 1;
            max_bright_run = max_bright_run.max(bright_run);
        } else {
            bright_run = 0;
        }
        if value < dark {
            dark_run += 1;
            max_dark_run = max_dark_run.max(dark_run);
        } else {
            dark_run = 0;
        }
        if step < CIRCLE.len() {
            bright_sum += ((value - bright) as i32).max(0);
            dark_sum += ((dark - value) as i32).max(0);
        }
    }

    if max_bright_run >= ARC_LENGTH {
        Some(bright_sum as f32)
    } else if max_dark_run >= ARC_LENGTH {
        Some(dark_sum as f32)
    } else {
        None
    }
}

fn orientation(at: &impl Fn(i32, i32) -> i16, x: i32, y: i32) -> f32 {
    let mut m10 = 0i64;
    let mut m01 = 0i64;
    for dy in -MOMENT_RADIUS..=MOMENT_RADIUS {
        for dx in -MOMENT_RADIUS..=MOMENT_RADIUS {
            let value = at(x + dx, y + dy) as i64;
            m10 += dx as i64 * value;
            m01 += dy as i64 * value;
        }
    }
    (m01 as f32).atan2(m10 as f32)
}

#[test]
fn uniform_image_has_no_keypoints() {
    let image = GrayImage::from_pixel(100, 100, image::Luma([128]));
    assert!(detect_keypoints(&image, DEFAULT_FAST_THRESHOLD).is_empty());
}

#[test]
fn image_smaller_than_borders_has_no_keypoints() {
    let image = GrayImage::from_pixel(32, 32, image::Luma([128]));
    assert!(detect_keypoints(&image, DEFAULT_FAST_THRESHOLD).is_empty());
}

#[test]
fn square_corners_are_detected() {
    let mut image = GrayImage::from_pixel(100, 100, image::Luma([30]));
    for y in 40..70 {
        for x in 40..70 {
            image.put_pixel(x, y, image::Luma([220]));
        }
    }
    let keypoints = detect_keypoints(&image, DEFAULT_FAST_THRESHOLD);
    assert!(!keypoints.is_empty());
    let corners = [(40.0, 40.0), (40.0, 69.0), (69.0, 40.0), (69.0, 69.0)];
    for keypoint in &keypoints {
        let near_corner = corners
            .iter()
            .any(|(cx, cy)| (keypoint.x - cx).abs() <= 6.0 && (keypoint.y - cy).abs() <= 6.0);
        assert!(
            near_corner,
            "keypoint at ({}, {}) is far from every corner",
            keypoint.x, keypoint.y
        );
    }
}

#[test]
fn straight_edges_are_not_corners() {
    let mut image = GrayImage::from_pixel(100, 100, image::Luma([30]));
    // Bright half plane: edge pixels see at most 8 contiguous circle pixels
    // on the dark side.
    for y in 50..100 {
        for x in 0..100 {
            image.put_pixel(x, y, image::Luma([220]));
        }
    }
    assert!(detect_keypoints(&image, DEFAULT_FAST_THRESHOLD).is_empty());
}
