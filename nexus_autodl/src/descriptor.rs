use {
    crate::keypoint::Keypoint,
    image::GrayImage,
    rand::{rngs::StdRng, Rng, SeedableRng},
};

/// 256-bit binary descriptor = 32 bytes.
pub type Descriptor = [u8; 32];

const PAIR_COUNT: usize = 256;

// Sampling offsets stay within this disc so a steered pair plus the smoothing
// window never leaves the keypoint patch.
const PAIR_RADIUS: i32 = 13;

// 5x5 box smoothing around each sampled point.
const BOX_RADIUS: i32 = 2;

// Fixed seed: templates and frames must sample the same pattern.
const PATTERN_SEED: u64 = 0x0bb5_0bb5_0bb5_0bb5;

pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum()
}

/// Produces binary descriptors from pairwise smoothed-intensity comparisons
/// steered by the keypoint orientation.
pub struct DescriptorExtractor {
    pairs: Vec<(i32, i32, i32, i32)>,
}

impl Default for DescriptorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorExtractor {
    pub fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(PATTERN_SEED);
        let mut pairs = Vec::with_capacity(PAIR_COUNT);
        for _ in 0..PAIR_COUNT {
            let (ax, ay) = sample_disc(&mut rng);
            let (bx, by) = sample_disc(&mut rng);
            pairs.push((ax, ay, bx, by));
        }
        Self { pairs }
    }

    pub fn describe(&self, image: &GrayImage, keypoints: &[Keypoint]) -> Vec<Descriptor> {
        let integral = IntegralImage::new(image);
        keypoints
            .iter()
            .map(|keypoint| self.describe_one(&integral, keypoint))
            .collect()
    }

    fn describe_one(&self, integral: &IntegralImage, keypoint: &Keypoint) -> Descriptor {
        let (sin, cos) = keypoint.angle.sin_cos();
        let x = keypoint.x.round() as i32;
        let y = keypoint.y.round() as i32;
        let mut descriptor = [0u8; 32];
        for (index, &(ax, ay, bx, by)) in self.pairs.iter().enumerate() {
            let (ax, ay) = rotate(ax, ay, sin, cos);
            let (bx, by) = rotate(bx, by, sin, cos);
            let a = integral.box_mean(x + ax, y + ay);
            let b = integral.box_mean(x + bx, y + by);
            if a < b {
                descriptor[index / 8] |= 1 << (index % 8);
            }
        }
        descriptor
    }
}

fn sample_disc(rng: &mut StdRng) -> (i32, i32) {
    loop {
        let x = rng.random_range(-PAIR_RADIUS..=PAIR_RADIUS);
        let y = rng.random_range(-PAIR_RADIUS..=PAIR_RADIUS);
        if x * x + y * y <= PAIR_RADIUS * PAIR_RADIUS {
            return (x, y);
        }
    }
}

fn rotate(dx: i32, dy: i32, sin: f32, cos: f32) -> (i32, i32) {
    let x = dx as f32 * cos - dy as f32 * sin;
    let y = dx as f32 * sin + dy as f32 * cos;
    (x.round() as i32, y.round() as i32)
}

// Summed-area table; box queries clamp to the image bounds.
struct IntegralImage {
    width: i32,
    height: i32,
    sums: Vec<u64>,
}

impl IntegralImage {
    fn new(image: &GrayImage) -> Self {
        let width = image.width() as i32;
        let height = image.height() as i32;
        let data = image.as_raw();
        let stride = (width + 1) as usize;
        let mut sums = vec![0u64; stride * (height + 1) as usize];
        for y in 0..height as usize {
            let mut row_sum = 0u64;
            for x in 0..width as usize {
                row_sum += data[y * width as usize + x] as u64;
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }
        Self {
            width,
            height,
            sums,
        }
    }

    fn box_mean(&self, x: i32, y: i32) -> u32 {
        let x0 = (x - BOX_RADIUS).clamp(0, self.width - 1);
        let y0 = (y - BOX_RADIUS).clamp(0, self.height - 1);
        let x1 = (x + BOX_RADIUS).clamp(0, self.width - 1);
        let y1 = (y + BOX_RADIUS).clamp(0, self.height - 1);
        let stride = (self.width + 1) as usize;
        let sum = self.sums[(y1 + 1) as usize * stride + (x1 + 1) as usize]
            + self.sums[y0 as usize * stride + x0 as usize]
            - self.sums[y0 as usize * stride + (x1 + 1) as usize]
            - self.sums[(y1 + 1) as usize * stride + x0 as usize];
        let count = ((x1 - x0 + 1) * (y1 - y0 + 1)) as u64;
        (sum / count) as u32
    }
}

#[test]
fn hamming_distance_counts_differing_bits() {
    let zero = [0u8; 32];
    let mut other = [0u8; 32];
    other[0] = 0b1010_1010;
    other[31] = 0xff;
    assert_eq!(hamming_distance(&zero, &zero), 0);
    assert_eq!(hamming_distance(&zero, &other), 12);
    assert_eq!(hamming_distance(&other, &zero), 12);
}

#[test]
fn sampling_pattern_is_stable_across_instances() {
    let image = GrayImage::from_fn(80, 80, |x, y| image::Luma([((x * 31 + y * 57) % 251) as u8]));
    let keypoint = Keypoint {
        x: 40.0,
        y: 40.0,
        angle: 0.7,
    };
    let a = DescriptorExtractor::new().describe(&image, &[keypoint]);
    let b = DescriptorExtractor::new().describe(&image, &[keypoint]);
    assert_eq!(a, b);
}

#[test]
fn translated_patch_keeps_its_descriptor() {
    let mut image = GrayImage::from_pixel(120, 60, image::Luma([100]));
    for dy in -15i32..=15 {
        for dx in -15i32..=15 {
            let value = (dx * 13 + dy * 29).rem_euclid(211) as u8;
            image.put_pixel((30 + dx) as u32, (30 + dy) as u32, image::Luma([value]));
            image.put_pixel((80 + dx) as u32, (30 + dy) as u32, image::Luma([value]));
        }
    }
    let keypoints = [
        Keypoint {
            x: 30.0,
            y: 30.0,
            angle: 0.0,
        },
        Keypoint {
            x: 80.0,
            y: 30.0,
            angle: 0.0,
        },
    ];
    let descriptors = DescriptorExtractor::new().describe(&image, &keypoints);
    assert_eq!(descriptors[0], descriptors[1]);
    assert_eq!(hamming_distance(&descriptors[0], &descriptors[1]), 0);
}
