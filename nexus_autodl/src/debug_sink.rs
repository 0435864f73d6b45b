use {
    crate::{
        detector::Detection,
        frame::{Frame, MonitorInfo},
        types::{Point, Rect},
    },
    chrono::{DateTime, Utc},
    font8x8::legacy::BASIC_LEGACY,
    fs_err::create_dir_all,
    image::{Rgba, RgbaImage},
    serde::Serialize,
    std::path::PathBuf,
    tracing::debug,
};

const HIGHLIGHT: Rgba<u8> = Rgba([0, 200, 0, 255]);
const OUTLINE_THICKNESS: i32 = 2;
const GLYPH_SCALE: i32 = 2;
const GLYPH_SIZE: i32 = 8;

/// Persists annotated copies of scanned frames for offline inspection.
/// Every frame gets a PNG with detection boxes and a JSON record of what
/// was found.
pub struct DebugSink {
    directory: PathBuf,
}

#[derive(Serialize)]
struct FrameRecord<'a> {
    cycle: u64,
    monitor: MonitorInfo,
    captured_at: DateTime<Utc>,
    detections: &'a [Detection],
}

impl DebugSink {
    pub fn new(directory: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let directory = directory.into();
        create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn record(
        &self,
        cycle: u64,
        frame: &Frame,
        detections: &[Detection],
    ) -> anyhow::Result<()> {
        let stem = format!("frame_{:06}_m{}", cycle, frame.monitor.index);
        let mut annotated = frame.image.clone();
        for detection in detections {
            draw_rect_outline(&mut annotated, detection.bounds, HIGHLIGHT);
            let label = format!(
                "{} | conf={} | matches={}",
                detection.role,
                detection.confidence(),
                detection.match_count
            );
            let label_origin = Point::new(
                detection.bounds.left(),
                (detection.bounds.top() - GLYPH_SIZE * GLYPH_SCALE - 2).max(0),
            );
            draw_label(&mut annotated, label_origin, &label, HIGHLIGHT);
        }
        let image_path = self.directory.join(format!("{stem}.png"));
        annotated.save(&image_path)?;

        let record = FrameRecord {
            cycle,
            monitor: frame.monitor,
            captured_at: frame.captured_at,
            detections,
        };
        let json = serde_json::to_string_pretty(&record)?;
        fs_err::write(self.directory.join(format!("{stem}.json")), json)?;
        debug!("saved debug frame {}", image_path.display());
        Ok(())
    }
}

fn draw_rect_outline(image: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    let width = image.width() as i32;
    let height = image.height() as i32;
    let mut plot = |x: i32, y: i32| {
        if x >= 0 && y >= 0 && x < width && y < height {
            image.put_pixel(x as u32, y as u32, color);
        }
    };
    for offset in 0..OUTLINE_THICKNESS {
        for x in rect.left()..rect.right() {
            plot(x, rect.top() + offset);
            plot(x, rect.bottom() - 1 - offset);
        }
        for y in rect.top()..rect.bottom() {
            plot(rect.left() + offset, y);
            plot(rect.right() - 1 - offset, y);
        }
    }
}

fn draw_label(image: &mut RgbaImage, origin: Point, text: &str, color: Rgba<u8>) {
    let width = image.width() as i32;
    let height = image.height() as i32;
    let mut pen_x = origin.x();
    for ch in text.chars() {
        let glyph = BASIC_LEGACY
            .get(ch as usize)
            .unwrap_or(&BASIC_LEGACY[b'?' as usize]);
        for (row_index, row) in glyph.iter().enumerate() {
            for bit in 0..GLYPH_SIZE {
                if row & (1 << bit) == 0 {
                    continue;
                }
                for dy in 0..GLYPH_SCALE {
                    for dx in 0..GLYPH_SCALE {
                        let x = pen_x + bit * GLYPH_SCALE + dx;
                        let y = origin.y() + row_index as i32 * GLYPH_SCALE + dy;
                        if x >= 0 && y >= 0 && x < width && y < height {
                            image.put_pixel(x as u32, y as u32, color);
                        }
                    }
                }
            }
        }
        pen_x += GLYPH_SIZE * GLYPH_SCALE;
    }
}
