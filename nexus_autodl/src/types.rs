use {
    serde::{Deserialize, Serialize},
    std::{
        cmp::{max, min},
        ops::{Add, Sub},
    },
};

/// A point in pixels, either frame-local or global depending on context.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, PartialOrd, Ord,
)]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    x: i32,
    y: i32,
}

impl Size {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    top_left: Point,
    size: Size,
}

impl Rect {
    pub const fn from_xywh(x: i32, y: i32, w: i32, h: i32) -> Rect {
        Self::from_pos_size(Point::new(x, y), Size::new(w, h))
    }

    pub const fn from_pos_size(top_left: Point, size: Size) -> Self {
        Self { top_left, size }
    }

    /// Smallest rect containing both corner points (inclusive).
    pub fn from_corners(a: Point, b: Point) -> Self {
        let top_left = Point::new(min(a.x, b.x), min(a.y, b.y));
        let bottom_right = Point::new(max(a.x, b.x), max(a.y, b.y));
        Self {
            top_left,
            size: Size::new(
                bottom_right.x - top_left.x + 1,
                bottom_right.y - top_left.y + 1,
            ),
        }
    }

    #[must_use]
    pub fn translate(&self, delta: Point) -> Self {
        Self {
            top_left: self.top_left + delta,
            size: self.size,
        }
    }

    pub fn top_left(&self) -> Point {
        self.top_left
    }

    /// Not inclusive.
    pub fn bottom_right(&self) -> Point {
        Point {
            x: self.top_left.x + self.size.x,
            y: self.top_left.y + self.size.y,
        }
    }

    pub fn left(&self) -> i32 {
        self.top_left.x
    }

    pub fn right(&self) -> i32 {
        self.top_left.x + self.size.x
    }

    pub fn top(&self) -> i32 {
        self.top_left.y
    }

    pub fn bottom(&self) -> i32 {
        self.top_left.y + self.size.y
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn size_x(&self) -> i32 {
        self.size.x
    }

    pub fn size_y(&self) -> i32 {
        self.size.y
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.top_left.x + self.size.x / 2,
            y: self.top_left.y + self.size.y / 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size.x <= 0 || self.size.y <= 0
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            return 0;
        }
        self.size.x as i64 * self.size.y as i64
    }

    pub fn contains(&self, pos: Point) -> bool {
        let br = self.bottom_right();
        self.top_left.x <= pos.x && pos.x < br.x && self.top_left.y <= pos.y && pos.y < br.y
    }

    pub fn intersect(&self, other: Self) -> Self {
        let top_left = Point {
            x: max(self.top_left.x, other.top_left.x),
            y: max(self.top_left.y, other.top_left.y),
        };
        let br1 = self.bottom_right();
        let br2 = other.bottom_right();
        let bottom_right = Point {
            x: min(br1.x, br2.x),
            y: min(br1.y, br2.y),
        };
        let size = Size {
            x: bottom_right.x - top_left.x,
            y: bottom_right.y - top_left.y,
        };
        if size.x < 0 || size.y < 0 {
            return Rect::default();
        }
        Self { top_left, size }
    }

    /// Intersection over union, in [0, 1]. Zero when either rect is empty.
    pub fn iou(&self, other: Self) -> f32 {
        let intersection = self.intersect(other).area();
        let union = self.area() + other.area() - intersection;
        if union <= 0 {
            return 0.0;
        }
        intersection as f32 / union as f32
    }

    /// Clamps this rect to the area of `bounds`.
    #[must_use]
    pub fn clamp_to(&self, bounds: Self) -> Self {
        self.intersect(bounds)
    }
}

#[test]
fn from_corners_is_inclusive() {
    let rect = Rect::from_corners(Point::new(10, 20), Point::new(12, 21));
    assert_eq!(rect, Rect::from_xywh(10, 20, 3, 2));
    assert_eq!(
        Rect::from_corners(Point::new(12, 21), Point::new(10, 20)),
        rect
    );
}

#[test]
fn contains_excludes_bottom_right() {
    let rect = Rect::from_xywh(10, 10, 5, 5);
    assert!(rect.contains(Point::new(10, 10)));
    assert!(rect.contains(Point::new(14, 14)));
    assert!(!rect.contains(Point::new(15, 10)));
    assert!(!rect.contains(Point::new(10, 15)));
}

#[test]
fn disjoint_rects_have_zero_iou() {
    let a = Rect::from_xywh(0, 0, 10, 10);
    let b = Rect::from_xywh(20, 20, 10, 10);
    assert_eq!(a.iou(b), 0.0);
    assert!(a.intersect(b).is_empty());
}

#[test]
fn identical_rects_have_full_iou() {
    let a = Rect::from_xywh(5, 5, 40, 30);
    assert_eq!(a.iou(a), 1.0);
}

#[test]
fn partial_overlap_iou() {
    let a = Rect::from_xywh(0, 0, 10, 10);
    let b = Rect::from_xywh(5, 0, 10, 10);
    assert!((a.iou(b) - 1.0 / 3.0).abs() < 1e-6);
}

#[test]
fn clamp_to_limits_bounds() {
    let bounds = Rect::from_xywh(0, 0, 100, 100);
    let rect = Rect::from_xywh(90, -5, 30, 20);
    assert_eq!(rect.clamp_to(bounds), Rect::from_xywh(90, 0, 10, 15));
}
