use core::fmt;
use core::time::Duration;

use alloc::vec::Vec;

use crate::ids::PrimitiveId;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box as reported by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub fn x2(&self) -> f64 {
        self.x + self.width
    }

    pub fn y2(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
    /// Cubic with every point relative to the current pen position.
    RelCubicTo(Point, Point, Point),
    Close,
}

/// Vector path handed to the surface; `Display` yields SVG path data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathData {
    pub segments: Vec<Segment>,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, x: f64, y: f64) -> Self {
        self.segments.push(Segment::MoveTo(Point::new(x, y)));
        self
    }

    pub fn line_to(mut self, x: f64, y: f64) -> Self {
        self.segments.push(Segment::LineTo(Point::new(x, y)));
        self
    }

    pub fn cubic_to(mut self, c1: Point, c2: Point, end: Point) -> Self {
        self.segments.push(Segment::CubicTo(c1, c2, end));
        self
    }

    pub fn rel_cubic_to(mut self, c1: Point, c2: Point, end: Point) -> Self {
        self.segments.push(Segment::RelCubicTo(c1, c2, end));
        self
    }

    pub fn close(mut self) -> Self {
        self.segments.push(Segment::Close);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn has_curves(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::CubicTo(..) | Segment::RelCubicTo(..)))
    }
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match segment {
                Segment::MoveTo(p) => write!(f, "M{},{}", p.x, p.y)?,
                Segment::LineTo(p) => write!(f, "L{},{}", p.x, p.y)?,
                Segment::CubicTo(a, b, c) => {
                    write!(f, "C{},{} {},{} {},{}", a.x, a.y, b.x, b.y, c.x, c.y)?
                }
                Segment::RelCubicTo(a, b, c) => {
                    write!(f, "c{},{} {},{} {},{}", a.x, a.y, b.x, b.y, c.x, c.y)?
                }
                Segment::Close => f.write_str("z")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Identity,
    Translate(f64, f64),
    /// Degrees, around the primitive's own centre.
    Rotate(f64),
}

/// Vector drawing surface injected into the renderer.
///
/// Pointer input is not delivered through this trait: hosts forward gestures to the view.
pub trait Surface {
    /// Drop every primitive.
    fn clear(&mut self);

    fn text(&mut self, x: f64, y: f64, content: &str) -> PrimitiveId;
    fn path(&mut self, data: &PathData) -> PrimitiveId;
    fn circle(&mut self, cx: f64, cy: f64, r: f64) -> PrimitiveId;
    /// Copy a primitive (content, position and classes) into a new, independent one.
    fn duplicate(&mut self, id: PrimitiveId) -> PrimitiveId;
    fn remove(&mut self, id: PrimitiveId);

    fn set_path(&mut self, id: PrimitiveId, data: &PathData);
    fn set_x(&mut self, id: PrimitiveId, x: f64);
    /// Replace the primitive's transform (not cumulative).
    fn set_transform(&mut self, id: PrimitiveId, transform: Transform);

    fn bbox(&self, id: PrimitiveId) -> BBox;

    fn add_class(&mut self, id: PrimitiveId, class: &str);
    fn remove_class(&mut self, id: PrimitiveId, class: &str);
    fn set_fill(&mut self, id: PrimitiveId, colour: &str);
    fn set_stroke(&mut self, id: PrimitiveId, colour: &str);

    /// Attach host-visible metadata to a primitive (`data-*` attributes in SVG).
    fn set_data(&mut self, id: PrimitiveId, key: &str, value: &str);

    fn set_canvas_size(&mut self, width: f64, height: f64);
    fn add_canvas_class(&mut self, class: &str);

    /// Animate the primitive back to its untransformed position, then remove it.
    /// Surfaces without animation support remove it immediately.
    fn spring_back(&mut self, id: PrimitiveId, _duration: Duration) {
        self.remove(id);
    }
}
