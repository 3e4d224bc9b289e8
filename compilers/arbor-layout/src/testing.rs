use std::collections::BTreeMap;

use arbor_protocol::{BBox, PathData, Point, PrimitiveId, Segment, Surface, Transform};

pub const CHAR_WIDTH: f64 = 8.0;
const ASCENT: f64 = 12.0;
const LINE_HEIGHT: f64 = 16.0;

#[derive(Debug, Clone)]
pub enum Shape {
    Text(String),
    Path(PathData),
    Circle(f64),
}

#[derive(Debug, Clone)]
pub struct Primitive {
    pub shape: Shape,
    pub x: f64,
    pub y: f64,
    pub classes: Vec<String>,
    pub transform: Option<Transform>,
}

/// Minimal in-memory surface with fixed-width glyphs.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub primitives: BTreeMap<PrimitiveId, Primitive>,
    next: u64,
}

impl RecordingSurface {
    fn push(&mut self, shape: Shape, x: f64, y: f64) -> PrimitiveId {
        self.next += 1;
        let id = PrimitiveId(self.next);
        self.primitives.insert(id, Primitive { shape, x, y, classes: Vec::new(), transform: None });
        id
    }

    pub fn position(&self, id: PrimitiveId) -> (f64, f64) {
        self.primitives.get(&id).map(|p| (p.x, p.y)).unwrap_or_default()
    }

    pub fn classes(&self, id: PrimitiveId) -> Vec<String> {
        self.primitives.get(&id).map(|p| p.classes.clone()).unwrap_or_default()
    }

    pub fn text_of(&self, id: PrimitiveId) -> Option<String> {
        match &self.primitives.get(&id)?.shape {
            Shape::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    pub fn transform(&self, id: PrimitiveId) -> Option<Transform> {
        self.primitives.get(&id)?.transform
    }
}

fn hull(data: &PathData) -> BBox {
    let mut pen = Point::default();
    let mut points = Vec::new();
    for segment in &data.segments {
        match *segment {
            Segment::MoveTo(p) | Segment::LineTo(p) => {
                pen = p;
                points.push(p);
            }
            Segment::CubicTo(a, b, c) => {
                points.extend([a, b, c]);
                pen = c;
            }
            Segment::RelCubicTo(a, b, c) => {
                let origin = pen;
                for p in [a, b, c] {
                    points.push(Point::new(origin.x + p.x, origin.y + p.y));
                }
                pen = Point::new(origin.x + c.x, origin.y + c.y);
            }
            Segment::Close => {}
        }
    }
    let (min_x, max_x) = points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
    let (min_y, max_y) = points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    if points.is_empty() {
        return BBox::default();
    }
    BBox { x: min_x, y: min_y, width: max_x - min_x, height: max_y - min_y }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.primitives.clear();
    }

    fn text(&mut self, x: f64, y: f64, content: &str) -> PrimitiveId {
        self.push(Shape::Text(content.to_string()), x, y)
    }

    fn path(&mut self, data: &PathData) -> PrimitiveId {
        self.push(Shape::Path(data.clone()), 0.0, 0.0)
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64) -> PrimitiveId {
        self.push(Shape::Circle(r), cx, cy)
    }

    fn duplicate(&mut self, id: PrimitiveId) -> PrimitiveId {
        let Some(original) = self.primitives.get(&id).cloned() else {
            return self.push(Shape::Text(String::new()), 0.0, 0.0);
        };
        let copy = self.push(original.shape.clone(), original.x, original.y);
        if let Some(p) = self.primitives.get_mut(&copy) {
            p.classes = original.classes;
        }
        copy
    }

    fn remove(&mut self, id: PrimitiveId) {
        self.primitives.remove(&id);
    }

    fn set_path(&mut self, id: PrimitiveId, data: &PathData) {
        if let Some(p) = self.primitives.get_mut(&id) {
            p.shape = Shape::Path(data.clone());
        }
    }

    fn set_x(&mut self, id: PrimitiveId, x: f64) {
        if let Some(p) = self.primitives.get_mut(&id) {
            p.x = x;
        }
    }

    fn set_transform(&mut self, id: PrimitiveId, transform: Transform) {
        if let Some(p) = self.primitives.get_mut(&id) {
            p.transform = Some(transform);
        }
    }

    fn bbox(&self, id: PrimitiveId) -> BBox {
        let Some(p) = self.primitives.get(&id) else {
            return BBox::default();
        };
        match &p.shape {
            Shape::Text(text) => BBox {
                x: p.x,
                y: p.y - ASCENT,
                width: text.chars().count() as f64 * CHAR_WIDTH,
                height: LINE_HEIGHT,
            },
            Shape::Path(data) => hull(data),
            Shape::Circle(r) => BBox { x: p.x - r, y: p.y - r, width: 2.0 * r, height: 2.0 * r },
        }
    }

    fn add_class(&mut self, id: PrimitiveId, class: &str) {
        if let Some(p) = self.primitives.get_mut(&id) {
            if !p.classes.iter().any(|c| c == class) {
                p.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, id: PrimitiveId, class: &str) {
        if let Some(p) = self.primitives.get_mut(&id) {
            p.classes.retain(|c| c != class);
        }
    }

    fn set_fill(&mut self, _id: PrimitiveId, _colour: &str) {}

    fn set_stroke(&mut self, _id: PrimitiveId, _colour: &str) {}

    fn set_canvas_size(&mut self, _width: f64, _height: f64) {}

    fn set_data(&mut self, _id: PrimitiveId, _key: &str, _value: &str) {}

    fn add_canvas_class(&mut self, _class: &str) {}
}
