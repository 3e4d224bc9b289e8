//! Retained in-memory SVG document implementing [`Surface`].

use std::collections::BTreeMap;
use std::fmt::Write as _;

use unicode_width::UnicodeWidthStr;

use arbor_protocol::{BBox, PathData, Point, PrimitiveId, Segment, Surface, Transform};

/// Fixed-advance text metrics, so layout is identical on every host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub font_size: f64,
    pub char_width_factor: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            char_width_factor: 0.6,
        }
    }
}

impl TextMetrics {
    /// Wide (CJK) characters take two cells.
    pub fn width(&self, text: &str) -> f64 {
        UnicodeWidthStr::width(text) as f64 * self.font_size * self.char_width_factor
    }

    fn ascent(&self) -> f64 {
        self.font_size * 0.8
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Text(String),
    Path(PathData),
    Circle { r: f64 },
}

#[derive(Debug, Clone, PartialEq)]
struct Element {
    shape: Shape,
    x: f64,
    y: f64,
    classes: Vec<String>,
    transform: Transform,
    fill: Option<String>,
    stroke: Option<String>,
    data: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default)]
pub struct SvgSurface {
    elements: BTreeMap<PrimitiveId, Element>,
    next_id: u64,
    width: f64,
    height: f64,
    canvas_classes: Vec<String>,
    metrics: TextMetrics,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: PrimitiveId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn has_class(&self, id: PrimitiveId, class: &str) -> bool {
        self.elements.get(&id).is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    /// Primitives carrying `class`, in drawing order.
    pub fn with_class(&self, class: &str) -> Vec<PrimitiveId> {
        self.elements
            .iter()
            .filter(|(_, e)| e.classes.iter().any(|c| c == class))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn text_content(&self, id: PrimitiveId) -> Option<&str> {
        match &self.elements.get(&id)?.shape {
            Shape::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn path_data(&self, id: PrimitiveId) -> Option<&PathData> {
        match &self.elements.get(&id)?.shape {
            Shape::Path(data) => Some(data),
            _ => None,
        }
    }

    pub fn transform_of(&self, id: PrimitiveId) -> Option<Transform> {
        self.elements.get(&id).map(|e| e.transform)
    }

    pub fn fill_of(&self, id: PrimitiveId) -> Option<&str> {
        self.elements.get(&id)?.fill.as_deref()
    }

    pub fn stroke_of(&self, id: PrimitiveId) -> Option<&str> {
        self.elements.get(&id)?.stroke.as_deref()
    }

    pub fn data_of(&self, id: PrimitiveId, key: &str) -> Option<&str> {
        let element = self.elements.get(&id)?;
        element.data.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn insert(&mut self, shape: Shape, x: f64, y: f64) -> PrimitiveId {
        self.next_id += 1;
        let id = PrimitiveId(self.next_id);
        self.elements.insert(
            id,
            Element {
                shape,
                x,
                y,
                classes: Vec::new(),
                transform: Transform::Identity,
                fill: None,
                stroke: None,
                data: Vec::new(),
            },
        );
        id
    }

    /// Serialise the document.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}""#,
            self.width, self.height
        );
        if !self.canvas_classes.is_empty() {
            let _ = write!(out, r#" class="{}""#, escape_xml(&self.canvas_classes.join(" ")));
        }
        out.push('>');

        for (id, element) in &self.elements {
            out.push('\n');
            let common = self.common_attributes(*id, element);
            match &element.shape {
                Shape::Text(text) => {
                    let _ = write!(
                        out,
                        r#"<text x="{}" y="{}"{}>{}</text>"#,
                        element.x,
                        element.y,
                        common,
                        escape_xml(text)
                    );
                }
                Shape::Path(data) => {
                    let _ = write!(out, r#"<path d="{}"{}/>"#, data, common);
                }
                Shape::Circle { r } => {
                    let _ = write!(out, r#"<circle cx="{}" cy="{}" r="{}"{}/>"#, element.x, element.y, r, common);
                }
            }
        }
        out.push_str("\n</svg>\n");
        out
    }

    /// `id="p<n>"` carries the primitive handle back to the host.
    fn common_attributes(&self, id: PrimitiveId, element: &Element) -> String {
        let mut attrs = String::new();
        let _ = write!(attrs, r#" id="p{}""#, id.0);
        for (key, value) in &element.data {
            let _ = write!(attrs, r#" data-{}="{}""#, key, escape_xml(value));
        }
        if !element.classes.is_empty() {
            let _ = write!(attrs, r#" class="{}""#, escape_xml(&element.classes.join(" ")));
        }
        let mut style = Vec::new();
        if let Some(fill) = &element.fill {
            style.push(format!("fill:{}", fill));
        }
        if let Some(stroke) = &element.stroke {
            style.push(format!("stroke:{}", stroke));
        }
        if !style.is_empty() {
            let _ = write!(attrs, r#" style="{}""#, escape_xml(&style.join(";")));
        }
        match element.transform {
            Transform::Identity => {}
            Transform::Translate(dx, dy) => {
                let _ = write!(attrs, r#" transform="translate({},{})""#, dx, dy);
            }
            Transform::Rotate(degrees) => {
                let bounds = self.bbox(id);
                let cy = bounds.y + bounds.height / 2.0;
                let _ = write!(attrs, r#" transform="rotate({} {} {})""#, degrees, bounds.center_x(), cy);
            }
        }
        attrs
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Running min/max over the points a path visits.
#[derive(Debug, Clone, Copy)]
struct Extent {
    min: Point,
    max: Point,
}

impl Extent {
    fn at(p: Point) -> Self {
        Self { min: p, max: p }
    }

    fn include(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }
}

/// Parameters in (0, 1) where one axis of a cubic has a turning point.
fn cubic_turning_points(p0: f64, p1: f64, p2: f64, p3: f64) -> Vec<f64> {
    // Derivative as a quadratic a t^2 + b t + c
    let a = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
    let b = 2.0 * (p0 - 2.0 * p1 + p2);
    let c = p1 - p0;

    let mut roots = Vec::with_capacity(2);
    if a.abs() < 1e-12 {
        if b.abs() > 1e-12 {
            roots.push(-c / b);
        }
    } else {
        let discriminant = b * b - 4.0 * a * c;
        if discriminant >= 0.0 {
            let sqrt = discriminant.sqrt();
            roots.push((-b + sqrt) / (2.0 * a));
            roots.push((-b - sqrt) / (2.0 * a));
        }
    }
    roots.retain(|t| *t > 0.0 && *t < 1.0);
    roots
}

fn cubic_at(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let w0 = mt * mt * mt;
    let w1 = 3.0 * mt * mt * t;
    let w2 = 3.0 * mt * t * t;
    let w3 = t * t * t;
    Point::new(
        w0 * p0.x + w1 * p1.x + w2 * p2.x + w3 * p3.x,
        w0 * p0.y + w1 * p1.y + w2 * p2.y + w3 * p3.y,
    )
}

fn visit(extent: &mut Option<Extent>, p: Point) {
    *extent = Some(match *extent {
        Some(mut e) => {
            e.include(p);
            e
        }
        None => Extent::at(p),
    });
}

/// Tight bounds of a path: endpoints plus the turning points of every cubic.
pub fn path_bounds(data: &PathData) -> BBox {
    let mut pen = Point::default();
    let mut start = Point::default();
    let mut extent: Option<Extent> = None;

    for segment in &data.segments {
        let (c1, c2, end) = match *segment {
            Segment::MoveTo(p) => {
                pen = p;
                start = p;
                visit(&mut extent, p);
                continue;
            }
            Segment::LineTo(p) => {
                pen = p;
                visit(&mut extent, p);
                continue;
            }
            Segment::Close => {
                pen = start;
                continue;
            }
            Segment::CubicTo(c1, c2, end) => (c1, c2, end),
            Segment::RelCubicTo(c1, c2, end) => (
                Point::new(pen.x + c1.x, pen.y + c1.y),
                Point::new(pen.x + c2.x, pen.y + c2.y),
                Point::new(pen.x + end.x, pen.y + end.y),
            ),
        };

        visit(&mut extent, pen);
        visit(&mut extent, end);
        let mut turning = cubic_turning_points(pen.x, c1.x, c2.x, end.x);
        turning.extend(cubic_turning_points(pen.y, c1.y, c2.y, end.y));
        for t in turning {
            visit(&mut extent, cubic_at(pen, c1, c2, end, t));
        }
        pen = end;
    }

    extent
        .map(|e| BBox { x: e.min.x, y: e.min.y, width: e.max.x - e.min.x, height: e.max.y - e.min.y })
        .unwrap_or_default()
}

impl Surface for SvgSurface {
    /// Handles restart from one, so identical renders serialise identically.
    fn clear(&mut self) {
        self.elements.clear();
        self.canvas_classes.clear();
        self.next_id = 0;
    }

    fn text(&mut self, x: f64, y: f64, content: &str) -> PrimitiveId {
        self.insert(Shape::Text(content.to_string()), x, y)
    }

    fn path(&mut self, data: &PathData) -> PrimitiveId {
        self.insert(Shape::Path(data.clone()), 0.0, 0.0)
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64) -> PrimitiveId {
        self.insert(Shape::Circle { r }, cx, cy)
    }

    fn duplicate(&mut self, id: PrimitiveId) -> PrimitiveId {
        let copy = self.elements.get(&id).cloned();
        self.next_id += 1;
        let new_id = PrimitiveId(self.next_id);
        if let Some(element) = copy {
            self.elements.insert(new_id, element);
        }
        new_id
    }

    fn remove(&mut self, id: PrimitiveId) {
        self.elements.remove(&id);
    }

    fn set_path(&mut self, id: PrimitiveId, data: &PathData) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.shape = Shape::Path(data.clone());
        }
    }

    fn set_x(&mut self, id: PrimitiveId, x: f64) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.x = x;
        }
    }

    fn set_transform(&mut self, id: PrimitiveId, transform: Transform) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.transform = transform;
        }
    }

    /// Untransformed bounds, like the DOM's `getBBox`.
    fn bbox(&self, id: PrimitiveId) -> BBox {
        let Some(element) = self.elements.get(&id) else {
            return BBox::default();
        };
        match &element.shape {
            Shape::Text(text) => BBox {
                x: element.x,
                y: element.y - self.metrics.ascent(),
                width: self.metrics.width(text),
                height: self.metrics.font_size,
            },
            Shape::Path(data) => path_bounds(data),
            Shape::Circle { r } => BBox {
                x: element.x - r,
                y: element.y - r,
                width: 2.0 * r,
                height: 2.0 * r,
            },
        }
    }

    fn add_class(&mut self, id: PrimitiveId, class: &str) {
        if let Some(element) = self.elements.get_mut(&id) {
            if !element.classes.iter().any(|c| c == class) {
                element.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, id: PrimitiveId, class: &str) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.classes.retain(|c| c != class);
        }
    }

    fn set_fill(&mut self, id: PrimitiveId, colour: &str) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.fill = Some(colour.to_string());
        }
    }

    fn set_stroke(&mut self, id: PrimitiveId, colour: &str) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.stroke = Some(colour.to_string());
        }
    }

    fn set_data(&mut self, id: PrimitiveId, key: &str, value: &str) {
        if let Some(element) = self.elements.get_mut(&id) {
            match element.data.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1 = value.to_string(),
                None => element.data.push((key.to_string(), value.to_string())),
            }
        }
    }

    fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn add_canvas_class(&mut self, class: &str) {
        if !self.canvas_classes.iter().any(|c| c == class) {
            self.canvas_classes.push(class.to_string());
        }
    }
}
