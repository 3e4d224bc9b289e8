use tracing::trace;

use arbor_protocol::{Head, PathData, Point, PrimitiveId, Surface, TokenId, Transform};
use arbor_scene::components::{ARC, ARROWHEAD, DEPREL};
use arbor_scene::SceneWorld;

use crate::metrics::max_extent;
use crate::{
    LayoutConfig, ARROWHEAD_SIZE, ENHANCED_OFFSET_Y, FONT_HEIGHT, GAP_X, ROOT_LABEL_OFFSET_X, ROOT_LABEL_Y,
};

/// Lift of a primary relation label above its arc.
const LABEL_LIFT: f64 = 5.0;
/// Drop of a secondary relation label below its arc.
const ENHANCED_LABEL_DROP: f64 = 10.0;

/// One drawn edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub dependent: TokenId,
    pub governor: Head,
    pub path: PathData,
    pub enhanced: bool,
}

/// Cubic from `(x_start, y_start)` to `(x_end, y_end)` with both control points at `y_apex`.
pub fn arc_path(x_start: f64, x_end: f64, y_start: f64, y_end: f64, y_apex: f64) -> PathData {
    PathData::new()
        .move_to(x_start, y_start)
        .cubic_to(Point::new(x_start, y_apex), Point::new(x_end, y_apex), Point::new(x_end, y_end))
}

/// Straight segment from the token up to the top of the canvas.
pub fn root_path(x: f64, y: f64) -> PathData {
    PathData::new().move_to(x, y).line_to(x, 0.0)
}

/// Two-lobe arrowhead whose tip is at `(x, y)`, pointing down onto the label.
pub fn arrowhead_path(x: f64, y: f64) -> PathData {
    let half = ARROWHEAD_SIZE / 2.0;
    PathData::new()
        .move_to(x, y)
        .rel_cubic_to(
            Point::new(0.0, 0.0),
            Point::new(-half, -ARROWHEAD_SIZE * 1.5),
            Point::new(-half, -ARROWHEAD_SIZE * 1.5),
        )
        .rel_cubic_to(Point::new(half, half), Point::new(half, half), Point::new(ARROWHEAD_SIZE, 0.0))
        .close()
}

pub fn apex_y(start_y: f64, level: u32, arc_height: f64) -> f64 {
    start_y - f64::from(level) * arc_height
}

/// Governor end of an arc, nudged towards the dependent so arcs meeting there stay apart.
pub fn governor_anchor_x(governor_center: f64, dependent_position: usize, governor_position: usize) -> f64 {
    if dependent_position > governor_position {
        governor_center + GAP_X / 2.0
    } else {
        governor_center - GAP_X / 2.0
    }
}

/// Label keys of a secondary edge towards `governor`.
pub fn enhanced_keys(governor: &TokenId) -> [String; 3] {
    [
        format!("E:{}.{}", governor, ARC),
        format!("E:{}.{}", governor, ARROWHEAD),
        format!("E:{}.{}", governor, DEPREL),
    ]
}

fn centred_text<S: Surface>(surface: &mut S, x: f64, y: f64, content: &str, class: &str) -> PrimitiveId {
    let id = surface.text(x, y, content);
    surface.add_class(id, class);
    let width = surface.bbox(id).width;
    surface.set_x(id, x - width / 2.0);
    id
}

/// Draw the primary edge of every placed token. Unassigned governors draw nothing.
pub fn draw_relations<S: Surface>(surface: &mut S, scene: &mut SceneWorld, config: &LayoutConfig) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(scene.len());

    for position in 0..scene.len() {
        let (Some(token), Some(column), Some(level)) =
            (scene.token(position), scene.column(position), scene.level(position))
        else {
            continue;
        };

        let upper = column.start_y - FONT_HEIGHT;
        let path = match token.head {
            Head::Unassigned => {
                trace!(id = %token.id, "no governor, no arc");
                continue;
            }
            Head::Root => root_path(column.center_x, upper),
            Head::Token(governor) => {
                let Some(governor_position) = scene.position_of(&governor) else {
                    trace!(id = %token.id, %governor, "governor not rendered, no arc");
                    continue;
                };
                let Some(governor_column) = scene.column(governor_position) else { continue };
                let x_end = governor_anchor_x(governor_column.center_x, position, governor_position);
                let apex = apex_y(column.start_y, level, config.arc_height);
                arc_path(column.center_x, x_end, upper, upper, apex)
            }
        };

        let arc = surface.path(&path);
        surface.add_class(arc, "curve");
        let arrowhead = surface.path(&arrowhead_path(column.center_x, upper));
        surface.add_class(arrowhead, "arrowhead");

        let bounds = surface.bbox(arc);
        let (label_x, label_y) = match token.head {
            Head::Root => (bounds.center_x() + ROOT_LABEL_OFFSET_X, ROOT_LABEL_Y),
            _ => (bounds.center_x(), bounds.y - LABEL_LIFT),
        };
        let label = centred_text(surface, label_x, label_y, &token.deprel, DEPREL);

        scene.insert_label(position, DEPREL, label);
        scene.insert_label(position, ARROWHEAD, arrowhead);
        scene.insert_label(position, ARC, arc);
        edges.push(Edge { dependent: token.id, governor: token.head, path, enhanced: false });
    }

    edges
}

/// Draw secondary edges below everything rendered so far.
///
/// Must run after [`draw_relations`]. A secondary edge that repeats the
/// primary governor, or points at the root, is not drawn.
pub fn draw_enhanced_relations<S: Surface>(
    surface: &mut S,
    scene: &mut SceneWorld,
    config: &LayoutConfig,
) -> Vec<Edge> {
    let watermark = max_extent(surface, scene);
    let lower = watermark + ENHANCED_OFFSET_Y;
    let apex = lower + config.arc_height;
    let mut edges = Vec::new();

    for position in 0..scene.len() {
        let (Some(token), Some(column)) = (scene.token(position), scene.column(position)) else {
            continue;
        };

        for (governor, relation) in &token.deps {
            if *governor == token.head {
                continue;
            }
            let Some(governor_id) = governor.token() else { continue };
            let Some(governor_position) = scene.position_of(&governor_id) else {
                trace!(id = %token.id, governor = %governor_id, "secondary governor not rendered");
                continue;
            };
            let Some(governor_column) = scene.column(governor_position) else { continue };

            let x_end = governor_anchor_x(governor_column.center_x, position, governor_position);
            let path = arc_path(column.center_x, x_end, lower, lower, apex);

            let arc = surface.path(&path);
            surface.add_class(arc, "curveenhanced");
            let arrowhead = surface.path(&arrowhead_path(column.center_x, lower));
            surface.add_class(arrowhead, "arrowheadenhanced");
            surface.set_transform(arrowhead, Transform::Rotate(180.0));

            let bounds = surface.bbox(arc);
            let text = format!("E:{}", relation);
            let label = centred_text(surface, bounds.center_x(), bounds.y2() + ENHANCED_LABEL_DROP, &text, "DEPRELenhanced");

            let [arc_key, arrowhead_key, deprel_key] = enhanced_keys(&governor_id);
            scene.insert_label(position, deprel_key, label);
            scene.insert_label(position, arrowhead_key, arrowhead);
            scene.insert_label(position, arc_key, arc);
            edges.push(Edge { dependent: token.id, governor: *governor, path, enhanced: true });
        }
    }

    edges
}
