use tracing::trace;

use arbor_protocol::{ColumnSnapshot, Feature, PinnedColumn, Surface, Token, TokenId, Tree};
use arbor_scene::components::{Column, Labels};
use arbor_scene::SceneWorld;

use crate::{LayoutConfig, CANVAS_MARGIN, FALLBACK_HEIGHT, MIN_LEVELS, START_TEXT_Y};

/// Size the host canvas should take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    pub width: f64,
    pub height: f64,
}

/// Baseline of the token row, leaving room above it for the tallest arc.
pub fn baseline_y(levels: &[u32], config: &LayoutConfig) -> f64 {
    let tallest = levels.iter().copied().max().unwrap_or(0).max(MIN_LEVELS);
    START_TEXT_Y + f64::from(tallest) * config.arc_height
}

/// Draw the stacked labels of one token and centre them in its column.
pub fn stack_labels<S: Surface>(
    surface: &mut S,
    token: &Token,
    features: &[Feature],
    start_x: f64,
    start_y: f64,
    config: &LayoutConfig,
) -> (Column, Labels) {
    let mut labels = Labels::default();
    let mut running_y = start_y;
    let mut widest: f64 = 0.0;

    for feature in features {
        let text = token.feature_label(feature);
        let id = surface.text(start_x, running_y, &text);
        surface.add_class(id, feature.class());
        widest = widest.max(surface.bbox(id).width);

        // An absent FEATS/MISC entry keeps its slot empty without taking room
        if !(feature.is_nested() && text.is_empty()) {
            running_y += config.features_vertical_spacing;
        }
        labels.primitives.insert(feature.to_string(), id);
    }

    let width = widest + config.token_spacing;
    let center_x = start_x + width / 2.0;
    for id in labels.primitives.values() {
        let label_width = surface.bbox(*id).width;
        surface.set_x(*id, center_x - label_width / 2.0);
    }

    let column = Column { position: 0, start_x, start_y, width, center_x };
    (column, labels)
}

/// Lay out every token of `order` left to right and spawn it into the scene.
///
/// Tokens with a pinned x keep it, shifted so the first pinned token in
/// render order starts at 0. The running offset advances past every column
/// either way.
#[allow(clippy::too_many_arguments)]
pub fn place_tokens<S: Surface>(
    surface: &mut S,
    scene: &mut SceneWorld,
    tree: &Tree,
    order: &[TokenId],
    levels: &[u32],
    features: &[Feature],
    pins: Option<&ColumnSnapshot>,
    config: &LayoutConfig,
) {
    let start_y = baseline_y(levels, config);
    let pin_origin = pins.and_then(|p| order.iter().find_map(|id| p.pinned_x(id)));
    let mut running_x = 0.0;

    for (position, id) in order.iter().enumerate() {
        let Some(token) = tree.get(id) else {
            trace!(%id, "token missing from tree, not placed");
            continue;
        };

        let pinned = pins.and_then(|p| p.pinned_x(id));
        let start_x = match (pinned, pin_origin) {
            (Some(x), Some(origin)) => x - origin,
            _ => running_x,
        };

        let (column, labels) = stack_labels(surface, token, features, start_x, start_y, config);
        running_x += column.width;

        let level = levels.get(position).copied().unwrap_or(0);
        scene.spawn_token(token.clone(), column, level, labels);
    }
}

/// Lowest edge of everything drawn so far, or 0 on an empty scene.
pub fn max_extent<S: Surface>(surface: &S, scene: &SceneWorld) -> f64 {
    scene
        .all_primitives()
        .into_iter()
        .map(|id| surface.bbox(id).y2())
        .fold(0.0, f64::max)
}

pub fn canvas_bounds<S: Surface>(surface: &S, scene: &SceneWorld) -> CanvasBounds {
    let content_width = (0..scene.len())
        .filter_map(|position| scene.column(position))
        .map(|c| c.start_x + c.width)
        .fold(0.0, f64::max);
    let extent = max_extent(surface, scene);

    CanvasBounds {
        width: content_width + CANVAS_MARGIN,
        height: if extent > 0.0 { extent } else { FALLBACK_HEIGHT },
    }
}

/// Columns of the current scene, ready to pin on the next pass.
pub fn column_snapshot(scene: &SceneWorld) -> ColumnSnapshot {
    let columns = (0..scene.len())
        .filter_map(|position| {
            let column = scene.column(position)?;
            let token = scene.token(position)?;
            Some(PinnedColumn { id: token.id, x: column.start_x, width: column.width })
        })
        .collect();
    ColumnSnapshot::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSurface, CHAR_WIDTH};
    use arbor_protocol::Head;

    fn sample_tree() -> Tree {
        Tree::from_tokens([
            Token::new(TokenId::Word(1), "the").with_head(TokenId::Word(2), "det"),
            Token::new(TokenId::Word(2), "dog").with_head(Head::Root, "root"),
            Token::new(TokenId::Word(3), "barked").with_head(TokenId::Word(2), "acl"),
        ])
    }

    fn order() -> Vec<TokenId> {
        vec![TokenId::Word(1), TokenId::Word(2), TokenId::Word(3)]
    }

    #[test]
    fn test_baseline_floor() {
        let config = LayoutConfig::default();
        assert_eq!(baseline_y(&[], &config), 130.0);
        assert_eq!(baseline_y(&[0, 1, 1], &config), 130.0);
        assert_eq!(baseline_y(&[0, 4, 1], &config), 250.0);
    }

    #[test]
    fn test_running_offsets() {
        let mut surface = RecordingSurface::default();
        let mut scene = SceneWorld::new();
        let config = LayoutConfig::default();
        let tree = sample_tree();

        place_tokens(&mut surface, &mut scene, &tree, &order(), &[1, 0, 2], &[Feature::Form], None, &config);

        let first = scene.column(0).unwrap();
        let third = scene.column(2).unwrap();
        assert_eq!(first.start_x, 0.0);
        assert_eq!(first.width, 3.0 * CHAR_WIDTH + 40.0);
        assert_eq!(third.start_x, 2.0 * first.width);
        assert_eq!(third.width, 6.0 * CHAR_WIDTH + 40.0);
        assert_eq!(scene.level(2), Some(2));
        assert_eq!(first.start_y, 130.0);
    }

    #[test]
    fn test_labels_are_centred() {
        let mut surface = RecordingSurface::default();
        let mut scene = SceneWorld::new();
        let tree = sample_tree();
        let features = [Feature::Form, Feature::Deprel];

        place_tokens(&mut surface, &mut scene, &tree, &order(), &[1, 0, 1], &features, None, &LayoutConfig::default());

        let column = scene.column(2).unwrap();
        let deprel = scene.label(2, "DEPREL").unwrap();
        let bbox = surface.bbox(deprel);
        assert!((bbox.center_x() - column.center_x).abs() < 1e-9);
        assert_eq!(surface.classes(deprel), vec!["DEPREL".to_string()]);
    }

    #[test]
    fn test_absent_nested_label_takes_no_room() {
        let mut surface = RecordingSurface::default();
        let config = LayoutConfig::default();
        let token = Token::new(TokenId::Word(1), "a");
        let features = [Feature::Form, Feature::Feats("Case".into()), Feature::Upos];

        let (_, labels) = stack_labels(&mut surface, &token, &features, 0.0, 100.0, &config);

        let upos = labels.get("UPOS").unwrap();
        assert_eq!(surface.position(upos).1, 120.0);
        assert!(labels.get("FEATS.Case").is_some());
    }

    #[test]
    fn test_pins_are_relative_to_first_pinned() {
        let mut surface = RecordingSurface::default();
        let mut scene = SceneWorld::new();
        let tree = sample_tree();
        let pins = ColumnSnapshot::new(vec![
            PinnedColumn { id: TokenId::Word(2), x: 300.0, width: 10.0 },
            PinnedColumn { id: TokenId::Word(3), x: 500.0, width: 10.0 },
        ]);

        place_tokens(&mut surface, &mut scene, &tree, &order(), &[1, 0, 1], &[Feature::Form], Some(&pins), &LayoutConfig::default());

        assert_eq!(scene.column(0).unwrap().start_x, 0.0);
        assert_eq!(scene.column(1).unwrap().start_x, 0.0);
        assert_eq!(scene.column(2).unwrap().start_x, 200.0);
    }

    #[test]
    fn test_canvas_bounds() {
        let mut surface = RecordingSurface::default();
        let mut scene = SceneWorld::new();
        assert_eq!(canvas_bounds(&surface, &scene).height, FALLBACK_HEIGHT);

        place_tokens(&mut surface, &mut scene, &sample_tree(), &order(), &[1, 0, 1], &[Feature::Form], None, &LayoutConfig::default());
        let bounds = canvas_bounds(&surface, &scene);
        let last = scene.column(2).unwrap();
        assert_eq!(bounds.width, last.start_x + last.width + CANVAS_MARGIN);
        assert!(bounds.height > 130.0 && bounds.height < FALLBACK_HEIGHT);
    }

    #[test]
    fn test_column_snapshot_pins_same_layout() {
        let mut surface = RecordingSurface::default();
        let mut scene = SceneWorld::new();
        let tree = sample_tree();
        let config = LayoutConfig::default();
        place_tokens(&mut surface, &mut scene, &tree, &order(), &[1, 0, 1], &[Feature::Form], None, &config);
        let snapshot = column_snapshot(&scene);
        assert_eq!(snapshot.columns.len(), 3);

        let mut again = SceneWorld::new();
        place_tokens(&mut surface, &mut again, &tree, &order(), &[1, 0, 1], &[Feature::Form], Some(&snapshot), &config);
        for position in 0..3 {
            assert_eq!(scene.column(position), again.column(position));
        }
    }
}
