//! Drag, click and hover handling for one rendered tree.
//!
//! A session starts on pointer-down over a token's FORM label and ends on
//! pointer-up. While it runs, a ghost copy of the label follows the pointer
//! and a preview curve joins the token to the pointer. Release before
//! [`CLICK_THRESHOLD`] is a click, anything later is a drop.

use std::time::Duration;

use tracing::{debug, trace};

use arbor_layout::geometry::{arc_path, arrowhead_path};
use arbor_protocol::{ClickEvent, DropEvent, PathData, Point, PrimitiveId, SentenceEvent, Surface, TokenId, Transform};
use arbor_scene::SceneWorld;

pub const CLICK_THRESHOLD: Duration = Duration::from_millis(400);
pub const SPRING_BACK: Duration = Duration::from_millis(300);
/// Pointer drop below which the preview curve bends under the row.
pub const REVERSE_ARC_THRESHOLD: f64 = 20.0;
/// Distance between the preview curve's apex and the pointer.
pub const DRAG_APEX_OFFSET: f64 = 40.0;
/// Ghost offset so the copy sits above and left of the pointer.
const GHOST_OFFSET: (f64, f64) = (-15.0, -30.0);

pub const FORM: &str = "FORM";
pub const GLOSSY: &str = "glossy";
const DRAG_CURVE: &str = "dragcurve";
const DRAG_ARROWHEAD: &str = "dragarrowhead";

/// What the host should do after a pointer-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub event: Option<SentenceEvent>,
    /// The gesture was a drop; suppress the platform default for it.
    pub prevent_default: bool,
}

impl Outcome {
    fn none() -> Self {
        Self { event: None, prevent_default: false }
    }
}

#[derive(Debug)]
struct DragSession {
    token: TokenId,
    started_at: Duration,
    /// FORM centre x and top y at pointer-down.
    anchor: Point,
    ghost: PrimitiveId,
    curve: PrimitiveId,
    arrowhead: PrimitiveId,
    root_indicator: Option<PrimitiveId>,
}

/// Owns the dragged and hovered markers of one rendered tree.
#[derive(Debug)]
pub struct InteractionController {
    session: Option<DragSession>,
    hovered: Option<TokenId>,
    arc_height: f64,
}

impl InteractionController {
    pub fn new(arc_height: f64) -> Self {
        Self { session: None, hovered: None, arc_height }
    }

    pub fn set_arc_height(&mut self, arc_height: f64) {
        self.arc_height = arc_height;
    }

    pub fn dragged(&self) -> Option<TokenId> {
        self.session.as_ref().map(|s| s.token)
    }

    pub fn hovered(&self) -> Option<TokenId> {
        self.hovered
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the preview currently offers a root drop.
    pub fn over_root(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.root_indicator.is_some())
    }

    fn form_of(scene: &SceneWorld, token: &TokenId) -> Option<PrimitiveId> {
        scene.position_of(token).and_then(|p| scene.label(p, FORM))
    }

    /// Start dragging `token`. Ignored while another drag runs or if the token has no FORM label.
    pub fn pointer_down<S: Surface>(&mut self, surface: &mut S, scene: &SceneWorld, token: TokenId, at: Duration) -> bool {
        if let Some(active) = self.dragged() {
            debug!(%token, %active, "pointer-down during a drag ignored");
            return false;
        }
        let (Some(position), Some(form)) = (scene.position_of(&token), Self::form_of(scene, &token)) else {
            return false;
        };
        let Some(column) = scene.column(position) else {
            return false;
        };

        let anchor = Point::new(column.center_x, surface.bbox(form).y);
        let ghost = surface.duplicate(form);
        let curve = surface.path(&PathData::new());
        surface.add_class(curve, DRAG_CURVE);
        let arrowhead = surface.path(&arrowhead_path(anchor.x, anchor.y));
        surface.add_class(arrowhead, DRAG_ARROWHEAD);

        self.hovered = None;
        self.session = Some(DragSession {
            token,
            started_at: at,
            anchor,
            ghost,
            curve,
            arrowhead,
            root_indicator: None,
        });
        debug!(%token, "drag started");
        true
    }

    /// Follow the pointer, `(dx, dy)` from where the drag started.
    pub fn pointer_move<S: Surface>(&mut self, surface: &mut S, dx: f64, dy: f64) {
        let dead_zone = self.arc_height / 2.0;
        let Some(session) = self.session.as_mut() else {
            return;
        };

        surface.set_transform(session.ghost, Transform::Translate(dx + GHOST_OFFSET.0, dy + GHOST_OFFSET.1));
        surface.add_class(session.ghost, GLOSSY);

        let origin = session.anchor;
        let target = Point::new(origin.x + dx, origin.y + dy);
        let offset = if dy > REVERSE_ARC_THRESHOLD { DRAG_APEX_OFFSET } else { -DRAG_APEX_OFFSET };
        let apex = (target.y + offset).max(0.0);
        surface.set_path(session.curve, &arc_path(origin.x, target.x, origin.y, target.y, apex));
        surface.set_transform(session.arrowhead, Transform::Translate(dx, dy));

        let near_root = target.y < dead_zone && dx.abs() < dead_zone;
        match (near_root, session.root_indicator) {
            (true, None) => {
                let circle = surface.circle(origin.x, 0.0, dead_zone);
                surface.add_class(circle, DRAG_CURVE);
                session.root_indicator = Some(circle);
                trace!(token = %session.token, "entered root zone");
            }
            (false, Some(circle)) => {
                surface.remove(circle);
                session.root_indicator = None;
                trace!(token = %session.token, "left root zone");
            }
            _ => {}
        }
    }

    /// End the session and classify it.
    pub fn pointer_up<S: Surface>(&mut self, surface: &mut S, scene: &SceneWorld, at: Duration) -> Outcome {
        let Some(session) = self.session.take() else {
            return Outcome::none();
        };

        let elapsed = at.saturating_sub(session.started_at);
        let outcome = if elapsed < CLICK_THRESHOLD {
            Outcome {
                event: Some(SentenceEvent::Click(ClickEvent { token: session.token, label: FORM.to_string() })),
                prevent_default: false,
            }
        } else {
            Outcome {
                event: Some(SentenceEvent::Drop(DropEvent {
                    dragged: session.token,
                    hovered: self.hovered,
                    is_root: session.root_indicator.is_some(),
                })),
                prevent_default: true,
            }
        };
        debug!(token = %session.token, ?elapsed, drop = outcome.prevent_default, "drag finished");

        if let Some(hovered) = self.hovered.take() {
            if let Some(form) = Self::form_of(scene, &hovered) {
                surface.remove_class(form, GLOSSY);
            }
        }
        surface.spring_back(session.ghost, SPRING_BACK);
        Self::discard_preview(surface, &session);
        outcome
    }

    /// Mark `token` as the drop target while a drag runs.
    pub fn pointer_enter<S: Surface>(&mut self, surface: &mut S, scene: &SceneWorld, token: TokenId) {
        if self.dragged().map_or(true, |dragged| dragged == token) {
            return;
        }
        if let Some(form) = Self::form_of(scene, &token) {
            surface.add_class(form, GLOSSY);
        }
        self.hovered = Some(token);
    }

    /// Drop the hover affordance of `token`; the marker clears only if `token` holds it.
    pub fn pointer_leave<S: Surface>(&mut self, surface: &mut S, scene: &SceneWorld, token: TokenId) {
        if self.dragged().map_or(true, |dragged| dragged == token) {
            return;
        }
        if let Some(form) = Self::form_of(scene, &token) {
            surface.remove_class(form, GLOSSY);
        }
        if self.hovered == Some(token) {
            self.hovered = None;
        }
    }

    /// Abandon any drag without notifying anyone.
    pub fn reset<S: Surface>(&mut self, surface: &mut S) {
        if let Some(session) = self.session.take() {
            debug!(token = %session.token, "drag abandoned");
            surface.remove(session.ghost);
            Self::discard_preview(surface, &session);
        }
        self.hovered = None;
    }

    fn discard_preview<S: Surface>(surface: &mut S, session: &DragSession) {
        surface.remove(session.curve);
        surface.remove(session.arrowhead);
        if let Some(circle) = session.root_indicator {
            surface.remove(circle);
        }
    }
}
