use std::time::Duration;

use tracing::{debug, debug_span, trace, warn};

use arbor_bidi::render_order;
use arbor_conllu::ConlluCodec;
use arbor_layout::{
    assign_levels, canvas_bounds, column_snapshot, draw_enhanced_relations, draw_relations, governor_positions,
    place_tokens, validate_tree, Edge,
};
use arbor_protocol::{
    ClickEvent, ColumnSnapshot, DiffFields, PrimitiveId, SentenceCodec, SentenceEvent, Surface, TokenId, Tree,
};
use arbor_scene::components::{ARC, ARROWHEAD, DEPREL};
use arbor_scene::systems::accuracy::{accuracy, AccuracyReport};
use arbor_scene::systems::diff::{apply_diff, DiffReport};
use arbor_scene::SceneWorld;

use crate::bus::{EventBus, SubscriptionId};
use crate::interaction::{InteractionController, Outcome, FORM};
use crate::options::SentenceViewOptions;
use crate::pins::{decode_snapshot, encode_snapshot};
use crate::ViewError;

const MARK: &str = "red";
const DIFF: &str = "diff";

/// One rendered tree: owns the drawing surface, the scene, and the drag state.
///
/// Every mutation that changes what is drawn re-runs the whole pipeline.
pub struct SentenceView<S: Surface, C: SentenceCodec = ConlluCodec> {
    surface: S,
    codec: C,
    options: SentenceViewOptions,
    tree: Tree,
    reference: Option<Tree>,
    pins: Option<ColumnSnapshot>,
    scene: SceneWorld,
    order: Vec<TokenId>,
    levels: Vec<u32>,
    edges: Vec<Edge>,
    diff: Option<DiffReport>,
    interaction: InteractionController,
    bus: EventBus,
}

impl<S: Surface> SentenceView<S, ConlluCodec> {
    /// Decode the first CoNLL-U sentence of `text` and render it.
    pub fn from_conllu(surface: S, text: &str, options: SentenceViewOptions) -> Result<Self, ViewError> {
        Self::from_text(surface, ConlluCodec::new(), text, options)
    }
}

impl<S: Surface, C: SentenceCodec> SentenceView<S, C> {
    pub fn new(surface: S, codec: C, tree: Tree, options: SentenceViewOptions) -> Self {
        let interaction = InteractionController::new(options.arc_height);
        let mut view = Self {
            surface,
            codec,
            options,
            tree,
            reference: None,
            pins: None,
            scene: SceneWorld::new(),
            order: Vec::new(),
            levels: Vec::new(),
            edges: Vec::new(),
            diff: None,
            interaction,
            bus: EventBus::new(),
        };
        view.render();
        view
    }

    pub fn from_text(surface: S, codec: C, text: &str, options: SentenceViewOptions) -> Result<Self, ViewError> {
        let tree = codec.decode(text).map_err(|err| ViewError::Decode(err.to_string()))?;
        Ok(Self::new(surface, codec, tree, options))
    }

    // --- Render pipeline ---

    /// Redraw everything from the current tree. Any drag in progress is abandoned.
    pub fn render(&mut self) {
        let span = debug_span!("render", tokens = self.tree.len());
        let _enter = span.enter();

        // 1. Reset
        self.interaction.reset(&mut self.surface);
        self.interaction.set_arc_height(self.options.arc_height);
        self.surface.clear();
        self.scene.clear();
        self.diff = None;

        if let Err(err) = validate_tree(&self.tree) {
            warn!(%err, "governor graph is not a tree; rendering anyway");
        }

        // 2. Order and levels
        self.order = render_order(&self.tree, self.options.draw_enhanced_tokens, self.options.draw_group_tokens);
        self.levels = assign_levels(&governor_positions(&self.order, &self.tree));

        // 3. Columns and edges
        let config = self.options.layout();
        let features = self.options.features(&self.tree);
        place_tokens(
            &mut self.surface,
            &mut self.scene,
            &self.tree,
            &self.order,
            &self.levels,
            &features,
            self.pins.as_ref(),
            &config,
        );
        self.edges = draw_relations(&mut self.surface, &mut self.scene, &config);
        self.edges.extend(draw_enhanced_relations(&mut self.surface, &mut self.scene, &config));

        let bounds = canvas_bounds(&self.surface, &self.scene);
        self.surface.set_canvas_size(bounds.width, bounds.height);

        // 4. Decorations
        self.show_highlights();
        self.show_matches();
        self.show_packages();
        if let Some(reference) = &self.reference {
            self.diff = apply_diff(&mut self.scene, &self.tree, reference);
        }
        if self.diff.is_some() {
            self.show_diffs();
        }

        // 5. Host hooks
        self.tag_primitives();
        if self.options.interactive {
            self.surface.add_canvas_class("interactive");
        }

        debug!(edges = self.edges.len(), width = bounds.width, height = bounds.height, "rendered");
    }

    pub fn refresh(&mut self) {
        self.render();
    }

    /// Mark every token-owned primitive with its token and label so hosts can
    /// map DOM events back to [`Self::click`] and the pointer handlers.
    fn tag_primitives(&mut self) {
        for (position, id) in self.scene.ids().into_iter().enumerate() {
            let token = id.to_string();
            for (label, primitive) in self.scene.labels(position) {
                self.surface.set_data(primitive, "token", &token);
                self.surface.set_data(primitive, "label", &label);
            }
        }
    }

    fn paint(&mut self, position: usize, key: &str) {
        if let Some(id) = self.scene.label(position, key) {
            self.surface.set_fill(id, MARK);
        }
    }

    fn show_highlights(&mut self) {
        for position in 0..self.scene.len() {
            let Some(token) = self.scene.token(position) else { continue };
            let (Some(colour), Some(form)) = (token.highlight(), self.scene.label(position, FORM)) else {
                continue;
            };
            self.surface.set_fill(form, colour);
        }
    }

    fn show_matches(&mut self) {
        let matched: Vec<usize> = self.options.matches.iter().filter_map(|id| self.scene.position_of(id)).collect();
        for position in matched {
            self.paint(position, FORM);
        }
    }

    fn show_packages(&mut self) {
        let Some(packages) = self.options.packages.clone() else {
            return;
        };

        for node in &packages.modified_nodes {
            let Some(position) = self.scene.position_of(&node.id) else { continue };
            for feature in &node.features {
                let key = match feature.as_str() {
                    "upos" => "UPOS".to_string(),
                    "form" => FORM.to_string(),
                    "lemma" => "LEMMA".to_string(),
                    "deprel" => DEPREL.to_string(),
                    other => {
                        let nested = [format!("FEATS.{}", other), format!("MISC.{}", other)];
                        match nested.into_iter().find(|k| self.scene.label(position, k).is_some()) {
                            Some(key) => key,
                            None => continue,
                        }
                    }
                };
                self.paint(position, &key);
            }
        }

        for edge in &packages.modified_edges {
            let Some(position) = self.scene.position_of(&edge.tar) else { continue };
            for key in [ARC, ARROWHEAD] {
                if let Some(id) = self.scene.label(position, key) {
                    self.surface.set_stroke(id, MARK);
                }
            }
        }
    }

    fn show_diffs(&mut self) {
        for position in 0..self.scene.len() {
            let fields = self.scene.diff(position);
            let mut keys = Vec::new();
            if fields.contains(DiffFields::HEAD) {
                keys.extend([ARC, ARROWHEAD]);
            }
            if fields.contains(DiffFields::DEPREL) {
                keys.push(DEPREL);
            }
            if fields.contains(DiffFields::UPOS) {
                keys.push("UPOS");
            }
            for key in keys {
                if let Some(id) = self.scene.label(position, key) {
                    self.surface.add_class(id, DIFF);
                }
            }
        }
    }

    // --- Tree and reference ---

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Replace the tree and redraw.
    pub fn update(&mut self, tree: Tree) {
        self.tree = tree;
        self.render();
    }

    /// Decode `text` with the view's codec and treat it as a tree update.
    pub fn update_text(&mut self, text: &str) -> Result<(), ViewError> {
        let tree = self.codec.decode(text).map_err(|err| ViewError::Decode(err.to_string()))?;
        self.handle(SentenceEvent::TreeUpdated(tree));
        Ok(())
    }

    /// Inbound notifications. Only `TreeUpdated` is acted on.
    pub fn handle(&mut self, event: SentenceEvent) {
        match event {
            SentenceEvent::TreeUpdated(tree) => self.update(tree),
            other => trace!(?other, "outbound event ignored on inbound path"),
        }
    }

    pub fn plug_reference(&mut self, reference: Tree) {
        self.reference = Some(reference);
        self.render();
    }

    pub fn plug_reference_text(&mut self, text: &str) -> Result<(), ViewError> {
        let reference = self.codec.decode(text).map_err(|err| ViewError::Decode(err.to_string()))?;
        self.plug_reference(reference);
        Ok(())
    }

    pub fn unplug_reference(&mut self) {
        if self.reference.take().is_some() {
            self.render();
        }
    }

    pub fn reference(&self) -> Option<&Tree> {
        self.reference.as_ref()
    }

    /// Per-token diff flags of the last render, if a comparable reference is plugged.
    pub fn diff_report(&self) -> Option<&DiffReport> {
        self.diff.as_ref()
    }

    /// Score the current tree against a reference given as text.
    pub fn diff_stats(&self, reference_text: &str) -> Result<AccuracyReport, ViewError> {
        let reference = self.codec.decode(reference_text).map_err(|err| ViewError::Decode(err.to_string()))?;
        Ok(accuracy(&self.tree, &reference))
    }

    pub fn export(&self) -> String {
        self.codec.encode(&self.tree)
    }

    // --- Column pinning ---

    pub fn column_snapshot(&self) -> ColumnSnapshot {
        column_snapshot(&self.scene)
    }

    pub fn snapshot_bytes(&self) -> Result<Vec<u8>, ViewError> {
        encode_snapshot(&self.column_snapshot())
    }

    /// Keep columns at the given positions on every following render; `None` lets them flow.
    pub fn pin_columns(&mut self, snapshot: Option<ColumnSnapshot>) {
        self.pins = snapshot;
        self.render();
    }

    pub fn pin_columns_from_bytes(&mut self, bytes: &[u8]) -> Result<(), ViewError> {
        let snapshot = decode_snapshot(bytes)?;
        self.pin_columns(Some(snapshot));
        Ok(())
    }

    // --- Notifications ---

    pub fn subscribe(&mut self, listener: impl FnMut(&SentenceEvent) + 'static) -> SubscriptionId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    fn emit(&mut self, outcome: &Outcome) {
        if let Some(event) = &outcome.event {
            self.bus.publish(event);
        }
    }

    // --- Pointer input ---

    /// `at` is a host timestamp; only differences between calls matter.
    pub fn pointer_down(&mut self, token: TokenId, at: Duration) -> bool {
        if !self.options.interactive {
            return false;
        }
        self.interaction.pointer_down(&mut self.surface, &self.scene, token, at)
    }

    pub fn pointer_move(&mut self, dx: f64, dy: f64) {
        self.interaction.pointer_move(&mut self.surface, dx, dy);
    }

    pub fn pointer_up(&mut self, at: Duration) -> Outcome {
        let outcome = self.interaction.pointer_up(&mut self.surface, &self.scene, at);
        self.emit(&outcome);
        outcome
    }

    pub fn pointer_enter(&mut self, token: TokenId) {
        self.interaction.pointer_enter(&mut self.surface, &self.scene, token);
    }

    pub fn pointer_leave(&mut self, token: TokenId) {
        self.interaction.pointer_leave(&mut self.surface, &self.scene, token);
    }

    /// A click on any primitive a token owns, reported with that primitive's label.
    pub fn click(&mut self, primitive: PrimitiveId) -> Option<ClickEvent> {
        if !self.options.interactive {
            return None;
        }
        let (token, label) = self.scene.owner_of(primitive)?;
        let click = ClickEvent { token, label };
        self.bus.publish(&SentenceEvent::Click(click.clone()));
        Some(click)
    }

    pub fn dragged(&self) -> Option<TokenId> {
        self.interaction.dragged()
    }

    pub fn hovered(&self) -> Option<TokenId> {
        self.interaction.hovered()
    }

    // --- Accessors ---

    pub fn options(&self) -> &SentenceViewOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: SentenceViewOptions) {
        self.options = options;
        self.render();
    }

    pub fn order(&self) -> &[TokenId] {
        &self.order
    }

    pub fn levels(&self) -> &[u32] {
        &self.levels
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn scene(&self) -> &SceneWorld {
        &self.scene
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Primitive drawn for `token` under `label` (`FORM`, `DEPREL`, `arc`, ...).
    pub fn primitive(&self, token: &TokenId, label: &str) -> Option<PrimitiveId> {
        self.scene.position_of(token).and_then(|p| self.scene.label(p, label))
    }
}
