use std::time::Duration;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use arbor_protocol::{PrimitiveId, SentenceEvent, TokenId};
use arbor_scene::systems::accuracy::{AccuracyReport, FieldScore};
use arbor_view::{Outcome, SentenceView, SentenceViewOptions, SvgSurface};

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Pointer-up result sent back to JavaScript
#[derive(Debug, Serialize)]
pub struct OutcomeDto {
    pub event: Option<SentenceEvent>,
    pub prevent_default: bool,
}

impl From<Outcome> for OutcomeDto {
    fn from(outcome: Outcome) -> Self {
        Self {
            event: outcome.event,
            prevent_default: outcome.prevent_default,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ScoreDto {
    pub correct: usize,
    pub total: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct AccuracyDto {
    pub head: ScoreDto,
    pub deprel: ScoreDto,
    pub upos: ScoreDto,
}

impl From<FieldScore> for ScoreDto {
    fn from(score: FieldScore) -> Self {
        Self { correct: score.correct, total: score.total }
    }
}

impl From<AccuracyReport> for AccuracyDto {
    fn from(report: AccuracyReport) -> Self {
        Self {
            head: report.head.into(),
            deprel: report.deprel.into(),
            upos: report.upos.into(),
        }
    }
}

/// Render order and arc level per token
#[derive(Debug, Serialize)]
pub struct LayoutDto {
    pub order: Vec<String>,
    pub levels: Vec<u32>,
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_id(text: &str) -> Result<TokenId, JsValue> {
    text.parse::<TokenId>().map_err(js_error)
}

/// Browser timestamps (`performance.now()`) are fractional milliseconds.
fn duration_from_ms(ms: f64) -> Duration {
    Duration::from_micros((ms.max(0.0) * 1000.0) as u64)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(js_error)
}

/// One rendered sentence living in the browser
#[wasm_bindgen]
pub struct ArborEngine {
    view: SentenceView<SvgSurface>,
}

#[wasm_bindgen]
impl ArborEngine {
    /// `options` is a plain object shaped like `SentenceViewOptions`; `undefined` takes the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(conllu: &str, options: JsValue) -> Result<ArborEngine, JsValue> {
        let options: SentenceViewOptions = if options.is_undefined() || options.is_null() {
            SentenceViewOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options).map_err(js_error)?
        };
        let view = SentenceView::from_conllu(SvgSurface::new(), conllu, options).map_err(js_error)?;
        Ok(Self { view })
    }

    /// Elements carry `id="p<n>"`; token-owned ones add `data-token` and `data-label`.
    pub fn svg(&self) -> String {
        self.view.surface().to_svg()
    }

    /// Replace the sentence, as a "tree updated" notification would.
    pub fn update(&mut self, conllu: &str) -> Result<(), JsValue> {
        self.view.update_text(conllu).map_err(js_error)
    }

    pub fn export(&self) -> String {
        self.view.export()
    }

    pub fn layout(&self) -> Result<JsValue, JsValue> {
        to_js(&LayoutDto {
            order: self.view.order().iter().map(|id| id.to_string()).collect(),
            levels: self.view.levels().to_vec(),
        })
    }

    pub fn plug_reference(&mut self, conllu: &str) -> Result<(), JsValue> {
        self.view.plug_reference_text(conllu).map_err(js_error)
    }

    pub fn unplug_reference(&mut self) {
        self.view.unplug_reference();
    }

    pub fn diff_stats(&self, conllu: &str) -> Result<JsValue, JsValue> {
        let report = self.view.diff_stats(conllu).map_err(js_error)?;
        to_js(&AccuracyDto::from(report))
    }

    /// Column positions as opaque bytes, to hand back to `pin_columns` after an edit.
    pub fn snapshot(&self) -> Result<Vec<u8>, JsValue> {
        self.view.snapshot_bytes().map_err(js_error)
    }

    pub fn pin_columns(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.view.pin_columns_from_bytes(bytes).map_err(js_error)
    }

    pub fn unpin_columns(&mut self) {
        self.view.pin_columns(None);
    }

    pub fn pointer_down(&mut self, token: &str, at_ms: f64) -> Result<bool, JsValue> {
        let id = parse_id(token)?;
        Ok(self.view.pointer_down(id, duration_from_ms(at_ms)))
    }

    pub fn pointer_move(&mut self, dx: f64, dy: f64) {
        self.view.pointer_move(dx, dy);
    }

    pub fn pointer_up(&mut self, at_ms: f64) -> Result<JsValue, JsValue> {
        let outcome = self.view.pointer_up(duration_from_ms(at_ms));
        to_js(&OutcomeDto::from(outcome))
    }

    pub fn pointer_enter(&mut self, token: &str) -> Result<(), JsValue> {
        let id = parse_id(token)?;
        self.view.pointer_enter(id);
        Ok(())
    }

    pub fn pointer_leave(&mut self, token: &str) -> Result<(), JsValue> {
        let id = parse_id(token)?;
        self.view.pointer_leave(id);
        Ok(())
    }

    /// Click on a primitive by the `n` of its `p<n>` element id; `null` when it belongs to no token.
    pub fn click(&mut self, primitive: u64) -> Result<JsValue, JsValue> {
        let click = self.view.click(PrimitiveId(primitive)).map(SentenceEvent::Click);
        to_js(&click)
    }
}
