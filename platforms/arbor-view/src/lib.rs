//! A rendered dependency tree that can be reparented by drag and drop.
//!
//! [`SentenceView`] runs the render pipeline (visual order, arc levels,
//! columns, edges) onto any [`arbor_protocol::Surface`], tracks pointer
//! gestures through the [`InteractionController`], and publishes click and
//! drop notifications on its [`EventBus`]. [`SvgSurface`] is a retained
//! in-memory surface that serialises to SVG.

pub mod bus;
pub mod error;
pub mod interaction;
pub mod options;
pub mod pins;
pub mod svg;
pub mod view;

pub use bus::{EventBus, SubscriptionId};
pub use error::ViewError;
pub use interaction::{InteractionController, Outcome, CLICK_THRESHOLD};
pub use options::{ModifiedEdge, ModifiedNode, Packages, SentenceViewOptions};
pub use svg::{SvgSurface, TextMetrics};
pub use view::SentenceView;
