//! Type-aware analysis over parsed templates: the diagnostic generator and
//! the hover formatter. Both are pure functions of a parse result plus a
//! type registry; neither owns threads or caches across calls.

mod diagnostics;
mod hover;

pub use diagnostics::generate;
pub use hover::{format_hover_response, HoverError, HoverInfo};
