mod cancel;
mod diagnostics;
mod position;

pub use cancel::{AnalysisContext, CancelToken};
pub use diagnostics::{
    diagnostics_have_errors, render_diagnostics, Diagnostic, Diagnostics, Severity,
};
pub use position::RawPosition;
