//! Build errors for mission and transition builders.

use thiserror::Error;

/// Errors raised by the builders before any structural validation runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("no states defined; add at least one stage or call .root(node)")]
    MissingStates,

    #[error("transition trigger not specified; call TransitionBuilder::on(event)")]
    MissingTrigger,

    #[error("transition source not specified; call .from(path)")]
    MissingSource,

    #[error("transition target not specified; call .to(path) or .stay()")]
    MissingTarget,
}
