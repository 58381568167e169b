//! Generation error types.

use thiserror::Error;

/// An error that prevents code generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The tree handed to the generator is not rooted at `<svg>`.
    #[error("expected an <svg> root element, found <{found}>")]
    MissingSvgRoot {
        /// The root tag that was found instead.
        found: String,
    },

    /// A component or export name is not a valid JavaScript identifier.
    #[error("invalid component name: {name:?} is not a valid JavaScript identifier")]
    InvalidComponentName {
        /// The rejected name.
        name: String,
    },
}
