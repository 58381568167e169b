//! bun-hosted collaborators for svg2jsx.
//!
//! The converter talks to its two external tools through the
//! [`SvgOptimizer`] and [`SourceFormatter`] traits. [`BunRunner`] implements
//! both by running SVGO and Prettier from the project's `node_modules` under
//! bun.

mod collaborator;
mod error;
mod protocol;
mod runner;

pub use collaborator::{SourceFormatter, SvgOptimizer, Unavailable};
pub use error::ToolError;
pub use protocol::{prettier_options, svgo_config};
pub use runner::{BunRunner, DEFAULT_TIMEOUT};
