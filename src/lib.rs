//! Streaming markdown renderer pipeline.
//!
//! Drives a caller-supplied byte→byte renderer over an arbitrarily long
//! input stream with bounded memory, progressive output, and structural
//! integrity guarantees: code fences, YAML frontmatter, and tables are
//! never split across a chunk boundary. See [`flow`] for the entry point.
//!
//! The crate is byte-opaque throughout — it does not parse markdown into
//! an AST, does not apply styling, and does not know what the renderer
//! does with the bytes it's handed.

pub mod accumulator;
pub mod boundary;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod demo_renderer;
pub mod editor;
pub mod error;
pub mod fence;
pub mod flow;
pub mod io;
pub mod render;

pub use cancel::CancellationToken;
pub use config::{FlowConfig, Window};
pub use error::FlowError;
pub use flow::flow;
pub use io::{ByteSink, ByteSource};
pub use render::{Render, RenderError};
