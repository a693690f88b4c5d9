#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod cwl_type;
pub mod error;
pub mod icons;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod ports;
pub mod render;
pub mod routing;
pub mod scene;
pub mod theme;
pub mod visualizer;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::Config;
pub use error::{Result, VisualizerError};
pub use ir::WorkflowGraph;
pub use scene::{Modifiers, PointerEvent, Scene};
pub use visualizer::{Fetch, LoadOutcome, SvgDownload, Visualizer};
