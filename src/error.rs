use thiserror::Error;

/// Errors surfaced to callers of the visualizer.
///
/// Rendering problems (missing positions, unknown ports) never show up here;
/// they are recovered where they happen and logged.
#[derive(Debug, Error)]
pub enum VisualizerError {
    #[error("failed to parse workflow document: {0}")]
    Parse(String),
    #[error("invalid CWL format: {0}")]
    InvalidFormat(String),
    #[error("no Workflow entry found in $graph")]
    NoWorkflowInGraph,
    #[error("failed to fetch workflow: {0}")]
    Fetch(String),
}

pub type Result<T> = std::result::Result<T, VisualizerError>;
