#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Unexpected close token `{0}` with no open node")]
    UnexpectedClose(&'static str),
    #[error("Position {pos} out of range (content size {size})")]
    PositionOutOfRange { pos: usize, size: usize },
    #[error("Expected a text block, found `{0}`")]
    NotTextblock(&'static str),
}
