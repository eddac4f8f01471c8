pub mod document;
pub mod location;
pub mod memory_dom;

pub use document::{Document, MutationRecord, NodeId, NodeSpec};
pub use location::{Location, PageLocation};
pub use memory_dom::MemoryDocument;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid page address: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Element not found: {0}")]
    ElementNotFound(String),
    #[error("Node {0} cannot have children")]
    NotAnElement(NodeId),
}

pub type CoreResult<T> = Result<T, CoreError>;
