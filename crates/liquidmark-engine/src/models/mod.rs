pub mod mark;
pub mod node;

pub use mark::{Mark, MarkSpec, MarkType};
pub use node::{Node, NodeKind, push_inline};
