//! Domain model: document blocks and whiteboard nodes.

mod block;
pub mod blocks;
pub mod board;

pub use block::{Block, BlockKind, BlockType};
pub use board::{BoardNode, Connector, LifeLine, NodeLinks};
