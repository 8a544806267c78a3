mod arena;
mod handle;
mod node;
mod raw_rb_tree;
mod validate;

pub(crate) use arena::Slot;
pub(crate) use handle::Handle;
pub(crate) use node::{Color, Side};
pub(crate) use raw_rb_tree::RawRBTree;
