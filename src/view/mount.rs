//! Mount - the container node a list projects onto
//!
//! A mount owns an ordered run of child nodes. Children are addressed by
//! opaque handles handed out on attach, so a view never has to search the
//! tree by id to find the node it rendered for a token.

use thiserror::Error;

/// Errors raised by a [`Mount`] when a handle no longer names a child
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MountError {
    #[error("Node is not attached to mount {0}")]
    NotAttached(String),
}

/// Container node in a rendered tree
pub trait Mount {
    /// Displayable node produced by a renderer
    type Node;
    /// Reference to an attached child; never reused after detach
    type Handle: Copy + Eq + std::fmt::Debug;

    /// Base identity of the mount, used to derive child keys
    fn base_id(&self) -> &str;

    /// Number of attached children
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether a handle still names an attached child
    fn contains(&self, handle: Self::Handle) -> bool;

    /// Attach a node as the last child
    fn append(&mut self, key: String, node: Self::Node) -> Self::Handle;

    /// Attach a node immediately before an existing child
    fn insert_before(
        &mut self,
        key: String,
        node: Self::Node,
        before: Self::Handle,
    ) -> Result<Self::Handle, MountError>;

    /// Swap the content of an attached child, keeping its handle and key
    fn replace(&mut self, handle: Self::Handle, node: Self::Node) -> Result<(), MountError>;

    /// Detach a child and hand its node back
    fn detach(&mut self, handle: Self::Handle) -> Result<Self::Node, MountError>;

    /// Detach every child
    fn clear(&mut self);
}
