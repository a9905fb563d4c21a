//! Ordered live list
//!
//! Keeps an ordered collection of records and the children of a [`Mount`]
//! in lockstep: `items[i]` is always rendered as the i-th child.
//!
//! # Ordering
//!
//! Order comes from an injected `precedes(a, b)` predicate that must be a
//! total preorder. Records of equal rank keep their relative order: an
//! insert lands after every existing equal, and an update that does not
//! change rank leaves the record where it was.
//!
//! Every mutating operation finds its target position with a single
//! forward scan of `items`. Lists are UI-sized, so there is no index.
//!
//! # Failure
//!
//! Rendering and node lookups happen before anything is mutated, so an
//! operation that returns an error leaves both the items and the mount as
//! they were.

use std::collections::HashMap;

use super::error::{RenderError, ViewError, ViewResult};
use super::mount::Mount;

/// A value with a stable identity token
pub trait Record {
    fn token(&self) -> &str;
}

/// Renderer producing a fresh node for a record
pub type RenderFn<R, N> = Box<dyn Fn(&R) -> Result<N, RenderError>>;

/// Ordering predicate: true iff the first record must appear before the second
pub type PrecedesFn<R> = Box<dyn Fn(&R, &R) -> bool>;

/// Ordered collection of records mirrored onto a mount
pub struct OrderedList<R, M: Mount> {
    items: Vec<R>,
    /// token → handle of the node rendered for it
    nodes: HashMap<String, M::Handle>,
    mount: M,
    renderer: RenderFn<R, M::Node>,
    precedes: PrecedesFn<R>,
}

impl<R: Record, M: Mount> OrderedList<R, M> {
    /// Create an empty list over `mount`, clearing any existing children
    pub fn new(
        mut mount: M,
        renderer: impl Fn(&R) -> Result<M::Node, RenderError> + 'static,
        precedes: impl Fn(&R, &R) -> bool + 'static,
    ) -> Self {
        mount.clear();
        Self {
            items: Vec::new(),
            nodes: HashMap::new(),
            mount,
            renderer: Box::new(renderer),
            precedes: Box::new(precedes),
        }
    }

    /// Look up the stored record for a token
    pub fn has(&self, token: &str) -> Option<&R> {
        self.items.iter().find(|r| r.token() == token)
    }

    /// Insert a record at its sorted position
    ///
    /// The record goes before the first existing item it precedes, or at
    /// the end.
    pub fn insert(&mut self, record: R) -> ViewResult<()> {
        let mut position = None;
        // No early exit: the whole list is checked for a duplicate token
        for (i, existing) in self.items.iter().enumerate() {
            if existing.token() == record.token() {
                return Err(ViewError::DuplicateToken(record.token().to_string()));
            }
            if position.is_none() && (self.precedes)(&record, existing) {
                position = Some(i);
            }
        }
        let position = position.unwrap_or(self.items.len());

        let before = self.anchor(position)?;
        let node = self.render(&record)?;
        let handle = self.attach(record.token(), node, before)?;

        tracing::trace!(
            mount = %self.mount.base_id(),
            token = %record.token(),
            position,
            "Inserted record"
        );

        self.nodes.insert(record.token().to_string(), handle);
        self.items.insert(position, record);
        Ok(())
    }

    /// Replace the stored record with the same token, repositioning if
    /// its rank changed
    pub fn update(&mut self, record: R) -> ViewResult<()> {
        // `target` indexes the sequence with the current entry taken out.
        // Items before the current entry are passed only when the record
        // strictly precedes them, items after it whenever they do not
        // strictly precede the record; equals stay on their side.
        let mut current = None;
        let mut target = None;
        for (i, existing) in self.items.iter().enumerate() {
            if existing.token() == record.token() {
                current = Some(i);
            } else if target.is_none() {
                let goes_before = match current {
                    None => (self.precedes)(&record, existing),
                    Some(_) => !(self.precedes)(existing, &record),
                };
                if goes_before {
                    target = Some(if current.is_some() { i - 1 } else { i });
                }
            }
            if current.is_some() && target.is_some() {
                break;
            }
        }
        let current =
            current.ok_or_else(|| ViewError::UnknownToken(record.token().to_string()))?;
        let target = target.unwrap_or(self.items.len() - 1);

        let handle = self.attached(record.token())?;

        if target == current {
            let node = self.render(&record)?;
            self.mount
                .replace(handle, node)
                .map_err(|_| self.missing(record.token()))?;
            self.items[current] = record;
            return Ok(());
        }

        // Index, in the untouched sequence, of the item that ends up
        // right after the record.
        let next = if target < current { target } else { target + 1 };
        let before = self.anchor(next)?;
        let node = self.render(&record)?;

        self.mount
            .detach(handle)
            .map_err(|_| self.missing(record.token()))?;
        let handle = self.attach(record.token(), node, before)?;

        tracing::trace!(
            mount = %self.mount.base_id(),
            token = %record.token(),
            from = current,
            to = target,
            "Moved record"
        );

        self.nodes.insert(record.token().to_string(), handle);
        self.items.remove(current);
        self.items.insert(target, record);
        Ok(())
    }

    /// Remove the record with the given token and detach its node
    pub fn remove(&mut self, token: &str) -> ViewResult<R> {
        let index = self
            .items
            .iter()
            .position(|r| r.token() == token)
            .ok_or_else(|| ViewError::UnknownToken(token.to_string()))?;
        let handle = self.attached(token)?;

        self.mount
            .detach(handle)
            .map_err(|_| self.missing(token))?;
        self.nodes.remove(token);

        tracing::trace!(mount = %self.mount.base_id(), token = %token, "Removed record");
        Ok(self.items.remove(index))
    }

    /// Detach every node and forget every record
    pub fn reset(&mut self) {
        self.mount.clear();
        self.items.clear();
        self.nodes.clear();
    }

    /// Key of the node rendered for a token
    pub fn node_key(&self, token: &str) -> String {
        format!("{}-{}", self.mount.base_id(), token)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.items.iter()
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.items.iter().map(|r| r.token()).collect()
    }

    pub fn mount(&self) -> &M {
        &self.mount
    }

    fn render(&self, record: &R) -> ViewResult<M::Node> {
        (self.renderer)(record).map_err(|source| ViewError::Render {
            token: record.token().to_string(),
            source,
        })
    }

    /// Handle of the node for `token`, checked against the mount
    fn attached(&self, token: &str) -> ViewResult<M::Handle> {
        self.nodes
            .get(token)
            .copied()
            .filter(|handle| self.mount.contains(*handle))
            .ok_or_else(|| self.missing(token))
    }

    /// Node that a record placed at `index` has to be inserted before
    fn anchor(&self, index: usize) -> ViewResult<Option<(M::Handle, String)>> {
        match self.items.get(index) {
            Some(next) => {
                let handle = self.attached(next.token())?;
                Ok(Some((handle, next.token().to_string())))
            }
            None => Ok(None),
        }
    }

    fn attach(
        &mut self,
        token: &str,
        node: M::Node,
        before: Option<(M::Handle, String)>,
    ) -> ViewResult<M::Handle> {
        let key = self.node_key(token);
        match before {
            Some((before, before_token)) => self
                .mount
                .insert_before(key, node, before)
                .map_err(|_| self.missing(&before_token)),
            None => Ok(self.mount.append(key, node)),
        }
    }

    fn missing(&self, token: &str) -> ViewError {
        ViewError::MissingMountNode {
            key: self.node_key(token),
        }
    }
}

impl<R, M: Mount> std::fmt::Debug for OrderedList<R, M>
where
    R: std::fmt::Debug,
    M: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderedList")
            .field("items", &self.items)
            .field("mount", &self.mount)
            .finish_non_exhaustive()
    }
}
