//! Render keys handed to the external renderer alongside placed items.
//!
//! Keys are `col-{column}:` followed by the caller's identity, the item's own
//! `id` field, or `index-{position}` as a last resort. The column prefix keeps
//! keys from colliding across columns.

use std::fmt;

use crate::estimate::ContentShape;

pub type IdentityFn<T> = Box<dyn Fn(&T) -> Option<String> + Send + Sync>;

pub struct KeyResolver<T> {
    identity: Option<IdentityFn<T>>,
}

impl<T> Default for KeyResolver<T> {
    fn default() -> Self {
        Self { identity: None }
    }
}

impl<T> fmt::Debug for KeyResolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyResolver")
            .field("identity", &self.identity.is_some())
            .finish()
    }
}

impl<T: ContentShape> KeyResolver<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity<F>(identity: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            identity: Some(Box::new(identity)),
        }
    }

    pub fn key(&self, column: usize, position: usize, item: &T) -> String {
        let id = self
            .identity
            .as_ref()
            .and_then(|identity| identity(item))
            .or_else(|| item.identity());

        match id {
            Some(id) => format!("col-{column}:id-{id}"),
            None => format!("col-{column}:index-{position}"),
        }
    }
}
