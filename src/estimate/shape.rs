use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use serde_json::Value;

/// Structural view of an item.
///
/// This is everything the estimator ever learns about an item: whether it is
/// text, an ordered run of children, a keyed record of children, or something
/// it cannot see into.
pub enum Shape<'a> {
    Text(&'a str),
    Sequence(Box<dyn Iterator<Item = &'a dyn ContentShape> + 'a>),
    /// Only the values are yielded; keys never count towards content size.
    Keyed(Box<dyn Iterator<Item = &'a dyn ContentShape> + 'a>),
    Other,
}

/// Implemented by anything that can be placed by the engine.
pub trait ContentShape {
    fn shape(&self) -> Shape<'_>;

    /// The item's own identity field, used for render keys when the caller
    /// does not supply an identity function.
    fn identity(&self) -> Option<String> {
        None
    }
}

impl ContentShape for str {
    fn shape(&self) -> Shape<'_> {
        Shape::Text(self)
    }
}

impl ContentShape for String {
    fn shape(&self) -> Shape<'_> {
        Shape::Text(self.as_str())
    }
}

impl<T: ContentShape + ?Sized> ContentShape for &T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }

    fn identity(&self) -> Option<String> {
        (**self).identity()
    }
}

impl<T: ContentShape> ContentShape for [T] {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(Box::new(self.iter().map(|v| v as &dyn ContentShape)))
    }
}

impl<T: ContentShape> ContentShape for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        self.as_slice().shape()
    }
}

impl<T: ContentShape> ContentShape for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(inner) => inner.shape(),
            None => Shape::Other,
        }
    }

    fn identity(&self) -> Option<String> {
        self.as_ref().and_then(ContentShape::identity)
    }
}

impl<K, V: ContentShape> ContentShape for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Keyed(Box::new(self.values().map(|v| v as &dyn ContentShape)))
    }
}

impl<K, V: ContentShape, S: BuildHasher> ContentShape for HashMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Keyed(Box::new(self.values().map(|v| v as &dyn ContentShape)))
    }
}

macro_rules! opaque_shape {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ContentShape for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Other
                }
            }
        )*
    };
}

opaque_shape!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl ContentShape for Value {
    fn shape(&self) -> Shape<'_> {
        match self {
            Value::String(text) => Shape::Text(text),
            Value::Array(values) => {
                Shape::Sequence(Box::new(values.iter().map(|v| v as &dyn ContentShape)))
            }
            Value::Object(map) => {
                Shape::Keyed(Box::new(map.values().map(|v| v as &dyn ContentShape)))
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => Shape::Other,
        }
    }

    fn identity(&self) -> Option<String> {
        match self.get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}
