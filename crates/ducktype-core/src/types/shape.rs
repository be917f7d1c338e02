//! Shapes and shape handles

use super::{merge, PyType};
use indexmap::IndexMap;
use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

/// Members of a structural type plus an optional display name
#[derive(Debug, Clone, Default)]
pub struct Shape {
    pub name: Option<String>,
    pub attrs: IndexMap<String, PyType>,
}

impl Shape {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every name mapped to `Dynamic`
    pub fn from_attribute_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            attrs: names.into_iter().map(|name| (name.into(), PyType::Dynamic)).collect(),
        }
    }

    pub fn singleton(name: impl Into<String>, ty: PyType) -> Self {
        let mut attrs = IndexMap::new();
        attrs.insert(name.into(), ty);
        Self { name: None, attrs }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&PyType> {
        self.attrs.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Adds an attribute, merging with any type already recorded under `name`
    pub fn merge_attribute(&mut self, name: impl Into<String>, ty: PyType) {
        let name = name.into();
        let merged = match self.attrs.get(&name) {
            Some(existing) => merge(existing, &ty),
            None => ty,
        };
        self.attrs.insert(name, merged);
    }
}

/// Shared handle to a [`Shape`].
///
/// The cell is written exactly once. A handle can be created before its
/// shape exists ([`ShapeRef::pending`]) so that the shape may contain the
/// handle itself. Until it is filled, a handle reads as an empty shape.
#[derive(Clone)]
pub struct ShapeRef(Rc<OnceCell<Shape>>);

impl ShapeRef {
    pub fn new(shape: Shape) -> Self {
        Self(Rc::new(OnceCell::from(shape)))
    }

    pub fn pending() -> Self {
        Self(Rc::new(OnceCell::new()))
    }

    /// Writes the shape of a pending handle. Later writes are ignored.
    pub fn fill(&self, shape: Shape) {
        if self.0.set(shape).is_err() {
            tracing::trace!("Ignoring second write to an already filled shape handle");
        }
    }

    pub fn shape(&self) -> Option<&Shape> {
        self.0.get()
    }

    pub fn name(&self) -> Option<&str> {
        self.shape().and_then(|shape| shape.name.as_deref())
    }

    pub fn attr(&self, name: &str) -> Option<&PyType> {
        self.shape().and_then(|shape| shape.get(name))
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&String, &PyType)> {
        self.shape().into_iter().flat_map(|shape| shape.attrs.iter())
    }

    pub fn len(&self) -> usize {
        self.shape().map_or(0, |shape| shape.attrs.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identity of the underlying cell
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn ptr_eq(&self, other: &ShapeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Shape> for ShapeRef {
    fn from(shape: Shape) -> Self {
        Self::new(shape)
    }
}

// Only one level is printed; shapes may contain themselves.
impl fmt::Debug for ShapeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&String> = self.attrs().map(|(name, _)| name).collect();
        f.debug_struct("ShapeRef")
            .field("name", &self.name())
            .field("attrs", &keys)
            .finish()
    }
}
