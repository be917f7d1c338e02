//! Structural type algebra
//!
//! Every inferred entity is described by a [`PyType`]:
//! - `Dynamic` is the unconstrained type and the identity of [`merge`]
//! - `Structural` describes an object by its members (a [`Shape`])
//! - `Callable` is a positional signature with a return type
//! - `Placeholder` stands for the class currently being inferred
//!
//! Shapes are held behind a [`ShapeRef`], a shared single-assignment cell.
//! Class inference closes self-references by pointing a class's own methods
//! back at the handle of its instance shape, so every traversal in this crate
//! tracks the handles it has already visited.

mod merge;
mod render;
mod shape;

pub use merge::{attribute_type, call_signature, merge};
pub use render::render;
pub use shape::{Shape, ShapeRef};

use std::collections::HashSet;
use std::fmt;

/// Synthetic attribute under which a callable-and-structural entity keeps its call signature
pub const CALL_ATTRIBUTE: &str = "__call__";

/// An inferred structural type
#[derive(Debug, Clone)]
pub enum PyType {
    /// Unknown or unconstrained
    Dynamic,
    /// An object described by its members
    Structural(ShapeRef),
    /// A function or method signature
    Callable(Signature),
    /// The not-yet-finished type of the named class
    Placeholder(String),
}

/// A named positional parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: PyType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: PyType) -> Self {
        Self { name: name.into(), ty }
    }

    pub fn dynamic(name: impl Into<String>) -> Self {
        Self::new(name, PyType::Dynamic)
    }
}

/// Payload of [`PyType::Callable`]
#[derive(Debug, Clone)]
pub struct Signature {
    pub params: Vec<Param>,
    pub ret: Box<PyType>,
}

impl Signature {
    pub fn new(params: Vec<Param>, ret: PyType) -> Self {
        Self {
            params,
            ret: Box::new(ret),
        }
    }

    /// The same signature with its first (receiver) parameter removed
    pub fn without_receiver(&self) -> Signature {
        Signature {
            params: self.params.iter().skip(1).cloned().collect(),
            ret: self.ret.clone(),
        }
    }

    pub fn param_types(&self) -> impl Iterator<Item = &PyType> {
        self.params.iter().map(|param| &param.ty)
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        Equivalence::default().signatures(self, other)
    }
}

impl PyType {
    pub fn structural(shape: Shape) -> Self {
        PyType::Structural(ShapeRef::new(shape))
    }

    pub fn callable(params: Vec<Param>, ret: PyType) -> Self {
        PyType::Callable(Signature::new(params, ret))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, PyType::Dynamic)
    }

    pub fn as_shape(&self) -> Option<&ShapeRef> {
        match self {
            PyType::Structural(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_signature(&self) -> Option<&Signature> {
        match self {
            PyType::Callable(signature) => Some(signature),
            _ => None,
        }
    }

    /// Whether `Placeholder(class)` occurs anywhere inside this type
    pub fn mentions_placeholder(&self, class: &str) -> bool {
        let mut seen = HashSet::new();
        mentions(self, class, &mut seen)
    }
}

fn mentions(ty: &PyType, class: &str, seen: &mut HashSet<usize>) -> bool {
    match ty {
        PyType::Dynamic => false,
        PyType::Placeholder(name) => name == class,
        PyType::Callable(signature) => {
            signature
                .param_types()
                .any(|param| mentions(param, class, seen))
                || mentions(&signature.ret, class, seen)
        }
        PyType::Structural(shape) => {
            if !seen.insert(shape.id()) {
                return false;
            }
            shape.attrs().any(|(_, attr)| mentions(attr, class, seen))
        }
    }
}

/// Structural equality.
///
/// Shape display names, parameter names and attribute order are ignored.
/// Pairs of shapes already under comparison are assumed equal, which makes
/// the comparison total on self-referential values.
impl PartialEq for PyType {
    fn eq(&self, other: &Self) -> bool {
        Equivalence::default().types(self, other)
    }
}

impl fmt::Display for PyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}

#[derive(Default)]
struct Equivalence {
    assumed: HashSet<(usize, usize)>,
}

impl Equivalence {
    fn types(&mut self, left: &PyType, right: &PyType) -> bool {
        match (left, right) {
            (PyType::Dynamic, PyType::Dynamic) => true,
            (PyType::Placeholder(a), PyType::Placeholder(b)) => a == b,
            (PyType::Callable(a), PyType::Callable(b)) => self.signatures(a, b),
            (PyType::Structural(a), PyType::Structural(b)) => self.shapes(a, b),
            _ => false,
        }
    }

    fn signatures(&mut self, left: &Signature, right: &Signature) -> bool {
        left.params.len() == right.params.len()
            && left
                .param_types()
                .zip(right.param_types())
                .all(|(a, b)| self.types(a, b))
            && self.types(&left.ret, &right.ret)
    }

    fn shapes(&mut self, left: &ShapeRef, right: &ShapeRef) -> bool {
        if left.ptr_eq(right) || !self.assumed.insert((left.id(), right.id())) {
            return true;
        }
        left.len() == right.len()
            && left
                .attrs()
                .all(|(name, ty)| right.attr(name).is_some_and(|other| self.types(ty, other)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_display_names() {
        let named = PyType::structural(Shape::from_attribute_names(["a"]).with_name("Point"));
        let anonymous = PyType::structural(Shape::from_attribute_names(["a"]));
        assert_eq!(named, anonymous);
    }

    #[test]
    fn test_equality_ignores_attribute_order() {
        let ab = PyType::structural(Shape::from_attribute_names(["a", "b"]));
        let ba = PyType::structural(Shape::from_attribute_names(["b", "a"]));
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_equality_distinguishes_attribute_types() {
        let left = PyType::structural(Shape::singleton("a", PyType::Dynamic));
        let right =
            PyType::structural(Shape::singleton("a", PyType::callable(vec![], PyType::Dynamic)));
        assert_ne!(left, right);
    }

    #[test]
    fn test_signature_equality_ignores_param_names() {
        let x = Signature::new(vec![Param::dynamic("x")], PyType::Dynamic);
        let y = Signature::new(vec![Param::dynamic("y")], PyType::Dynamic);
        assert_eq!(x, y);

        let two = Signature::new(vec![Param::dynamic("x"), Param::dynamic("y")], PyType::Dynamic);
        assert_ne!(x, two);
    }

    #[test]
    fn test_without_receiver_drops_first_param() {
        let method = Signature::new(
            vec![Param::dynamic("self"), Param::dynamic("x")],
            PyType::Dynamic,
        );
        let stripped = method.without_receiver();
        assert_eq!(stripped.params.len(), 1);
        assert_eq!(stripped.params[0].name, "x");

        let bare = Signature::new(vec![], PyType::Dynamic);
        assert!(bare.without_receiver().params.is_empty());
    }

    #[test]
    fn test_equality_on_self_referential_shapes() {
        let first = ShapeRef::pending();
        first.fill(Shape::singleton("next", PyType::Structural(first.clone())));
        let second = ShapeRef::pending();
        second.fill(Shape::singleton("next", PyType::Structural(second.clone())));

        assert_eq!(PyType::Structural(first), PyType::Structural(second));
    }

    #[test]
    fn test_mentions_placeholder() {
        let ty = PyType::callable(vec![], PyType::Placeholder("Node".to_string()));
        assert!(ty.mentions_placeholder("Node"));
        assert!(!ty.mentions_placeholder("Other"));
        assert!(!PyType::Dynamic.mentions_placeholder("Node"));
    }
}
