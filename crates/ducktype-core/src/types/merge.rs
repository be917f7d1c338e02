//! Merge of type observations
//!
//! `merge` combines two observations of the same entity taken at different
//! program points. It forms a commutative monoid with `Dynamic` as identity:
//! - shapes union their attributes, merging shared keys recursively
//! - a shape and a callable become a shape carrying the callable as `__call__`
//! - callables merge positionally; parameter lists truncate to the shorter one

use super::shape::{Shape, ShapeRef};
use super::{Param, PyType, Signature, CALL_ATTRIBUTE};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Merge two observations of the same entity
pub fn merge(left: &PyType, right: &PyType) -> PyType {
    Merger::default().merge(left, right)
}

/// Type of `name` on `ty`, defined only for structural types
pub fn attribute_type(ty: &PyType, name: &str) -> Option<PyType> {
    match ty {
        PyType::Structural(shape) => shape.attr(name).cloned(),
        _ => None,
    }
}

/// Signature used when `ty` is called: the callable itself, or a shape's `__call__`
pub fn call_signature(ty: &PyType) -> Option<Signature> {
    match ty {
        PyType::Callable(signature) => Some(signature.clone()),
        PyType::Structural(shape) => shape
            .attr(CALL_ATTRIBUTE)
            .and_then(PyType::as_signature)
            .cloned(),
        _ => None,
    }
}

/// Merges shapes pairwise, remembering the result handle of every pair of
/// input handles. Meeting a pair again (a cycle) returns the handle whose
/// shape is still being built.
#[derive(Default)]
struct Merger {
    results: HashMap<(usize, usize), ShapeRef>,
}

impl Merger {
    fn merge(&mut self, left: &PyType, right: &PyType) -> PyType {
        match (left, right) {
            (PyType::Dynamic, other) | (other, PyType::Dynamic) => other.clone(),
            (PyType::Placeholder(class), _) | (_, PyType::Placeholder(class)) => {
                PyType::Placeholder(class.clone())
            }
            (PyType::Structural(a), PyType::Structural(b)) => {
                PyType::Structural(self.merge_shapes(a, b))
            }
            (PyType::Structural(shape), PyType::Callable(signature))
            | (PyType::Callable(signature), PyType::Structural(shape)) => {
                let call = ShapeRef::new(Shape::singleton(
                    CALL_ATTRIBUTE,
                    PyType::Callable(signature.clone()),
                ));
                PyType::Structural(self.merge_shapes(shape, &call))
            }
            (PyType::Callable(a), PyType::Callable(b)) => {
                PyType::Callable(self.merge_signatures(a, b))
            }
        }
    }

    fn merge_signatures(&mut self, left: &Signature, right: &Signature) -> Signature {
        // zip stops at the shorter list: surplus parameters are dropped
        let params = left
            .params
            .iter()
            .zip(&right.params)
            .map(|(a, b)| Param::new(a.name.clone(), self.merge(&a.ty, &b.ty)))
            .collect();
        Signature::new(params, self.merge(&left.ret, &right.ret))
    }

    fn merge_shapes(&mut self, left: &ShapeRef, right: &ShapeRef) -> ShapeRef {
        if left.ptr_eq(right) || absorbs(left, right) {
            return left.clone();
        }
        if absorbs(right, left) {
            return right.clone();
        }

        let key = (left.id(), right.id());
        if let Some(result) = self.results.get(&key) {
            return result.clone();
        }
        let result = ShapeRef::pending();
        self.results.insert(key, result.clone());

        let mut attrs = IndexMap::with_capacity(left.len() + right.len());
        for (name, ty) in left.attrs() {
            let merged = match right.attr(name) {
                Some(other) => self.merge(ty, other),
                None => ty.clone(),
            };
            attrs.insert(name.clone(), merged);
        }
        for (name, ty) in right.attrs() {
            if !attrs.contains_key(name) {
                attrs.insert(name.clone(), ty.clone());
            }
        }

        let name = left.name().or(right.name()).map(str::to_owned);
        result.fill(Shape { name, attrs });
        result
    }
}

/// Merging `other` into `shape` would not change it
fn absorbs(shape: &ShapeRef, other: &ShapeRef) -> bool {
    other.is_empty() && (other.name().is_none() || shape.name().is_some())
}
