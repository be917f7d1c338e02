//! Structural compatibility checking
//!
//! Decides whether an observed type satisfies a required shape and, when it
//! does not, which attribute paths are missing. Both walks are depth-first
//! and treat a pair of shapes met again as satisfied, so they terminate on
//! self-referential types.

use crate::types::{render, PyType, ShapeRef, Signature};
use std::collections::HashSet;

/// Outcome of checking an observed type against a required one
#[derive(Debug, Clone, PartialEq)]
pub enum Compatibility {
    Ok,
    /// Both sides are shapes; `missing` lists the attribute paths `observed` lacks
    Difference { observed: String, missing: Vec<Vec<String>> },
    Incompatible { observed: PyType, required: PyType },
}

impl Compatibility {
    pub fn is_ok(&self) -> bool {
        matches!(self, Compatibility::Ok)
    }
}

/// Whether `observed` structurally satisfies `required`
pub fn is_compatible(observed: &PyType, required: &PyType) -> bool {
    Checker::default().compatible(observed, required)
}

/// Attribute paths of `required` that `observed` does not provide.
///
/// Only nested shape chains are followed; callable signatures are not
/// descended into. An attribute that exists but cannot satisfy its
/// requirement for another reason is reported by its own path. Empty unless
/// both arguments are structural.
pub fn missing_attributes(observed: &PyType, required: &PyType) -> Vec<Vec<String>> {
    match (observed, required) {
        (PyType::Structural(observed), PyType::Structural(required)) => {
            let mut paths = Vec::new();
            Differ::default().collect(observed, required, &mut Vec::new(), &mut paths);
            paths
        }
        _ => Vec::new(),
    }
}

/// Classify `observed` against `required` for diagnostics
pub fn classify(observed: &PyType, required: &PyType) -> Compatibility {
    if is_compatible(observed, required) {
        return Compatibility::Ok;
    }
    match (observed, required) {
        (PyType::Structural(_), PyType::Structural(_)) => Compatibility::Difference {
            observed: render(observed),
            missing: missing_attributes(observed, required),
        },
        _ => Compatibility::Incompatible {
            observed: observed.clone(),
            required: required.clone(),
        },
    }
}

#[derive(Default)]
struct Checker {
    assumed: HashSet<(usize, usize)>,
}

impl Checker {
    fn compatible(&mut self, observed: &PyType, required: &PyType) -> bool {
        match (observed, required) {
            (PyType::Dynamic, _) | (_, PyType::Dynamic) => true,
            (_, PyType::Structural(required)) if required.is_empty() => true,
            (PyType::Structural(observed), PyType::Structural(required)) => {
                self.shapes(observed, required)
            }
            (PyType::Callable(observed), PyType::Callable(required)) => {
                self.signatures(observed, required)
            }
            (PyType::Placeholder(a), PyType::Placeholder(b)) => a == b,
            _ => false,
        }
    }

    fn shapes(&mut self, observed: &ShapeRef, required: &ShapeRef) -> bool {
        if observed.ptr_eq(required) || !self.assumed.insert((observed.id(), required.id())) {
            return true;
        }
        required
            .attrs()
            .all(|(name, ty)| observed.attr(name).is_some_and(|found| self.compatible(found, ty)))
    }

    // Parameters and return use the same direction of check
    fn signatures(&mut self, observed: &Signature, required: &Signature) -> bool {
        observed
            .param_types()
            .zip(required.param_types())
            .all(|(o, r)| self.compatible(o, r))
            && self.compatible(&observed.ret, &required.ret)
    }
}

/// Collects missing paths. Only pairs on the current path are skipped, so a
/// pair of shared handles reached through two attributes is reported under
/// both prefixes.
#[derive(Default)]
struct Differ {
    open: HashSet<(usize, usize)>,
}

impl Differ {
    fn collect(
        &mut self,
        observed: &ShapeRef,
        required: &ShapeRef,
        prefix: &mut Vec<String>,
        out: &mut Vec<Vec<String>>,
    ) {
        let key = (observed.id(), required.id());
        if observed.ptr_eq(required) || !self.open.insert(key) {
            return;
        }
        for (name, required_ty) in required.attrs() {
            prefix.push(name.clone());
            match (observed.attr(name), required_ty) {
                (None, _) => out.push(prefix.clone()),
                (Some(PyType::Structural(found)), PyType::Structural(nested)) => {
                    self.collect(found, nested, prefix, out);
                }
                (Some(found), _) => {
                    if !is_compatible(found, required_ty) {
                        out.push(prefix.clone());
                    }
                }
            }
            prefix.pop();
        }
        self.open.remove(&key);
    }
}
