//! Persistent analysis environment
//!
//! Every scope entry produces a new environment; the parent stays valid and
//! can be reused by sibling inferences. Bindings live in an `im::HashMap`, so
//! extending an environment shares structure with its parent instead of
//! copying it.

use crate::types::{PyType, Signature};
use im::HashMap as ImHashMap;

#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: ImHashMap<String, PyType>,
    /// Class whose methods are being inferred, if any
    class: Option<String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new environment with `name` bound to `ty`, shadowing any earlier binding
    pub fn bind(&self, name: impl Into<String>, ty: PyType) -> Self {
        let mut next = self.clone();
        next.bindings.insert(name.into(), ty);
        next
    }

    pub fn lookup(&self, name: &str) -> Option<&PyType> {
        self.bindings.get(name)
    }

    /// A new environment for inferring the methods of `class`
    pub fn enter_class(&self, class: impl Into<String>) -> Self {
        Self {
            bindings: self.bindings.clone(),
            class: Some(class.into()),
        }
    }

    /// Class whose methods are being inferred under this environment
    pub fn class_context(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// Type of a method's receiver: the placeholder of the enclosing class
    pub fn receiver_type(&self) -> Option<PyType> {
        self.class.as_ref().map(|class| PyType::Placeholder(class.clone()))
    }

    /// A new environment for the body of a function with `signature`.
    ///
    /// Parameters are bound to their signature types. The class context is
    /// cleared: functions nested in a method are plain functions.
    pub fn enter_scope(&self, signature: &Signature) -> Self {
        let mut bindings = self.bindings.clone();
        for param in &signature.params {
            bindings.insert(param.name.clone(), param.ty.clone());
        }
        Self { bindings, class: None }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
