//! Class type inference
//!
//! A class infers to one callable: its constructor signature returning the
//! instance shape. The shape is the union of every method (receiver dropped)
//! and every attribute assigned through the receiver in any method body.
//!
//! Methods may mention the class itself, e.g. by returning `self` or by
//! constructing a new instance. While the shape is being assembled those
//! mentions are `Placeholder(class)`. Once it is complete, each placeholder is
//! replaced by a handle to the finished shape, so the result refers to itself.

use super::{DefaultExprInferer, DefaultFunctionInferer, ExprTypeInferer, FunctionTypeInferer};
use crate::config::InferenceConfig;
use crate::env::Environment;
use crate::hir::{HirClass, HirExpr, HirFunction, HirStmt};
use crate::types::{Param, PyType, Shape, ShapeRef, Signature};
use crate::walk;
use std::collections::HashMap;
use tracing::debug;

pub struct ClassTypeInferer<F = DefaultFunctionInferer, E = DefaultExprInferer> {
    functions: F,
    exprs: E,
    config: InferenceConfig,
}

impl ClassTypeInferer {
    pub fn new(config: InferenceConfig) -> Self {
        Self::with_inferers(DefaultFunctionInferer::new(), DefaultExprInferer, config)
    }
}

impl Default for ClassTypeInferer {
    fn default() -> Self {
        Self::new(InferenceConfig::default())
    }
}

impl<F: FunctionTypeInferer, E: ExprTypeInferer> ClassTypeInferer<F, E> {
    pub fn with_inferers(functions: F, exprs: E, config: InferenceConfig) -> Self {
        Self {
            functions,
            exprs,
            config,
        }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Infer the constructor type of `class` under `env`.
    ///
    /// The result is `Callable(constructor params, Structural(instance))` and
    /// contains no placeholder of `class`.
    pub fn infer(&self, env: &Environment, class: &HirClass) -> PyType {
        let methods: Vec<&HirFunction> = class
            .body
            .iter()
            .filter_map(|item| match &item.stmt {
                HirStmt::FunctionDef(function) => Some(function),
                _ => None,
            })
            .collect();

        // A redefinition replaces the earlier constructor
        let constructor = methods.iter().rposition(|method| method.name == self.config.initializer);

        let class_env = env
            .bind(class.name.clone(), PyType::Placeholder(class.name.clone()))
            .enter_class(class.name.clone());

        let mut shape = Shape::empty();
        let mut constructor_params = Vec::new();
        for (index, method) in methods.iter().enumerate() {
            let signature = self.functions.infer(&class_env, method);
            let method_env = class_env.enter_scope(&signature);

            if let Some(receiver) = method.params.first() {
                for (attr, ty) in self.receiver_assignments(&method_env, &receiver.name, method) {
                    shape.merge_attribute(attr, ty);
                }
            }

            let stripped = signature.without_receiver();
            if Some(index) == constructor {
                constructor_params = stripped.params;
            } else if method.name != self.config.initializer {
                shape.merge_attribute(method.name.clone(), PyType::Callable(stripped));
            }
        }

        debug!(
            "Inferred class '{}' with {} methods and {} attributes",
            class.name,
            methods.len(),
            shape.attrs.len()
        );

        let instance = ShapeRef::pending();
        let mut resolver = PlaceholderResolver::new(&class.name, &instance);
        let resolved = resolver.resolve_shape(&shape).with_name(class.name.clone());
        let params = constructor_params
            .iter()
            .map(|param| Param::new(param.name.clone(), resolver.resolve(&param.ty)))
            .collect();
        instance.fill(resolved);

        PyType::Callable(Signature::new(params, PyType::Structural(instance)))
    }

    /// `(attr, type)` for every `receiver.attr = value` in the method body
    fn receiver_assignments(
        &self,
        env: &Environment,
        receiver: &str,
        method: &HirFunction,
    ) -> Vec<(String, PyType)> {
        let mut assignments = Vec::new();
        for item in walk::flatten_function(method) {
            let HirStmt::Assign { targets, value } = &item.stmt else {
                continue;
            };
            if self.config.suppress_none_assignments && matches!(value, HirExpr::NoneLiteral) {
                continue;
            }
            let attrs: Vec<&str> = targets
                .iter()
                .filter_map(|target| target.receiver_attribute(receiver))
                .collect();
            if attrs.is_empty() {
                continue;
            }
            let ty = self.exprs.infer(env, value);
            assignments.extend(attrs.into_iter().map(|attr| (attr.to_string(), ty.clone())));
        }
        assignments
    }
}

/// Replaces `Placeholder(class)` with a handle to the instance shape.
///
/// Shapes that mention the placeholder are rebuilt (once each, tracked by
/// handle); shapes that do not are shared unchanged.
struct PlaceholderResolver<'a> {
    class: &'a str,
    instance: &'a ShapeRef,
    rebuilt: HashMap<usize, ShapeRef>,
}

impl<'a> PlaceholderResolver<'a> {
    fn new(class: &'a str, instance: &'a ShapeRef) -> Self {
        Self {
            class,
            instance,
            rebuilt: HashMap::new(),
        }
    }

    fn resolve(&mut self, ty: &PyType) -> PyType {
        match ty {
            PyType::Placeholder(name) if name == self.class => {
                PyType::Structural(self.instance.clone())
            }
            PyType::Dynamic | PyType::Placeholder(_) => ty.clone(),
            PyType::Callable(signature) => PyType::Callable(Signature {
                params: signature
                    .params
                    .iter()
                    .map(|param| Param::new(param.name.clone(), self.resolve(&param.ty)))
                    .collect(),
                ret: Box::new(self.resolve(&signature.ret)),
            }),
            PyType::Structural(shape) => PyType::Structural(self.resolve_handle(shape)),
        }
    }

    fn resolve_handle(&mut self, handle: &ShapeRef) -> ShapeRef {
        if let Some(rebuilt) = self.rebuilt.get(&handle.id()) {
            return rebuilt.clone();
        }
        if !PyType::Structural(handle.clone()).mentions_placeholder(self.class) {
            return handle.clone();
        }
        let rebuilt = ShapeRef::pending();
        self.rebuilt.insert(handle.id(), rebuilt.clone());
        if let Some(shape) = handle.shape() {
            let resolved = self.resolve_shape(shape);
            rebuilt.fill(resolved);
        }
        rebuilt
    }

    fn resolve_shape(&mut self, shape: &Shape) -> Shape {
        Shape {
            name: shape.name.clone(),
            attrs: shape
                .attrs
                .iter()
                .map(|(name, ty)| (name.clone(), self.resolve(ty)))
                .collect(),
        }
    }
}
