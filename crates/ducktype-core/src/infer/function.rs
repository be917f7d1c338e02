//! Default function signature inference
//!
//! A parameter's type is what the body demands of it: every attribute chain
//! rooted at the parameter adds a nested shape requirement. The return type
//! merges all `return` expressions.

use super::{DefaultExprInferer, ExprTypeInferer, FunctionTypeInferer};
use crate::env::Environment;
use crate::hir::{HirFunction, HirItem, HirStmt};
use crate::types::{merge, Param, PyType, Shape, Signature};
use crate::walk;

#[derive(Debug, Clone, Default)]
pub struct DefaultFunctionInferer<E = DefaultExprInferer> {
    exprs: E,
}

impl DefaultFunctionInferer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: ExprTypeInferer> DefaultFunctionInferer<E> {
    pub fn with_expr_inferer(exprs: E) -> Self {
        Self { exprs }
    }
}

impl<E: ExprTypeInferer> FunctionTypeInferer for DefaultFunctionInferer<E> {
    fn infer(&self, env: &Environment, function: &HirFunction) -> Signature {
        let body = walk::flatten_function(function);
        let receiver = env.receiver_type();

        let params: Vec<Param> = function
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| {
                let ty = match (&receiver, index) {
                    (Some(receiver), 0) => receiver.clone(),
                    _ => parameter_requirement(&param.name, &body),
                };
                Param::new(param.name.clone(), ty)
            })
            .collect();

        let scope = env.enter_scope(&Signature::new(params.clone(), PyType::Dynamic));
        let ret = body
            .iter()
            .filter_map(|item| match &item.stmt {
                HirStmt::Return(Some(value)) => Some(self.exprs.infer(&scope, value)),
                _ => None,
            })
            .fold(PyType::Dynamic, |acc, ty| merge(&acc, &ty));

        tracing::trace!(
            "Inferred signature for '{}' with {} parameters",
            function.name,
            params.len()
        );
        Signature::new(params, ret)
    }
}

/// Structural requirement the statements place on parameter `name`.
///
/// `p.a.b` requires `{a :: {b :: Any}}`; a method call `p.m(...)` requires
/// `{m :: Any}`. A parameter that is never dereferenced is `Dynamic`.
pub fn parameter_requirement(name: &str, body: &[&HirItem]) -> PyType {
    let mut requirement = PyType::Dynamic;
    for item in body {
        for expr in walk::stmt_expressions(&item.stmt) {
            expr.walk(&mut |node| {
                if let Some((root, path)) = node.attribute_path() {
                    if root == name && !path.is_empty() {
                        requirement = merge(&requirement, &path_requirement(&path));
                    }
                }
            });
        }
    }
    requirement
}

fn path_requirement(path: &[&str]) -> PyType {
    path.iter()
        .rev()
        .fold(PyType::Dynamic, |inner, attr| PyType::structural(Shape::singleton(*attr, inner)))
}
