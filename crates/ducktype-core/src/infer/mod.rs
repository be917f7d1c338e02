//! Type inference for expressions, functions and classes
//!
//! Class inference is the orchestrator; it delegates method signatures to a
//! [`FunctionTypeInferer`] and right-hand sides to an [`ExprTypeInferer`],
//! and combines their results only through [`merge`](crate::types::merge).
//! The default inferers cover attribute access, calls and parameter
//! requirements; any of them can be swapped for a richer implementation.

mod class;
mod expr;
mod function;

pub use class::ClassTypeInferer;
pub use expr::DefaultExprInferer;
pub use function::{parameter_requirement, DefaultFunctionInferer};

use crate::env::Environment;
use crate::hir::{HirExpr, HirFunction};
use crate::types::{PyType, Signature};

/// Infers the type of one expression. Never fails: unknown forms are `Dynamic`.
pub trait ExprTypeInferer {
    fn infer(&self, env: &Environment, expr: &HirExpr) -> PyType;
}

/// Infers the positional signature of a function or method
pub trait FunctionTypeInferer {
    fn infer(&self, env: &Environment, function: &HirFunction) -> Signature;
}

impl<T: ExprTypeInferer + ?Sized> ExprTypeInferer for &T {
    fn infer(&self, env: &Environment, expr: &HirExpr) -> PyType {
        (**self).infer(env, expr)
    }
}

impl<T: FunctionTypeInferer + ?Sized> FunctionTypeInferer for &T {
    fn infer(&self, env: &Environment, function: &HirFunction) -> Signature {
        (**self).infer(env, function)
    }
}
