//! Statement flattening
//!
//! Inference looks at a function body as one ordered sequence of statements,
//! regardless of the blocks they sit in. Nested function and class bodies are
//! separate scopes and are not entered.

use crate::hir::{HirExpr, HirFunction, HirItem, HirStmt};

/// Statements of `body` and of every nested block, in source order, each
/// with its own line
pub fn flatten(body: &[HirItem]) -> Vec<&HirItem> {
    let mut out = Vec::new();
    flatten_into(body, &mut out);
    out
}

/// [`flatten`] over a function's body
pub fn flatten_function(function: &HirFunction) -> Vec<&HirItem> {
    flatten(&function.body)
}

fn flatten_into<'a>(body: &'a [HirItem], out: &mut Vec<&'a HirItem>) {
    for item in body {
        out.push(item);
        match &item.stmt {
            HirStmt::If { body, orelse, .. }
            | HirStmt::While { body, orelse, .. }
            | HirStmt::For { body, orelse, .. } => {
                flatten_into(body, out);
                flatten_into(orelse, out);
            }
            HirStmt::With { body, .. } => flatten_into(body, out),
            HirStmt::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                flatten_into(body, out);
                for handler in handlers {
                    flatten_into(handler, out);
                }
                flatten_into(orelse, out);
                flatten_into(finalbody, out);
            }
            HirStmt::FunctionDef(_)
            | HirStmt::ClassDef(_)
            | HirStmt::Assign { .. }
            | HirStmt::Return(_)
            | HirStmt::Expr(_)
            | HirStmt::Other => {}
        }
    }
}

/// Expressions a statement itself evaluates, excluding those of nested blocks.
///
/// For assignments this is the value plus whatever the targets read
/// (`obj.inner` in `obj.inner.x = v`).
pub fn stmt_expressions(stmt: &HirStmt) -> Vec<&HirExpr> {
    match stmt {
        HirStmt::Assign { targets, value } => {
            let mut exprs = vec![value];
            exprs.extend(targets.iter().filter_map(|target| target.read_expr()));
            exprs
        }
        HirStmt::Return(value) => value.iter().collect(),
        HirStmt::Expr(expr) => vec![expr],
        HirStmt::If { test, .. } | HirStmt::While { test, .. } => vec![test],
        HirStmt::For { target, iter, .. } => {
            let mut exprs = vec![iter];
            exprs.extend(target.read_expr());
            exprs
        }
        HirStmt::With { items, .. } => items.iter().collect(),
        HirStmt::FunctionDef(_) | HirStmt::ClassDef(_) | HirStmt::Try { .. } | HirStmt::Other => {
            Vec::new()
        }
    }
}
