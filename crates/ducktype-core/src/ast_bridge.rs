//! Bridge from the rustpython AST to HIR

use crate::error::{DucktypeError, Result};
use crate::hir::{
    AssignTarget, HirClass, HirExpr, HirFunction, HirItem, HirModule, HirParam, HirStmt,
};
use rustpython_ast::{self as ast, Ranged, Suite};
use rustpython_parser::Parse;

/// Parse Python source and lower it to HIR
pub fn parse_module(source: &str, source_path: &str) -> Result<HirModule> {
    let statements = Suite::parse(source, source_path).map_err(|e| DucktypeError::Parse {
        path: source_path.to_string(),
        message: e.to_string(),
    })?;
    Ok(AstBridge::new().with_source(source.to_string()).python_to_hir(statements))
}

/// Lowers parsed statements to HIR.
///
/// With the Python source attached, every statement carries its line
/// number; without it statements are reported as line 0.
#[derive(Debug, Default)]
pub struct AstBridge {
    source: Option<String>,
}

impl AstBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: String) -> Self {
        self.source = Some(source);
        self
    }

    pub fn python_to_hir(&self, statements: Suite) -> HirModule {
        HirModule {
            body: self.convert_body(statements),
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        match &self.source {
            Some(source) => {
                let end = offset.min(source.len());
                source.as_bytes()[..end].iter().filter(|&&byte| byte == b'\n').count() + 1
            }
            None => 0,
        }
    }

    fn convert_body(&self, body: Vec<ast::Stmt>) -> Vec<HirItem> {
        body.into_iter()
            .map(|stmt| {
                let line = self.line_of(usize::from(stmt.range().start()));
                HirItem::new(line, self.convert_stmt(stmt))
            })
            .collect()
    }

    fn convert_stmt(&self, stmt: ast::Stmt) -> HirStmt {
        match stmt {
            ast::Stmt::FunctionDef(def) => {
                HirStmt::FunctionDef(self.convert_function(def.name, &def.args, def.body))
            }
            ast::Stmt::AsyncFunctionDef(def) => {
                HirStmt::FunctionDef(self.convert_function(def.name, &def.args, def.body))
            }
            ast::Stmt::ClassDef(def) => HirStmt::ClassDef(HirClass {
                name: def.name.as_str().to_string(),
                body: self.convert_body(def.body),
            }),
            ast::Stmt::Assign(assign) => HirStmt::Assign {
                targets: assign
                    .targets
                    .into_iter()
                    .map(|target| self.convert_target(target))
                    .collect(),
                value: self.convert_expr(*assign.value),
            },
            ast::Stmt::AnnAssign(assign) => match assign.value {
                Some(value) => HirStmt::Assign {
                    targets: vec![self.convert_target(*assign.target)],
                    value: self.convert_expr(*value),
                },
                None => HirStmt::Other,
            },
            ast::Stmt::AugAssign(assign) => {
                let current = self.convert_expr((*assign.target).clone());
                HirStmt::Assign {
                    targets: vec![self.convert_target(*assign.target)],
                    value: HirExpr::Opaque(vec![current, self.convert_expr(*assign.value)]),
                }
            }
            ast::Stmt::Return(ret) => {
                HirStmt::Return(ret.value.map(|value| self.convert_expr(*value)))
            }
            ast::Stmt::Expr(expr) => HirStmt::Expr(self.convert_expr(*expr.value)),
            ast::Stmt::If(stmt) => HirStmt::If {
                test: self.convert_expr(*stmt.test),
                body: self.convert_body(stmt.body),
                orelse: self.convert_body(stmt.orelse),
            },
            ast::Stmt::While(stmt) => HirStmt::While {
                test: self.convert_expr(*stmt.test),
                body: self.convert_body(stmt.body),
                orelse: self.convert_body(stmt.orelse),
            },
            ast::Stmt::For(stmt) => HirStmt::For {
                target: self.convert_target(*stmt.target),
                iter: self.convert_expr(*stmt.iter),
                body: self.convert_body(stmt.body),
                orelse: self.convert_body(stmt.orelse),
            },
            ast::Stmt::AsyncFor(stmt) => HirStmt::For {
                target: self.convert_target(*stmt.target),
                iter: self.convert_expr(*stmt.iter),
                body: self.convert_body(stmt.body),
                orelse: self.convert_body(stmt.orelse),
            },
            ast::Stmt::With(stmt) => HirStmt::With {
                items: self.convert_with_items(stmt.items),
                body: self.convert_body(stmt.body),
            },
            ast::Stmt::AsyncWith(stmt) => HirStmt::With {
                items: self.convert_with_items(stmt.items),
                body: self.convert_body(stmt.body),
            },
            ast::Stmt::Try(stmt) => HirStmt::Try {
                body: self.convert_body(stmt.body),
                handlers: self.convert_handlers(stmt.handlers),
                orelse: self.convert_body(stmt.orelse),
                finalbody: self.convert_body(stmt.finalbody),
            },
            ast::Stmt::TryStar(stmt) => HirStmt::Try {
                body: self.convert_body(stmt.body),
                handlers: self.convert_handlers(stmt.handlers),
                orelse: self.convert_body(stmt.orelse),
                finalbody: self.convert_body(stmt.finalbody),
            },
            _ => HirStmt::Other,
        }
    }

    fn convert_handlers(&self, handlers: Vec<ast::ExceptHandler>) -> Vec<Vec<HirItem>> {
        handlers
            .into_iter()
            .map(|handler| match handler {
                ast::ExceptHandler::ExceptHandler(handler) => self.convert_body(handler.body),
            })
            .collect()
    }

    fn convert_with_items(&self, items: Vec<ast::WithItem>) -> Vec<HirExpr> {
        items
            .into_iter()
            .map(|item| self.convert_expr(item.context_expr))
            .collect()
    }

    fn convert_function(
        &self,
        name: ast::Identifier,
        args: &ast::Arguments,
        body: Vec<ast::Stmt>,
    ) -> HirFunction {
        HirFunction {
            name: name.as_str().to_string(),
            params: convert_params(args),
            body: self.convert_body(body),
        }
    }

    fn convert_target(&self, target: ast::Expr) -> AssignTarget {
        match target {
            ast::Expr::Name(name) => AssignTarget::Name(name.id.as_str().to_string()),
            ast::Expr::Attribute(attr) => AssignTarget::Attribute {
                value: self.convert_expr(*attr.value),
                attr: attr.attr.as_str().to_string(),
            },
            other => AssignTarget::Other(self.convert_expr(other)),
        }
    }

    fn convert_exprs(&self, exprs: Vec<ast::Expr>) -> Vec<HirExpr> {
        exprs.into_iter().map(|expr| self.convert_expr(expr)).collect()
    }

    fn convert_expr(&self, expr: ast::Expr) -> HirExpr {
        match expr {
            ast::Expr::Name(name) => HirExpr::Name(name.id.as_str().to_string()),
            ast::Expr::Attribute(attr) => HirExpr::Attribute {
                value: Box::new(self.convert_expr(*attr.value)),
                attr: attr.attr.as_str().to_string(),
            },
            ast::Expr::Call(call) => HirExpr::Call {
                func: Box::new(self.convert_expr(*call.func)),
                args: self.convert_exprs(call.args),
                keywords: call
                    .keywords
                    .into_iter()
                    .map(|keyword| self.convert_expr(keyword.value))
                    .collect(),
            },
            ast::Expr::Constant(constant) => match constant.value {
                ast::Constant::None => HirExpr::NoneLiteral,
                _ => HirExpr::Literal,
            },
            ast::Expr::Lambda(lambda) => HirExpr::Lambda {
                params: convert_params(&lambda.args),
                body: Box::new(self.convert_expr(*lambda.body)),
            },
            ast::Expr::IfExp(ifexp) => HirExpr::IfExp {
                test: Box::new(self.convert_expr(*ifexp.test)),
                body: Box::new(self.convert_expr(*ifexp.body)),
                orelse: Box::new(self.convert_expr(*ifexp.orelse)),
            },
            ast::Expr::BinOp(binop) => {
                HirExpr::Opaque(vec![
                    self.convert_expr(*binop.left),
                    self.convert_expr(*binop.right),
                ])
            }
            ast::Expr::BoolOp(boolop) => HirExpr::Opaque(self.convert_exprs(boolop.values)),
            ast::Expr::UnaryOp(unary) => HirExpr::Opaque(vec![self.convert_expr(*unary.operand)]),
            ast::Expr::Compare(compare) => {
                let mut children = vec![self.convert_expr(*compare.left)];
                children.extend(self.convert_exprs(compare.comparators));
                HirExpr::Opaque(children)
            }
            ast::Expr::List(list) => HirExpr::Opaque(self.convert_exprs(list.elts)),
            ast::Expr::Tuple(tuple) => HirExpr::Opaque(self.convert_exprs(tuple.elts)),
            ast::Expr::Set(set) => HirExpr::Opaque(self.convert_exprs(set.elts)),
            ast::Expr::Dict(dict) => {
                let mut children: Vec<HirExpr> = dict
                    .keys
                    .into_iter()
                    .flatten()
                    .map(|key| self.convert_expr(key))
                    .collect();
                children.extend(self.convert_exprs(dict.values));
                HirExpr::Opaque(children)
            }
            ast::Expr::Subscript(subscript) => {
                HirExpr::Opaque(vec![
                    self.convert_expr(*subscript.value),
                    self.convert_expr(*subscript.slice),
                ])
            }
            ast::Expr::Await(await_expr) => {
                HirExpr::Opaque(vec![self.convert_expr(*await_expr.value)])
            }
            ast::Expr::Starred(starred) => HirExpr::Opaque(vec![self.convert_expr(*starred.value)]),
            _ => HirExpr::Opaque(Vec::new()),
        }
    }
}

/// Positional parameters; `*args`, `**kwargs` and keyword-only parameters are
/// not part of the positional signature
fn convert_params(args: &ast::Arguments) -> Vec<HirParam> {
    args.posonlyargs
        .iter()
        .chain(&args.args)
        .map(|arg| HirParam::new(arg.def.arg.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> HirModule {
        parse_module(source, "<test>").expect("valid python")
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = parse_module("def broken(:\n", "broken.py");
        assert!(matches!(
            result,
            Err(DucktypeError::Parse { ref path, .. }) if path == "broken.py"
        ));
    }

    #[test]
    fn test_lines_of_module_items() {
        let module = parse("x = 1\n\nclass A:\n    pass\n\ndef f():\n    return x\n");
        let lines: Vec<usize> = module.body.iter().map(|item| item.line).collect();
        assert_eq!(lines, vec![1, 3, 6]);
    }

    #[test]
    fn test_lines_of_nested_statements() {
        let module = parse("if ready:\n    start()\nelse:\n\n    stop()\n");
        let HirStmt::If { body, orelse, .. } = &module.body[0].stmt else {
            panic!("expected if, got {:?}", module.body[0].stmt);
        };
        assert_eq!(module.body[0].line, 1);
        assert_eq!(body[0].line, 2);
        assert_eq!(orelse[0].line, 5);
    }

    #[test]
    fn test_class_with_methods() {
        let module = parse(
            r#"
class Counter:
    def __init__(self, start, *rest, step=1, **extra):
        self.count = start

    async def tick(self):
        self.count += 1
"#,
        );
        let HirStmt::ClassDef(class) = &module.body[0].stmt else {
            panic!("expected class, got {:?}", module.body[0].stmt);
        };
        assert_eq!(class.name, "Counter");
        assert_eq!(class.body.len(), 2);

        let HirStmt::FunctionDef(init) = &class.body[0].stmt else {
            panic!("expected __init__");
        };
        let params: Vec<&str> = init.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(params, vec!["self", "start", "step"]);

        let HirStmt::FunctionDef(tick) = &class.body[1].stmt else {
            panic!("expected tick");
        };
        assert_eq!(tick.body[0].line, 7);
        let HirStmt::Assign { targets, value } = &tick.body[0].stmt else {
            panic!("augmented assignment lowers to an assignment");
        };
        assert_eq!(targets[0].receiver_attribute("self"), Some("count"));
        assert!(matches!(value, HirExpr::Opaque(children) if children.len() == 2));
    }

    #[test]
    fn test_none_literal_is_distinguished() {
        let module = parse("a = None\nb = 3\n");
        let values: Vec<bool> = module
            .body
            .iter()
            .map(|item| matches!(&item.stmt, HirStmt::Assign { value: HirExpr::NoneLiteral, .. }))
            .collect();
        assert_eq!(values, vec![true, false]);
    }

    #[test]
    fn test_nested_calls_survive_opaque_expressions() {
        let module = parse("result = [make(x.a) for x in items] + [build(1)]\n");
        let HirStmt::Assign { value, .. } = &module.body[0].stmt else {
            panic!("expected assignment");
        };
        let mut calls = 0;
        value.walk(&mut |expr| {
            if matches!(expr, HirExpr::Call { .. }) {
                calls += 1;
            }
        });
        // Comprehension bodies are opaque; the list literal keeps its call
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_without_source_lines_are_zero() {
        let statements = Suite::parse("pass\n", "<test>").unwrap();
        let module = AstBridge::new().python_to_hir(statements);
        assert_eq!(module.body[0].line, 0);
    }
}
