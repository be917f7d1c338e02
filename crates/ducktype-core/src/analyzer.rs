//! Module driver
//!
//! Walks the statements of a module in order, infers classes, functions and
//! assigned names, and checks the calls and attribute reads of module-level
//! code against what has been inferred so far.

use crate::compat::classify;
use crate::config::InferenceConfig;
use crate::diagnostics::Diagnostic;
use crate::env::Environment;
use crate::hir::{AssignTarget, HirExpr, HirModule, HirStmt};
use crate::infer::{
    ClassTypeInferer, DefaultExprInferer, DefaultFunctionInferer, ExprTypeInferer,
    FunctionTypeInferer,
};
use crate::types::{call_signature, render, Param, PyType, Signature};
use crate::walk;
use indexmap::IndexMap;
use tracing::{debug, info};

/// Attribute whose presence makes every attribute read valid
const DYNAMIC_LOOKUP_ATTRIBUTE: &str = "__getattr__";

/// Result of analysing one module
#[derive(Debug, Default)]
pub struct ModuleReport {
    /// Module-level names in order of first binding, with their latest type
    pub bindings: IndexMap<String, PyType>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ModuleReport {
    pub fn binding(&self, name: &str) -> Option<&PyType> {
        self.bindings.get(name)
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

pub struct ModuleAnalyzer {
    classes: ClassTypeInferer,
    functions: DefaultFunctionInferer,
    exprs: DefaultExprInferer,
}

impl Default for ModuleAnalyzer {
    fn default() -> Self {
        Self::new(InferenceConfig::default())
    }
}

impl ModuleAnalyzer {
    pub fn new(config: InferenceConfig) -> Self {
        Self {
            classes: ClassTypeInferer::new(config),
            functions: DefaultFunctionInferer::new(),
            exprs: DefaultExprInferer,
        }
    }

    pub fn config(&self) -> &InferenceConfig {
        self.classes.config()
    }

    pub fn analyze(&self, module: &HirModule) -> ModuleReport {
        let mut env = Environment::new();
        let mut report = ModuleReport::default();

        // Blocks at module level share the module scope
        for item in walk::flatten(&module.body) {
            for expr in walk::stmt_expressions(&item.stmt) {
                self.check_expr(&env, expr, item.line, &mut report.diagnostics);
            }
            for (name, ty) in self.bindings_of(&env, &item.stmt) {
                env = env.bind(name.clone(), ty.clone());
                report.bindings.insert(name, ty);
            }
        }

        info!(
            "Analyzed module: {} bindings, {} diagnostics",
            report.bindings.len(),
            report.diagnostics.len()
        );
        report
    }

    /// Names a module-level statement binds
    fn bindings_of(&self, env: &Environment, stmt: &HirStmt) -> Vec<(String, PyType)> {
        match stmt {
            HirStmt::ClassDef(class) => vec![(class.name.clone(), self.classes.infer(env, class))],
            HirStmt::FunctionDef(function) => {
                let signature = self.functions.infer(env, function);
                vec![(function.name.clone(), PyType::Callable(signature))]
            }
            HirStmt::Assign { targets, value } => {
                let ty = self.exprs.infer(env, value);
                targets
                    .iter()
                    .filter_map(|target| match target {
                        AssignTarget::Name(name) => Some((name.clone(), ty.clone())),
                        _ => None,
                    })
                    .collect()
            }
            // Loop variables take values nothing is known about
            HirStmt::For {
                target: AssignTarget::Name(name),
                ..
            } => vec![(name.clone(), PyType::Dynamic)],
            _ => Vec::new(),
        }
    }

    fn check_expr(
        &self,
        env: &Environment,
        expr: &HirExpr,
        line: usize,
        out: &mut Vec<Diagnostic>,
    ) {
        match expr {
            HirExpr::Lambda { params, body } => {
                let params = params
                    .iter()
                    .map(|param| Param::dynamic(param.name.clone()))
                    .collect();
                let scope = env.enter_scope(&Signature::new(params, PyType::Dynamic));
                self.check_expr(&scope, body, line, out);
                return;
            }
            HirExpr::Call { func, args, .. } => {
                if let Some(signature) = call_signature(&self.exprs.infer(env, func)) {
                    for (arg, param) in args.iter().zip(&signature.params) {
                        let observed = self.exprs.infer(env, arg);
                        let found =
                            Diagnostic::from_compatibility(line, &classify(&observed, &param.ty));
                        if !found.is_empty() {
                            debug!("Argument for parameter '{}' fails its requirement", param.name);
                        }
                        out.extend(found);
                    }
                }
            }
            HirExpr::Attribute { value, attr } => {
                let observed = self.exprs.infer(env, value);
                if let Some(shape) = observed.as_shape() {
                    let missing = !shape.is_empty()
                        && shape.attr(attr).is_none()
                        && shape.attr(DYNAMIC_LOOKUP_ATTRIBUTE).is_none();
                    if missing {
                        out.push(Diagnostic::attribute_error(
                            line,
                            &render(&observed),
                            &[attr.clone()],
                        ));
                    }
                }
            }
            _ => {}
        }
        for child in expr.children() {
            self.check_expr(env, child, line, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::hir::{block, HirClass, HirFunction, HirItem, HirParam};

    fn item(line: usize, stmt: HirStmt) -> HirItem {
        HirItem::new(line, stmt)
    }

    fn assign(name: &str, value: HirExpr) -> HirStmt {
        HirStmt::Assign {
            targets: vec![AssignTarget::Name(name.to_string())],
            value,
        }
    }

    /// `class Point: def __init__(self): self.x = 0; self.y = 0`
    fn point_class() -> HirStmt {
        let field = |attr: &str| HirStmt::Assign {
            targets: vec![AssignTarget::Attribute {
                value: HirExpr::name("self"),
                attr: attr.to_string(),
            }],
            value: HirExpr::Literal,
        };
        HirStmt::ClassDef(HirClass {
            name: "Point".to_string(),
            body: block([HirStmt::FunctionDef(HirFunction {
                name: "__init__".to_string(),
                params: vec![HirParam::new("self")],
                body: block([field("x"), field("y")]),
            })]),
        })
    }

    /// `def norm(p): return p.x.real`
    fn norm_function() -> HirStmt {
        HirStmt::FunctionDef(HirFunction {
            name: "norm".to_string(),
            params: vec![HirParam::new("p")],
            body: block([HirStmt::Return(Some(HirExpr::attr(
                HirExpr::attr(HirExpr::name("p"), "x"),
                "real",
            )))]),
        })
    }

    #[test]
    fn test_bindings_in_order() {
        let module = HirModule {
            body: vec![
                item(1, point_class()),
                item(2, norm_function()),
                item(3, assign("p", HirExpr::call(HirExpr::name("Point"), vec![]))),
            ],
        };
        let report = ModuleAnalyzer::default().analyze(&module);
        let names: Vec<&str> = report.bindings.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Point", "norm", "p"]);
        assert_eq!(report.binding("p").map(render).as_deref(), Some("Point"));
        assert!(!report.has_diagnostics());
    }

    #[test]
    fn test_missing_nested_attribute_in_argument() {
        let module = HirModule {
            body: vec![
                item(1, point_class()),
                item(2, norm_function()),
                item(
                    3,
                    HirStmt::Expr(HirExpr::call(
                        HirExpr::name("norm"),
                        vec![HirExpr::call(HirExpr::name("Point"), vec![])],
                    )),
                ),
            ],
        };
        let report = ModuleAnalyzer::default().analyze(&module);
        // `x` is assigned a literal, so only `Dynamic` is known about it
        assert!(!report.has_diagnostics(), "{:?}", report.diagnostics);
    }

    #[test]
    fn test_missing_attribute_in_argument() {
        let needs_z = HirStmt::FunctionDef(HirFunction {
            name: "depth".to_string(),
            params: vec![HirParam::new("p")],
            body: block([HirStmt::Return(Some(HirExpr::attr(HirExpr::name("p"), "z")))]),
        });
        let module = HirModule {
            body: vec![
                item(1, point_class()),
                item(2, needs_z),
                item(
                    7,
                    HirStmt::Expr(HirExpr::call(
                        HirExpr::name("depth"),
                        vec![HirExpr::call(HirExpr::name("Point"), vec![])],
                    )),
                ),
            ],
        };
        let report = ModuleAnalyzer::default().analyze(&module);
        assert_eq!(report.diagnostics.len(), 1);
        let diagnostic = &report.diagnostics[0];
        assert_eq!(diagnostic.line, 7);
        assert_eq!(diagnostic.kind, DiagnosticKind::AttributeError);
        assert_eq!(diagnostic.message, "possible attribute error: `Point` has no attribute `z`");
    }

    #[test]
    fn test_attribute_read_on_instance() {
        let module = HirModule {
            body: vec![
                item(1, point_class()),
                item(2, assign("p", HirExpr::call(HirExpr::name("Point"), vec![]))),
                item(3, HirStmt::Expr(HirExpr::attr(HirExpr::name("p"), "x"))),
                item(4, HirStmt::Expr(HirExpr::attr(HirExpr::name("p"), "w"))),
            ],
        };
        let report = ModuleAnalyzer::default().analyze(&module);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].line, 4);
    }

    #[test]
    fn test_lambda_parameters_shadow_module_names() {
        let lambda = HirExpr::Lambda {
            params: vec![HirParam::new("p")],
            body: Box::new(HirExpr::attr(HirExpr::name("p"), "w")),
        };
        let module = HirModule {
            body: vec![
                item(1, point_class()),
                item(2, assign("p", HirExpr::call(HirExpr::name("Point"), vec![]))),
                item(3, assign("f", lambda)),
            ],
        };
        let report = ModuleAnalyzer::default().analyze(&module);
        assert!(!report.has_diagnostics(), "{:?}", report.diagnostics);
    }

    #[test]
    fn test_callable_argument_for_shape_parameter() {
        let module = HirModule {
            body: vec![
                item(1, norm_function()),
                item(
                    2,
                    HirStmt::Expr(HirExpr::call(
                        HirExpr::name("norm"),
                        vec![HirExpr::name("norm")],
                    )),
                ),
            ],
        };
        let report = ModuleAnalyzer::default().analyze(&module);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::TypeError);
    }

    #[test]
    fn test_statements_in_module_blocks_report_their_own_line() {
        let module = HirModule {
            body: vec![
                item(1, point_class()),
                item(2, assign("p", HirExpr::call(HirExpr::name("Point"), vec![]))),
                item(
                    3,
                    HirStmt::If {
                        test: HirExpr::Literal,
                        body: vec![
                            item(4, HirStmt::Expr(HirExpr::attr(HirExpr::name("p"), "x"))),
                            item(5, HirStmt::Expr(HirExpr::attr(HirExpr::name("p"), "w"))),
                        ],
                        orelse: vec![item(
                            7,
                            HirStmt::Expr(HirExpr::attr(HirExpr::name("p"), "v")),
                        )],
                    },
                ),
            ],
        };
        let report = ModuleAnalyzer::default().analyze(&module);
        let lines: Vec<usize> = report.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![5, 7]);
    }

    #[test]
    fn test_rebinding_keeps_first_position() {
        let module = HirModule::from_stmts(vec![
            assign("a", HirExpr::Literal),
            assign("b", HirExpr::Literal),
            assign("a", HirExpr::name("b")),
        ]);
        let report = ModuleAnalyzer::default().analyze(&module);
        let names: Vec<&str> = report.bindings.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
