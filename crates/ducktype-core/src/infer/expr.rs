//! Default expression inference

use super::ExprTypeInferer;
use crate::env::Environment;
use crate::hir::HirExpr;
use crate::types::{attribute_type, call_signature, merge, Param, PyType, Signature};

/// Expression rules structural inference needs:
/// - names resolve through the environment
/// - `e.a` is the type of `a` on the shape of `e`
/// - `f(...)` is the return type of `f`'s call signature; calling the class
///   being inferred yields its placeholder
/// - lambdas become callables, conditional expressions merge both branches
///
/// Everything else, literals included, is `Dynamic`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExprInferer;

impl ExprTypeInferer for DefaultExprInferer {
    fn infer(&self, env: &Environment, expr: &HirExpr) -> PyType {
        match expr {
            HirExpr::Name(name) => env.lookup(name).cloned().unwrap_or(PyType::Dynamic),
            HirExpr::Attribute { value, attr } => {
                attribute_type(&self.infer(env, value), attr).unwrap_or(PyType::Dynamic)
            }
            HirExpr::Call { func, .. } => match self.infer(env, func) {
                PyType::Placeholder(class) => PyType::Placeholder(class),
                callee => {
                    call_signature(&callee).map_or(PyType::Dynamic, |signature| *signature.ret)
                }
            },
            HirExpr::Lambda { params, body } => {
                let params: Vec<Param> = params
                    .iter()
                    .map(|param| Param::dynamic(param.name.clone()))
                    .collect();
                let scope = env.enter_scope(&Signature::new(params.clone(), PyType::Dynamic));
                PyType::callable(params, self.infer(&scope, body))
            }
            HirExpr::IfExp { body, orelse, .. } => {
                merge(&self.infer(env, body), &self.infer(env, orelse))
            }
            HirExpr::NoneLiteral | HirExpr::Literal | HirExpr::Opaque(_) => PyType::Dynamic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::HirParam;
    use crate::types::Shape;

    fn point() -> PyType {
        PyType::structural(Shape::from_attribute_names(["x", "y"]).with_name("Point"))
    }

    #[test]
    fn test_name_lookup() {
        let env = Environment::new().bind("p", point());
        assert_eq!(DefaultExprInferer.infer(&env, &HirExpr::name("p")), point());
        assert_eq!(DefaultExprInferer.infer(&env, &HirExpr::name("unbound")), PyType::Dynamic);
    }

    #[test]
    fn test_literals_are_dynamic() {
        let env = Environment::new();
        assert_eq!(DefaultExprInferer.infer(&env, &HirExpr::Literal), PyType::Dynamic);
        assert_eq!(DefaultExprInferer.infer(&env, &HirExpr::NoneLiteral), PyType::Dynamic);
    }

    #[test]
    fn test_attribute_access() {
        let nested = PyType::structural(Shape::singleton("origin", point()));
        let env = Environment::new().bind("shape", nested);
        let expr = HirExpr::attr(HirExpr::name("shape"), "origin");
        assert_eq!(DefaultExprInferer.infer(&env, &expr), point());

        let missing = HirExpr::attr(HirExpr::name("shape"), "radius");
        assert_eq!(DefaultExprInferer.infer(&env, &missing), PyType::Dynamic);
    }

    #[test]
    fn test_call_returns_signature_return() {
        let env =
            Environment::new().bind("Point", PyType::callable(vec![Param::dynamic("x")], point()));
        let expr = HirExpr::call(HirExpr::name("Point"), vec![HirExpr::Literal]);
        assert_eq!(DefaultExprInferer.infer(&env, &expr), point());
    }

    #[test]
    fn test_call_of_placeholder_constructs_instance() {
        let env = Environment::new().bind("Node", PyType::Placeholder("Node".to_string()));
        let expr = HirExpr::call(HirExpr::name("Node"), vec![]);
        assert_eq!(DefaultExprInferer.infer(&env, &expr), PyType::Placeholder("Node".to_string()));
    }

    #[test]
    fn test_lambda_is_callable() {
        let env = Environment::new().bind("p", point());
        let expr = HirExpr::Lambda {
            params: vec![HirParam::new("unused")],
            body: Box::new(HirExpr::name("p")),
        };
        assert_eq!(
            DefaultExprInferer.infer(&env, &expr),
            PyType::callable(vec![Param::dynamic("unused")], point())
        );
    }

    #[test]
    fn test_conditional_merges_branches() {
        let env = Environment::new()
            .bind("a", PyType::structural(Shape::from_attribute_names(["x"])))
            .bind("b", PyType::structural(Shape::from_attribute_names(["y"])));
        let expr = HirExpr::IfExp {
            test: Box::new(HirExpr::Literal),
            body: Box::new(HirExpr::name("a")),
            orelse: Box::new(HirExpr::name("b")),
        };
        assert_eq!(
            DefaultExprInferer.infer(&env, &expr),
            PyType::structural(Shape::from_attribute_names(["x", "y"]))
        );
    }
}
