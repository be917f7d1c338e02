//! High-level intermediate representation
//!
//! The subset of a Python module that structural inference looks at. The
//! [`AstBridge`](crate::ast_bridge::AstBridge) lowers parsed Python into it;
//! constructs inference has no rule for are kept as `Other`/`Opaque` nodes so
//! their sub-expressions remain visible to the checks.

/// A parsed module
#[derive(Debug, Clone, Default)]
pub struct HirModule {
    pub body: Vec<HirItem>,
}

/// A statement with its 1-based source line (0 when unknown)
#[derive(Debug, Clone)]
pub struct HirItem {
    pub line: usize,
    pub stmt: HirStmt,
}

impl HirItem {
    pub fn new(line: usize, stmt: HirStmt) -> Self {
        Self { line, stmt }
    }
}

impl From<HirStmt> for HirItem {
    fn from(stmt: HirStmt) -> Self {
        Self::new(0, stmt)
    }
}

/// Statements without line information as a block
pub fn block(stmts: impl IntoIterator<Item = HirStmt>) -> Vec<HirItem> {
    stmts.into_iter().map(HirItem::from).collect()
}

impl HirModule {
    /// Module from statements without line information
    pub fn from_stmts(stmts: Vec<HirStmt>) -> Self {
        Self { body: block(stmts) }
    }
}

#[derive(Debug, Clone)]
pub struct HirClass {
    pub name: String,
    pub body: Vec<HirItem>,
}

#[derive(Debug, Clone)]
pub struct HirFunction {
    pub name: String,
    /// Positional parameters in declaration order
    pub params: Vec<HirParam>,
    pub body: Vec<HirItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HirParam {
    pub name: String,
}

impl HirParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone)]
pub enum HirStmt {
    FunctionDef(HirFunction),
    ClassDef(HirClass),
    /// `t1 = t2 = value`
    Assign {
        targets: Vec<AssignTarget>,
        value: HirExpr,
    },
    Return(Option<HirExpr>),
    Expr(HirExpr),
    If {
        test: HirExpr,
        body: Vec<HirItem>,
        orelse: Vec<HirItem>,
    },
    While {
        test: HirExpr,
        body: Vec<HirItem>,
        orelse: Vec<HirItem>,
    },
    For {
        target: AssignTarget,
        iter: HirExpr,
        body: Vec<HirItem>,
        orelse: Vec<HirItem>,
    },
    With {
        items: Vec<HirExpr>,
        body: Vec<HirItem>,
    },
    Try {
        body: Vec<HirItem>,
        handlers: Vec<Vec<HirItem>>,
        orelse: Vec<HirItem>,
        finalbody: Vec<HirItem>,
    },
    Other,
}

#[derive(Debug, Clone)]
pub enum AssignTarget {
    Name(String),
    /// `value.attr = ...`
    Attribute { value: HirExpr, attr: String },
    Other(HirExpr),
}

impl AssignTarget {
    /// Attribute assigned through `receiver`, for targets of the form `receiver.attr`
    pub fn receiver_attribute(&self, receiver: &str) -> Option<&str> {
        match self {
            AssignTarget::Attribute {
                value: HirExpr::Name(base),
                attr,
            } if base == receiver => Some(attr.as_str()),
            _ => None,
        }
    }

    /// Expression read when the target is assigned (`a.b` in `a.b.c = v`)
    pub fn read_expr(&self) -> Option<&HirExpr> {
        match self {
            AssignTarget::Name(_) => None,
            AssignTarget::Attribute { value, .. } => Some(value),
            AssignTarget::Other(expr) => Some(expr),
        }
    }
}

#[derive(Debug, Clone)]
pub enum HirExpr {
    Name(String),
    Attribute {
        value: Box<HirExpr>,
        attr: String,
    },
    Call {
        func: Box<HirExpr>,
        args: Vec<HirExpr>,
        keywords: Vec<HirExpr>,
    },
    Lambda {
        params: Vec<HirParam>,
        body: Box<HirExpr>,
    },
    IfExp {
        test: Box<HirExpr>,
        body: Box<HirExpr>,
        orelse: Box<HirExpr>,
    },
    NoneLiteral,
    Literal,
    /// Any other expression, keeping its sub-expressions
    Opaque(Vec<HirExpr>),
}

impl HirExpr {
    pub fn name(name: impl Into<String>) -> Self {
        HirExpr::Name(name.into())
    }

    pub fn attr(value: HirExpr, attr: impl Into<String>) -> Self {
        HirExpr::Attribute {
            value: Box::new(value),
            attr: attr.into(),
        }
    }

    pub fn call(func: HirExpr, args: Vec<HirExpr>) -> Self {
        HirExpr::Call {
            func: Box::new(func),
            args,
            keywords: Vec::new(),
        }
    }

    /// Direct sub-expressions in evaluation order
    pub fn children(&self) -> Vec<&HirExpr> {
        match self {
            HirExpr::Name(_) | HirExpr::NoneLiteral | HirExpr::Literal => Vec::new(),
            HirExpr::Attribute { value, .. } => vec![value.as_ref()],
            HirExpr::Call { func, args, keywords } => {
                let mut children = vec![func.as_ref()];
                children.extend(args);
                children.extend(keywords);
                children
            }
            HirExpr::Lambda { body, .. } => vec![body.as_ref()],
            HirExpr::IfExp { test, body, orelse } => {
                vec![test.as_ref(), body.as_ref(), orelse.as_ref()]
            }
            HirExpr::Opaque(children) => children.iter().collect(),
        }
    }

    /// Pre-order traversal over this expression and all its sub-expressions
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a HirExpr)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// `root.a.b` as `("root", ["a", "b"])`
    pub fn attribute_path(&self) -> Option<(&str, Vec<&str>)> {
        match self {
            HirExpr::Name(root) => Some((root.as_str(), Vec::new())),
            HirExpr::Attribute { value, attr } => {
                let (root, mut path) = value.attribute_path()?;
                path.push(attr.as_str());
                Some((root, path))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receiver_attribute() {
        let target = AssignTarget::Attribute {
            value: HirExpr::name("self"),
            attr: "count".to_string(),
        };
        assert_eq!(target.receiver_attribute("self"), Some("count"));
        assert_eq!(target.receiver_attribute("this"), None);

        let deep = AssignTarget::Attribute {
            value: HirExpr::attr(HirExpr::name("self"), "inner"),
            attr: "count".to_string(),
        };
        assert_eq!(deep.receiver_attribute("self"), None);
    }

    #[test]
    fn test_attribute_path() {
        let expr = HirExpr::attr(HirExpr::attr(HirExpr::name("p"), "a"), "b");
        assert_eq!(expr.attribute_path(), Some(("p", vec!["a", "b"])));

        let call = HirExpr::attr(HirExpr::call(HirExpr::name("f"), vec![]), "x");
        assert_eq!(call.attribute_path(), None);
    }

    #[test]
    fn test_walk_visits_nested_expressions() {
        let expr = HirExpr::call(
            HirExpr::attr(HirExpr::name("obj"), "run"),
            vec![HirExpr::Opaque(vec![HirExpr::name("x"), HirExpr::Literal])],
        );
        let mut names = Vec::new();
        expr.walk(&mut |e| {
            if let HirExpr::Name(n) = e {
                names.push(n.as_str());
            }
        });
        assert_eq!(names, vec!["obj", "x"]);
    }
}
