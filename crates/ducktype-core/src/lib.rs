//! # Ducktype Core
//!
//! Structural ("duck") type inference for Python classes.
//!
//! A class is described by the attributes its methods assign through the
//! receiver and by the methods themselves; a function parameter is described
//! by the attributes the function body reads from it. Checking a call means
//! checking that the argument's shape provides what the parameter requires.
//!
//! ## Modules
//!
//! - **[`types`]** - Type representation, merge and rendering
//! - **[`compat`]** - Compatibility checking and missing-attribute diagnosis
//! - **[`infer`]** - Expression, function and class inference
//! - **[`analyzer`]** - Module driver producing bindings and diagnostics
//! - **[`ast_bridge`]** - Lowering from the rustpython AST to [`hir`]
//!
//! ## Quick Start
//!
//! ```rust
//! use ducktype_core::{analyze_source, InferenceConfig};
//!
//! let source = "class Duck:\n    def quack(self):\n        return self\n";
//! let report = analyze_source(source, "duck.py", &InferenceConfig::default()).unwrap();
//! assert_eq!(report.binding("Duck").unwrap().to_string(), "() -> Duck");
//! ```

pub mod analyzer;
pub mod ast_bridge;
pub mod compat;
pub mod config;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod hir;
pub mod infer;
pub mod types;
pub mod walk;

pub use analyzer::{ModuleAnalyzer, ModuleReport};
pub use ast_bridge::{parse_module, AstBridge};
pub use compat::{classify, is_compatible, missing_attributes, Compatibility};
pub use config::InferenceConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use env::Environment;
pub use error::{DucktypeError, Result};
pub use infer::{
    ClassTypeInferer, DefaultExprInferer, DefaultFunctionInferer, ExprTypeInferer,
    FunctionTypeInferer,
};
pub use types::{merge, render, Param, PyType, Shape, ShapeRef, Signature};

/// Parse `source` and analyse it as one module
pub fn analyze_source(
    source: &str,
    source_path: &str,
    config: &InferenceConfig,
) -> Result<ModuleReport> {
    let module = parse_module(source, source_path)?;
    Ok(ModuleAnalyzer::new(config.clone()).analyze(&module))
}
