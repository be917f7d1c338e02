//! Deterministic textual form of types for diagnostics

use super::shape::ShapeRef;
use super::PyType;

const INDENT: &str = "  ";

/// Render a type for display.
///
/// `Dynamic` prints as `Any`, named shapes and placeholders print their name,
/// callables print as `(T1, T2) -> R`. Anonymous shapes print inline as
/// `{a :: T, b :: U}` unless one of their attributes is itself a non-empty
/// anonymous shape, in which case each attribute goes on its own indented
/// line. A shape met again while it is being printed renders as `...`.
pub fn render(ty: &PyType) -> String {
    Renderer::default().render(ty, 0)
}

#[derive(Default)]
struct Renderer {
    open: Vec<usize>,
}

impl Renderer {
    fn render(&mut self, ty: &PyType, depth: usize) -> String {
        match ty {
            PyType::Dynamic => "Any".to_string(),
            PyType::Placeholder(class) => class.clone(),
            PyType::Callable(signature) => {
                let params: Vec<String> = signature
                    .param_types()
                    .map(|param| self.render(param, depth))
                    .collect();
                format!("({}) -> {}", params.join(", "), self.render(&signature.ret, depth))
            }
            PyType::Structural(shape) => self.render_shape(shape, depth),
        }
    }

    fn render_shape(&mut self, shape: &ShapeRef, depth: usize) -> String {
        if let Some(name) = shape.name() {
            return name.to_string();
        }
        if shape.is_empty() {
            return "{}".to_string();
        }
        if self.open.contains(&shape.id()) {
            return "...".to_string();
        }

        self.open.push(shape.id());
        let multiline = shape.attrs().any(|(_, ty)| is_anonymous_shape(ty));
        let rendered = if multiline {
            let indent = INDENT.repeat(depth + 1);
            let fields: Vec<String> = shape
                .attrs()
                .map(|(name, ty)| format!("{indent}{name} :: {}", self.render(ty, depth + 1)))
                .collect();
            format!("{{\n{}\n{}}}", fields.join(",\n"), INDENT.repeat(depth))
        } else {
            let fields: Vec<String> = shape
                .attrs()
                .map(|(name, ty)| format!("{name} :: {}", self.render(ty, depth)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        };
        self.open.pop();
        rendered
    }
}

fn is_anonymous_shape(ty: &PyType) -> bool {
    matches!(ty, PyType::Structural(shape) if shape.name().is_none() && !shape.is_empty())
}
