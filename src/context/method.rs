use strum_macros::{Display, IntoStaticStr};

/// How an argument is passed to the woven method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PassMode {
    Value,
    Ref,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: &'static str,
    pub type_name: &'static str,
    pub mode: PassMode,
    /// Declarative constraints attached to the parameter (e.g. `not_null`)
    pub constraints: &'static [&'static str],
}

impl ParameterInfo {
    pub const fn new(name: &'static str, type_name: &'static str, mode: PassMode) -> Self {
        Self {
            name,
            type_name,
            mode,
            constraints: &[],
        }
    }

    pub const fn with_constraints(self, constraints: &'static [&'static str]) -> Self {
        Self {
            constraints,
            ..self
        }
    }

    pub fn has_constraint(&self, constraint: &str) -> bool {
        self.constraints.contains(&constraint)
    }
}

/// Reflective handle of a woven method
///
/// One handle exists per call site, created lazily through a
/// [`MethodSlot`](crate::MethodSlot) and reused by every later invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodHandle {
    type_name: &'static str,
    name: &'static str,
    parameters: &'static [ParameterInfo],
    generic_arguments: &'static [&'static str],
    is_async: bool,
}

impl MethodHandle {
    pub const fn new(
        type_name: &'static str,
        name: &'static str,
        parameters: &'static [ParameterInfo],
        is_async: bool,
    ) -> Self {
        Self {
            type_name,
            name,
            parameters,
            generic_arguments: &[],
            is_async,
        }
    }

    /// Specialize the handle with the call site's generic arguments
    pub const fn with_generic_arguments(self, arguments: &'static [&'static str]) -> Self {
        Self {
            generic_arguments: arguments,
            ..self
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn full_name(&self) -> String {
        format!("{}::{}", self.type_name, self.name)
    }

    pub fn parameters(&self) -> &'static [ParameterInfo] {
        self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&'static ParameterInfo> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn generic_arguments(&self) -> &'static [&'static str] {
        self.generic_arguments
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }
}
