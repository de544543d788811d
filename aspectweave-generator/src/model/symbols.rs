use super::{AttributeUsage, Location, MethodIdx, TypeIdx};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TypeKind {
    Class,
    Interface,
    Attribute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Accessibility {
    Public,
    Internal,
    ProtectedInternal,
    Protected,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PassMode {
    Value,
    Ref,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asyncness {
    #[default]
    Sync,
    Async,
}

/// Textual type reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    /// Cannot be captured into a heap-held snapshot (borrowed views, guards)
    #[serde(default)]
    pub stack_only: bool,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stack_only: false,
        }
    }

    /// `Option<T>` arguments are captured with their presence recorded
    pub fn is_option(&self) -> bool {
        let name = self.name.trim();
        ["Option<", "std::option::Option<", "::std::option::Option<", "core::option::Option<"]
            .iter()
            .any(|prefix| name.starts_with(prefix))
    }
}

/// What the method hands back to its caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ReturnShape {
    #[serde(default)]
    pub asyncness: Asyncness,
    /// Success value type; `None` for unit
    #[serde(default)]
    pub value: Option<TypeRef>,
    /// Error type of a `Result`-returning method
    #[serde(default)]
    pub error: Option<TypeRef>,
}

impl ReturnShape {
    pub fn is_async(&self) -> bool {
        self.asyncness == Asyncness::Async
    }

    pub fn is_void(&self) -> bool {
        self.value.is_none()
    }

    pub fn is_fallible(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default = "default_pass_mode")]
    pub mode: PassMode,
    /// Parameter-level markers such as `not_null`
    #[serde(default)]
    pub constraints: Vec<String>,
}

fn default_pass_mode() -> PassMode {
    PassMode::Value
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericParam {
    pub name: String,
    #[serde(default)]
    pub bounds: Vec<String>,
}

/// Method descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSymbol {
    pub owner: TypeIdx,
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub returns: ReturnShape,
    #[serde(default)]
    pub generics: Vec<GenericParam>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default = "default_accessibility")]
    pub accessibility: Accessibility,
    /// Base method this one overrides
    #[serde(default)]
    pub overrides: Option<MethodIdx>,
    #[serde(default)]
    pub attributes: Vec<AttributeUsage>,
}

fn default_accessibility() -> Accessibility {
    Accessibility::Public
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    /// Accessor method, read as `this.name()`
    Property,
}

/// Field or property of a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub ty: TypeRef,
    pub kind: MemberKind,
    #[serde(default = "default_accessibility")]
    pub accessibility: Accessibility,
    #[serde(default = "default_has_getter")]
    pub has_getter: bool,
    #[serde(default)]
    pub attributes: Vec<AttributeUsage>,
}

fn default_has_getter() -> bool {
    true
}

/// Explicit mapping from an interface method to the method implementing it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceImpl {
    pub interface_method: MethodIdx,
    pub implementation: MethodIdx,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSymbol {
    /// Fully qualified path; the type identity
    pub path: String,
    pub kind: TypeKind,
    /// Owning crate; empty for the crate under analysis
    #[serde(default)]
    pub crate_name: String,
    #[serde(default)]
    pub base: Option<TypeIdx>,
    #[serde(default)]
    pub interfaces: Vec<TypeIdx>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub methods: Vec<MethodIdx>,
    #[serde(default)]
    pub constants: BTreeMap<String, i64>,
    #[serde(default)]
    pub interface_impls: Vec<InterfaceImpl>,
    #[serde(default)]
    pub attributes: Vec<AttributeUsage>,
}

impl TypeSymbol {
    /// Last path segment
    pub fn name(&self) -> &str {
        self.path.rsplit("::").next().unwrap_or(&self.path)
    }
}

/// How the call site names its receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Receiver {
    Instance,
    /// Explicit call to the base implementation, bypassing overrides
    BaseDispatch,
    Static,
}

/// A call found in the unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub location: Location,
    pub method: MethodIdx,
    #[serde(default = "default_receiver")]
    pub receiver: Receiver,
    #[serde(default)]
    pub generic_arguments: Vec<String>,
}

fn default_receiver() -> Receiver {
    Receiver::Instance
}
