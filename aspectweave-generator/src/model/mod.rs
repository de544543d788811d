//! Symbolic model of the program under analysis.
//!
//! The model is an arena: types and methods live in flat vectors and refer to
//! each other through [`TypeIdx`] / [`MethodIdx`].

mod attributes;
mod symbols;

pub use attributes::{AttributeUsage, ConstValue, Location, NamedArgument};
pub use symbols::{
    Accessibility, Asyncness, GenericParam, InterfaceImpl, Invocation, Member, MemberKind,
    MethodSymbol, Parameter, PassMode, Receiver, ReturnShape, TypeKind, TypeRef, TypeSymbol,
};

use crate::error::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeIdx(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodIdx(pub u32);

impl fmt::Display for TypeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

impl fmt::Display for MethodIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method#{}", self.0)
    }
}

/// One unit of analysis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compilation {
    /// Name of the crate whose call sites are rewritten
    #[serde(default)]
    pub crate_name: String,
    /// Friend-access grants: crate name to the crates it exposes
    /// protected-internal members to
    #[serde(default)]
    pub access_grants: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub types: Vec<TypeSymbol>,
    #[serde(default)]
    pub methods: Vec<MethodSymbol>,
    #[serde(default)]
    pub invocations: Vec<Invocation>,
}

impl Compilation {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn ty(&self, idx: TypeIdx) -> Result<&TypeSymbol> {
        self.types
            .get(idx.0 as usize)
            .ok_or(GeneratorError::UnknownType(idx.0))
    }

    pub fn method(&self, idx: MethodIdx) -> Result<&MethodSymbol> {
        self.methods
            .get(idx.0 as usize)
            .ok_or(GeneratorError::UnknownMethod(idx.0))
    }

    pub fn type_by_path(&self, path: &str) -> Option<TypeIdx> {
        let path = path.trim_start_matches("::");
        self.types
            .iter()
            .position(|ty| ty.path.trim_start_matches("::") == path)
            .map(|position| TypeIdx(position as u32))
    }

    /// The type followed by its ancestors, nearest first
    pub fn base_chain(&self, start: TypeIdx) -> Vec<TypeIdx> {
        let mut chain = Vec::new();
        let mut current = Some(start);
        while let Some(idx) = current {
            // A malformed model may loop; the chain can never be longer than the arena
            if chain.contains(&idx) || chain.len() > self.types.len() {
                break;
            }
            chain.push(idx);
            current = self.ty(idx).ok().and_then(|ty| ty.base);
        }
        chain
    }

    /// Whether `ty` derives from `base` through base links or implemented interfaces
    pub fn derives_from(&self, ty: TypeIdx, base: TypeIdx) -> bool {
        self.base_chain(ty).into_iter().any(|ancestor| {
            (ancestor != ty && ancestor == base)
                || self
                    .ty(ancestor)
                    .is_ok_and(|symbol| symbol.interfaces.contains(&base))
        })
    }

    /// Crate owning `ty`
    pub fn crate_of(&self, ty: TypeIdx) -> &str {
        match self.ty(ty) {
            Ok(symbol) if !symbol.crate_name.is_empty() => &symbol.crate_name,
            _ => &self.crate_name,
        }
    }

    /// Whether `grantor` exposes protected-internal members to `grantee`
    pub fn grants_access(&self, grantor: &str, grantee: &str) -> bool {
        self.access_grants
            .get(grantor)
            .is_some_and(|grantees| grantees.iter().any(|name| name == grantee))
    }

    /// `Owner::method` for reporting
    pub fn method_path(&self, idx: MethodIdx) -> String {
        match self.method(idx) {
            Ok(method) => match self.ty(method.owner) {
                Ok(owner) => format!("{}::{}", owner.path, method.name),
                Err(_) => method.name.clone(),
            },
            Err(_) => idx.to_string(),
        }
    }

    /// Integer constant declared on a type
    pub fn constant(&self, ty: TypeIdx, name: &str) -> Option<i64> {
        self.ty(ty).ok().and_then(|symbol| symbol.constants.get(name).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> Compilation {
        Compilation::from_value(json!({
            "crate_name": "app",
            "access_grants": { "core": ["app"] },
            "types": [
                { "path": "aspectweave::Aspect", "kind": "interface", "crate_name": "aspectweave" },
                { "path": "app::Audit", "kind": "attribute", "interfaces": [0],
                  "constants": { "DEFAULT_ORDER": 5 } },
                { "path": "app::StrictAudit", "kind": "attribute", "base": 1 },
                { "path": "core::Base", "kind": "class", "crate_name": "core" },
                { "path": "app::Derived", "kind": "class", "base": 3 }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_lookup_by_path() {
        let model = model();
        assert_eq!(model.type_by_path("::app::Audit"), Some(TypeIdx(1)));
        assert_eq!(model.type_by_path("app::Missing"), None);
        assert!(matches!(model.ty(TypeIdx(9)), Err(GeneratorError::UnknownType(9))));
    }

    #[test]
    fn test_derivation_walks_bases_and_interfaces() {
        let model = model();
        let marker = TypeIdx(0);
        assert!(model.derives_from(TypeIdx(1), marker));
        assert!(model.derives_from(TypeIdx(2), marker));
        assert!(!model.derives_from(TypeIdx(3), marker));
        assert!(!model.derives_from(marker, marker));
    }

    #[test]
    fn test_base_chain_and_crates() {
        let model = model();
        assert_eq!(model.base_chain(TypeIdx(4)), vec![TypeIdx(4), TypeIdx(3)]);
        assert_eq!(model.crate_of(TypeIdx(4)), "app");
        assert_eq!(model.crate_of(TypeIdx(3)), "core");
        assert!(model.grants_access("core", "app"));
        assert!(!model.grants_access("app", "core"));
        assert_eq!(model.constant(TypeIdx(1), "DEFAULT_ORDER"), Some(5));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Compilation::from_json("{ \"types\": 3 }"),
            Err(GeneratorError::Model(_))
        ));
    }
}
