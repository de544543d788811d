//! Resolution of the provider reachable from a woven receiver.

use crate::config::WeaverConfig;
use crate::error::Result;
use crate::model::{Accessibility, Compilation, Member, MemberKind, MethodIdx, TypeIdx};
use std::fmt;

/// Path from a receiver to its provider
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessPath {
    pub member: String,
    pub kind: MemberKind,
    /// Type in the base walk declaring the member
    pub declaring_type: TypeIdx,
}

impl AccessPath {
    /// Expression reading the provider from `receiver`
    pub fn expression(&self, receiver: &str) -> String {
        match self.kind {
            MemberKind::Field => format!("{receiver}.{}", self.member),
            MemberKind::Property => format!("{receiver}.{}()", self.member),
        }
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression("this"))
    }
}

/// Provider lookup settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessConfig {
    pub provider_names: Vec<String>,
}

impl From<&WeaverConfig> for AccessConfig {
    fn from(config: &WeaverConfig) -> Self {
        Self {
            provider_names: config.provider_names.clone(),
        }
    }
}

/// Find the member through which `method`'s receiver exposes a provider
///
/// `is_provider` decides whether a member type is a provider type. The first
/// type in the base walk with an accessible match decides; within it a
/// conventional name wins, else the first match.
pub fn find_provider_access(
    compilation: &Compilation,
    method: MethodIdx,
    is_provider: &dyn Fn(&str) -> bool,
    config: &AccessConfig,
) -> Result<Option<AccessPath>> {
    let symbol = compilation.method(method)?;
    if symbol.is_static {
        return Ok(None);
    }

    for ty in compilation.base_chain(symbol.owner) {
        let accessible: Vec<&Member> = compilation
            .ty(ty)?
            .members
            .iter()
            .filter(|member| member.kind == MemberKind::Field || member.has_getter)
            .filter(|member| is_provider(&member.ty.name))
            .filter(|member| is_accessible(compilation, ty, member))
            .collect();

        if accessible.is_empty() {
            continue;
        }

        let chosen = config
            .provider_names
            .iter()
            .find_map(|name| accessible.iter().find(|member| &member.name == name))
            .unwrap_or(&accessible[0]);

        return Ok(Some(AccessPath {
            member: chosen.name.clone(),
            kind: chosen.kind,
            declaring_type: ty,
        }));
    }
    Ok(None)
}

fn is_accessible(compilation: &Compilation, declaring_type: TypeIdx, member: &Member) -> bool {
    match member.accessibility {
        Accessibility::Public | Accessibility::Internal => true,
        Accessibility::ProtectedInternal => {
            let owner = compilation.crate_of(declaring_type);
            owner == compilation.crate_name || compilation.grants_access(owner, &compilation.crate_name)
        }
        Accessibility::Protected | Accessibility::Private => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider(name: &str) -> bool {
        WeaverConfig::default().is_provider_type(name)
    }

    fn resolve(model: &Compilation, method: u32) -> Option<AccessPath> {
        let config = AccessConfig::from(&WeaverConfig::default());
        find_provider_access(model, MethodIdx(method), &provider, &config).unwrap()
    }

    fn member(name: &str, ty: &str, kind: &str, accessibility: &str) -> serde_json::Value {
        json!({ "name": name, "ty": { "name": ty }, "kind": kind, "accessibility": accessibility })
    }

    fn model(base_members: serde_json::Value, derived_members: serde_json::Value, grants: serde_json::Value) -> Compilation {
        Compilation::from_value(json!({
            "crate_name": "app",
            "access_grants": grants,
            "types": [
                { "path": "core::Service", "kind": "class", "crate_name": "core", "members": base_members, "methods": [0] },
                { "path": "app::Orders", "kind": "class", "base": 0, "members": derived_members, "methods": [1, 2] }
            ],
            "methods": [
                { "owner": 0, "name": "run" },
                { "owner": 1, "name": "place" },
                { "owner": 1, "name": "now", "is_static": true }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_conventional_name_preferred() {
        let model = model(
            json!([]),
            json!([
                member("backup", "aspectweave::Container", "field", "public"),
                member("services", "Arc<dyn aspectweave::ServiceProvider>", "property", "public")
            ]),
            json!({}),
        );
        let path = resolve(&model, 1).unwrap();
        assert_eq!(path.member, "services");
        assert_eq!(path.expression("this"), "this.services()");
    }

    #[test]
    fn test_first_accessible_match_without_convention() {
        let model = model(
            json!([]),
            json!([
                member("hidden", "aspectweave::Container", "field", "private"),
                member("registry", "aspectweave::Container", "field", "internal")
            ]),
            json!({}),
        );
        assert_eq!(resolve(&model, 1).unwrap().to_string(), "this.registry");
    }

    #[test]
    fn test_first_type_with_match_wins() {
        let model = model(
            json!([member("service_provider", "aspectweave::Container", "field", "public")]),
            json!([member("container", "aspectweave::Container", "field", "public")]),
            json!({}),
        );
        let path = resolve(&model, 1).unwrap();
        assert_eq!(path.member, "container");
        assert_eq!(path.declaring_type, TypeIdx(1));
    }

    #[test]
    fn test_walks_to_base_when_derived_has_none_accessible() {
        let model = model(
            json!([member("services", "aspectweave::Container", "field", "public")]),
            json!([member("mine", "aspectweave::Container", "field", "protected")]),
            json!({}),
        );
        assert_eq!(resolve(&model, 1).unwrap().declaring_type, TypeIdx(0));
    }

    #[test]
    fn test_protected_internal_requires_grant_across_crates() {
        let fields = json!([member("services", "aspectweave::Container", "field", "protected_internal")]);
        let without = model(fields.clone(), json!([]), json!({}));
        assert!(resolve(&without, 1).is_none());

        let with = model(fields, json!([]), json!({ "core": ["app"] }));
        assert!(resolve(&with, 1).is_some());
    }

    #[test]
    fn test_property_without_getter_is_ignored() {
        let mut model = model(json!([]), json!([member("services", "aspectweave::Container", "property", "public")]), json!({}));
        model.types[1].members[0].has_getter = false;
        assert!(resolve(&model, 1).is_none());
    }

    #[test]
    fn test_static_methods_have_no_provider() {
        let model = model(json!([]), json!([member("services", "aspectweave::Container", "field", "public")]), json!({}));
        assert!(resolve(&model, 2).is_none());
    }
}
