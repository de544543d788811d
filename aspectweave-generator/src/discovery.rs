//! Aspect discovery across the override and interface hierarchy.

use crate::error::Result;
use crate::model::{AttributeUsage, Compilation, Location, MethodIdx, MethodSymbol, TypeIdx};
use dashmap::DashMap;
use std::collections::HashSet;

/// One aspect applied to a method, with its resolved Order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AspectInfo {
    pub attribute: AttributeUsage,
    pub attribute_type: TypeIdx,
    pub order: i32,
}

/// Aspects of one method: one entry per attribute type, ascending Order
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AppliedAspectSet {
    aspects: Vec<AspectInfo>,
}

impl AppliedAspectSet {
    pub fn iter(&self) -> std::slice::Iter<'_, AspectInfo> {
        self.aspects.iter()
    }

    pub fn len(&self) -> usize {
        self.aspects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aspects.is_empty()
    }

    pub fn get(&self, attribute_type: TypeIdx) -> Option<&AspectInfo> {
        self.aspects
            .iter()
            .find(|aspect| aspect.attribute_type == attribute_type)
    }

    pub fn orders(&self) -> Vec<i32> {
        self.aspects.iter().map(|aspect| aspect.order).collect()
    }
}

impl<'a> IntoIterator for &'a AppliedAspectSet {
    type Item = &'a AspectInfo;
    type IntoIter = std::slice::Iter<'a, AspectInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.aspects.iter()
    }
}

/// Names used to resolve an aspect's Order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderConvention {
    /// Named usage argument overriding the Order
    pub argument: String,
    /// Integer constant on the attribute type holding its default Order
    pub constant: String,
}

impl Default for OrderConvention {
    fn default() -> Self {
        Self {
            argument: "order".to_string(),
            constant: "DEFAULT_ORDER".to_string(),
        }
    }
}

/// A later declaration of an already collected aspect whose Order differs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivergentDeclaration {
    pub attribute_type: TypeIdx,
    pub kept_order: i32,
    pub ignored_order: i32,
    pub location: Location,
}

pub fn find_applicable_aspects(
    compilation: &Compilation,
    method: MethodIdx,
    marker_base: TypeIdx,
) -> Result<AppliedAspectSet> {
    find_applicable_aspects_with(compilation, method, marker_base, &OrderConvention::default())
}

/// Collect the aspects of `method`
///
/// Walks the method and the methods it overrides, then every interface method
/// it implements. The first declaration of each attribute type wins.
pub fn find_applicable_aspects_with(
    compilation: &Compilation,
    method: MethodIdx,
    marker_base: TypeIdx,
    convention: &OrderConvention,
) -> Result<AppliedAspectSet> {
    let mut seen = HashSet::new();
    let mut aspects = Vec::new();

    for declaration in declarations(compilation, method, marker_base, convention)? {
        if seen.insert(declaration.attribute_type) {
            aspects.push(declaration);
        }
    }

    // Stable: equal Orders keep discovery order
    aspects.sort_by_key(|aspect| aspect.order);
    Ok(AppliedAspectSet { aspects })
}

/// Duplicate declarations whose Order disagrees with the retained one
pub fn find_divergent_orders(
    compilation: &Compilation,
    method: MethodIdx,
    marker_base: TypeIdx,
    convention: &OrderConvention,
) -> Result<Vec<DivergentDeclaration>> {
    let mut kept: Vec<AspectInfo> = Vec::new();
    let mut divergent = Vec::new();

    for declaration in declarations(compilation, method, marker_base, convention)? {
        match kept
            .iter()
            .find(|aspect| aspect.attribute_type == declaration.attribute_type)
        {
            Some(first) if first.order != declaration.order => {
                divergent.push(DivergentDeclaration {
                    attribute_type: declaration.attribute_type,
                    kept_order: first.order,
                    ignored_order: declaration.order,
                    location: declaration.attribute.location.clone(),
                });
            }
            Some(_) => {}
            None => kept.push(declaration),
        }
    }
    Ok(divergent)
}

/// Every marker declaration reachable from `method`, in traversal order
fn declarations(
    compilation: &Compilation,
    method: MethodIdx,
    marker_base: TypeIdx,
    convention: &OrderConvention,
) -> Result<Vec<AspectInfo>> {
    let mut found = Vec::new();
    let mut collect = |symbol: &MethodSymbol| {
        for usage in &symbol.attributes {
            if compilation.derives_from(usage.attribute, marker_base) {
                found.push(AspectInfo {
                    attribute: usage.clone(),
                    attribute_type: usage.attribute,
                    order: resolve_order(compilation, usage, convention),
                });
            }
        }
    };

    let overrides = override_chain(compilation, method)?;
    for idx in &overrides {
        collect(compilation.method(*idx)?);
    }

    let owner = compilation.method(method)?.owner;
    for interface in all_interfaces(compilation, owner) {
        for &interface_method in &compilation.ty(interface)?.methods {
            let related = find_implementation(compilation, owner, interface_method)?
                .is_some_and(|implementation| overrides.contains(&implementation));
            if related {
                collect(compilation.method(interface_method)?);
            }
        }
    }
    Ok(found)
}

/// Usage override, then the type's default-order constant, then 0
pub fn resolve_order(compilation: &Compilation, usage: &AttributeUsage, convention: &OrderConvention) -> i32 {
    usage
        .named(&convention.argument)
        .and_then(|value| value.as_int())
        .and_then(|value| i32::try_from(value).ok())
        .or_else(|| {
            compilation
                .constant(usage.attribute, &convention.constant)
                .and_then(|value| i32::try_from(value).ok())
        })
        .unwrap_or(0)
}

/// The method followed by every method it overrides, nearest first
fn override_chain(compilation: &Compilation, method: MethodIdx) -> Result<Vec<MethodIdx>> {
    let mut chain = vec![method];
    let mut current = compilation.method(method)?.overrides;
    while let Some(idx) = current {
        if chain.contains(&idx) {
            break;
        }
        chain.push(idx);
        current = compilation.method(idx)?.overrides;
    }
    Ok(chain)
}

/// Interfaces implemented by `ty` or its ancestors, including inherited interfaces
fn all_interfaces(compilation: &Compilation, ty: TypeIdx) -> Vec<TypeIdx> {
    let mut result: Vec<TypeIdx> = Vec::new();
    let mut pending: Vec<TypeIdx> = compilation
        .base_chain(ty)
        .into_iter()
        .filter_map(|idx| compilation.ty(idx).ok())
        .flat_map(|symbol| symbol.interfaces.iter().copied())
        .collect();
    pending.reverse();

    while let Some(interface) = pending.pop() {
        if result.contains(&interface) {
            continue;
        }
        result.push(interface);
        if let Ok(symbol) = compilation.ty(interface) {
            pending.extend(symbol.interfaces.iter().rev().copied());
        }
    }
    result
}

/// Method of `ty` (or its nearest ancestor) implementing `interface_method`
pub fn find_implementation(
    compilation: &Compilation,
    ty: TypeIdx,
    interface_method: MethodIdx,
) -> Result<Option<MethodIdx>> {
    let wanted = compilation.method(interface_method)?;

    for idx in compilation.base_chain(ty) {
        let symbol = compilation.ty(idx)?;
        if let Some(mapping) = symbol
            .interface_impls
            .iter()
            .find(|mapping| mapping.interface_method == interface_method)
        {
            return Ok(Some(mapping.implementation));
        }
        for &candidate in &symbol.methods {
            let method = compilation.method(candidate)?;
            if !method.is_static && same_signature(method, wanted) {
                return Ok(Some(candidate));
            }
        }
    }
    Ok(None)
}

fn same_signature(left: &MethodSymbol, right: &MethodSymbol) -> bool {
    left.name == right.name
        && left.parameters.len() == right.parameters.len()
        && left
            .parameters
            .iter()
            .zip(&right.parameters)
            .all(|(a, b)| a.ty.name == b.ty.name && a.mode == b.mode)
}

type DiscoveryKey = (MethodIdx, TypeIdx, OrderConvention);

/// Memoized discovery shared across analysis workers
///
/// Entries are keyed by every input of the walk, so one cache may serve
/// several marker bases or conventions.
#[derive(Debug, Default)]
pub struct DiscoveryCache {
    entries: DashMap<DiscoveryKey, AppliedAspectSet>,
}

impl DiscoveryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_discover(
        &self,
        compilation: &Compilation,
        method: MethodIdx,
        marker_base: TypeIdx,
        convention: &OrderConvention,
    ) -> Result<AppliedAspectSet> {
        let key = (method, marker_base, convention.clone());
        if let Some(cached) = self.entries.get(&key) {
            return Ok(cached.clone());
        }
        let aspects = find_applicable_aspects_with(compilation, method, marker_base, convention)?;
        self.entries.insert(key, aspects.clone());
        Ok(aspects)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
