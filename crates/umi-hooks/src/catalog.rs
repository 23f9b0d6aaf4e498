//! Extension point catalog, mapping each point to its composition kind.
//!
//! Classification order:
//!
//! 1. An explicit declaration (built-in table or `registerMethod`) wins.
//! 2. Otherwise the private `_` prefix is stripped and the name is matched by
//!    convention: `add*` accumulates, `modify*` transforms, `on*`, `before*`
//!    and `after*` notify.
//! 3. Anything else is an error. There is no default kind.

use indexmap::IndexMap;
use serde::Serialize;

use crate::builtin::BUILTIN_METHODS;
use crate::error::{HookError, Result};
use crate::kind::CompositionKind;

/// Prefix marking points that are internal to the tool.
pub const PRIVATE_PREFIX: char = '_';

/// Whether a point is meant for third-party plugin authors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn of(name: &str) -> Self {
        if name.starts_with(PRIVATE_PREFIX) {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }
}

/// A built-in facade method, installed on every plugin API instance.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinMethod {
    /// Extension point name, private prefix included.
    pub name: &'static str,
    /// Kind given explicitly instead of inferred from the name.
    pub declared: Option<CompositionKind>,
    /// Kind the typed facade method's argument is shaped for.
    pub shape: CompositionKind,
}

/// Classifies a name by prefix convention alone.
pub fn classify_by_convention(name: &str) -> Result<CompositionKind> {
    let bare = name.strip_prefix(PRIVATE_PREFIX).unwrap_or(name);

    if bare.starts_with("add") {
        Ok(CompositionKind::Accumulate)
    } else if bare.starts_with("modify") {
        Ok(CompositionKind::Transform)
    } else if bare.starts_with("on") || bare.starts_with("before") || bare.starts_with("after") {
        Ok(CompositionKind::Notify)
    } else {
        Err(HookError::UnclassifiableExtensionPoint {
            name: name.to_string(),
        })
    }
}

/// A point with a fixed, declared kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredPoint {
    pub kind: CompositionKind,
    /// Declared with a custom `apply` reduction.
    pub custom: bool,
}

/// One row of the catalog listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointInfo {
    pub name: String,
    pub kind: CompositionKind,
    pub visibility: Visibility,
    pub builtin: bool,
    pub custom: bool,
}

/// Extension points known to one host.
#[derive(Debug, Clone)]
pub struct ExtensionPointCatalog {
    declared: IndexMap<String, DeclaredPoint>,
}

impl ExtensionPointCatalog {
    /// Creates a catalog seeded with the explicitly typed built-in points.
    pub fn new() -> Self {
        let declared = BUILTIN_METHODS
            .iter()
            .filter_map(|m| {
                m.declared.map(|kind| {
                    (
                        m.name.to_string(),
                        DeclaredPoint {
                            kind,
                            custom: false,
                        },
                    )
                })
            })
            .collect();
        Self { declared }
    }

    /// Returns the composition kind of a point.
    pub fn classify(&self, name: &str) -> Result<CompositionKind> {
        match self.declared.get(name) {
            Some(point) => Ok(point.kind),
            None => classify_by_convention(name),
        }
    }

    pub fn declared(&self, name: &str) -> Option<&DeclaredPoint> {
        self.declared.get(name)
    }

    /// Fixes the kind of a point.
    ///
    /// Re-declaring with the same kind is accepted; a different kind fails
    /// with [`HookError::KindConflict`].
    pub fn declare(&mut self, name: &str, kind: CompositionKind, custom: bool) -> Result<()> {
        if let Some(existing) = self.declared.get(name) {
            if existing.kind != kind {
                return Err(HookError::KindConflict {
                    point: name.to_string(),
                    declared: existing.kind,
                    requested: kind,
                });
            }
            return Ok(());
        }

        self.declared
            .insert(name.to_string(), DeclaredPoint { kind, custom });
        Ok(())
    }

    /// Every known point: built-ins in catalog order, then declared extras.
    pub fn points(&self) -> Vec<PointInfo> {
        let mut points: Vec<PointInfo> = BUILTIN_METHODS
            .iter()
            .map(|m| PointInfo {
                name: m.name.to_string(),
                kind: self.classify(m.name).unwrap_or(m.shape),
                visibility: Visibility::of(m.name),
                builtin: true,
                custom: false,
            })
            .collect();

        for (name, point) in &self.declared {
            if BUILTIN_METHODS.iter().any(|m| m.name == name.as_str()) {
                continue;
            }
            points.push(PointInfo {
                name: name.clone(),
                kind: point.kind,
                visibility: Visibility::of(name),
                builtin: false,
                custom: point.custom,
            });
        }

        points
    }
}

impl Default for ExtensionPointCatalog {
    fn default() -> Self {
        Self::new()
    }
}
