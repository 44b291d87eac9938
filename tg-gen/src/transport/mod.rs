//! Conversion between live application trees and their transport-safe projection.
//!
//! The live tree carries parent links and cohesive shortcut links; neither is ever serialized.
//! [`clean`] projects an application into nested, parent-free records, and [`reconstruct`] rebuilds
//! a live tree from such records, re-deriving every parent link from the nesting.
use anyhow::Result;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    instrument,
    warn,
};

use crate::errors::GenError;
use crate::model::{
    Application,
    ClassId,
    PackageId,
    TreeBuilder,
};

/// Parent-free method record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanMethod {
    /// Method name.
    pub identifier: String,
}

/// Parent-free class record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanClass {
    /// Simple class name.
    pub identifier: String,
    /// Methods owned by the class.
    #[serde(default)]
    pub methods: Vec<CleanMethod>,
    /// Name of the owning application.
    #[serde(default)]
    pub parent_app_name: String,
}

/// Parent-free package record; nesting replaces the parent links.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanPackage {
    /// Package path segment.
    pub name: String,
    /// Classes directly inside the package.
    #[serde(default)]
    pub classes: Vec<CleanClass>,
    /// Packages directly inside the package.
    #[serde(default)]
    pub subpackages: Vec<CleanPackage>,
}

/// Transport-safe projection of an [`Application`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanApplication {
    /// Application name.
    pub name: String,
    /// Top-level packages with their full subtrees.
    pub root_packages: Vec<CleanPackage>,
    /// Fully-qualified name of the entry point class.
    #[serde(default)]
    pub entry_point_fqn: String,
    /// Every class, flat.
    #[serde(default)]
    pub classes: Vec<CleanClass>,
    /// Every package (each with its subtree), flat.
    #[serde(default)]
    pub packages: Vec<CleanPackage>,
    /// Every method, flat.
    #[serde(default)]
    pub methods: Vec<CleanMethod>,
}

/// A rebuilt application, plus whether the entry point had to be guessed.
#[derive(Clone, Debug)]
pub struct Reconstructed {
    /// The live application tree.
    pub application: Application,
    /// `true` when no class matched the recorded entry point FQN and the first class was used.
    pub entry_point_fallback: bool,
}

/// Project `app` into its parent-free form.
#[must_use]
pub fn clean(app: &Application) -> CleanApplication {
    CleanApplication {
        name: app.name.clone(),
        root_packages: app.root_packages.iter().map(|&p| clean_package(app, p)).collect(),
        entry_point_fqn: app.class_fqn(app.entry_point),
        classes: app.class_ids().map(|c| clean_class(app, c)).collect(),
        packages: (0..app.packages.len()).map(|p| clean_package(app, PackageId(p))).collect(),
        methods: app
            .methods
            .iter()
            .map(|m| CleanMethod { identifier: m.identifier.clone() })
            .collect(),
    }
}

/// Project one class.
fn clean_class(app: &Application, id: ClassId) -> CleanClass {
    let class = app.class(id);
    CleanClass {
        identifier: class.identifier.clone(),
        methods: class
            .methods
            .iter()
            .map(|&m| CleanMethod { identifier: app.method(m).identifier.clone() })
            .collect(),
        parent_app_name: class.parent_app_name.clone(),
    }
}

/// Project one package and everything below it.
fn clean_package(app: &Application, id: PackageId) -> CleanPackage {
    let pkg = app.package(id);
    CleanPackage {
        name: pkg.name.clone(),
        classes: pkg.classes.iter().map(|&c| clean_class(app, c)).collect(),
        subpackages: pkg.subpackages.iter().map(|&p| clean_package(app, p)).collect(),
    }
}

/// Rebuild a live application from its parent-free form.
///
/// Flat lists are rebuilt from the tree (the ones in `clean` are ignored), so the tree and the
/// arenas always agree. If no class matches `entry_point_fqn` the first class in depth-first order
/// becomes the entry point and `entry_point_fallback` is set.
#[instrument(skip_all, fields(app = %clean.name))]
pub fn reconstruct(clean: &CleanApplication) -> Result<Reconstructed> {
    let mut tree = TreeBuilder::default();
    let roots = clean
        .root_packages
        .iter()
        .map(|pkg| rebuild_package(&mut tree, pkg, None, &clean.name))
        .collect();

    if tree.classes.is_empty() {
        return Err(GenError::NoClasses(clean.name.clone()).into());
    }

    let mut application = tree.finish(clean.name.clone(), roots, ClassId(0));
    let matched = application
        .class_ids()
        .find(|&c| application.class_fqn(c) == clean.entry_point_fqn);
    let entry_point_fallback = matched.is_none();
    if let Some(entry) = matched {
        application.entry_point = entry;
    } else {
        warn!(fqn = %clean.entry_point_fqn, "Entry point not found, using first class");
    }

    debug!(
        packages = application.packages.len(),
        classes = application.classes.len(),
        methods = application.methods.len(),
        "Application reconstructed"
    );
    Ok(Reconstructed { application, entry_point_fallback })
}

/// Depth-first rebuild of `pkg`, assigning parent links on the way down.
fn rebuild_package(tree: &mut TreeBuilder, pkg: &CleanPackage, parent: Option<PackageId>, app_name: &str) -> PackageId {
    let id = tree.add_package(pkg.name.clone());
    if let Some(parent) = parent {
        tree.attach_package(parent, id);
    }
    for class in &pkg.classes {
        let methods = class.methods.iter().map(|m| tree.add_method(m.identifier.clone())).collect();
        let owner = if class.parent_app_name.is_empty() { app_name } else { class.parent_app_name.as_str() };
        let class_id = tree.add_class(class.identifier.clone(), owner, methods);
        tree.attach_class(id, class_id);
    }
    for sub in &pkg.subpackages {
        rebuild_package(tree, sub, Some(id), app_name);
    }
    id
}

/// Hierarchical landscape description: nodes hosting applications made of packages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureLandscape {
    /// Token identifying the landscape; its presence distinguishes this shape.
    pub landscape_token: String,
    /// Hosts in the landscape.
    pub nodes: Vec<StructureNode>,
}

/// A host running applications.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureNode {
    /// Host address.
    #[serde(default)]
    pub ip_address: String,
    /// Host name.
    #[serde(default)]
    pub host_name: String,
    /// Applications on this host.
    #[serde(default)]
    pub applications: Vec<StructureApplication>,
}

/// An application in the hierarchical shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureApplication {
    /// Application name.
    pub name: String,
    /// Implementation language.
    #[serde(default)]
    pub language: String,
    /// Instance identifier.
    #[serde(default)]
    pub instance_id: String,
    /// Top-level packages.
    #[serde(default)]
    pub packages: Vec<StructurePackage>,
}

/// A package in the hierarchical shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructurePackage {
    /// Package path segment.
    pub name: String,
    /// Nested packages.
    #[serde(default)]
    pub sub_packages: Vec<StructurePackage>,
    /// Classes directly inside the package.
    #[serde(default)]
    pub classes: Vec<StructureClass>,
}

/// A class in the hierarchical shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureClass {
    /// Simple class name.
    pub name: String,
    /// Methods of the class.
    #[serde(default)]
    pub methods: Vec<StructureMethod>,
}

/// A method in the hierarchical shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureMethod {
    /// Method name.
    pub name: String,
    /// Opaque method hash.
    #[serde(default)]
    pub hash_code: String,
}

/// Any accepted import document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LandscapeImport {
    /// The hierarchical nodes/applications shape.
    Structure(StructureLandscape),
    /// A list of cleaned applications, as written by [`clean`].
    Canonical(Vec<CleanApplication>),
}

impl LandscapeImport {
    /// Convert to the canonical cleaned shape.
    ///
    /// The hierarchical shape records no entry point, so its applications come out with an empty
    /// `entry_point_fqn` and reconstruction falls back to their first class.
    #[must_use]
    pub fn into_cleaned(self) -> Vec<CleanApplication> {
        match self {
            Self::Canonical(apps) => apps,
            Self::Structure(landscape) => landscape
                .nodes
                .into_iter()
                .flat_map(|node| node.applications)
                .map(|app| {
                    let root_packages = app
                        .packages
                        .into_iter()
                        .map(|pkg| structure_package(pkg, &app.name))
                        .collect();
                    CleanApplication {
                        name: app.name,
                        root_packages,
                        entry_point_fqn: String::new(),
                        classes: Vec::new(),
                        packages: Vec::new(),
                        methods: Vec::new(),
                    }
                })
                .collect(),
        }
    }
}

/// Convert one hierarchical package subtree.
fn structure_package(pkg: StructurePackage, app_name: &str) -> CleanPackage {
    CleanPackage {
        name: pkg.name,
        classes: pkg
            .classes
            .into_iter()
            .map(|class| CleanClass {
                identifier: class.name,
                methods: class
                    .methods
                    .into_iter()
                    .map(|m| CleanMethod { identifier: m.name })
                    .collect(),
                parent_app_name: app_name.to_owned(),
            })
            .collect(),
        subpackages: pkg
            .sub_packages
            .into_iter()
            .map(|sub| structure_package(sub, app_name))
            .collect(),
    }
}

/// Reconstruct every application of an import document.
pub fn reconstruct_landscape(import: LandscapeImport) -> Result<Vec<Reconstructed>> {
    import.into_cleaned().iter().map(reconstruct).collect()
}

#[cfg(test)]
mod tests;
