//! Data models for generated landscapes and simulated traces.
//!
//! An [`Application`] owns three arenas (packages, classes, methods) and the tree edges between
//! them are typed indices into those arenas. The arenas double as the flat `packages`/`classes`/
//! `methods` lists, so a node reached by walking the tree is always the very same node found in the
//! flat list. Parent links are indices too, which keeps ancestor walks O(depth) without creating
//! ownership cycles.
use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};

/// Index of a [`Package`] in its application's package arena.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PackageId(pub usize);

/// Index of a [`Class`] in its application's class arena.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClassId(pub usize);

/// Index of a [`Method`] in its application's method arena.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct MethodId(pub usize);

/// Address of a class across a slice of applications, as used by the simulator.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClassRef {
    /// Position of the owning application in the simulated slice.
    pub app: usize,
    /// The class within that application.
    pub class: ClassId,
}

/// Leaf unit of a landscape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Method {
    /// Method name, unique within the generating name pool.
    pub identifier: String,
}

/// A class owning a list of methods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Class {
    /// Simple (unqualified) class name.
    pub identifier: String,
    /// Methods owned by this class.
    pub methods: Vec<MethodId>,
    /// Name of the application this class belongs to.
    pub parent_app_name: String,
    /// Containing package; only `None` while a tree is still being assembled.
    pub parent: Option<PackageId>,
    /// Shortcut edge assigned by the cohesive linking pass.
    pub linked_class: Option<ClassRef>,
}

/// A package containing classes and nested packages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Package {
    /// Single path segment of the package name.
    pub name: String,
    /// Classes directly inside this package.
    pub classes: Vec<ClassId>,
    /// Packages directly inside this package.
    pub subpackages: Vec<PackageId>,
    /// Containing package, `None` for root packages.
    pub parent: Option<PackageId>,
}

/// One generated application and its package tree.
#[derive(Clone, Debug)]
pub struct Application {
    /// Application name as drawn from the name pool.
    pub name: String,
    /// Top-level packages; for generated applications this is the synthetic `org` package.
    pub root_packages: Vec<PackageId>,
    /// Class that hosts the trace's entry span.
    pub entry_point: ClassId,
    /// Package arena; also the flat package list.
    pub packages: Vec<Package>,
    /// Class arena; also the flat class list.
    pub classes: Vec<Class>,
    /// Method arena; also the flat method list.
    pub methods: Vec<Method>,
}

impl Application {
    /// Look up a package by id.
    #[must_use]
    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    /// Look up a class by id.
    #[must_use]
    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.0]
    }

    /// Look up a method by id.
    #[must_use]
    pub fn method(&self, id: MethodId) -> &Method {
        &self.methods[id.0]
    }

    /// Ids of every class in arena order.
    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        (0..self.classes.len()).map(ClassId)
    }

    /// Package names from the root down to (and including) `id`.
    #[must_use]
    pub fn package_path(&self, id: PackageId) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(pkg_id) = current {
            let pkg = self.package(pkg_id);
            path.push(pkg.name.as_str());
            current = pkg.parent;
        }
        path.reverse();
        path
    }

    /// Fully-qualified name of a class, derived from its ancestor chain.
    #[must_use]
    pub fn class_fqn(&self, id: ClassId) -> String {
        let class = self.class(id);
        match class.parent {
            Some(parent) => {
                let mut segments = self.package_path(parent);
                segments.push(&class.identifier);
                segments.join(".")
            },
            None => class.identifier.clone(),
        }
    }

    /// Every class contained in `id` or any of its (transitive) subpackages.
    #[must_use]
    pub fn classes_under(&self, id: PackageId) -> Vec<ClassId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(pkg_id) = stack.pop() {
            let pkg = self.package(pkg_id);
            out.extend(pkg.classes.iter().copied());
            stack.extend(pkg.subpackages.iter().rev().copied());
        }
        out
    }

    /// Number of package levels on the longest root-to-leaf path.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(PackageId, usize)> = self.root_packages.iter().map(|&p| (p, 1)).collect();
        while let Some((pkg_id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(self.package(pkg_id).subpackages.iter().map(|&p| (p, depth + 1)));
        }
        deepest
    }
}

/// Incrementally assembles the arenas of an [`Application`].
#[derive(Default)]
pub(crate) struct TreeBuilder {
    /// Package arena under construction.
    pub(crate) packages: Vec<Package>,
    /// Class arena under construction.
    pub(crate) classes: Vec<Class>,
    /// Method arena under construction.
    pub(crate) methods: Vec<Method>,
}

impl TreeBuilder {
    /// Append a method and return its id.
    pub(crate) fn add_method(&mut self, identifier: String) -> MethodId {
        self.methods.push(Method { identifier });
        MethodId(self.methods.len() - 1)
    }

    /// Append a class with the given methods; the caller is responsible for attaching it.
    pub(crate) fn add_class(&mut self, identifier: String, app_name: &str, methods: Vec<MethodId>) -> ClassId {
        self.classes.push(Class {
            identifier,
            methods,
            parent_app_name: app_name.to_owned(),
            parent: None,
            linked_class: None,
        });
        ClassId(self.classes.len() - 1)
    }

    /// Append an empty package with no parent.
    pub(crate) fn add_package(&mut self, name: String) -> PackageId {
        self.packages.push(Package {
            name,
            classes: Vec::new(),
            subpackages: Vec::new(),
            parent: None,
        });
        PackageId(self.packages.len() - 1)
    }

    /// Make `class` a direct child of `pkg`.
    pub(crate) fn attach_class(&mut self, pkg: PackageId, class: ClassId) {
        self.classes[class.0].parent = Some(pkg);
        self.packages[pkg.0].classes.push(class);
    }

    /// Make `child` a direct subpackage of `pkg`.
    pub(crate) fn attach_package(&mut self, pkg: PackageId, child: PackageId) {
        self.packages[child.0].parent = Some(pkg);
        self.packages[pkg.0].subpackages.push(child);
    }

    /// Seal the arenas into an application.
    pub(crate) fn finish(self, name: String, root_packages: Vec<PackageId>, entry_point: ClassId) -> Application {
        Application {
            name,
            root_packages,
            entry_point,
            packages: self.packages,
            classes: self.classes,
            methods: self.methods,
        }
    }
}

/// One timed call frame of a simulated trace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    /// `<class FQN>.<method>`.
    pub name: String,
    /// Simulated time at which the call started.
    pub relative_start_time: f64,
    /// Simulated time at which the call returned.
    pub relative_end_time: f64,
    /// Fixed attributes merged with the per-call service/namespace/function attributes.
    pub attributes: BTreeMap<String, String>,
    /// Calls made from within this one, in start order.
    pub children: Vec<Span>,
}

impl Span {
    /// An open span; its end time is assigned when it is closed.
    #[must_use]
    pub const fn open(name: String, start: f64, attributes: BTreeMap<String, String>) -> Self {
        Self {
            name,
            relative_start_time: start,
            relative_end_time: start,
            attributes,
            children: Vec::new(),
        }
    }

    /// Number of spans in this subtree, including this one.
    #[must_use]
    pub fn span_count(&self) -> usize {
        1 + self.children.iter().map(Self::span_count).sum::<usize>()
    }

    /// Number of span levels in this subtree, including this one.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Self::depth).max().unwrap_or(0)
    }

    /// Depth-first (pre-order) iterator over this subtree.
    pub fn walk(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let span = stack.pop()?;
            stack.extend(span.children.iter().rev());
            Some(span)
        })
    }
}

/// Aggregate size figures for a set of applications.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandscapeStats {
    /// Number of applications.
    pub applications: usize,
    /// Total packages, synthetic namespace packages included.
    pub packages: usize,
    /// Total classes.
    pub classes: usize,
    /// Total methods.
    pub methods: usize,
    /// Deepest package nesting over all applications.
    pub max_depth: usize,
}

impl LandscapeStats {
    /// Compute the statistics of `apps`.
    #[must_use]
    pub fn of(apps: &[Application]) -> Self {
        apps.iter().fold(
            Self { applications: apps.len(), ..Self::default() },
            |acc, app| Self {
                packages: acc.packages + app.packages.len(),
                classes: acc.classes + app.classes.len(),
                methods: acc.methods + app.methods.len(),
                max_depth: acc.max_depth.max(app.max_depth()),
                ..acc
            },
        )
    }
}
