//! Bottom-up randomized landscape generation.
//!
//! Classes are created layer by layer starting from the deepest package level. Each layer's new
//! classes are shuffled in among the packages built for the layer below, and the mixed list is then
//! cut into random-length runs that each become a new package. Repeating this up to the top layer
//! yields a tree whose classes are spread over all depths, and whose packages mix classes and
//! subpackages instead of segregating them into separate branches.
//!
//! Every application is wrapped in the synthetic namespace `org.tracegenerator.<appname>`.

use anyhow::Result;
use rand::Rng;
use tg_core::rng::{
    rng_from_seed,
    SimRng,
};
use tracing::{
    debug,
    info,
    instrument,
};

use crate::errors::GenError;
use crate::model::{
    Application,
    ClassId,
    PackageId,
    TreeBuilder,
};
use crate::names::{
    sanitize_app_name,
    NameCategory,
    NamePool,
};
use crate::params::GenerationParams;

/// Outermost synthetic namespace segment.
pub const ROOT_NAMESPACE: &str = "org";
/// Second synthetic namespace segment.
pub const GENERATOR_NAMESPACE: &str = "tracegenerator";

/// Either kind of node that can be wrapped into a package while building a layer.
#[derive(Clone, Copy, Debug)]
enum Component {
    /// A class created for the current layer.
    Class(ClassId),
    /// A package built in a deeper layer.
    Package(PackageId),
}

/// Generate a single application.
pub fn generate(params: &GenerationParams) -> Result<Application> {
    let mut apps = generate_many(params, 1)?;
    apps.pop().ok_or_else(|| GenError::invalid("appCount >= 1"))
}

/// Generate `params.app_count` applications.
pub fn generate_landscape(params: &GenerationParams) -> Result<Vec<Application>> {
    generate_many(params, params.app_count)
}

/// Generate `count` applications sharing one name pool, so names never repeat across them.
#[instrument(skip(params), fields(package_depth = params.package_depth, balance = params.balance))]
pub fn generate_many(params: &GenerationParams, count: usize) -> Result<Vec<Application>> {
    params.validate()?;
    if count < 1 {
        return Err(GenError::invalid("appCount >= 1"));
    }

    let mut rng = rng_from_seed(params.seed);
    let mut names = NamePool::new();
    let apps = (0..count)
        .map(|_| generate_application(params, &mut names, &mut rng))
        .collect::<Result<Vec<_>>>()?;

    info!(
        apps = apps.len(),
        classes = apps.iter().map(|a| a.classes.len()).sum::<usize>(),
        methods = apps.iter().map(|a| a.methods.len()).sum::<usize>(),
        "Landscape generated"
    );
    Ok(apps)
}

/// Build one application tree, drawing all names from `names` and all randomness from `rng`.
pub(crate) fn generate_application(
    params: &GenerationParams,
    names: &mut NamePool,
    rng: &mut SimRng,
) -> Result<Application> {
    let app_name = names.next(NameCategory::Application, rng);
    let mut tree = TreeBuilder::default();

    let class_count = rng.gen_range(params.min_class_count..=params.max_class_count);
    let mut remaining = class_count;
    let mut current_layer: Vec<Component> = Vec::new();

    for layer in (1..=params.package_depth).rev() {
        // the deepest layer must hold at least one class so the tree has leaves
        let min_in_layer = usize::from(layer == params.package_depth);
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let max_in_layer = ((remaining as f64 * params.balance).floor() as usize).max(min_in_layer);
        let in_layer = rng.gen_range(min_in_layer..=max_in_layer);
        remaining -= in_layer;
        debug!(layer, in_layer, remaining, "Distributing classes");

        for _ in 0..in_layer {
            let class = new_class(&mut tree, &app_name, params, names, rng);
            let pos = rng.gen_range(0..=current_layer.len());
            current_layer.insert(pos, Component::Class(class));
        }

        let mut next_layer = Vec::new();
        while !current_layer.is_empty() {
            let take = rng.gen_range(1..=current_layer.len());
            let pkg = tree.add_package(names.next(NameCategory::Package, rng));
            for component in current_layer.drain(..take) {
                match component {
                    Component::Class(class) => tree.attach_class(pkg, class),
                    Component::Package(child) => tree.attach_package(pkg, child),
                }
            }
            next_layer.push(Component::Package(pkg));
        }
        current_layer = next_layer;
    }

    let top_packages = current_layer
        .into_iter()
        .map(|component| match component {
            Component::Package(pkg) => Ok(pkg),
            Component::Class(_) => Err(GenError::StructuralInvariant("class left outside of a package".into())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let leftover: Vec<ClassId> = (0..remaining)
        .map(|_| new_class(&mut tree, &app_name, params, names, rng))
        .collect();

    let org = tree.add_package(ROOT_NAMESPACE.into());
    let generator = tree.add_package(GENERATOR_NAMESPACE.into());
    let app_pkg = tree.add_package(sanitize_app_name(&app_name));
    tree.attach_package(org, generator);
    tree.attach_package(generator, app_pkg);
    for pkg in top_packages {
        tree.attach_package(app_pkg, pkg);
    }
    for class in leftover {
        tree.attach_class(app_pkg, class);
    }

    let entry_point = ClassId(rng.gen_range(0..tree.classes.len()));
    debug!(app = %app_name, class_count, packages = tree.packages.len(), "Application generated");
    Ok(tree.finish(app_name, vec![org], entry_point))
}

/// Create a detached class with a drawn number of freshly named methods.
fn new_class(
    tree: &mut TreeBuilder,
    app_name: &str,
    params: &GenerationParams,
    names: &mut NamePool,
    rng: &mut SimRng,
) -> ClassId {
    let method_count = rng.gen_range(params.min_method_count..=params.max_method_count);
    let methods = (0..method_count)
        .map(|_| tree.add_method(names.next(NameCategory::Method, rng)))
        .collect();
    tree.add_class(names.next(NameCategory::Class, rng), app_name, methods)
}

#[cfg(test)]
mod tests;
