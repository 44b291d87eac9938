//! Communication styles: policies for picking the next class to call.
//!
//! Every style is a pure function of the selection context and the random handle. Running out of
//! eligible candidates is reported as `None` ("exhaustion"); the simulator decides how to recover.
//! When the calling class has no containing package, every style degrades to uniform selection.
use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{
    debug,
    instrument,
};

use crate::model::{
    Application,
    ClassRef,
    PackageId,
};
use crate::params::CommunicationStyle;

/// Everything a style may look at when choosing the next class.
#[derive(Clone, Copy, Debug)]
pub struct Selection<'a> {
    /// Applications being simulated over.
    pub apps: &'a [Application],
    /// Every class of every application.
    pub classes: &'a [ClassRef],
    /// The class that is making the call.
    pub previous: ClassRef,
    /// Classes that have already been called during this simulation.
    pub visited: &'a HashSet<ClassRef>,
    /// Whether already visited classes may be called again.
    pub allow_cyclic_calls: bool,
}

impl Selection<'_> {
    /// Drop visited classes from `pool` unless cycles are allowed.
    fn unvisited(&self, pool: impl IntoIterator<Item = ClassRef>) -> Vec<ClassRef> {
        pool.into_iter()
            .filter(|c| self.allow_cyclic_calls || !self.visited.contains(c))
            .collect()
    }

    /// Classes under the caller's immediate package, or `None` if the caller has no package.
    fn package_pool(&self) -> Option<Vec<ClassRef>> {
        let app = &self.apps[self.previous.app];
        let parent: PackageId = app.class(self.previous.class).parent?;
        Some(
            app.classes_under(parent)
                .into_iter()
                .map(|class| ClassRef { app: self.previous.app, class })
                .collect(),
        )
    }
}

/// Pick the next class according to `style`.
pub fn select_next<R: Rng>(style: CommunicationStyle, sel: &Selection, rng: &mut R) -> Option<ClassRef> {
    match style {
        CommunicationStyle::TrueRandom => true_random(sel, rng),
        CommunicationStyle::Cohesive => cohesive(sel, rng),
        CommunicationStyle::RandomExit => random_exit(sel, rng),
    }
}

/// Uniform choice over all classes.
pub fn true_random<R: Rng>(sel: &Selection, rng: &mut R) -> Option<ClassRef> {
    sel.unvisited(sel.classes.iter().copied()).choose(rng).copied()
}

/// Follow the caller's link if it has one, otherwise stay inside the caller's package.
pub fn cohesive<R: Rng>(sel: &Selection, rng: &mut R) -> Option<ClassRef> {
    let app = &sel.apps[sel.previous.app];
    if let Some(linked) = app.class(sel.previous.class).linked_class {
        return Some(linked);
    }
    let Some(local) = sel.package_pool() else {
        return true_random(sel, rng);
    };
    sel.unvisited(local).choose(rng).copied()
}

/// Stay inside the caller's package four times in five, otherwise call any class outside of it.
pub fn random_exit<R: Rng>(sel: &Selection, rng: &mut R) -> Option<ClassRef> {
    let Some(local) = sel.package_pool() else {
        return true_random(sel, rng);
    };

    if rng.gen_ratio(4, 5) {
        if let Some(&next) = sel.unvisited(local.iter().copied()).choose(rng) {
            return Some(next);
        }
    }

    let local: HashSet<ClassRef> = local.into_iter().collect();
    let outside = sel.classes.iter().copied().filter(|c| !local.contains(c));
    sel.unvisited(outside).choose(rng).copied()
}

/// Link one class of every package to one class of the next package, circularly.
///
/// Only packages with at least one direct class take part; they are ordered by application and
/// then by position in the package arena, and the last one wraps around to the first. Links left
/// over from a previous pass are cleared first. Returns the number of links created.
#[instrument(skip_all, fields(apps = apps.len()))]
pub fn link_cohesive<R: Rng>(apps: &mut [Application], rng: &mut R) -> usize {
    for app in apps.iter_mut() {
        for class in &mut app.classes {
            class.linked_class = None;
        }
    }

    let populated: Vec<(usize, PackageId)> = apps
        .iter()
        .enumerate()
        .flat_map(|(app_idx, app)| {
            app.packages
                .iter()
                .enumerate()
                .filter(|(_, pkg)| !pkg.classes.is_empty())
                .map(move |(pkg_idx, _)| (app_idx, PackageId(pkg_idx)))
        })
        .collect();

    // the wrap-around below needs at least one package
    if populated.is_empty() {
        debug!("No populated packages to link");
        return 0;
    }

    let mut links = 0;
    for (i, &(from_app, from_pkg)) in populated.iter().enumerate() {
        let (to_app, to_pkg) = populated[(i + 1) % populated.len()];
        let from = apps[from_app].package(from_pkg).classes.choose(rng).copied();
        let to = apps[to_app].package(to_pkg).classes.choose(rng).copied();
        if let (Some(from), Some(to)) = (from, to) {
            apps[from_app].classes[from.0].linked_class = Some(ClassRef { app: to_app, class: to });
            links += 1;
        }
    }
    debug!(links, "Linked packages");
    links
}
