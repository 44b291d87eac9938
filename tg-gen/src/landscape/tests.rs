use std::collections::HashSet;

use assertables::*;
use rstest::*;

use super::*;

fn params(package_depth: usize, min_classes: usize, max_classes: usize, balance: f64, seed: u64) -> GenerationParams {
    GenerationParams {
        app_count: 1,
        package_depth,
        min_class_count: min_classes,
        max_class_count: max_classes,
        min_method_count: 1,
        max_method_count: 4,
        balance,
        seed: Some(seed),
    }
}

/// Check that every parent link points at the node that actually lists the child.
fn assert_parents_consistent(app: &Application) {
    for (idx, pkg) in app.packages.iter().enumerate() {
        for &child in &pkg.subpackages {
            assert_eq!(app.package(child).parent, Some(PackageId(idx)));
        }
        for &class in &pkg.classes {
            assert_eq!(app.class(class).parent, Some(PackageId(idx)));
        }
    }
    for &root in &app.root_packages {
        assert_eq!(app.package(root).parent, None);
    }
    for class in &app.classes {
        assert!(class.parent.is_some());
    }
}

#[rstest]
fn test_flat_sizing_without_layers() {
    let params = GenerationParams {
        app_count: 1,
        package_depth: 0,
        min_class_count: 5,
        max_class_count: 5,
        min_method_count: 1,
        max_method_count: 1,
        balance: 0.5,
        seed: Some(7),
    };
    let apps = generate_landscape(&params).unwrap();

    assert_eq!(apps.len(), 1);
    let app = &apps[0];
    assert_eq!(app.classes.len(), 5);
    assert!(app.classes.iter().all(|c| c.methods.len() == 1));
    assert_eq!(app.packages.len(), 3);

    let app_pkg = app.package(app.class(ClassId(0)).parent.unwrap());
    assert_eq!(app_pkg.name, sanitize_app_name(&app.name));
    assert!(app_pkg.subpackages.is_empty());
    assert_eq!(app_pkg.classes.len(), 5);
}

#[rstest]
#[case(0, 1, 1, 0.5)]
#[case(1, 3, 8, 0.0)]
#[case(3, 5, 20, 0.5)]
#[case(4, 10, 40, 1.0)]
#[case(6, 1, 3, 0.3)]
fn test_bounds_hold(#[case] depth: usize, #[case] min: usize, #[case] max: usize, #[case] balance: f64) {
    for seed in 0..20 {
        let params = params(depth, min, max, balance, seed);
        let app = generate(&params).unwrap();

        assert_ge!(app.classes.len(), min);
        assert_le!(app.classes.len(), max);
        for class in &app.classes {
            assert_ge!(class.methods.len(), params.min_method_count);
            assert_le!(class.methods.len(), params.max_method_count);
            assert_eq!(class.parent_app_name, app.name);
        }
        let owned: usize = app.classes.iter().map(|c| c.methods.len()).sum();
        assert_eq!(owned, app.methods.len());
        assert_eq!(app.max_depth(), depth + 3);
        assert_lt!(app.entry_point.0, app.classes.len());
        assert_parents_consistent(&app);
    }
}

#[rstest]
fn test_tree_and_flat_lists_agree() {
    let app = generate(&params(3, 10, 30, 0.6, 11)).unwrap();

    let mut reached = Vec::new();
    for &root in &app.root_packages {
        reached.extend(app.classes_under(root));
    }
    let reached: HashSet<_> = reached.into_iter().collect();
    let flat: HashSet<_> = app.class_ids().collect();
    assert_eq!(reached, flat);
}

#[rstest]
fn test_fqn_starts_with_namespace() {
    let app = generate(&params(2, 4, 4, 0.5, 5)).unwrap();
    let prefix = format!("org.tracegenerator.{}.", sanitize_app_name(&app.name));
    for id in app.class_ids() {
        let fqn = app.class_fqn(id);
        assert!(fqn.starts_with(&prefix));
        assert!(fqn.ends_with(&app.class(id).identifier));
    }
}

#[rstest]
fn test_zero_balance_keeps_one_class_below_namespace() {
    let app = generate(&params(2, 10, 10, 0.0, 9)).unwrap();
    let app_pkg = app.package(app.package(app.package(app.root_packages[0]).subpackages[0]).subpackages[0]);

    assert_eq!(app_pkg.classes.len(), 9);
    assert_eq!(app_pkg.subpackages.len(), 1);
    assert_eq!(app.classes_under(app_pkg.subpackages[0]).len(), 1);
}

#[rstest]
fn test_layered_and_leftover_classes_add_up() {
    for seed in 0..10 {
        let app = generate(&params(1, 6, 6, 1.0, seed)).unwrap();
        let app_pkg = app.package(app.package(app.package(app.root_packages[0]).subpackages[0]).subpackages[0]);
        let layered: usize = app_pkg.subpackages.iter().map(|&p| app.classes_under(p).len()).sum();
        assert_ge!(layered, 1);
        assert_eq!(app_pkg.classes.len() + layered, 6);
    }
}

#[rstest]
fn test_same_seed_same_landscape() {
    let params = GenerationParams { app_count: 3, ..params(3, 5, 15, 0.5, 1234) };
    let a = generate_landscape(&params).unwrap();
    let b = generate_landscape(&params).unwrap();

    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.name, y.name);
        assert_eq!(x.packages, y.packages);
        assert_eq!(x.classes, y.classes);
        assert_eq!(x.methods, y.methods);
        assert_eq!(x.entry_point, y.entry_point);
    }
}

#[rstest]
fn test_names_unique_across_applications() {
    let params = GenerationParams { app_count: 4, ..params(2, 5, 10, 0.5, 99) };
    let apps = generate_landscape(&params).unwrap();

    let app_names: HashSet<_> = apps.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(app_names.len(), 4);
    let class_names: Vec<_> = apps.iter().flat_map(|a| a.classes.iter().map(|c| c.identifier.as_str())).collect();
    let unique: HashSet<_> = class_names.iter().collect();
    assert_eq!(unique.len(), class_names.len());
}

#[rstest]
fn test_invalid_params_rejected() {
    let bad = GenerationParams { max_class_count: 0, ..params(1, 1, 1, 0.5, 0) };
    let err = generate(&bad).unwrap_err();
    assert_eq!(
        err.downcast_ref::<GenError>(),
        Some(&GenError::InvalidParameter("maxClassCount >= minClassCount".into()))
    );

    let err = generate_many(&params(1, 1, 1, 0.5, 0), 0).unwrap_err();
    assert_eq!(err.downcast_ref::<GenError>(), Some(&GenError::InvalidParameter("appCount >= 1".into())));
}
