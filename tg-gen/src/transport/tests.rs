use rstest::*;
use tracing_test::traced_test;

use super::*;
use crate::landscape::generate_landscape;
use crate::model::LandscapeStats;
use crate::params::GenerationParams;

#[fixture]
fn apps() -> Vec<Application> {
    generate_landscape(&GenerationParams {
        app_count: 2,
        package_depth: 3,
        min_class_count: 6,
        max_class_count: 15,
        min_method_count: 1,
        max_method_count: 4,
        balance: 0.4,
        seed: Some(555),
    })
    .unwrap()
}

const STRUCTURE_JSON: &str = r#"{
    "landscapeToken": "7cd8a9a7-b840-4735-9ef0-2dbbfa01c039",
    "nodes": [{
        "ipAddress": "10.0.0.1",
        "hostName": "node-1",
        "applications": [{
            "name": "petclinic",
            "language": "java",
            "instanceId": "0",
            "packages": [{
                "name": "org",
                "subPackages": [{
                    "name": "clinic",
                    "subPackages": [],
                    "classes": [
                        {"name": "Owner", "methods": [{"name": "getName", "hashCode": "1"}]},
                        {"name": "Vet", "methods": [{"name": "getSpecialties", "hashCode": "2"}, {"name": "toString", "hashCode": "3"}]}
                    ]
                }],
                "classes": []
            }]
        }]
    }]
}"#;

#[rstest]
fn test_clean_has_no_back_references(apps: Vec<Application>) {
    let json = serde_json::to_string(&clean(&apps[0])).unwrap();
    assert!(!json.contains("parent\""));
    assert!(!json.contains("linkedClass"));
    assert!(json.contains("parentAppName"));
}

#[rstest]
fn test_clean_flat_lists(apps: Vec<Application>) {
    let app = &apps[1];
    let cleaned = clean(app);

    assert_eq!(cleaned.classes.len(), app.classes.len());
    assert_eq!(cleaned.packages.len(), app.packages.len());
    assert_eq!(cleaned.methods.len(), app.methods.len());
    assert_eq!(cleaned.entry_point_fqn, app.class_fqn(app.entry_point));
    assert_eq!(cleaned.root_packages.len(), 1);
    assert_eq!(cleaned.root_packages[0].name, "org");
}

#[rstest]
fn test_round_trip(apps: Vec<Application>) {
    for app in &apps {
        let rebuilt = reconstruct(&clean(app)).unwrap();
        let new = &rebuilt.application;

        assert!(!rebuilt.entry_point_fallback);
        assert_eq!(LandscapeStats::of(std::slice::from_ref(new)), LandscapeStats::of(std::slice::from_ref(app)));
        assert_eq!(new.class_fqn(new.entry_point), app.class_fqn(app.entry_point));

        for (idx, pkg) in new.packages.iter().enumerate() {
            for &child in &pkg.subpackages {
                assert_eq!(new.package(child).parent, Some(PackageId(idx)));
            }
            for &class in &pkg.classes {
                assert_eq!(new.class(class).parent, Some(PackageId(idx)));
            }
        }
        assert!(new.root_packages.iter().all(|&r| new.package(r).parent.is_none()));
        assert_eq!(clean(new).root_packages, clean(app).root_packages);
    }
}

#[rstest]
fn test_round_trip_through_json(apps: Vec<Application>) {
    let exported: Vec<CleanApplication> = apps.iter().map(clean).collect();
    let json = serde_json::to_string(&exported).unwrap();

    let import: LandscapeImport = serde_json::from_str(&json).unwrap();
    assert!(matches!(import, LandscapeImport::Canonical(_)));
    let rebuilt = reconstruct_landscape(import).unwrap();
    assert_eq!(rebuilt.len(), apps.len());
    for (r, app) in rebuilt.iter().zip(&apps) {
        assert_eq!(r.application.name, app.name);
        assert_eq!(r.application.classes.len(), app.classes.len());
    }
}

#[rstest]
#[traced_test]
fn test_unknown_entry_point_falls_back(apps: Vec<Application>) {
    let mut cleaned = clean(&apps[0]);
    cleaned.entry_point_fqn = "org.nowhere.Ghost".into();
    let rebuilt = reconstruct(&cleaned).unwrap();

    assert!(rebuilt.entry_point_fallback);
    assert_eq!(rebuilt.application.entry_point, ClassId(0));
    assert!(logs_contain("Entry point not found"));
}

#[rstest]
fn test_no_classes_rejected() {
    let cleaned = CleanApplication {
        name: "empty".into(),
        root_packages: vec![CleanPackage { name: "org".into(), classes: vec![], subpackages: vec![] }],
        entry_point_fqn: String::new(),
        classes: vec![],
        packages: vec![],
        methods: vec![],
    };
    let err = reconstruct(&cleaned).unwrap_err();
    assert_eq!(err.downcast_ref::<GenError>(), Some(&GenError::NoClasses("empty".into())));
}

#[rstest]
fn test_structure_import() {
    let import: LandscapeImport = serde_json::from_str(STRUCTURE_JSON).unwrap();
    assert!(matches!(import, LandscapeImport::Structure(_)));

    let rebuilt = reconstruct_landscape(import).unwrap();
    assert_eq!(rebuilt.len(), 1);
    let app = &rebuilt[0].application;

    assert!(rebuilt[0].entry_point_fallback);
    assert_eq!(app.name, "petclinic");
    assert_eq!(app.packages.len(), 2);
    assert_eq!(app.classes.len(), 2);
    assert_eq!(app.methods.len(), 3);
    assert_eq!(app.class_fqn(app.entry_point), "org.clinic.Owner");
    assert!(app.classes.iter().all(|c| c.parent_app_name == "petclinic"));
}
