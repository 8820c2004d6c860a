//! Route role catalog and role registry tests

use proptest::prelude::*;
use rolegate_authz::catalog::{
    CatalogBuilder, Constraints, RbacRouteConfig, RouteDefinition,
};
use rolegate_authz::config::RbacOptions;
use serde_json::json;

fn index_routes(builder: &mut CatalogBuilder) {
    builder.register(
        RouteDefinition::new(["GET"], "/")
            .with_rbac(RbacRouteConfig::resource("index").operations(["read"])),
    );
    builder.register(
        RouteDefinition::new(["POST"], "/")
            .with_rbac(RbacRouteConfig::resource("index").operations(["create"])),
    );
    builder.register(RouteDefinition::new(["PUT"], "/"));
    builder.register(RouteDefinition::new(["DELETE"], "/").with_rbac(RbacRouteConfig::default()));
    builder.register(
        RouteDefinition::new(["GET", "PUT"], "/:id")
            .with_rbac(RbacRouteConfig::resource("dynamic").operations(["*"])),
    );
}

#[test]
fn test_catalog_records_declared_routes_in_order() {
    let mut builder = CatalogBuilder::new(&RbacOptions::default());
    index_routes(&mut builder);
    let catalog = builder.finalize();

    let routes = catalog.routes();
    let keys: Vec<&str> = routes.keys().collect();
    assert_eq!(keys, ["GET:/", "POST:/", "GET:/:id", "PUT:/:id"]);

    assert_eq!(catalog.required_roles("GET:/").unwrap().as_ref(), ["index:read"]);
    assert_eq!(catalog.required_roles("POST:/").unwrap().as_ref(), ["index:create"]);
    assert_eq!(catalog.required_roles("PUT:/:id").unwrap().as_ref(), ["dynamic:*"]);
    assert!(catalog.required_roles("PUT:/").is_none());
    assert!(catalog.required_roles("DELETE:/").is_none());
}

#[test]
fn test_registry_is_deduplicated() {
    let mut builder = CatalogBuilder::new(&RbacOptions::default());
    index_routes(&mut builder);
    let catalog = builder.finalize();

    let mut roles = catalog.roles().to_vec();
    roles.sort();
    assert_eq!(roles, ["dynamic:*", "index:*", "index:create", "index:read"]);
}

#[test]
fn test_registry_includes_additional_privileges() {
    let options = RbacOptions {
        additional_privileges: vec!["admin:*".to_string(), "index:read".to_string()],
        ..RbacOptions::default()
    };
    let mut builder = CatalogBuilder::new(&options);
    index_routes(&mut builder);
    let catalog = builder.finalize();

    assert_eq!(catalog.roles().len(), 5);
    assert!(catalog.roles().iter().any(|r| r == "admin:*"));
}

#[test]
fn test_hierarchy_starts_with_wildcard() {
    let mut builder = CatalogBuilder::new(&RbacOptions::default());
    index_routes(&mut builder);
    let catalog = builder.finalize();

    let hierarchy = catalog.hierarchy();
    assert_eq!(hierarchy["index"], ["*", "read", "create"]);
    assert_eq!(hierarchy["dynamic"], ["*"]);
    assert!(!hierarchy.contains_key("DELETE"));
}

#[test]
fn test_missing_operations_allow_everything() {
    let mut builder = CatalogBuilder::new(&RbacOptions::default());
    builder.register(RouteDefinition::new(["GET"], "/all").with_rbac(RbacRouteConfig::resource("report")));
    builder.register(
        RouteDefinition::new(["POST"], "/all")
            .with_rbac(RbacRouteConfig::resource("report").operations(Vec::<String>::new())),
    );
    let catalog = builder.finalize();

    assert_eq!(catalog.required_roles("GET:/all").unwrap().as_ref(), ["report:*"]);
    assert_eq!(catalog.required_roles("POST:/all").unwrap().as_ref(), ["report:*"]);
}

#[test]
fn test_first_registration_wins() {
    let mut builder = CatalogBuilder::new(&RbacOptions::default());
    let first = builder.register(
        RouteDefinition::new(["GET"], "/")
            .with_rbac(RbacRouteConfig::resource("index").operations(["read"])),
    );
    let second = builder.register(
        RouteDefinition::new(["GET"], "/")
            .with_rbac(RbacRouteConfig::resource("other").operations(["write"])),
    );
    let catalog = builder.finalize();

    assert_eq!(first.key_for("GET"), Some("GET:/"));
    assert_eq!(second.key_for("GET"), None);
    assert_eq!(catalog.routes().len(), 1);
    assert_eq!(catalog.required_roles("GET:/").unwrap().as_ref(), ["index:read"]);
    assert!(!catalog.hierarchy().contains_key("other"));
    assert!(!catalog.roles().iter().any(|r| r.starts_with("other")));
}

#[test]
fn test_constraints_distinguish_routes() {
    let mut builder = CatalogBuilder::new(&RbacOptions::default());
    let v1 = builder.register(
        RouteDefinition::new(["GET"], "/report")
            .with_constraint("version", "1.0.0")
            .with_rbac(RbacRouteConfig::resource("report").operations(["read"])),
    );
    let v2 = builder.register(
        RouteDefinition::new(["GET"], "/report")
            .with_constraint("version", "2.0.0")
            .with_rbac(RbacRouteConfig::resource("report").operations(["export"])),
    );
    let catalog = builder.finalize();

    let v1_key = v1.key_for("GET").unwrap();
    let v2_key = v2.key_for("GET").unwrap();
    assert_eq!(v1_key, r#"GET:/report - {"version":"1.0.0"}"#);
    assert_ne!(v1_key, v2_key);
    assert_eq!(catalog.required_roles(v2_key).unwrap().as_ref(), ["report:export"]);
    assert!(catalog.required_roles("GET:/report").is_none());
}

#[test]
fn test_constraint_deriver_runs_before_key() {
    let mut builder = CatalogBuilder::new(&RbacOptions::default()).with_constraint_deriver(
        |route: &RouteDefinition| {
            route.path.starts_with("/tenant").then(|| {
                let mut derived = Constraints::new();
                derived.insert("tenant".to_string(), json!("acme"));
                derived
            })
        },
    );

    let tenant = builder.register(
        RouteDefinition::new(["GET"], "/tenant/users")
            .with_constraint("version", "1")
            .with_rbac(RbacRouteConfig::resource("user").operations(["read"])),
    );
    let plain = builder.register(
        RouteDefinition::new(["GET"], "/users")
            .with_rbac(RbacRouteConfig::resource("user").operations(["read"])),
    );

    assert_eq!(
        tenant.key_for("GET"),
        Some(r#"GET:/tenant/users - {"tenant":"acme","version":"1"}"#)
    );
    assert_eq!(tenant.constraints.as_ref().unwrap()["tenant"], json!("acme"));
    assert_eq!(plain.key_for("GET"), Some("GET:/users"));
    assert!(plain.constraints.is_none());
}

#[test]
fn test_empty_derived_constraints_keep_plain_key() {
    let mut builder = CatalogBuilder::new(&RbacOptions::default())
        .with_constraint_deriver(|_: &RouteDefinition| Some(Constraints::new()));

    let binding = builder.register(
        RouteDefinition::new(["GET"], "/users")
            .with_rbac(RbacRouteConfig::resource("user").operations(["read"])),
    );

    assert_eq!(binding.key_for("GET"), Some("GET:/users"));
    assert!(binding.constraints.is_none());
    assert!(builder.finalize().required_roles("GET:/users").is_some());
}

#[test]
fn test_reconfigure_route_table() {
    let mut builder = CatalogBuilder::new(&RbacOptions::default());
    index_routes(&mut builder);
    let catalog = builder.finalize();

    let removed = catalog.reconfigure_unchecked(|routes| routes.remove("GET:/"));
    assert_eq!(removed.unwrap().as_ref(), ["index:read"]);
    assert!(catalog.required_roles("GET:/").is_none());

    catalog.reconfigure_unchecked(|routes| routes.insert("GET:/", vec!["index:*".to_string()]));
    assert_eq!(catalog.required_roles("GET:/").unwrap().as_ref(), ["index:*"]);

    catalog.reconfigure_unchecked(|routes| routes.clear());
    assert!(catalog.routes().is_empty());
}

proptest! {
    #[test]
    fn prop_finalize_removes_duplicates(
        privileges in prop::collection::vec("[a-c]{1,2}:[a-c*]", 0..20)
    ) {
        let options = RbacOptions {
            additional_privileges: privileges.clone(),
            ..RbacOptions::default()
        };
        let catalog = CatalogBuilder::new(&options).finalize();

        let mut expected = privileges;
        expected.sort();
        expected.dedup();

        let mut roles = catalog.roles().to_vec();
        roles.sort();
        prop_assert_eq!(roles, expected);
    }
}
