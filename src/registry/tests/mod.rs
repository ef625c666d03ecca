use super::*;
use crate::types::{HandlerKind, RouteRegistration};
use yare::parameterized;


fn session_route(method: &str, path: &str, handler: HandlerKind) -> RouteRegistration {
    RouteRegistration::new(method, path, handler).session_authenticated()
}

fn registered(group: &str, action: &str) -> Registration {
    Registration::Registered {
        group: group.to_string(),
        action: action.to_string(),
    }
}

fn skipped(reason: SkipReason) -> Registration {
    Registration::Skipped { reason }
}

fn register(registry: &RouteRegistry, method: &str, path: &str, handler: HandlerKind) -> Registration {
    registry
        .register(&session_route(method, path, handler))
        .unwrap()
}

#[parameterized(
    create = { "PUT", "/api/v1/projects", HandlerKind::Create, "projects", "create" },
    read_all = { "GET", "/api/v1/projects", HandlerKind::ReadAll, "projects", "read_all" },
    read_one = { "GET", "/api/v1/projects/:project", HandlerKind::ReadOne, "projects", "read_one" },
    update = { "POST", "/api/v1/projects/:project", HandlerKind::Update, "projects", "update" },
    delete = { "DELETE", "/api/v1/projects/:project", HandlerKind::Delete, "projects", "delete" },
    nested_group = { "PUT", "/api/v1/projects/:project/views", HandlerKind::Create, "projects_views", "create" },
    project_tasks_alias = { "PUT", "/api/v1/projects/:project/tasks", HandlerKind::Create, "tasks", "create" },
    tasks_all_alias = { "GET", "/api/v1/tasks/all", HandlerKind::ReadAll, "tasks", "read_all" },
    upload_attachment = { "PUT", "/api/v1/tasks/:task/attachments", HandlerKind::UploadAttachment, "tasks_attachments", "create" },
    get_attachment = { "GET", "/api/v1/tasks/:task/attachments/:attachment", HandlerKind::GetAttachment, "tasks_attachments", "read_one" },
    generic_sub_route = { "GET", "/api/v1/projects/:project/background", HandlerKind::Generic, "projects", "background" },
    generic_deep_sub_route = { "POST", "/api/v1/projects/:project/views/:view/buckets", HandlerKind::Generic, "projects", "views_buckets" },
    generic_top_level = { "GET", "/api/v1/info", HandlerKind::Generic, "other", "info" },
    generic_aliased = { "GET", "/api/v1/tasks/all", HandlerKind::Generic, "other", "tasks" },
)]
fn test_register(method: &str, path: &str, handler: HandlerKind, group: &str, action: &str) {
    let registry = RouteRegistry::new();
    assert_eq!(
        register(&registry, method, path, handler),
        registered(group, action)
    );

    let catalog = registry.catalog().unwrap();
    let route = catalog.get(group).and_then(|g| g.get(action)).unwrap();
    assert_eq!(route, &RouteDetail::new(path, method));
}

#[parameterized(
    user = { "/api/v1/user", HandlerKind::Generic },
    user_canonical = { "/api/v1/user", HandlerKind::ReadOne },
    user_settings = { "/api/v1/user/settings/general", HandlerKind::Generic },
    user_prefixed_group = { "/api/v1/user/timezones", HandlerKind::ReadAll },
    token_test = { "/api/v1/tokenTest", HandlerKind::Generic },
    subscriptions = { "/api/v1/subscriptions/:entity/:entityID", HandlerKind::Create },
    tokens = { "/api/v1/tokens", HandlerKind::ReadAll },
    token = { "/api/v1/tokens/:token", HandlerKind::Delete },
    wildcard = { "/api/v1/*", HandlerKind::Generic },
    tasks_bulk = { "/api/v1/tasks/bulk", HandlerKind::Update },
    labels_bulk = { "/api/v1/tasks/:projecttask/labels/bulk", HandlerKind::Create },
)]
fn test_excluded_groups_never_registered(path: &str, handler: HandlerKind) {
    let registry = RouteRegistry::new();
    assert_eq!(
        register(&registry, "POST", path, handler),
        skipped(SkipReason::Excluded)
    );
    assert!(registry.catalog().unwrap().is_empty());
}

#[test]
fn test_users_group_is_not_excluded() {
    // Only "user" and "user_*" are excluded, not every group starting with "user".
    let registry = RouteRegistry::new();
    assert_eq!(
        register(&registry, "GET", "/api/v1/users", HandlerKind::Generic),
        registered("other", "users")
    );
}

#[test]
fn test_not_found_route_is_skipped() {
    let registry = RouteRegistry::new();
    assert_eq!(
        register(&registry, "GET", "/api/v1/*", HandlerKind::NotFound),
        skipped(SkipReason::NotFound)
    );
}

#[test]
fn test_route_without_session_auth_is_skipped() {
    let registry = RouteRegistry::new();
    let route = RouteRegistration::new("POST", "/api/v1/login", HandlerKind::Generic);
    assert_eq!(
        registry.register(&route).unwrap(),
        skipped(SkipReason::NoSessionAuth)
    );

    // Public routes outside the API prefix are never classified.
    let route = RouteRegistration::new("GET", "/health", HandlerKind::Generic);
    assert_eq!(
        registry.register(&route).unwrap(),
        skipped(SkipReason::NoSessionAuth)
    );
    assert!(registry.catalog().unwrap().is_empty());
}

#[test]
fn test_session_route_outside_prefix_fails() {
    let registry = RouteRegistry::new();
    let err = registry
        .register(&session_route("GET", "/internal/metrics", HandlerKind::Generic))
        .unwrap_err();
    assert_eq!(
        err,
        RouteError::UnclassifiableRoute {
            path: "/internal/metrics".to_string(),
            prefix: "/api/v1/".to_string(),
        }
    );
}

#[test]
fn test_bare_prefix_is_skipped() {
    let registry = RouteRegistry::new();
    assert_eq!(
        register(&registry, "GET", "/api/v1/", HandlerKind::Generic),
        skipped(SkipReason::EmptyGroup)
    );
}

#[parameterized(
    upload_outside_group = { "PUT", "/api/v1/projects/:project/attachments", HandlerKind::UploadAttachment },
    get_outside_group = { "GET", "/api/v1/tasks/:task/files/:file", HandlerKind::GetAttachment },
)]
fn test_attachment_handlers_outside_attachment_group(method: &str, path: &str, handler: HandlerKind) {
    let registry = RouteRegistry::new();
    assert_eq!(
        register(&registry, method, path, handler),
        skipped(SkipReason::UnmappedAttachment)
    );
    assert!(registry.catalog().unwrap().is_empty());
}

#[test]
fn test_canonical_reregistration_replaces_route() {
    let registry = RouteRegistry::new();
    register(&registry, "GET", "/api/v1/labels", HandlerKind::ReadAll);
    assert_eq!(
        register(&registry, "GET", "/api/v1/labels", HandlerKind::ReadAll),
        skipped(SkipReason::AlreadyRegistered)
    );
    assert_eq!(
        register(&registry, "POST", "/api/v1/labels", HandlerKind::ReadAll),
        registered("labels", "read_all")
    );

    let catalog = registry.catalog().unwrap();
    let labels = catalog.get("labels").unwrap();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels.get("read_all").unwrap().method, "POST");
}

#[test]
fn test_register_all() {
    let registry = RouteRegistry::new();
    let routes = vec![
        session_route("GET", "/api/v1/labels", HandlerKind::ReadAll),
        session_route("PUT", "/api/v1/labels", HandlerKind::Create),
        RouteRegistration::new("GET", "/api/v1/info", HandlerKind::Generic),
    ];
    let outcomes = registry.register_all(&routes).unwrap();
    assert_eq!(
        outcomes,
        vec![
            registered("labels", "read_all"),
            registered("labels", "create"),
            skipped(SkipReason::NoSessionAuth),
        ]
    );
}

#[test]
fn test_register_all_stops_at_first_error() {
    let registry = RouteRegistry::new();
    let routes = vec![
        session_route("GET", "/api/v1/labels", HandlerKind::ReadAll),
        session_route("GET", "/v1/broken", HandlerKind::Generic),
        session_route("PUT", "/api/v1/labels", HandlerKind::Create),
    ];
    assert!(registry.register_all(&routes).is_err());

    let catalog = registry.catalog().unwrap();
    let labels = catalog.get("labels").unwrap();
    assert!(labels.contains_action("read_all"));
    assert!(!labels.contains_action("create"));
}

#[test]
fn test_catalog_snapshot() {
    let registry = RouteRegistry::new();
    register(&registry, "PUT", "/api/v1/projects/:project/tasks", HandlerKind::Create);
    register(&registry, "GET", "/api/v1/info", HandlerKind::Generic);
    register(&registry, "GET", "/api/v1/user", HandlerKind::Generic);

    insta::assert_json_snapshot!(registry.catalog().unwrap(), @r#"
    {
      "other": {
        "info": {
          "path": "/api/v1/info",
          "method": "GET"
        }
      },
      "tasks": {
        "create": {
          "path": "/api/v1/projects/:project/tasks",
          "method": "PUT"
        }
      }
    }
    "#);
}

#[test]
fn test_catalog_json_matches_catalog() {
    let registry = RouteRegistry::new();
    register(&registry, "GET", "/api/v1/tasks/all", HandlerKind::ReadAll);
    register(&registry, "GET", "/api/v1/projects/:project/background", HandlerKind::Generic);

    let json = registry.catalog_json().unwrap();
    assert_eq!(json["tasks"]["read_all"]["path"], "/api/v1/tasks/all");
    assert_eq!(json["projects"]["background"]["method"], "GET");

    let catalog: RouteCatalog = serde_json::from_value(json).unwrap();
    assert_eq!(catalog, registry.catalog().unwrap());
}

#[test]
fn test_validate_permissions_against_registry() {
    let registry = RouteRegistry::new();
    register(&registry, "PUT", "/api/v1/projects/:project/tasks", HandlerKind::Create);

    let valid = PermissionSet::new().grant("tasks", ["create"]);
    assert!(registry.validate_permissions(&valid).is_ok());

    let invalid = PermissionSet::new().grant("nonexistent_group", ["create"]);
    assert_eq!(
        registry.validate_permissions(&invalid).unwrap_err(),
        RouteError::InvalidPermissionGroup {
            group: "nonexistent_group".to_string()
        }
    );
}

#[test]
fn test_registry_clones_share_state() {
    let registry = RouteRegistry::new();
    let clone = registry.clone();
    register(&clone, "GET", "/api/v1/labels", HandlerKind::ReadAll);
    assert!(registry.catalog().unwrap().contains_group("labels"));
}

#[test]
fn test_concurrent_catalog_reads() {
    use std::thread;

    let registry = RouteRegistry::new();
    register(&registry, "GET", "/api/v1/labels", HandlerKind::ReadAll);
    register(&registry, "PUT", "/api/v1/labels", HandlerKind::Create);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    let catalog = registry.catalog().unwrap();
                    assert_eq!(catalog.get("labels").unwrap().len(), 2);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
