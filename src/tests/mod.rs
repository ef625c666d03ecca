//! Crate-level tests that run the registry, validator and authorizer together
//! over a realistic route table.

use crate::{HandlerKind, RouteRegistration, RouteRegistry};


/// Routes as a router would enumerate them at startup.
pub(crate) fn api_routes() -> Vec<RouteRegistration> {
    use HandlerKind::*;

    let session = [
        ("GET", "/api/v1/info", Generic),
        ("GET", "/api/v1/user", Generic),
        ("POST", "/api/v1/user/password", Generic),
        ("GET", "/api/v1/user/timezones", Generic),
        ("GET", "/api/v1/tokenTest", Generic),
        ("GET", "/api/v1/routes", Generic),
        ("GET", "/api/v1/tokens", ReadAll),
        ("PUT", "/api/v1/tokens", Create),
        ("DELETE", "/api/v1/tokens/:token", Delete),
        ("PUT", "/api/v1/subscriptions/:entity/:entityID", Create),
        ("GET", "/api/v1/projects", ReadAll),
        ("PUT", "/api/v1/projects", Create),
        ("GET", "/api/v1/projects/:project", ReadOne),
        ("POST", "/api/v1/projects/:project", Update),
        ("DELETE", "/api/v1/projects/:project", Delete),
        ("GET", "/api/v1/projects/:project/background", Generic),
        ("DELETE", "/api/v1/projects/:project/background", Generic),
        ("PUT", "/api/v1/projects/:project/duplicate", Create),
        ("GET", "/api/v1/projects/:project/views", ReadAll),
        ("PUT", "/api/v1/projects/:project/views", Create),
        ("PUT", "/api/v1/projects/:project/tasks", Create),
        ("GET", "/api/v1/tasks/all", ReadAll),
        ("GET", "/api/v1/tasks/:projecttask", ReadOne),
        ("POST", "/api/v1/tasks/:projecttask", Update),
        ("DELETE", "/api/v1/tasks/:projecttask", Delete),
        ("POST", "/api/v1/tasks/bulk", Update),
        ("POST", "/api/v1/tasks/:projecttask/position", Generic),
        ("PUT", "/api/v1/tasks/:task/attachments", UploadAttachment),
        ("GET", "/api/v1/tasks/:task/attachments", ReadAll),
        ("GET", "/api/v1/tasks/:task/attachments/:attachment", GetAttachment),
        ("DELETE", "/api/v1/tasks/:task/attachments/:attachment", Delete),
        ("GET", "/api/v1/labels", ReadAll),
        ("PUT", "/api/v1/labels", Create),
        ("GET", "/api/v1/notifications", ReadAll),
        ("POST", "/api/v1/notifications", Generic),
    ];

    let public = [
        ("POST", "/api/v1/login", Generic),
        ("POST", "/api/v1/register", Generic),
        ("GET", "/api/v1/*", NotFound),
    ];

    session
        .into_iter()
        .map(|(method, path, handler)| {
            RouteRegistration::new(method, path, handler).session_authenticated()
        })
        .chain(
            public
                .into_iter()
                .map(|(method, path, handler)| RouteRegistration::new(method, path, handler)),
        )
        .collect()
}

pub(crate) fn api_registry() -> RouteRegistry {
    let registry = RouteRegistry::new();
    registry.register_all(&api_routes()).unwrap();
    registry
}
