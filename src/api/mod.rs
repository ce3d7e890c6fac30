use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::error::{ErrorBody, ErrorKind};

mod audit;
mod command;
mod query;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(command::routes());
    routes.extend(query::routes());
    routes.extend(audit::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![error_catcher]
}

/// Give failed guards (missing tokens, malformed bodies, unknown routes) the
/// same JSON error body as failed commands.
#[catch(default)]
fn error_catcher(status: Status, req: &Request) -> (Status, Json<ErrorBody>) {
    let kind = match status.code {
        401 | 403 => ErrorKind::Unauthorized,
        404 => ErrorKind::NotFound,
        400 | 415 | 422 => ErrorKind::InvalidArgument,
        409 => ErrorKind::Conflict,
        _ => ErrorKind::Internal,
    };
    let body = ErrorBody {
        kind,
        message: format!("{status} for {} {}", req.method(), req.uri()),
    };
    (status, Json(body))
}
