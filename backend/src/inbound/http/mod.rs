//! HTTP inbound adapter exposing the user record REST endpoints.
//!
//! [`configure`] registers every route together with extractor settings that
//! turn unreadable bodies and query strings into domain errors, so clients
//! always receive the standard error payload.

pub mod error;
pub mod health;
pub mod state;
pub mod users;

use actix_web::{HttpRequest, error::JsonPayloadError, error::QueryPayloadError, web};
use tracing::debug;

use crate::domain::Error;

pub use error::ApiResult;

const MALFORMED_JSON_MESSAGE: &str = "Invalid JSON format";
const MALFORMED_QUERY_MESSAGE: &str = "Invalid query string";

fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, path = req.path(), "rejected request body");
    Error::malformed_request(MALFORMED_JSON_MESSAGE).into()
}

fn query_error(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, path = req.path(), "rejected query string");
    Error::malformed_request(MALFORMED_QUERY_MESSAGE).into()
}

/// Register the user and health routes with their extractor configuration.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_api::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(health::health)
        .service(health::ready)
        .service(health::live)
        .service(users::create_user)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user);
}
