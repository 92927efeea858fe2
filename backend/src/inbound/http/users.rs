//! User record handlers.
//!
//! ```text
//! POST   /users        {"name":"Ada","email":"ada@example.com","score":7}
//! GET    /users/{id}
//! GET    /users?name=ad&minScore=5&page=1&limit=10&sortBy=score&sortOrder=asc
//! PUT    /users/{id}   {"score":9}
//! DELETE /users/{id}
//! ```
//!
//! Bodies arrive as raw JSON values and ids as raw strings so the
//! validation layer can name every offending field itself.

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::Paginated;
use serde_json::Value;

use crate::domain::validation::{parse_new_user, parse_user_changes, parse_user_id};
use crate::domain::{User, UserListParams};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Create a record. Responds 201 with the stored record.
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let input = parse_new_user(&payload)?;
    let user = state.users.create(input).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Fetch one record by id.
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let user = state.users_query.get(&id).await?;
    Ok(web::Json(user))
}

/// List records with filtering, sorting and pagination.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_api::inbound::http::users::list_users;
///
/// let app = App::new().service(list_users);
/// ```
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    params: web::Query<UserListParams>,
) -> ApiResult<web::Json<Paginated<User>>> {
    let query = params.parse()?;
    let page = state.users_query.list(&query).await?;
    Ok(web::Json(page))
}

/// Apply a partial update.
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let changes = parse_user_changes(&payload)?;
    let user = state.users.update(&id, changes).await?;
    Ok(web::Json(user))
}

/// Remove a record. Responds 204 with an empty body.
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    state.users.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests;
