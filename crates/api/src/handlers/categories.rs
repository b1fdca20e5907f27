//! Handlers for the `/categories` resource. Reads are public; mutations
//! require the admin role.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use haven_core::error::CoreError;
use haven_core::types::DbId;
use haven_db::models::category::{CreateCategory, UpdateCategory};
use haven_db::repositories::CategoryRepo;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// Request body for `POST /categories`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(url(message = "Image must be a URL"))]
    pub image: Option<String>,
}

/// Request body for `PUT /categories/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: Option<String>,
    #[validate(url(message = "Image must be a URL"))]
    pub image: Option<String>,
}

/// GET /api/v1/categories
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let categories = CategoryRepo::list(&state.pool).await?;
    Ok(Json(json!({ "categories": categories })))
}

/// POST /api/v1/categories
pub async fn create_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    input.validate()?;

    let category = CategoryRepo::create(
        &state.pool,
        &CreateCategory {
            name: input.name,
            description: input.description,
            image: input.image,
        },
    )
    .await?;

    tracing::info!(category_id = category.id, admin_id = admin.user_id, "Category created");

    Ok((StatusCode::CREATED, Json(json!({ "category": category }))))
}

/// PUT /api/v1/categories/{id}
pub async fn update_category(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategoryRequest>,
) -> AppResult<Json<serde_json::Value>> {
    input.validate()?;

    let update = UpdateCategory {
        name: input.name,
        description: input.description,
        image: input.image,
    };
    let category = CategoryRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(CoreError::NotFound("Category"))?;

    Ok(Json(json!({ "category": category })))
}

/// DELETE /api/v1/categories/{id}
///
/// Articles in the category keep existing with no category.
pub async fn delete_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CategoryRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound("Category").into());
    }
    tracing::info!(category_id = id, admin_id = admin.user_id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
