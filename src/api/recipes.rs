use actix_web::{web, HttpResponse, ResponseError};
use serde_json::Value;

use crate::database::DocumentStore;
use crate::models::{DeleteRecipeQuery, RecipeFilterParams};
use crate::services::auth_service::Claims;
use crate::services::recipe_service;

/// GET /Recipes - lists recipes matching the optional filters
pub async fn list_recipes(
    store: web::Data<dyn DocumentStore>,
    query: web::Query<RecipeFilterParams>,
) -> HttpResponse {
    match recipe_service::list_recipes(store.get_ref(), &query).await {
        Ok(recipes) => {
            log::info!("📋 GET /Recipes - {} recipes", recipes.len());
            HttpResponse::Ok().json(recipes)
        }
        Err(e) => {
            log::warn!("❌ GET /Recipes failed: {}", e);
            e.error_response()
        }
    }
}

/// POST /Recipes - creates a recipe together with its satellite rows
pub async fn create_recipe(
    store: web::Data<dyn DocumentStore>,
    body: web::Json<Value>,
) -> HttpResponse {
    match recipe_service::create_recipe(store.get_ref(), &body).await {
        Ok(recipe_id) => {
            log::info!("✅ Recipe created: {}", recipe_id);
            HttpResponse::Created().json(serde_json::json!({
                "success": true,
                "message": "Recipe created successfully",
                "id": recipe_id
            }))
        }
        Err(e) => {
            log::warn!("❌ Recipe creation failed: {}", e);
            e.error_response()
        }
    }
}

/// GET /Recipes/{id} - recipe plus all satellite collections
pub async fn get_recipe(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
) -> HttpResponse {
    let recipe_id = path.into_inner();

    match recipe_service::get_composite(store.get_ref(), &recipe_id).await {
        Ok(composite) => HttpResponse::Ok().json(composite),
        Err(e) => {
            log::warn!("❌ GET /Recipes/{} failed: {}", recipe_id, e);
            e.error_response()
        }
    }
}

/// PUT /Recipes/{name} - merges fields into the named recipe
pub async fn update_recipe(
    user: web::ReqData<Claims>,
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> HttpResponse {
    let name = path.into_inner();

    match recipe_service::update_recipe(store.get_ref(), &name, &body).await {
        Ok(()) => {
            log::info!("✏️  Recipe '{}' updated by {}", name, user.sub);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": "Recipe updated successfully"
            }))
        }
        Err(e) => {
            log::warn!("❌ Update of '{}' by {} failed: {}", name, user.sub, e);
            e.error_response()
        }
    }
}

/// DELETE /Recipes/{name} - removes the named recipe, optionally with its satellites
pub async fn delete_recipe(
    user: web::ReqData<Claims>,
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
    query: web::Query<DeleteRecipeQuery>,
) -> HttpResponse {
    let name = path.into_inner();

    match recipe_service::delete_recipe(store.get_ref(), &name, query.cascade).await {
        Ok(outcome) => {
            log::info!("🗑️  Recipe '{}' deleted by {}", name, user.sub);
            let mut body = serde_json::json!({
                "success": true,
                "message": "Recipe deleted successfully"
            });
            if let Some(removed) = outcome.satellites_removed {
                body["satellites_removed"] = serde_json::json!(removed);
            }
            HttpResponse::Ok().json(body)
        }
        Err(e) => {
            log::warn!("❌ Delete of '{}' by {} failed: {}", name, user.sub, e);
            e.error_response()
        }
    }
}
