use mongodb::bson::{doc, to_document, Bson, Document};
use serde_json::{Map, Value};

use crate::{
    database::DocumentStore,
    models::{
        CompositeRecipe, RecipeFilterParams, RECIPES_COLLECTION, RECIPE_ID_FIELD, RECIPE_SECTION,
        REQUIRED_RECIPE_FIELDS, SATELLITES,
    },
    utils::AppError,
};

/// A creation payload that passed every check and is ready to be written
#[derive(Debug)]
pub struct PreparedRecipe {
    pub recipe_id: Value,
    pub recipe: Document,
    /// (collection, document) in payload order
    pub satellites: Vec<(&'static str, Document)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub satellites_removed: Option<u64>,
}

fn parse_int_param(name: &str, raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::validation(format!("Query parameter '{}' must be an integer", name)))
}

/// Builds the Recipes match filter from the supplied query parameters.
/// Absent parameters add no condition.
pub fn build_filter(params: &RecipeFilterParams) -> Result<Document, AppError> {
    let mut filter = Document::new();

    let text_fields = [
        ("category", &params.category),
        ("origin", &params.origin),
        ("type", &params.recipe_type),
        ("main_ingredient", &params.main_ingredient),
        ("allergen", &params.allergen),
        ("dietary_benefits", &params.dietary_benefits),
        ("difficulty", &params.difficulty),
        ("Vegan", &params.vegan),
        ("Author", &params.author),
    ];
    for (field, value) in text_fields {
        if let Some(value) = value {
            filter.insert(field, value.as_str());
        }
    }

    if let Some(raw) = &params.serve_size {
        filter.insert("serve_size", parse_int_param("serve_size", raw)?);
    }
    if let Some(raw) = &params.calories {
        filter.insert("calories", doc! { "$lte": parse_int_param("calories", raw)? });
    }

    Ok(filter)
}

/// Path ids arrive as text; a numeric id also matches integer `recipeID`s
fn recipe_id_lookup(id: &str) -> Document {
    match id.parse::<i64>() {
        Ok(n) => doc! { "recipeID": { "$in": [id, n] } },
        Err(_) => doc! { "recipeID": id },
    }
}

fn into_json(mut document: Document) -> Value {
    document.remove("_id");
    Bson::Document(document).into_relaxed_extjson()
}

fn object_to_document(object: &Map<String, Value>, context: &str) -> Result<Document, AppError> {
    to_document(object)
        .map_err(|e| AppError::validation(format!("{} cannot be stored: {}", context, e)))
}

fn is_present(object: &Map<String, Value>, field: &str) -> bool {
    object.get(field).is_some_and(|value| !value.is_null())
}

pub async fn list_recipes(
    store: &dyn DocumentStore,
    params: &RecipeFilterParams,
) -> Result<Vec<Value>, AppError> {
    let filter = build_filter(params)?;
    let recipes = store.find(RECIPES_COLLECTION, filter).await?;
    Ok(recipes.into_iter().map(into_json).collect())
}

/// Fetches a recipe and every satellite row sharing its `recipeID`
pub async fn get_composite(
    store: &dyn DocumentStore,
    recipe_id: &str,
) -> Result<CompositeRecipe, AppError> {
    let recipe = store
        .find_one(RECIPES_COLLECTION, recipe_id_lookup(recipe_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".to_string()))?;

    let stored_id = recipe
        .get(RECIPE_ID_FIELD)
        .cloned()
        .unwrap_or_else(|| Bson::String(recipe_id.to_string()));

    let mut composite = CompositeRecipe::default();
    composite.recipe.push(into_json(recipe));

    for satellite in SATELLITES {
        let rows = store
            .find(satellite.collection, doc! { "recipeID": stored_id.clone() })
            .await?;
        if let Some(section) = composite.section_mut(satellite.section) {
            section.extend(rows.into_iter().map(into_json));
        }
    }

    Ok(composite)
}

/// Validates a composite creation payload without touching the store
pub fn prepare_recipe(payload: &Value) -> Result<PreparedRecipe, AppError> {
    let body = payload
        .as_object()
        .ok_or_else(|| AppError::validation("Request body must be a JSON object"))?;

    let recipe = match body.get(RECIPE_SECTION) {
        Some(Value::Array(entries)) if !entries.is_empty() => entries[0]
            .as_object()
            .ok_or_else(|| AppError::validation("Recipe entry must be a JSON object"))?,
        _ => return Err(AppError::validation("Recipe must be a non-empty array")),
    };

    let missing: Vec<String> = REQUIRED_RECIPE_FIELDS
        .iter()
        .filter(|field| !is_present(recipe, field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::missing_fields(missing));
    }

    let recipe_id = recipe[RECIPE_ID_FIELD].clone();
    if !(recipe_id.is_string() || recipe_id.is_i64() || recipe_id.is_u64()) {
        return Err(AppError::validation("recipeID must be a string or an integer"));
    }

    let mut satellites = Vec::new();
    for satellite in SATELLITES {
        let entries = match body.get(satellite.section) {
            None | Some(Value::Null) => continue,
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(AppError::validation(format!(
                    "{} must be an array",
                    satellite.section
                )))
            }
        };

        for (index, entry) in entries.iter().enumerate() {
            let context = format!("{}[{}]", satellite.section, index);
            let object = entry
                .as_object()
                .ok_or_else(|| AppError::validation(format!("{} must be a JSON object", context)))?;
            if !is_present(object, RECIPE_ID_FIELD) {
                return Err(AppError::validation(format!("{} is missing recipeID", context)));
            }
            satellites.push((satellite.collection, object_to_document(object, &context)?));
        }
    }

    Ok(PreparedRecipe {
        recipe_id,
        recipe: object_to_document(recipe, RECIPE_SECTION)?,
        satellites,
    })
}

/// Writes a recipe and its satellites. Everything is validated before the
/// first insert; if an insert fails, rows already written by this call are
/// removed again.
pub async fn create_recipe(store: &dyn DocumentStore, payload: &Value) -> Result<Value, AppError> {
    let prepared = prepare_recipe(payload)?;

    let recipe_id = prepared
        .recipe
        .get(RECIPE_ID_FIELD)
        .cloned()
        .unwrap_or(Bson::Null);
    if store
        .find_one(RECIPES_COLLECTION, doc! { "recipeID": recipe_id })
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Recipe with recipeID {} already exists",
            prepared.recipe_id
        )));
    }

    let mut inserted: Vec<(&'static str, Bson)> = Vec::new();
    let writes = std::iter::once((RECIPES_COLLECTION, prepared.recipe)).chain(prepared.satellites);

    for (collection, document) in writes {
        match store.insert_one(collection, document).await {
            Ok(id) => inserted.push((collection, id)),
            Err(e) => {
                rollback(store, &inserted).await;
                return Err(e);
            }
        }
    }

    log::debug!(
        "Recipe {} written with {} satellite rows",
        prepared.recipe_id,
        inserted.len() - 1
    );

    Ok(prepared.recipe_id)
}

async fn rollback(store: &dyn DocumentStore, inserted: &[(&'static str, Bson)]) {
    for (collection, id) in inserted.iter().rev() {
        if let Err(e) = store.delete_one(collection, doc! { "_id": id.clone() }).await {
            log::error!("❌ Rollback failed for {} {}: {}", collection, id, e);
        }
    }
}

/// Merges `fields` into the recipe called `name`. A match that changes
/// nothing is reported as not found.
pub async fn update_recipe(
    store: &dyn DocumentStore,
    name: &str,
    fields: &Value,
) -> Result<(), AppError> {
    let object = fields
        .as_object()
        .ok_or_else(|| AppError::validation("Request body must be a JSON object"))?;

    let mut set = object_to_document(object, "Update")?;
    set.remove("_id");
    if set.is_empty() {
        return Err(AppError::NotFound("Recipe not found".to_string()));
    }

    let outcome = store
        .update_one(RECIPES_COLLECTION, doc! { "name": name }, set)
        .await?;

    if outcome.modified == 0 {
        if outcome.matched > 0 {
            log::debug!("Recipe '{}' matched but the update changed nothing", name);
        }
        return Err(AppError::NotFound("Recipe not found".to_string()));
    }
    Ok(())
}

pub async fn delete_recipe(
    store: &dyn DocumentStore,
    name: &str,
    cascade: bool,
) -> Result<DeleteOutcome, AppError> {
    if !cascade {
        let deleted = store
            .delete_one(RECIPES_COLLECTION, doc! { "name": name })
            .await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Recipe not found".to_string()));
        }
        return Ok(DeleteOutcome { satellites_removed: None });
    }

    let recipe = store
        .find_one(RECIPES_COLLECTION, doc! { "name": name })
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".to_string()))?;

    let id = recipe.get("_id").cloned().unwrap_or(Bson::Null);
    if store
        .delete_one(RECIPES_COLLECTION, doc! { "_id": id })
        .await?
        == 0
    {
        return Err(AppError::NotFound("Recipe not found".to_string()));
    }

    let mut removed = 0;
    if let Some(recipe_id) = recipe.get(RECIPE_ID_FIELD) {
        for satellite in SATELLITES {
            removed += store
                .delete_many(satellite.collection, doc! { "recipeID": recipe_id.clone() })
                .await?;
        }
    }

    Ok(DeleteOutcome { satellites_removed: Some(removed) })
}
