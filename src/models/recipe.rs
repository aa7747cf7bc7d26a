use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RECIPES_COLLECTION: &str = "Recipes";

/// Payload key holding the primary recipe
pub const RECIPE_SECTION: &str = "Recipe";

pub const RECIPE_ID_FIELD: &str = "recipeID";

/// Fields every recipe must carry at creation
pub const REQUIRED_RECIPE_FIELDS: [&str; 11] = [
    "recipeID",
    "name",
    "description",
    "origin",
    "type",
    "servings",
    "prep_time",
    "cook_time",
    "difficulty",
    "majorIngredient",
    "instructions",
];

/// A satellite kind: the key used in payloads/responses and the backing collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Satellite {
    pub section: &'static str,
    pub collection: &'static str,
}

pub const SATELLITES: [Satellite; 6] = [
    Satellite { section: "Ingredients", collection: "Ingredients" },
    Satellite { section: "NutritionInfo", collection: "Nutritioninfo" },
    Satellite { section: "DietaryBenefits", collection: "Dietarybenefits" },
    Satellite { section: "Picture", collection: "Picture" },
    Satellite { section: "Video", collection: "Video" },
    Satellite { section: "Author", collection: "Author" },
];

/// Query parameters accepted by `GET /Recipes`.
///
/// Integers arrive as raw strings so a malformed value can be reported as a
/// validation error naming the parameter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeFilterParams {
    pub category: Option<String>,
    pub origin: Option<String>,
    #[serde(rename = "type")]
    pub recipe_type: Option<String>,
    pub serve_size: Option<String>,
    pub main_ingredient: Option<String>,
    pub allergen: Option<String>,
    pub dietary_benefits: Option<String>,
    pub calories: Option<String>,
    pub difficulty: Option<String>,
    #[serde(rename = "Vegan")]
    pub vegan: Option<String>,
    #[serde(rename = "Author")]
    pub author: Option<String>,
}

/// A recipe with every satellite row that shares its `recipeID`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeRecipe {
    #[serde(rename = "Recipe")]
    pub recipe: Vec<Value>,
    #[serde(rename = "Ingredients")]
    pub ingredients: Vec<Value>,
    #[serde(rename = "NutritionInfo")]
    pub nutrition_info: Vec<Value>,
    #[serde(rename = "DietaryBenefits")]
    pub dietary_benefits: Vec<Value>,
    #[serde(rename = "Picture")]
    pub picture: Vec<Value>,
    #[serde(rename = "Video")]
    pub video: Vec<Value>,
    #[serde(rename = "Author")]
    pub author: Vec<Value>,
}

impl CompositeRecipe {
    pub fn section_mut(&mut self, section: &str) -> Option<&mut Vec<Value>> {
        match section {
            "Recipe" => Some(&mut self.recipe),
            "Ingredients" => Some(&mut self.ingredients),
            "NutritionInfo" => Some(&mut self.nutrition_info),
            "DietaryBenefits" => Some(&mut self.dietary_benefits),
            "Picture" => Some(&mut self.picture),
            "Video" => Some(&mut self.video),
            "Author" => Some(&mut self.author),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteRecipeQuery {
    #[serde(default)]
    pub cascade: bool,
}
