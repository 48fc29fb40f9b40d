//! Recipe catalog tools
//!
//! Add, inspect, list and remove catalog recipes.

use serde::Serialize;

use crate::db::{Database, DbError};
use crate::models::{Recipe, RecipeCreate};

/// Response for add_recipe
#[derive(Debug, Serialize)]
pub struct AddRecipeResponse {
    pub id: String,
    pub title: String,
    pub ingredient_count: usize,
}

/// Recipe summary for listing
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: String,
    pub title: String,
    pub calories: f64,
    pub base_servings: f64,
    pub medical_tags: Vec<String>,
    pub ingredient_count: usize,
}

/// Response for list_recipes
#[derive(Debug, Serialize)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for delete_recipe
#[derive(Debug, Serialize)]
pub struct DeleteRecipeResponse {
    pub success: bool,
    pub deleted_id: String,
}

/// Add a recipe with its ingredients and medical tags
pub fn add_recipe(db: &Database, data: RecipeCreate) -> Result<AddRecipeResponse, String> {
    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::create(&mut conn, &data).map_err(|e| match e {
        DbError::DuplicateId(id) => format!("Recipe already exists with id: {}", id),
        DbError::InvalidRecipe(reason) => reason,
        e => format!("Failed to add recipe: {}", e),
    })?;

    Ok(AddRecipeResponse {
        ingredient_count: recipe.ingredients.len(),
        id: recipe.id,
        title: recipe.title,
    })
}

/// Get a recipe by id
pub fn get_recipe(db: &Database, id: &str) -> Result<Option<Recipe>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Recipe::get_by_id(&conn, id).map_err(|e| format!("Failed to get recipe: {}", e))
}

/// List recipes with optional title search and pagination
pub fn list_recipes(
    db: &Database,
    query: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<ListRecipesResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipes = Recipe::list(&conn, query, limit, offset)
        .map_err(|e| format!("Failed to list recipes: {}", e))?;

    let total = Recipe::count(&conn, query)
        .map_err(|e| format!("Failed to count recipes: {}", e))?;

    let recipes = recipes
        .into_iter()
        .map(|recipe| RecipeSummary {
            ingredient_count: recipe.ingredients.len(),
            medical_tags: recipe.medical_tags.into_iter().collect(),
            id: recipe.id,
            title: recipe.title,
            calories: recipe.calories,
            base_servings: recipe.base_servings,
        })
        .collect();

    Ok(ListRecipesResponse {
        recipes,
        total,
        limit,
        offset,
    })
}

/// Delete a recipe
pub fn delete_recipe(db: &Database, id: &str) -> Result<DeleteRecipeResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Recipe::delete(&conn, id)
        .map_err(|e| format!("Failed to delete recipe: {}", e))?;
    if !deleted {
        return Err(format!("Recipe not found with id: {}", id));
    }

    Ok(DeleteRecipeResponse {
        success: true,
        deleted_id: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ingredient;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| crate::db::migrations::run_migrations(conn)).unwrap();
        db
    }

    fn porridge() -> RecipeCreate {
        RecipeCreate {
            id: Some("porridge".to_string()),
            title: "Porridge".to_string(),
            ingredients: vec![Ingredient::new("Oats", 0.5, "cup")],
            medical_tags: Default::default(),
            calories: 150.0,
            base_servings: 1.0,
        }
    }

    #[test]
    fn test_add_get_list_delete() {
        let db = test_db();

        let added = add_recipe(&db, porridge()).unwrap();
        assert_eq!(added.id, "porridge");
        assert_eq!(added.ingredient_count, 1);

        let recipe = get_recipe(&db, "porridge").unwrap().unwrap();
        assert_eq!(recipe.ingredients[0].name, "Oats");

        let listed = list_recipes(&db, None, 500, -3).unwrap();
        assert_eq!(listed.limit, 200);
        assert_eq!(listed.offset, 0);
        assert_eq!(listed.total, 1);
        assert_eq!(listed.recipes[0].title, "Porridge");

        delete_recipe(&db, "porridge").unwrap();
        assert!(get_recipe(&db, "porridge").unwrap().is_none());
        assert!(delete_recipe(&db, "porridge").is_err());
    }

    #[test]
    fn test_add_rejects_invalid_data() {
        let db = test_db();

        let mut data = porridge();
        data.title = "  ".to_string();
        assert!(add_recipe(&db, data).is_err());

        let mut data = porridge();
        data.base_servings = 0.0;
        assert_eq!(
            add_recipe(&db, data).unwrap_err(),
            "base_servings must be greater than 0"
        );

        let mut data = porridge();
        data.ingredients[0].amount = -1.0;
        assert!(add_recipe(&db, data).is_err());
    }

    #[test]
    fn test_add_duplicate_reports_id() {
        let db = test_db();
        add_recipe(&db, porridge()).unwrap();
        assert_eq!(
            add_recipe(&db, porridge()).unwrap_err(),
            "Recipe already exists with id: porridge"
        );
    }
}
