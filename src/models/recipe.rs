//! Recipe model
//!
//! A catalog recipe with its ordered ingredients and medical tags.

use std::collections::BTreeSet;

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::{Ingredient, Nutrient};

/// A catalog recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub medical_tags: BTreeSet<String>,
    #[serde(default)]
    pub calories: f64,
    /// Servings the ingredient amounts are written for
    #[serde(default = "default_servings")]
    pub base_servings: f64,
}

/// Data for creating a new recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeCreate {
    /// Generated as `rcp-<n>` when absent
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub medical_tags: BTreeSet<String>,
    #[serde(default)]
    pub calories: f64,
    #[serde(default = "default_servings")]
    pub base_servings: f64,
}

pub(crate) fn default_servings() -> f64 {
    1.0
}

impl RecipeCreate {
    /// Check the fields the scaler and the density score rely on
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Recipe title cannot be empty".to_string());
        }
        if let Some(id) = &self.id {
            if id.trim().is_empty() {
                return Err("Recipe id cannot be blank".to_string());
            }
        }
        if !(self.calories >= 0.0) {
            return Err("calories must be 0 or greater".to_string());
        }
        if !(self.base_servings > 0.0) {
            return Err("base_servings must be greater than 0".to_string());
        }
        for ingredient in &self.ingredients {
            if ingredient.name.trim().is_empty() {
                return Err("Ingredient name cannot be empty".to_string());
            }
            if !(ingredient.amount >= 0.0) {
                return Err(format!("Ingredient '{}' has a negative amount", ingredient.name));
            }
            if let Some(n) = ingredient.nutrients.iter().find(|n| !(n.amount >= 0.0)) {
                return Err(format!(
                    "Nutrient '{}' of ingredient '{}' has a negative amount",
                    n.name, ingredient.name
                ));
            }
        }
        Ok(())
    }
}

fn id_taken(conn: &Connection, id: &str) -> DbResult<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM recipes WHERE id = ?1", [id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

/// First free `rcp-<n>`, starting from the row count
fn next_generated_id(conn: &Connection) -> DbResult<String> {
    let mut n: i64 = conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
    loop {
        n += 1;
        let candidate = format!("rcp-{}", n);
        if !id_taken(conn, &candidate)? {
            return Ok(candidate);
        }
    }
}

impl Recipe {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.medical_tags.contains(tag)
    }

    /// Create a Recipe from a `recipes` row (children attached separately)
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            ingredients: Vec::new(),
            medical_tags: BTreeSet::new(),
            calories: row.get("calories")?,
            base_servings: row.get("base_servings")?,
        })
    }

    fn load_children(conn: &Connection, mut recipe: Self) -> DbResult<Self> {
        let mut stmt = conn.prepare(
            "SELECT tag FROM recipe_medical_tags WHERE recipe_id = ?1 ORDER BY tag",
        )?;
        recipe.medical_tags = stmt
            .query_map([&recipe.id], |row| row.get::<_, String>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT name, amount, unit, nutrients_json
            FROM recipe_ingredients
            WHERE recipe_id = ?1
            ORDER BY position ASC
            "#,
        )?;
        let rows = stmt
            .query_map([&recipe.id], |row| {
                Ok((
                    row.get::<_, String>("name")?,
                    row.get::<_, f64>("amount")?,
                    row.get::<_, String>("unit")?,
                    row.get::<_, String>("nutrients_json")?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        recipe.ingredients = rows
            .into_iter()
            .map(|(name, amount, unit, nutrients_json)| -> DbResult<Ingredient> {
                let nutrients: Vec<Nutrient> = serde_json::from_str(&nutrients_json)?;
                Ok(Ingredient { name, amount, unit, nutrients })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(recipe)
    }

    /// Insert a recipe with its tags and ingredients in one transaction
    pub fn create(conn: &mut Connection, data: &RecipeCreate) -> DbResult<Self> {
        data.validate().map_err(DbError::InvalidRecipe)?;

        let tx = conn.transaction()?;

        let id = match &data.id {
            Some(id) => id.trim().to_string(),
            None => next_generated_id(&tx)?,
        };

        if id_taken(&tx, &id)? {
            return Err(DbError::DuplicateId(id));
        }

        tx.execute(
            r#"
            INSERT INTO recipes (id, title, calories, base_servings)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![id, data.title.trim(), data.calories, data.base_servings],
        )?;

        for tag in &data.medical_tags {
            tx.execute(
                "INSERT OR IGNORE INTO recipe_medical_tags (recipe_id, tag) VALUES (?1, ?2)",
                params![id, tag],
            )?;
        }

        for (position, ingredient) in data.ingredients.iter().enumerate() {
            let nutrients_json = serde_json::to_string(&ingredient.nutrients)?;
            tx.execute(
                r#"
                INSERT INTO recipe_ingredients (recipe_id, position, name, amount, unit, nutrients_json)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    id,
                    position as i64,
                    ingredient.name,
                    ingredient.amount,
                    ingredient.unit,
                    nutrients_json,
                ],
            )?;
        }

        tx.commit()?;

        Self::get_by_id(conn, &id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a recipe by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(recipe) => Ok(Some(Self::load_children(conn, recipe)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Every recipe in store order (insertion order)
    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes ORDER BY rowid ASC")?;
        let recipes = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        recipes
            .into_iter()
            .map(|r| Self::load_children(conn, r))
            .collect()
    }

    /// List recipes with an optional title search
    pub fn list(
        conn: &Connection,
        query: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let recipes = match query {
            Some(q) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM recipes WHERE title LIKE ?1 ORDER BY rowid ASC LIMIT ?2 OFFSET ?3",
                )?;
                let pattern = format!("%{}%", q);
                let rows = stmt
                    .query_map(params![pattern, limit, offset], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt =
                    conn.prepare("SELECT * FROM recipes ORDER BY rowid ASC LIMIT ?1 OFFSET ?2")?;
                let rows = stmt
                    .query_map(params![limit, offset], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        recipes
            .into_iter()
            .map(|r| Self::load_children(conn, r))
            .collect()
    }

    /// Count recipes, optionally restricted to a title search
    pub fn count(conn: &Connection, query: Option<&str>) -> DbResult<i64> {
        let count: i64 = match query {
            Some(q) => conn.query_row(
                "SELECT COUNT(*) FROM recipes WHERE title LIKE ?1",
                [format!("%{}%", q)],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// Delete a recipe. Tags and ingredients cascade.
    /// Returns Ok(false) if not found.
    pub fn delete(conn: &Connection, id: &str) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM recipes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn stir_fry() -> RecipeCreate {
        RecipeCreate {
            id: Some("stir-fry".to_string()),
            title: "Tofu Stir Fry".to_string(),
            ingredients: vec![
                Ingredient::new("Tofu", 200.0, "g")
                    .with_nutrients(vec![Nutrient::new("Protein", 16.0, "g")]),
                Ingredient::new("Broccoli", 1.5, "cup"),
            ],
            medical_tags: ["Low Sodium".to_string()].into_iter().collect(),
            calories: 320.0,
            base_servings: 2.0,
        }
    }

    #[test]
    fn test_create_and_get_round_trips_children() {
        let mut conn = test_conn();
        let created = Recipe::create(&mut conn, &stir_fry()).unwrap();

        assert_eq!(created.id, "stir-fry");
        assert_eq!(created.base_servings, 2.0);
        assert!(created.has_tag("Low Sodium"));
        assert_eq!(created.ingredients.len(), 2);
        assert_eq!(created.ingredients[0].name, "Tofu");
        assert_eq!(created.ingredients[0].nutrients[0].amount, 16.0);
        assert!(created.ingredients[1].nutrients.is_empty());

        let fetched = Recipe::get_by_id(&conn, "stir-fry").unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_missing_recipe_is_none() {
        let conn = test_conn();
        assert!(Recipe::get_by_id(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut conn = test_conn();
        Recipe::create(&mut conn, &stir_fry()).unwrap();
        let err = Recipe::create(&mut conn, &stir_fry()).unwrap_err();
        assert!(matches!(err, DbError::DuplicateId(id) if id == "stir-fry"));
        assert_eq!(Recipe::count(&conn, None).unwrap(), 1);
    }

    #[test]
    fn test_generated_ids_and_store_order() {
        let mut conn = test_conn();
        for title in ["Oatmeal", "Lentil Soup", "Salmon Bowl"] {
            let data = RecipeCreate {
                id: None,
                title: title.to_string(),
                ingredients: vec![],
                medical_tags: BTreeSet::new(),
                calories: 100.0,
                base_servings: 1.0,
            };
            Recipe::create(&mut conn, &data).unwrap();
        }

        let all = Recipe::list_all(&conn).unwrap();
        let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rcp-1", "rcp-2", "rcp-3"]);
        let titles: Vec<&str> = all.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Oatmeal", "Lentil Soup", "Salmon Bowl"]);
    }

    #[test]
    fn test_generated_id_skips_explicit_ids() {
        let mut conn = test_conn();
        let mut data = stir_fry();
        data.id = Some("rcp-2".to_string());
        Recipe::create(&mut conn, &data).unwrap();

        data.id = None;
        let first = Recipe::create(&mut conn, &data).unwrap();
        let second = Recipe::create(&mut conn, &data).unwrap();

        assert_eq!(first.id, "rcp-3");
        assert_eq!(second.id, "rcp-4");

        Recipe::delete(&conn, "rcp-3").unwrap();
        let third = Recipe::create(&mut conn, &data).unwrap();
        assert_eq!(third.id, "rcp-3");
        assert_eq!(Recipe::count(&conn, None).unwrap(), 3);
    }

    #[test]
    fn test_create_rejects_non_positive_base_servings() {
        let mut conn = test_conn();
        for servings in [0.0, -2.0, f64::NAN] {
            let mut data = stir_fry();
            data.base_servings = servings;
            let err = Recipe::create(&mut conn, &data).unwrap_err();
            assert!(matches!(err, DbError::InvalidRecipe(ref msg) if msg.contains("base_servings")));
        }
        assert_eq!(Recipe::count(&conn, None).unwrap(), 0);
    }

    #[test]
    fn test_list_search_and_count() {
        let mut conn = test_conn();
        Recipe::create(&mut conn, &stir_fry()).unwrap();
        let mut soup = stir_fry();
        soup.id = Some("soup".to_string());
        soup.title = "Miso Soup".to_string();
        Recipe::create(&mut conn, &soup).unwrap();

        let found = Recipe::list(&conn, Some("Soup"), 10, 0).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "soup");
        assert_eq!(Recipe::count(&conn, Some("Soup")).unwrap(), 1);
        assert_eq!(Recipe::count(&conn, None).unwrap(), 2);

        let page = Recipe::list(&conn, None, 1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "soup");
    }

    #[test]
    fn test_delete_cascades() {
        let mut conn = test_conn();
        Recipe::create(&mut conn, &stir_fry()).unwrap();

        assert!(Recipe::delete(&conn, "stir-fry").unwrap());
        assert!(!Recipe::delete(&conn, "stir-fry").unwrap());

        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM recipe_ingredients", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_base_servings_defaults_to_one() {
        let recipe: Recipe = serde_json::from_str(r#"{"id": "a", "title": "Toast"}"#).unwrap();
        assert_eq!(recipe.base_servings, 1.0);
        assert_eq!(recipe.calories, 0.0);
        assert!(recipe.ingredients.is_empty());
    }
}
