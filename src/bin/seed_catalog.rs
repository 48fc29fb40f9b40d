//! Utility to load demo recipes into the catalog
//!
//! Recipes whose id already exists are left untouched.

use std::collections::BTreeSet;

use nourish::config;
use nourish::db::{Database, DbError};
use nourish::models::{Ingredient, Nutrient, Recipe, RecipeCreate};

fn tags(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|t| t.to_string()).collect()
}

fn demo_recipes() -> Vec<RecipeCreate> {
    vec![
        RecipeCreate {
            id: Some("lentil-soup".to_string()),
            title: "Lemony Lentil Soup".to_string(),
            ingredients: vec![
                Ingredient::new("Red Lentils", 1.0, "cup").with_nutrients(vec![
                    Nutrient::new("Protein", 24.0, "g"),
                    Nutrient::new("Fiber", 11.0, "g"),
                    Nutrient::new("Iron", 6.5, "mg"),
                ]),
                Ingredient::new("Carrot", 1.0, "each")
                    .with_nutrients(vec![Nutrient::new("Fiber", 1.7, "g")]),
                Ingredient::new("Lemon", 0.5, "each")
                    .with_nutrients(vec![Nutrient::new("Vitamin C", 15.0, "mg")]),
                Ingredient::new("Vegetable Broth", 3.0, "cup"),
            ],
            medical_tags: tags(&["Low Sodium", "Low Sugar"]),
            calories: 390.0,
            base_servings: 2.0,
        },
        RecipeCreate {
            id: Some("berry-pancakes".to_string()),
            title: "Maple Berry Pancakes".to_string(),
            ingredients: vec![
                Ingredient::new("Flour", 1.0, "cup")
                    .with_nutrients(vec![Nutrient::new("Protein", 13.0, "g")]),
                Ingredient::new("Maple Syrup", 4.0, "tbsp"),
                Ingredient::new("Blueberries", 0.5, "cup").with_nutrients(vec![
                    Nutrient::new("Fiber", 1.8, "g"),
                    Nutrient::new("Vitamin C", 7.0, "mg"),
                ]),
            ],
            medical_tags: tags(&["High Sugar"]),
            calories: 720.0,
            base_servings: 2.0,
        },
        RecipeCreate {
            id: Some("salmon-bowl".to_string()),
            title: "Salmon Rice Bowl with Cilantro".to_string(),
            ingredients: vec![
                Ingredient::new("Salmon", 150.0, "g")
                    .with_nutrients(vec![Nutrient::new("Protein", 30.0, "g")]),
                Ingredient::new("Brown Rice", 0.75, "cup")
                    .with_nutrients(vec![Nutrient::new("Fiber", 2.6, "g")]),
                Ingredient::new("Cilantro", 2.0, "tbsp"),
                Ingredient::new("Soy Sauce", 1.0, "tbsp"),
            ],
            medical_tags: tags(&[]),
            calories: 540.0,
            base_servings: 1.0,
        },
        RecipeCreate {
            id: Some("kale-salad".to_string()),
            title: "Kale and Chickpea Salad".to_string(),
            ingredients: vec![
                Ingredient::new("Kale", 2.0, "cup").with_nutrients(vec![
                    Nutrient::new("Calcium", 180.0, "mg"),
                    Nutrient::new("Vitamin C", 160.0, "mg"),
                    Nutrient::new("Fiber", 2.6, "g"),
                ]),
                Ingredient::new("Chickpeas", 0.5, "cup").with_nutrients(vec![
                    Nutrient::new("Protein", 7.3, "g"),
                    Nutrient::new("Fiber", 6.2, "g"),
                ]),
                Ingredient::new("Olive Oil", 1.0, "tbsp"),
            ],
            medical_tags: tags(&["Low Sodium"]),
            calories: 330.0,
            base_servings: 1.0,
        },
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = config::database_path();
    println!("Database path: {}", db_path.display());

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&db_path)?;

    database.with_conn(|conn| {
        if nourish::db::migrations::needs_migration(conn)? {
            println!("Creating catalog schema");
        }
        nourish::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    database.with_conn_mut(|conn| {
        for data in demo_recipes() {
            match Recipe::create(conn, &data) {
                Ok(recipe) => println!(
                    "  Added {} ({} ingredients)",
                    recipe.id,
                    recipe.ingredients.len()
                ),
                Err(DbError::DuplicateId(id)) => println!("  Skipped {} (already present)", id),
                Err(DbError::InvalidRecipe(reason)) => println!("  Rejected {}: {}", data.title, reason),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    })?;

    let total = database.with_conn(|conn| Recipe::count(conn, None))?;
    println!("Catalog now holds {} recipes", total);

    Ok(())
}
