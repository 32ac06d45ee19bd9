use serde::Serialize;

use crate::constants::DEFAULT_SERVINGS;
use crate::schema::{
    Difficulty, Food, IngredientRow, MealSlot, PlanRow, Quantity, RecipeRecord, RecipeType,
    StepRow, TimeUnit, User, UserRow, Uuid, WeekDay,
};

/// Denormalized recipe as served to clients. Every optional scalar from the
/// storage layer is defaulted here, and only here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub name: String,
    pub description: String,
    pub cuisine: String,
    pub r#type: RecipeType,
    pub time: TimeView,
    pub difficulty: Difficulty,
    pub ingredients: Vec<IngredientView>,
    pub steps: Vec<StepView>,
    pub tags: Vec<String>,
    pub servings: i32,
    pub is_added: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeView {
    pub value: Option<f64>,
    pub unit: TimeUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientView {
    pub id: Uuid,
    pub name: Option<String>,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub text: String,
    pub image_url: String,
}

/// Joins a recipe row with its ordered children and the viewer's saved flag.
///
/// Ingredient and step order is taken from the rows as given; callers fetch
/// them ordered by their stored position. `is_added` must already reflect the
/// viewer (false when there is none).
pub fn assemble_recipe(
    recipe: RecipeRecord,
    author_name: Option<String>,
    ingredients: Vec<IngredientRow>,
    steps: Vec<StepRow>,
    tags: Vec<String>,
    is_added: bool,
) -> RecipeView {
    RecipeView {
        id: recipe.id,
        user_id: recipe.user_id,
        user_name: author_name.unwrap_or_default(),
        name: recipe.name,
        description: recipe.description.unwrap_or_default(),
        cuisine: recipe.cuisine.unwrap_or_default(),
        r#type: recipe.r#type.unwrap_or(RecipeType::Other),
        time: TimeView {
            value: recipe.time_value,
            unit: recipe.time_unit.unwrap_or(TimeUnit::Minute),
        },
        difficulty: recipe.difficulty.unwrap_or(Difficulty::Easy),
        ingredients: ingredients
            .into_iter()
            .map(|row| IngredientView {
                id: row.food_id.unwrap_or(row.id),
                name: row.name,
                quantity: Quantity {
                    value: row.quantity_value,
                    unit: row.quantity_unit,
                },
            })
            .collect(),
        steps: steps
            .into_iter()
            .map(|row| StepView {
                text: row.text,
                image_url: row.image_url.unwrap_or_default(),
            })
            .collect(),
        tags,
        servings: recipe.servings.unwrap_or(DEFAULT_SERVINGS),
        is_added,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanningView {
    #[serde(rename = "startDate")]
    pub start_date: String,
    pub recipes: Vec<PlannedRecipeView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedRecipeView {
    pub kind: String,
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub recipe_name: String,
    pub week: String,
    pub day: Option<WeekDay>,
    pub meal: Option<MealSlot>,
}

pub fn assemble_plan(row: PlanRow) -> PlannedRecipeView {
    let recipe_name = if row.recipe_name.is_empty() {
        row.recipe_name_lookup.unwrap_or_default()
    } else {
        row.recipe_name
    };

    PlannedRecipeView {
        kind: String::from("recipe"),
        id: row.id,
        user_id: row.user_id,
        recipe_id: row.recipe_id,
        recipe_name,
        week: row.week,
        day: row.day,
        meal: row.meal,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url.unwrap_or_default(),
        }
    }
}

/// Signup/signin/google payload: the issued token plus the public user.
#[derive(Debug, Clone, Serialize)]
pub struct AuthView {
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfileView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    #[serde(rename = "isFollowed")]
    pub is_followed: bool,
}

impl UserProfileView {
    pub fn from_row(row: UserRow, is_followed: bool) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            avatar_url: row.avatar_url,
            is_followed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupView {
    pub id: Uuid,
    pub users: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodView {
    pub id: Uuid,
    pub name: String,
    pub quantity: FoodUnit,
    pub kcal: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub fiber: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodUnit {
    pub unit: String,
}

impl From<Food> for FoodView {
    fn from(food: Food) -> Self {
        Self {
            id: food.id,
            name: food.name,
            quantity: FoodUnit {
                unit: food.default_unit,
            },
            kcal: food.kcal,
            protein: food.protein,
            fat: food.fat,
            carbs: food.carbs,
            fiber: food.fiber,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bare_recipe() -> RecipeRecord {
        RecipeRecord {
            id: 1,
            user_id: 10,
            name: String::from("Carbonara"),
            description: None,
            cuisine: None,
            r#type: None,
            difficulty: None,
            time_value: None,
            time_unit: None,
            servings: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(),
        }
    }

    fn ingredient(id: Uuid, food_id: Option<Uuid>, name: &str, order: i32) -> IngredientRow {
        IngredientRow {
            id,
            recipe_id: 1,
            food_id,
            name: Some(name.to_string()),
            quantity_value: Some(100.0),
            quantity_unit: Some(String::from("GRAM")),
            sort_order: order,
        }
    }

    #[test]
    fn missing_scalars_are_defaulted() {
        let view = assemble_recipe(bare_recipe(), None, vec![], vec![], vec![], false);
        assert_eq!(view.description, "");
        assert_eq!(view.cuisine, "");
        assert_eq!(view.r#type, RecipeType::Other);
        assert_eq!(view.difficulty, Difficulty::Easy);
        assert_eq!(view.time.unit, TimeUnit::Minute);
        assert_eq!(view.time.value, None);
        assert_eq!(view.servings, DEFAULT_SERVINGS);
        assert_eq!(view.user_name, "");
        assert!(!view.is_added);
    }

    #[test]
    fn ingredient_view_prefers_food_id() {
        let view = assemble_recipe(
            bare_recipe(),
            Some(String::from("Alice")),
            vec![
                ingredient(100, Some(7), "Guanciale", 0),
                ingredient(101, None, "Pecorino", 1),
            ],
            vec![],
            vec![],
            false,
        );
        assert_eq!(view.ingredients[0].id, 7);
        assert_eq!(view.ingredients[1].id, 101);
    }

    #[test]
    fn children_keep_given_order() {
        let view = assemble_recipe(
            bare_recipe(),
            None,
            vec![
                ingredient(1, None, "Spaghetti", 0),
                ingredient(2, None, "Eggs", 1),
                ingredient(3, None, "Black pepper", 2),
            ],
            vec![
                StepRow {
                    id: 1,
                    recipe_id: 1,
                    text: String::from("Boil"),
                    image_url: None,
                    sort_order: 0,
                },
                StepRow {
                    id: 2,
                    recipe_id: 1,
                    text: String::from("Toss"),
                    image_url: Some(String::from("https://img/toss.jpg")),
                    sort_order: 1,
                },
            ],
            vec![String::from("pasta"), String::from("roman")],
            true,
        );
        let names: Vec<_> = view
            .ingredients
            .iter()
            .map(|i| i.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["Spaghetti", "Eggs", "Black pepper"]);
        assert_eq!(view.steps[0].image_url, "");
        assert_eq!(view.steps[1].image_url, "https://img/toss.jpg");
        assert_eq!(view.tags, vec!["pasta", "roman"]);
        assert!(view.is_added);
    }

    #[test]
    fn assembly_is_idempotent() {
        let rows = vec![ingredient(1, None, "Spaghetti", 0)];
        let first = assemble_recipe(
            bare_recipe(),
            Some(String::from("Alice")),
            rows.clone(),
            vec![],
            vec![],
            false,
        );
        let second = assemble_recipe(
            bare_recipe(),
            Some(String::from("Alice")),
            rows,
            vec![],
            vec![],
            false,
        );
        assert_eq!(first, second);
    }

    #[test]
    fn plan_name_falls_back_to_live_recipe() {
        let base = PlanRow {
            id: 1,
            user_id: 2,
            recipe_id: 3,
            recipe_name: String::new(),
            week: String::from("2026-03-02"),
            day: Some(WeekDay::Mon),
            meal: None,
            recipe_name_lookup: Some(String::from("Rice")),
        };
        assert_eq!(assemble_plan(base.clone()).recipe_name, "Rice");

        let snapshotted = PlanRow {
            recipe_name: String::from("Old rice"),
            ..base
        };
        assert_eq!(assemble_plan(snapshotted).recipe_name, "Old rice");
    }

    #[test]
    fn recipe_view_serializes_camel_case() {
        let view = assemble_recipe(bare_recipe(), None, vec![], vec![], vec![], false);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["userId"], 10);
        assert_eq!(json["type"], "OTHER");
        assert_eq!(json["isAdded"], false);
        assert_eq!(json["time"]["unit"], "MINUTE");
    }
}
