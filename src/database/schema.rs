use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Uuid = i32;

#[derive(
    Clone, Copy, Debug, PartialEq, PartialOrd, sqlx::Type, Serialize, Deserialize, Eq, Ord, Hash,
)]
#[sqlx(type_name = "recipe_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RecipeType {
    Appetizer,
    FirstCourse,
    SecondCourse,
    Sides,
    YeastProducts,
    Dessert,
    Beverage,
    Other,
}

#[derive(
    Clone, Copy, Debug, PartialEq, PartialOrd, sqlx::Type, Serialize, Deserialize, Eq, Ord, Hash,
)]
#[sqlx(type_name = "difficulty_level", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(
    Clone, Copy, Debug, PartialEq, PartialOrd, sqlx::Type, Serialize, Deserialize, Eq, Ord, Hash,
)]
#[sqlx(type_name = "time_unit", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeUnit {
    Minute,
    Hour,
}

#[derive(
    Clone, Copy, Debug, PartialEq, PartialOrd, sqlx::Type, Serialize, Deserialize, Eq, Ord, Hash,
)]
#[sqlx(type_name = "week_day", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum WeekDay {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

#[derive(
    Clone, Copy, Debug, PartialEq, PartialOrd, sqlx::Type, Serialize, Deserialize, Eq, Ord, Hash,
)]
#[sqlx(type_name = "meal_slot", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// A quantity as authored: either half may be missing, and the unit is a
/// free-form label that is never converted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: Option<f64>,
    pub unit: Option<String>,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub avatar_url: Option<String>,
    pub google_id: Option<String>,
}

/// Public listing row: everything except credentials.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct RecipeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub cuisine: Option<String>,
    pub r#type: Option<RecipeType>,
    pub difficulty: Option<Difficulty>,
    pub time_value: Option<f64>,
    pub time_unit: Option<TimeUnit>,
    pub servings: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct IngredientRow {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub food_id: Option<Uuid>,
    pub name: Option<String>,
    pub quantity_value: Option<f64>,
    pub quantity_unit: Option<String>,
    pub sort_order: i32,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct StepRow {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub text: String,
    pub image_url: Option<String>,
    pub sort_order: i32,
}

/// Planning entry joined against the live recipe name, which backs the
/// denormalized `recipe_name` snapshot when that snapshot is empty.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct PlanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub recipe_name: String,
    pub week: String,
    pub day: Option<WeekDay>,
    pub meal: Option<MealSlot>,
    pub recipe_name_lookup: Option<String>,
}

/// Ingredient line of a planned recipe, as consumed by the shopping-list
/// aggregation.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct ShoppingRow {
    pub food_id: Option<Uuid>,
    pub name: Option<String>,
    pub quantity_value: Option<f64>,
    pub quantity_unit: Option<String>,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub default_unit: String,
    pub created_by: Uuid,
    pub kcal: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub fiber: Option<f64>,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct UserStats {
    pub saved: i64,
    pub followers: i64,
    pub followed: i64,
}

// Request payloads

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeInput {
    pub name: String,
    pub description: Option<String>,
    pub cuisine: Option<String>,
    pub r#type: Option<RecipeType>,
    pub difficulty: Option<Difficulty>,
    pub time: Option<TimeSpec>,
    pub servings: Option<i32>,
    pub ingredients: Option<Vec<IngredientInput>>,
    pub steps: Option<Vec<StepInput>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSpec {
    pub value: Option<f64>,
    pub unit: Option<TimeUnit>,
}

/// An ingredient as authored in a recipe payload. `id` refers to a catalog
/// food when the client picked one; free-text ingredients carry only a name.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientInput {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub quantity: Option<Quantity>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInput {
    pub text: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanInput {
    pub recipe_id: Uuid,
    pub recipe_name: Option<String>,
    pub week: String,
    pub day: Option<WeekDay>,
    pub meal: Option<MealSlot>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodInput {
    pub name: String,
    pub default_unit: Option<String>,
    pub kcal: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub fiber: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_serialize_as_stored_labels() {
        assert_eq!(
            serde_json::to_string(&RecipeType::FirstCourse).unwrap(),
            "\"FIRSTCOURSE\""
        );
        assert_eq!(serde_json::to_string(&Difficulty::Easy).unwrap(), "\"EASY\"");
        assert_eq!(serde_json::to_string(&WeekDay::Mon).unwrap(), "\"MON\"");
        assert_eq!(
            serde_json::to_string(&MealSlot::Breakfast).unwrap(),
            "\"BREAKFAST\""
        );
    }

    #[test]
    fn plan_input_accepts_missing_slots() {
        let input: PlanInput =
            serde_json::from_str(r#"{"recipe_id": 3, "week": "2026-03-02"}"#).unwrap();
        assert_eq!(input.recipe_id, 3);
        assert!(input.day.is_none());
        assert!(input.meal.is_none());
    }

    #[test]
    fn recipe_input_parses_nested_collections() {
        let input: RecipeInput = serde_json::from_str(
            r#"{
                "name": "Focaccia",
                "type": "YEASTPRODUCTS",
                "time": {"value": 40, "unit": "MINUTE"},
                "ingredients": [{"name": "Flour", "quantity": {"value": 500, "unit": "GRAM"}}],
                "steps": [{"text": "Knead", "imageUrl": null}],
                "tags": ["bread"]
            }"#,
        )
        .unwrap();
        assert_eq!(input.r#type, Some(RecipeType::YeastProducts));
        assert_eq!(input.ingredients.as_ref().unwrap().len(), 1);
        assert_eq!(input.steps.as_ref().unwrap()[0].text, "Knead");
    }
}
