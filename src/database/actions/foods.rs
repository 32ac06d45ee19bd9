use sqlx::{Pool, Postgres};

use crate::{
    constants::DEFAULT_FOOD_UNIT,
    error::{Error, QueryError},
    schema::{Food, FoodInput, Uuid},
    views::FoodView,
};

pub async fn list_foods(pool: &Pool<Postgres>) -> Result<Vec<FoodView>, Error> {
    let rows: Vec<Food> = sqlx::query_as("SELECT * FROM foods ORDER BY name")
        .fetch_all(&*pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(rows.into_iter().map(FoodView::from).collect())
}

pub async fn create_food(
    user_id: Uuid,
    input: FoodInput,
    pool: &Pool<Postgres>,
) -> Result<FoodView, Error> {
    let default_unit = input
        .default_unit
        .clone()
        .unwrap_or_else(|| DEFAULT_FOOD_UNIT.to_string());

    let id: (i32,) = sqlx::query_as(
        "
        INSERT INTO foods (name, default_unit, created_by, kcal, protein, fat, carbs, fiber)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
    ",
    )
    .bind(&input.name)
    .bind(&default_unit)
    .bind(user_id)
    .bind(input.kcal)
    .bind(input.protein)
    .bind(input.fat)
    .bind(input.carbs)
    .bind(input.fiber)
    .fetch_one(&*pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(FoodView::from(Food {
        id: id.0,
        name: input.name,
        default_unit,
        created_by: user_id,
        kcal: input.kcal,
        protein: input.protein,
        fat: input.fat,
        carbs: input.carbs,
        fiber: input.fiber,
    }))
}
