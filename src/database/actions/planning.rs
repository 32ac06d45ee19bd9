use sqlx::{Pool, Postgres};

use crate::{
    error::{Error, QueryError},
    schema::{MealSlot, PlanInput, PlanRow, ShoppingRow, Uuid, WeekDay},
    shopping::{aggregate_ingredients, ShoppingListItem},
    views::{assemble_plan, PlannedRecipeView, PlanningView},
};

/// Fetches the planned recipes of a week for a set of users. Callers pass a
/// single id for personal planning, or the member ids of a group.
pub async fn get_week_plan(
    user_ids: &[Uuid],
    week: &str,
    pool: &Pool<Postgres>,
) -> Result<PlanningView, Error> {
    let rows: Vec<PlanRow> = sqlx::query_as(
        "
        SELECT p.*, r.name AS recipe_name_lookup
        FROM planning p
        LEFT JOIN recipes r ON r.id = p.recipe_id
        WHERE p.week = $1 AND p.user_id = ANY($2)
    ",
    )
    .bind(week)
    .bind(user_ids.to_vec())
    .fetch_all(&*pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(PlanningView {
        start_date: week.to_string(),
        recipes: rows.into_iter().map(assemble_plan).collect(),
    })
}

pub async fn plan_recipe(
    user_id: Uuid,
    input: PlanInput,
    pool: &Pool<Postgres>,
) -> Result<PlannedRecipeView, Error> {
    let recipe_name = input.recipe_name.clone().unwrap_or_default();

    let id: (i32,) = sqlx::query_as(
        "
        INSERT INTO planning (user_id, recipe_id, recipe_name, week, day, meal)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
    ",
    )
    .bind(user_id)
    .bind(input.recipe_id)
    .bind(&recipe_name)
    .bind(&input.week)
    .bind(input.day)
    .bind(input.meal)
    .fetch_one(&*pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(PlannedRecipeView {
        kind: String::from("recipe"),
        id: id.0,
        user_id,
        recipe_id: input.recipe_id,
        recipe_name,
        week: input.week,
        day: input.day,
        meal: input.meal,
    })
}

/// Moves a planning entry to another slot; passing None clears the slot.
pub async fn update_plan_slot(
    id: Uuid,
    day: Option<WeekDay>,
    meal: Option<MealSlot>,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    sqlx::query("UPDATE planning SET day = $1, meal = $2 WHERE id = $3")
        .bind(day)
        .bind(meal)
        .bind(id)
        .execute(&*pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(())
}

pub async fn remove_plan(id: Uuid, pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query("DELETE FROM planning WHERE id = $1")
        .bind(id)
        .execute(&*pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(())
}

/// Flattened ingredient lines of every recipe planned by the given users in
/// the given week, in planning order.
pub async fn list_shopping_rows(
    user_ids: &[Uuid],
    week: &str,
    pool: &Pool<Postgres>,
) -> Result<Vec<ShoppingRow>, Error> {
    let rows: Vec<ShoppingRow> = sqlx::query_as(
        "
        SELECT ri.food_id, ri.name, ri.quantity_value, ri.quantity_unit
        FROM planning p
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = p.recipe_id
        WHERE p.week = $1 AND p.user_id = ANY($2)
        ORDER BY p.id, ri.sort_order
    ",
    )
    .bind(week)
    .bind(user_ids.to_vec())
    .fetch_all(&*pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(rows)
}

pub async fn shopping_list(
    user_ids: &[Uuid],
    week: &str,
    pool: &Pool<Postgres>,
) -> Result<Vec<ShoppingListItem>, Error> {
    let rows = list_shopping_rows(user_ids, week, pool).await?;

    Ok(aggregate_ingredients(rows))
}
