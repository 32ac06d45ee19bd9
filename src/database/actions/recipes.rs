use sqlx::{Pool, Postgres, Transaction};

use crate::{
    constants::DISCOVER_RECIPE_LIMIT,
    error::{ApiError, Error, QueryError},
    jwt::SessionData,
    schema::{
        IngredientInput, IngredientRow, RecipeInput, RecipeRecord, StepInput, StepRow, Uuid,
    },
    views::{assemble_recipe, RecipeView},
};

pub async fn get_recipe(
    id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Option<RecipeRecord>, Error> {
    let row: Option<RecipeRecord> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(&*pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(row)
}

/// Fetches a recipe for mutation. Missing and foreign recipes answer alike.
pub async fn get_recipe_mut(
    id: Uuid,
    session: &SessionData,
    pool: &Pool<Postgres>,
) -> Result<RecipeRecord, Error> {
    let recipe = get_recipe(id, pool).await?;

    match recipe {
        Some(recipe) if recipe.user_id == session.user_id => Ok(recipe),
        _ => Err(ApiError::NotFound.new("Recipe not found or not owned")),
    }
}

pub async fn list_recipe_ingredients(
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<IngredientRow>, Error> {
    let rows: Vec<IngredientRow> =
        sqlx::query_as("SELECT * FROM recipe_ingredients WHERE recipe_id = $1 ORDER BY sort_order")
            .bind(recipe_id)
            .fetch_all(&*pool)
            .await
            .map_err(|e| QueryError::from(e).into())?;

    Ok(rows)
}

pub async fn list_recipe_steps(
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<StepRow>, Error> {
    let rows: Vec<StepRow> =
        sqlx::query_as("SELECT * FROM recipe_steps WHERE recipe_id = $1 ORDER BY sort_order")
            .bind(recipe_id)
            .fetch_all(&*pool)
            .await
            .map_err(|e| QueryError::from(e).into())?;

    Ok(rows)
}

pub async fn list_recipe_tags(
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<String>, Error> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT tag FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .fetch_all(&*pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(rows.into_iter().map(|r| r.0).collect())
}

pub async fn is_saved(
    recipe_id: Uuid,
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "SELECT recipe_id FROM saved_recipes WHERE user_id = $1 AND recipe_id = $2",
    )
    .bind(user_id)
    .bind(recipe_id)
    .fetch_optional(&*pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(row.is_some())
}

/// Gathers a recipe's children and author name and assembles the denormalized
/// view. The saved flag is resolved only when a viewer is given.
pub async fn build_recipe_view(
    recipe: RecipeRecord,
    viewer: Option<Uuid>,
    pool: &Pool<Postgres>,
) -> Result<RecipeView, Error> {
    let ingredients = list_recipe_ingredients(recipe.id, pool).await?;
    let steps = list_recipe_steps(recipe.id, pool).await?;
    let tags = list_recipe_tags(recipe.id, pool).await?;

    let author: Option<(String,)> = sqlx::query_as("SELECT name FROM users WHERE id = $1")
        .bind(recipe.user_id)
        .fetch_optional(&*pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    let is_added = match viewer {
        Some(user_id) => is_saved(recipe.id, user_id, pool).await?,
        None => false,
    };

    Ok(assemble_recipe(
        recipe,
        author.map(|r| r.0),
        ingredients,
        steps,
        tags,
        is_added,
    ))
}

pub async fn get_recipe_view(
    id: Uuid,
    viewer: Option<Uuid>,
    pool: &Pool<Postgres>,
) -> Result<RecipeView, Error> {
    match get_recipe(id, pool).await? {
        Some(recipe) => build_recipe_view(recipe, viewer, pool).await,
        None => Err(ApiError::NotFound.new("Recipe not found")),
    }
}

pub async fn list_user_recipes(
    owner_id: Uuid,
    viewer: Option<Uuid>,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeView>, Error> {
    let rows: Vec<RecipeRecord> =
        sqlx::query_as("SELECT * FROM recipes WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(owner_id)
            .fetch_all(&*pool)
            .await
            .map_err(|e| QueryError::from(e).into())?;

    let mut views = Vec::with_capacity(rows.len());
    for row in rows {
        views.push(build_recipe_view(row, viewer, pool).await?);
    }

    Ok(views)
}

pub async fn list_saved_recipes(
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeView>, Error> {
    let rows: Vec<RecipeRecord> = sqlx::query_as(
        "
        SELECT r.* FROM recipes r
        INNER JOIN saved_recipes sr ON sr.recipe_id = r.id
        WHERE sr.user_id = $1
        ORDER BY sr.created_at DESC
    ",
    )
    .bind(user_id)
    .fetch_all(&*pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    let mut views = Vec::with_capacity(rows.len());
    for row in rows {
        views.push(build_recipe_view(row, Some(user_id), pool).await?);
    }

    Ok(views)
}

pub async fn discover_recipes(
    viewer: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeView>, Error> {
    let rows: Vec<RecipeRecord> =
        sqlx::query_as("SELECT * FROM recipes ORDER BY created_at DESC LIMIT $1")
            .bind(DISCOVER_RECIPE_LIMIT)
            .fetch_all(&*pool)
            .await
            .map_err(|e| QueryError::from(e).into())?;

    let mut views = Vec::with_capacity(rows.len());
    for row in rows {
        views.push(build_recipe_view(row, Some(viewer), pool).await?);
    }

    Ok(views)
}

pub async fn create_recipe(
    user_id: Uuid,
    input: RecipeInput,
    pool: &Pool<Postgres>,
) -> Result<RecipeView, Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()).into())?;

    let id: (i32,) = sqlx::query_as(
        "
        INSERT INTO recipes (user_id, name, description, cuisine, type, difficulty, time_value, time_unit, servings)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
    ",
    )
    .bind(user_id)
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.cuisine)
    .bind(input.r#type)
    .bind(input.difficulty)
    .bind(input.time.as_ref().and_then(|t| t.value))
    .bind(input.time.as_ref().and_then(|t| t.unit))
    .bind(input.servings)
    .fetch_one(&mut *tr)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    replace_recipe_details(
        &mut tr,
        id.0,
        input.ingredients.as_deref().unwrap_or_default(),
        input.steps.as_deref().unwrap_or_default(),
        input.tags.as_deref().unwrap_or_default(),
    )
    .await?;

    tr.commit()
        .await
        .map_err(|_| QueryError::new("Could not commit transaction".to_owned()).into())?;

    let recipe = get_recipe(id.0, pool)
        .await?
        .ok_or_else(|| ApiError::InternalServerError.new("Recipe missing after insert"))?;
    build_recipe_view(recipe, Some(user_id), pool).await
}

pub async fn update_recipe(
    id: Uuid,
    session: &SessionData,
    input: RecipeInput,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    get_recipe_mut(id, session, pool).await?;

    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()).into())?;

    sqlx::query(
        "
        UPDATE recipes SET name = $1, description = $2, cuisine = $3, type = $4,
            difficulty = $5, time_value = $6, time_unit = $7, servings = $8
        WHERE id = $9
    ",
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.cuisine)
    .bind(input.r#type)
    .bind(input.difficulty)
    .bind(input.time.as_ref().and_then(|t| t.value))
    .bind(input.time.as_ref().and_then(|t| t.unit))
    .bind(input.servings)
    .bind(id)
    .execute(&mut *tr)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    replace_recipe_details(
        &mut tr,
        id,
        input.ingredients.as_deref().unwrap_or_default(),
        input.steps.as_deref().unwrap_or_default(),
        input.tags.as_deref().unwrap_or_default(),
    )
    .await?;

    tr.commit()
        .await
        .map_err(|_| QueryError::new("Could not commit transaction".to_owned()).into())?;

    Ok(())
}

/// Replaces a recipe's ingredient, step and tag rows with the given
/// collections, inside the caller's transaction. Positions are assigned from
/// the input order; duplicate tags collapse to their first occurrence. A
/// concurrent reader never observes a half-replaced recipe.
pub async fn replace_recipe_details(
    tr: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    ingredients: &[IngredientInput],
    steps: &[StepInput],
    tags: &[String],
) -> Result<(), Error> {
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut **tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM recipe_steps WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut **tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut **tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    for (position, ingredient) in ingredients.iter().enumerate() {
        sqlx::query(
            "
            INSERT INTO recipe_ingredients (recipe_id, food_id, name, quantity_value, quantity_unit, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
        ",
        )
        .bind(recipe_id)
        .bind(ingredient.id)
        .bind(&ingredient.name)
        .bind(ingredient.quantity.as_ref().and_then(|q| q.value))
        .bind(ingredient.quantity.as_ref().and_then(|q| q.unit.clone()))
        .bind(position as i32)
        .execute(&mut **tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;
    }

    for (position, step) in steps.iter().enumerate() {
        sqlx::query(
            "
            INSERT INTO recipe_steps (recipe_id, text, image_url, sort_order)
            VALUES ($1, $2, $3, $4)
        ",
        )
        .bind(recipe_id)
        .bind(&step.text)
        .bind(step.image_url.clone().unwrap_or_default())
        .bind(position as i32)
        .execute(&mut **tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;
    }

    for tag in dedupe_tags(tags) {
        sqlx::query(
            "INSERT INTO recipe_tags (recipe_id, tag) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(recipe_id)
        .bind(tag)
        .execute(&mut **tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;
    }

    Ok(())
}

fn dedupe_tags(tags: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for tag in tags {
        if !seen.contains(tag) {
            seen.push(tag.clone());
        }
    }
    seen
}

pub async fn delete_recipe(id: Uuid, pool: &Pool<Postgres>) -> Result<(), Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()).into())?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM recipe_steps WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM saved_recipes WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM planning WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    tr.commit()
        .await
        .map_err(|_| QueryError::new("Could not commit transaction".to_owned()).into())?;

    Ok(())
}

pub async fn save_recipe(
    recipe_id: Uuid,
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    sqlx::query(
        "INSERT INTO saved_recipes (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(recipe_id)
    .execute(&*pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(())
}

pub async fn unsave_recipe(
    recipe_id: Uuid,
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    sqlx::query("DELETE FROM saved_recipes WHERE user_id = $1 AND recipe_id = $2")
        .bind(user_id)
        .bind(recipe_id)
        .execute(&*pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_tags_collapse_to_first_occurrence() {
        let tags = vec![
            String::from("spicy"),
            String::from("spicy"),
            String::from("vegan"),
        ];
        assert_eq!(dedupe_tags(&tags), vec!["spicy", "vegan"]);
    }

    #[test]
    fn tag_order_is_preserved() {
        let tags = vec![
            String::from("vegan"),
            String::from("quick"),
            String::from("vegan"),
            String::from("cheap"),
        ];
        assert_eq!(dedupe_tags(&tags), vec!["vegan", "quick", "cheap"]);
    }
}
