use sqlx::{Pool, Postgres};

use crate::{
    error::{ApiError, Error, QueryError},
    schema::Uuid,
    views::GroupView,
};

pub async fn group_members(group_id: Uuid, pool: &Pool<Postgres>) -> Result<Vec<Uuid>, Error> {
    let rows: Vec<(Uuid,)> =
        sqlx::query_as("SELECT user_id FROM group_members WHERE group_id = $1")
            .bind(group_id)
            .fetch_all(&*pool)
            .await
            .map_err(|e| QueryError::from(e).into())?;

    Ok(rows.into_iter().map(|r| r.0).collect())
}

async fn group_exists(group_id: Uuid, pool: &Pool<Postgres>) -> Result<bool, Error> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM user_groups WHERE id = $1")
        .bind(group_id)
        .fetch_optional(&*pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(row.is_some())
}

/// A user's group, if any. Membership in more than one group is not part of
/// the intended usage; the first membership wins.
pub async fn my_group(user_id: Uuid, pool: &Pool<Postgres>) -> Result<Option<GroupView>, Error> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "
        SELECT g.id FROM user_groups g
        INNER JOIN group_members gm ON gm.group_id = g.id
        WHERE gm.user_id = $1
        LIMIT 1
    ",
    )
    .bind(user_id)
    .fetch_optional(&*pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    match row {
        Some((id,)) => {
            let users = group_members(id, pool).await?;
            Ok(Some(GroupView { id, users }))
        }
        None => Ok(None),
    }
}

pub async fn create_group(user_id: Uuid, pool: &Pool<Postgres>) -> Result<GroupView, Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()).into())?;

    let id: (i32,) = sqlx::query_as("INSERT INTO user_groups DEFAULT VALUES RETURNING id")
        .fetch_one(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("INSERT INTO group_members (group_id, user_id) VALUES ($1, $2)")
        .bind(id.0)
        .bind(user_id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    tr.commit()
        .await
        .map_err(|_| QueryError::new("Could not commit transaction".to_owned()).into())?;

    Ok(GroupView {
        id: id.0,
        users: vec![user_id],
    })
}

pub async fn join_group(
    group_id: Uuid,
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<GroupView, Error> {
    if !group_exists(group_id, pool).await? {
        return Err(ApiError::NotFound.new("Group not found"));
    }

    sqlx::query(
        "INSERT INTO group_members (group_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(group_id)
    .bind(user_id)
    .execute(&*pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    let users = group_members(group_id, pool).await?;
    Ok(GroupView {
        id: group_id,
        users,
    })
}

pub async fn leave_group(
    group_id: Uuid,
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<GroupView, Error> {
    sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
        .bind(group_id)
        .bind(user_id)
        .execute(&*pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    let users = group_members(group_id, pool).await?;
    Ok(GroupView {
        id: group_id,
        users,
    })
}
