use sqlx::{Pool, Postgres};

use crate::{
    authentication::{
        cryptography::{hash_password, verify_password},
        google::GoogleClaims,
        jwt::generate_jwt_session,
    },
    error::{ApiError, Error, QueryError},
    schema::{User, UserRow, UserStats, Uuid},
    views::{AuthView, UserProfileView},
};

pub async fn get_user_by_email(
    email: &str,
    pool: &Pool<Postgres>,
) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(&*pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(row)
}

pub async fn get_user_by_id(user_id: Uuid, pool: &Pool<Postgres>) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&*pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(row)
}

/// Registers a password account and signs the user in.
pub async fn signup_user(
    name: &str,
    email: &str,
    password: &str,
    pool: &Pool<Postgres>,
) -> Result<AuthView, Error> {
    if get_user_by_email(email, pool).await?.is_some() {
        return Err(ApiError::Conflict.new("Email already registered"));
    }

    let hashed = hash_password(password.to_string())
        .map_err(|_| ApiError::InternalServerError.new("Failed to hash password"))?;

    let id: (i32,) = sqlx::query_as(
        "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(&hashed)
    .fetch_one(&*pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    let user = User {
        id: id.0,
        name: name.to_string(),
        email: email.to_string(),
        password: Some(hashed),
        avatar_url: None,
        google_id: None,
    };
    let token = generate_jwt_session(&user);

    Ok(AuthView {
        token,
        user: user.into(),
    })
}

pub async fn signin_user(
    email: &str,
    password: &str,
    pool: &Pool<Postgres>,
) -> Result<AuthView, Error> {
    let user = get_user_by_email(email, pool)
        .await?
        .ok_or_else(|| ApiError::NotFound.new("User not found"))?;

    let hash = match &user.password {
        Some(hash) => hash,
        None => return Err(ApiError::InvalidRequest.new("This account uses Google login.")),
    };

    let authenticated = verify_password(password, hash)
        .map_err(|_| ApiError::InternalServerError.new("Failed to verify password"))?;
    if !authenticated {
        return Err(ApiError::Unauthorized.new("Wrong password"));
    }

    let token = generate_jwt_session(&user);

    Ok(AuthView {
        token,
        user: user.into(),
    })
}

/// Signs in with verified Google claims, creating the account on first use
/// and linking `google_id` to an existing password account with the same
/// email. The Google avatar only fills an empty avatar, never replaces one.
pub async fn login_google(claims: &GoogleClaims, pool: &Pool<Postgres>) -> Result<AuthView, Error> {
    let existing: Option<User> =
        sqlx::query_as("SELECT * FROM users WHERE google_id = $1 OR email = $2 LIMIT 1")
            .bind(&claims.sub)
            .bind(&claims.email)
            .fetch_optional(&*pool)
            .await
            .map_err(|e| QueryError::from(e).into())?;

    let user = match existing {
        None => {
            let name = claims.name.clone().unwrap_or_else(|| {
                claims.email.split('@').next().unwrap_or_default().to_string()
            });
            let avatar_url = claims.picture.clone().unwrap_or_default();

            let id: (i32,) = sqlx::query_as(
                "
                INSERT INTO users (name, email, avatar_url, google_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id
            ",
            )
            .bind(&name)
            .bind(&claims.email)
            .bind(&avatar_url)
            .bind(&claims.sub)
            .fetch_one(&*pool)
            .await
            .map_err(|e| QueryError::from(e).into())?;

            User {
                id: id.0,
                name,
                email: claims.email.clone(),
                password: None,
                avatar_url: Some(avatar_url),
                google_id: Some(claims.sub.clone()),
            }
        }
        Some(mut user) if user.google_id.is_none() => {
            sqlx::query(
                "
                UPDATE users SET google_id = $1,
                    avatar_url = COALESCE(NULLIF(avatar_url, ''), $2)
                WHERE id = $3
            ",
            )
            .bind(&claims.sub)
            .bind(claims.picture.clone().unwrap_or_default())
            .bind(user.id)
            .execute(&*pool)
            .await
            .map_err(|e| QueryError::from(e).into())?;

            if user.avatar_url.as_deref().unwrap_or("").is_empty() {
                user.avatar_url = claims.picture.clone();
            }
            user.google_id = Some(claims.sub.clone());
            user
        }
        Some(user) => user,
    };

    let token = generate_jwt_session(&user);

    Ok(AuthView {
        token,
        user: user.into(),
    })
}

/// Removes the account and its personal links. The user's recipes stay
/// published; their author name simply resolves to empty.
pub async fn delete_user(user_id: Uuid, pool: &Pool<Postgres>) -> Result<(), Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()).into())?;

    sqlx::query("DELETE FROM planning WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM saved_recipes WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM followers WHERE follower_id = $1 OR followed_id = $1")
        .bind(user_id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM group_members WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tr)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    tr.commit()
        .await
        .map_err(|_| QueryError::new("Could not commit transaction".to_owned()).into())?;

    Ok(())
}

pub async fn list_users(me: Uuid, pool: &Pool<Postgres>) -> Result<Vec<UserRow>, Error> {
    let rows: Vec<UserRow> =
        sqlx::query_as("SELECT id, name, email, avatar_url FROM users WHERE id != $1")
            .bind(me)
            .fetch_all(&*pool)
            .await
            .map_err(|e| QueryError::from(e).into())?;

    Ok(rows)
}

pub async fn get_user_profile(
    user_id: Uuid,
    viewer: Uuid,
    pool: &Pool<Postgres>,
) -> Result<UserProfileView, Error> {
    let row: Option<UserRow> =
        sqlx::query_as("SELECT id, name, email, avatar_url FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&*pool)
            .await
            .map_err(|e| QueryError::from(e).into())?;

    match row {
        Some(row) => {
            let followed = is_following(viewer, user_id, pool).await?;
            Ok(UserProfileView::from_row(row, followed))
        }
        None => Err(ApiError::NotFound.new("User not found")),
    }
}

pub async fn is_following(
    follower_id: Uuid,
    followed_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "SELECT follower_id FROM followers WHERE follower_id = $1 AND followed_id = $2",
    )
    .bind(follower_id)
    .bind(followed_id)
    .fetch_optional(&*pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(row.is_some())
}

pub async fn get_user_stats(user_id: Uuid, pool: &Pool<Postgres>) -> Result<UserStats, Error> {
    let stats: UserStats = sqlx::query_as(
        "
        SELECT
            (SELECT COUNT(*) FROM saved_recipes WHERE user_id = $1) AS saved,
            (SELECT COUNT(*) FROM followers WHERE followed_id = $1) AS followers,
            (SELECT COUNT(*) FROM followers WHERE follower_id = $1) AS followed
    ",
    )
    .bind(user_id)
    .fetch_one(&*pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(stats)
}

pub async fn follow_user(
    follower_id: Uuid,
    followed_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    sqlx::query(
        "INSERT INTO followers (follower_id, followed_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(follower_id)
    .bind(followed_id)
    .execute(&*pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(())
}

pub async fn unfollow_user(
    follower_id: Uuid,
    followed_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    sqlx::query("DELETE FROM followers WHERE follower_id = $1 AND followed_id = $2")
        .bind(follower_id)
        .bind(followed_id)
        .execute(&*pool)
        .await
        .map_err(|e| QueryError::from(e).into())?;

    Ok(())
}
