use sqlx::PgPool;

use crate::db::models::Profile;
use crate::db::types::UserRole;

const COLUMNS: &str = "id, email, full_name, username, role, created_at";

#[cfg(test)]
pub(crate) struct CreateProfile<'a> {
    pub(crate) id: &'a str,
    pub(crate) email: Option<&'a str>,
    pub(crate) full_name: Option<&'a str>,
    pub(crate) username: Option<&'a str>,
    pub(crate) role: Option<UserRole>,
    pub(crate) created_at: time::PrimitiveDateTime,
}

/// Minimal projection returned by the student-name lookup.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct StudentMatch {
    pub(crate) id: String,
    pub(crate) full_name: Option<String>,
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(&format!("SELECT {COLUMNS} FROM profiles WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Profiles come from the identity provider; only fixtures insert them here.
#[cfg(test)]
pub(crate) async fn create(
    pool: &PgPool,
    params: CreateProfile<'_>,
) -> Result<Profile, sqlx::Error> {
    sqlx::query_as::<_, Profile>(&format!(
        "INSERT INTO profiles (id, email, full_name, username, role, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.email)
    .bind(params.full_name)
    .bind(params.username)
    .bind(params.role)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

/// Case-insensitive exact match on the trimmed full name, students only.
pub(crate) async fn get_student_by_name(
    pool: &PgPool,
    name: &str,
) -> Result<Vec<StudentMatch>, sqlx::Error> {
    sqlx::query_as::<_, StudentMatch>(
        "SELECT id, full_name FROM profiles
         WHERE lower(full_name) = lower($1) AND role = $2
         ORDER BY created_at",
    )
    .bind(name.trim())
    .bind(UserRole::Student)
    .fetch_all(pool)
    .await
}
