use sqlx::PgPool;

use crate::db::models::Notification;

const COLUMNS: &str =
    "id, user_id, title, message, type, course_id, activity_file_id, is_read, created_at";
const LIST_LIMIT: i64 = 50;

pub(crate) struct CourseNotice<'a> {
    pub(crate) course_id: &'a str,
    pub(crate) activity_file_id: Option<&'a str>,
    pub(crate) title: &'a str,
    pub(crate) message: &'a str,
    pub(crate) kind: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

/// One notification per enrolled student. Returns how many were written.
pub(crate) async fn notify_enrolled_students(
    executor: impl sqlx::PgExecutor<'_>,
    notice: CourseNotice<'_>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO notifications (
            id, user_id, title, message, type, course_id, activity_file_id, is_read, created_at
         )
         SELECT gen_random_uuid()::text, e.student_id, $1, $2, $3, $4, $5, FALSE, $6
         FROM enrollments e
         WHERE e.course_id = $4",
    )
    .bind(notice.title)
    .bind(notice.message)
    .bind(notice.kind)
    .bind(notice.course_id)
    .bind(notice.activity_file_id)
    .bind(notice.created_at)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn list_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "SELECT {COLUMNS} FROM notifications
         WHERE user_id = $1
         ORDER BY created_at DESC
         LIMIT $2"
    ))
    .bind(user_id)
    .bind(LIST_LIMIT)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_unread(pool: &PgPool, user_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn mark_read(
    pool: &PgPool,
    user_id: &str,
    notification_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn mark_all_read(pool: &PgPool, user_id: &str) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read")
            .bind(user_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}
