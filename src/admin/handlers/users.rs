// src/admin/handlers/users.rs

use axum::{
    extract::{Extension, Query},
    Json,
};
use sqlx::{QueryBuilder, Sqlite};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::admin::models::AdminUserQuery;
use crate::auth::{AuthedUser, User};
use crate::common::{ApiError, AppState, Page, Paginated};

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &AdminUserQuery) {
    builder.push(" WHERE 1 = 1");
    if let Some(role) = query.role.as_deref().filter(|r| !r.is_empty()) {
        builder.push(" AND role = ").push_bind(role.to_lowercase());
    }
    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{}%", q.to_lowercase());
        builder
            .push(" AND (LOWER(email) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(name) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// GET /api/admin/users?role=&q=&page=&limit=
pub async fn list_users(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<AdminUserQuery>,
) -> Result<Json<Paginated<User>>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();
    let page = Page::new(query.page, query.limit);

    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users");
    push_filters(&mut count, &query);
    let (total,): (i64,) = count.build_query_as().fetch_one(&state.db).await?;

    let mut select = QueryBuilder::<Sqlite>::new("SELECT * FROM users");
    push_filters(&mut select, &query);
    select
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let users = select.build_query_as::<User>().fetch_all(&state.db).await?;

    info!(admin_user_id = %authed.id, user_count = users.len(), "Admin user list fetched");
    Ok(Json(Paginated::new(users, total, page)))
}
