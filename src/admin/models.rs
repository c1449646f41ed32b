// src/admin/models.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub total_users: i64,
    pub total_artists: i64,
    pub pending_videos: i64,
    pub approved_videos: i64,
    pub bookings_by_status: BTreeMap<String, i64>,
    pub last_updated: String,
}

/// `GET /api/admin/users` query
#[derive(Debug, Default, Deserialize)]
pub struct AdminUserQuery {
    pub role: Option<String>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
