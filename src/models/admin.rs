use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentStatusCounts {
    pub pending: u64,
    pub confirmed: u64,
    pub completed: u64,
    pub cancelled: u64,
}

/// Dashboard totals.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsResponse {
    pub total_users: u64,
    pub active_users: u64,
    pub total_businesses: u64,
    pub active_businesses: u64,
    pub total_services: u64,
    pub total_appointments: u64,
    pub appointments_by_status: AppointmentStatusCounts,
    pub pending_reviews: u64,
    pub active_coupons: u64,
}
