// Admin dashboard: session login/logout, signup triage, CSV export and the
// audit trail. Every mutation goes through `AdminGuard::run`.

pub mod handlers;
pub mod store;
