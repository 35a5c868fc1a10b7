use crate::services::{AuditService, AuthService};

#[derive(Clone)]
pub struct AppState {
    pub audits: AuditService,
    pub auth: AuthService,
}
