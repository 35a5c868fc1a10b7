use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct CreateAuditBody {
    pub domain: Option<String>,
    #[serde(rename = "type")]
    pub audit_type: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAuditBody {
    pub domain: Option<String>,
    #[serde(rename = "type")]
    pub audit_type: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}
