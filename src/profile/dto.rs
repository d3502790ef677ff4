use serde::{Deserialize, Serialize};

/// The three per-user lists, typed at the boundary. Stored as JSON text but
/// never passed around as opaque strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLists {
    pub skills: Vec<String>,
    pub experience: Vec<String>,
    pub languages: Vec<String>,
}

/// Request body for saving a profile. Missing lists mean empty lists; every
/// save replaces all three wholesale.
#[derive(Debug, Deserialize)]
pub struct SaveProfileRequest {
    pub user_id: Option<i64>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveProfileResponse {
    pub message: &'static str,
}
