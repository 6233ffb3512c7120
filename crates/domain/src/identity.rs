use serde::{Deserialize, Serialize};

/// Claims resolved from the caller's bearer token by the identity provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserInfo {
    pub uid: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

impl UserInfo {
    pub fn full_name(&self) -> String {
        let given = self.given_name.as_deref().unwrap_or("").trim();
        let family = self.family_name.as_deref().unwrap_or("").trim();
        [given, family]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}
