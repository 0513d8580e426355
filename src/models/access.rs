use super::{Resource, deserialize_id, deserialize_id_list, impl_record};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(default, deserialize_with = "deserialize_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Machine name, e.g. `inventory.write`.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(default, deserialize_with = "deserialize_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ids of the permissions granted to the role.
    #[serde(default, deserialize_with = "deserialize_id_list")]
    pub permissions: Vec<String>,
}

impl Role {
    pub fn grants(&self, permission_id: &str) -> bool {
        self.permissions.iter().any(|granted| granted == permission_id)
    }
}

impl_record!(Permission, Role);

impl Resource for Permission {
    const PATH: &'static str = "/permissions";
    const NAME: &'static str = "permission";
}

impl Resource for Role {
    const PATH: &'static str = "/roles";
    const NAME: &'static str = "role";
}
