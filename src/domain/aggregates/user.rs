//! Signed-in customer or staff member, as returned by the auth service

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl User {
    pub fn is_admin(&self) -> bool { self.role.eq_ignore_ascii_case("admin") }
}

/// The `user` + `token` pair kept for a signed-in client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}
