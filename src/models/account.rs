use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    HrManager,
    Hr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Registered, waiting for OTP verification.
    Pending,
    /// OTP verified, waiting for admin or HR manager approval.
    WaitApproved,
    Active,
    Inactive,
}

/// Login account in the `users` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    /// bcrypt hash.
    pub password: String,
    pub roles: Vec<Role>,
    pub status: AccountStatus,
    pub company: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}
