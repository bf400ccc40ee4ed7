use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::dto::request::CreateUserRequest;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum UserRole {
    Admin,
    Instructor,
    Student,
}

impl User {
    pub fn new(
        first_name: &str,
        last_name: &str,
        username: &str,
        email: &str,
        role: UserRole,
    ) -> Self {
        User {
            id: Uuid::new_v4().to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            role,
            is_active: true,
            created_at: Some(Utc::now()),
        }
    }

    pub fn from_request(request: CreateUserRequest) -> Self {
        User::new(
            &request.first_name,
            &request.last_name,
            &request.username,
            &request.email,
            request.role,
        )
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
impl User {
    pub fn test_user(username: &str, role: UserRole) -> Self {
        User::new(
            "Test",
            "User",
            username,
            &format!("{}@example.com", username),
            role,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = User::new("John", "Doe", "johndoe", "john@example.com", UserRole::Student);

        assert_eq!(user.full_name(), "John Doe");
        assert_eq!(user.role, UserRole::Student);
        assert!(user.is_active);
        assert!(user.created_at.is_some());
        assert!(Uuid::parse_str(&user.id).is_ok());
    }

    #[test]
    fn test_user_from_request() {
        let request = CreateUserRequest {
            first_name: "Jane".to_string(),
            last_name: "Smith".to_string(),
            username: "janesmith".to_string(),
            email: "jane@example.com".to_string(),
            role: UserRole::Instructor,
        };

        let user = User::from_request(request);
        assert_eq!(user.username, "janesmith");
        assert_eq!(user.role, UserRole::Instructor);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_role_serializes_as_variant_name() {
        let json = serde_json::to_string(&UserRole::Admin).expect("role should serialize");
        assert_eq!(json, "\"Admin\"");
    }
}
