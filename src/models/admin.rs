use crate::models::group::Group;
use crate::models::user::UserAccount;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ApiKeyQuery {
    pub api_key: String,
}

#[derive(Deserialize)]
pub struct SelectViewQuery {
    pub api_key: String,
    pub view: String,
}

#[derive(Deserialize)]
pub struct GroupRemoveQuery {
    pub api_key: String,
    pub id: String,
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Deserialize)]
pub struct UserBanQuery {
    pub api_key: String,
    pub uid: String,
    #[serde(default)]
    pub currently_banned: bool,
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Result of a moderation action request
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    /// "declined" or "applied"
    pub outcome: String,
    pub message: String,
}

/// Row of the Groups tab. The group password is never exposed.
#[derive(Debug, Serialize, Deserialize)]
pub struct GroupRow {
    pub id: String,
    pub name: String,
    pub member_count: usize,
    pub is_private: bool,
    pub creator_id: String,
}

impl From<&Group> for GroupRow {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.clone(),
            name: group.name.clone(),
            member_count: group.member_count(),
            is_private: group.is_private(),
            creator_id: group.creator_id.clone(),
        }
    }
}

/// Row of the Users tab
#[derive(Debug, Serialize, Deserialize)]
pub struct UserRow {
    pub uid: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub med_course: Option<String>,
    pub semester: Option<String>,
    pub is_banned: bool,
    /// "Ban" or "Unban"
    pub action: String,
}

impl From<&UserAccount> for UserRow {
    fn from(user: &UserAccount) -> Self {
        Self {
            uid: user.uid.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
            med_course: user.med_course.clone(),
            semester: user.semester.clone(),
            is_banned: user.is_banned,
            action: user.ban_action_label().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupListResponse {
    pub success: bool,
    pub groups: Vec<GroupRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<UserRow>,
}

/// Active tab plus the rows it displays
#[derive(Debug, Serialize, Deserialize)]
pub struct ViewResponse {
    pub success: bool,
    pub selected_view: String,
    /// Caption of the selected tab
    pub view_label: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub groups: Option<Vec<GroupRow>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub users: Option<Vec<UserRow>>,
}
