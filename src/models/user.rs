use crate::models::record::{decode_with_id, free_form, lenient_bool, Document};
use serde::Deserialize;
use serde_json::{Map, Value};

/// User account from the `users` collection.
///
/// Only the fields moderation looks at are typed. Everything else on the
/// account (points, streaks, study timers, activity) is kept untouched in
/// `extra` and never written back.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub uid: String,
    #[serde(default, deserialize_with = "free_form")]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL", deserialize_with = "free_form")]
    pub photo_url: Option<String>,
    #[serde(default, deserialize_with = "free_form")]
    pub med_course: Option<String>,
    #[serde(default, deserialize_with = "free_form")]
    pub semester: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_banned: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserAccount {
    /// Operator-facing label of the ban toggle for this account
    pub fn ban_action_label(&self) -> &'static str {
        if self.is_banned {
            "Unban"
        } else {
            "Ban"
        }
    }
}

impl Document for UserAccount {
    const ID_FIELD: &'static str = "uid";

    fn decode(id: &str, fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        decode_with_id(Self::ID_FIELD, id, fields)
    }
}
