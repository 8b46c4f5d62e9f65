use crate::models::record::{decode_with_id, free_form, free_form_or_empty, string_list, Document};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Study group as stored in the `groups` collection
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Backend-assigned document id
    pub id: String,
    #[serde(default, deserialize_with = "free_form_or_empty")]
    pub name: String,
    /// Present only for private groups
    #[serde(default, deserialize_with = "free_form")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "free_form_or_empty")]
    pub creator_id: String,
    /// Member uids, order irrelevant
    #[serde(default, deserialize_with = "string_list")]
    pub members: Vec<String>,
    /// Opaque backend timestamp
    #[serde(default)]
    pub created_at: Value,
}

impl Group {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_private(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

impl Document for Group {
    const ID_FIELD: &'static str = "id";

    fn decode(id: &str, fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        decode_with_id(Self::ID_FIELD, id, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_group() {
        let fields = json!({
            "name": "Anatomy",
            "creatorId": "u1",
            "members": ["u1", "u2"],
            "createdAt": { "seconds": 1700000000, "nanoseconds": 0 }
        });
        let group = Group::decode("g1", fields.as_object().cloned().unwrap()).unwrap();

        assert_eq!(group.id, "g1");
        assert_eq!(group.name, "Anatomy");
        assert_eq!(group.creator_id, "u1");
        assert_eq!(group.member_count(), 2);
        assert!(!group.is_private());
        assert_eq!(group.created_at["seconds"], 1700000000);
    }

    #[test]
    fn test_private_group() {
        let fields = json!({ "name": "Closed", "creatorId": "u1", "password": "s3cret" });
        let group = Group::decode("g2", fields.as_object().cloned().unwrap()).unwrap();

        assert!(group.is_private());
        assert_eq!(group.member_count(), 0);
        assert!(group.created_at.is_null());
    }

    #[test]
    fn test_group_without_creator_is_kept() {
        let fields = json!({ "name": "Anatomy", "members": ["u1", "u2"] });
        let group = Group::decode("g1", fields.as_object().cloned().unwrap()).unwrap();

        assert_eq!(group.id, "g1");
        assert_eq!(group.name, "Anatomy");
        assert_eq!(group.creator_id, "");
        assert_eq!(group.member_count(), 2);
    }

    #[test]
    fn test_bare_group_record_decodes() {
        let fields = json!({ "name": 42, "members": "u1" });
        let group = Group::decode("g3", fields.as_object().cloned().unwrap()).unwrap();

        assert_eq!(group.name, "42");
        assert_eq!(group.member_count(), 0);
        assert!(!group.is_private());
    }
}
