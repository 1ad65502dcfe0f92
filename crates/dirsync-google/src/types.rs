//! Admin SDK Directory wire types.
//!
//! Only the fields the sync consumes are modeled; everything else in a
//! Directory payload is ignored on deserialization.

use serde::Deserialize;

/// A group resource from `directory/v1/groups`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryGroup {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// A user's name block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryName {
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub full_name: String,
}

/// One email entry on a user resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEmail {
    #[serde(default)]
    pub address: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub primary: bool,
}

/// One postal address entry on a user resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryAddress {
    #[serde(default)]
    pub formatted: String,
    #[serde(default)]
    pub street_address: String,
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub primary: bool,
}

/// One phone entry on a user resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryPhone {
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// One organization entry on a user resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryOrganization {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub cost_center: String,
}

/// One relation entry (the `manager` relation is the one consumed).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRelation {
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// One language entry on a user resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryLanguage {
    #[serde(default)]
    pub language_code: String,
}

/// A user resource from `directory/v1/users`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub primary_email: String,
    #[serde(default)]
    pub name: DirectoryName,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub emails: Vec<DirectoryEmail>,
    #[serde(default)]
    pub addresses: Vec<DirectoryAddress>,
    #[serde(default)]
    pub phones: Vec<DirectoryPhone>,
    #[serde(default)]
    pub organizations: Vec<DirectoryOrganization>,
    #[serde(default)]
    pub relations: Vec<DirectoryRelation>,
    #[serde(default)]
    pub languages: Vec<DirectoryLanguage>,
    #[serde(default)]
    pub employee_number: String,
}

/// A member resource from `directory/v1/groups/{id}/members`.
///
/// `kind` distinguishes `USER` entries from nested `GROUP` entries; the
/// latter are dropped by the port since derived-membership expansion already
/// surfaces their users.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryMember {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Paginated envelope for group listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupsPage {
    #[serde(default)]
    pub groups: Vec<DirectoryGroup>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Paginated envelope for user listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersPage {
    #[serde(default)]
    pub users: Vec<DirectoryUser>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Paginated envelope for member listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersPage {
    #[serde(default)]
    pub members: Vec<DirectoryMember>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_a_directory_user() {
        let json = r#"{
            "kind": "admin#directory#user",
            "id": "103331",
            "primaryEmail": "ada@example.com",
            "name": {"givenName": "Ada", "familyName": "Lovelace", "fullName": "Ada Lovelace"},
            "suspended": false,
            "emails": [{"address": "ada@example.com", "type": "work", "primary": true}],
            "organizations": [{"title": "Engineer", "department": "R&D", "costCenter": "cc-1"}],
            "relations": [{"value": "boss@example.com", "type": "manager"}],
            "languages": [{"languageCode": "en-GB"}]
        }"#;

        let user: DirectoryUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.primary_email, "ada@example.com");
        assert_eq!(user.name.given_name, "Ada");
        assert!(!user.suspended);
        assert_eq!(user.organizations[0].department, "R&D");
        assert_eq!(user.relations[0].kind, "manager");
    }

    #[test]
    fn deserializes_a_members_page_with_token() {
        let json = r#"{
            "members": [
                {"id": "1", "email": "a@example.com", "status": "ACTIVE", "type": "USER"},
                {"id": "2", "email": "nested@example.com", "type": "GROUP"}
            ],
            "nextPageToken": "tok-2"
        }"#;

        let page: MembersPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.members.len(), 2);
        assert_eq!(page.members[1].kind, "GROUP");
        assert_eq!(page.next_page_token.as_deref(), Some("tok-2"));
    }
}
