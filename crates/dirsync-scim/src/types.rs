//! SCIM 2.0 wire types (RFC 7643/7644 subset) and their mappings to the
//! dirsync entity model.

use serde::{Deserialize, Serialize};

use dirsync_model::{
    Address, Email, EnterpriseData, Manager, Name, PhoneNumber, User, UserBuilder,
};

/// SCIM Core User schema URI.
pub const USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";

/// SCIM Enterprise User extension schema URI.
pub const ENTERPRISE_USER_SCHEMA: &str =
    "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";

/// SCIM Core Group schema URI.
pub const GROUP_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";

/// SCIM PatchOp message schema URI.
pub const PATCH_OP_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

/// SCIM User `name` component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honorific_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honorific_suffix: Option<String>,
}

/// SCIM email value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScimEmail {
    pub value: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub email_type: Option<String>,
    #[serde(default)]
    pub primary: bool,
}

/// SCIM address value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
    #[serde(default)]
    pub primary: bool,
}

/// SCIM phone-number value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScimPhoneNumber {
    pub value: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub phone_type: Option<String>,
}

/// Enterprise extension manager reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScimManager {
    pub value: String,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Enterprise User extension attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_center: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<ScimManager>,
}

/// SCIM User resource: Core schema plus the Enterprise extension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimUser {
    pub schemas: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    pub user_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<ScimName>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,

    #[serde(rename = "profileUrl", skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default)]
    pub active: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<ScimEmail>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<ScimAddress>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phone_numbers: Vec<ScimPhoneNumber>,

    #[serde(
        rename = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User",
        skip_serializing_if = "Option::is_none"
    )]
    pub enterprise_user: Option<EnterpriseUser>,
}

/// Member reference inside a SCIM Group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScimGroupMember {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// SCIM Group resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimGroup {
    pub schemas: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub display_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<ScimGroupMember>,
}

impl ScimGroup {
    pub fn new(display_name: impl Into<String>, external_id: impl Into<String>) -> Self {
        let external_id = external_id.into();
        Self {
            schemas: vec![GROUP_SCHEMA.to_string()],
            id: None,
            display_name: display_name.into(),
            external_id: if external_id.is_empty() {
                None
            } else {
                Some(external_id)
            },
            members: Vec::new(),
        }
    }
}

/// Paged list envelope (RFC 7644 §3.4.2).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default)]
    pub total_results: usize,

    #[serde(default)]
    pub items_per_page: usize,

    #[serde(default)]
    pub start_index: usize,

    #[serde(rename = "Resources", default)]
    pub resources: Vec<T>,
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self {
            total_results: 0,
            items_per_page: 0,
            start_index: 0,
            resources: Vec::new(),
        }
    }
}

/// PatchOp request message (RFC 7644 §3.5.2).
#[derive(Debug, Clone, Serialize)]
pub struct PatchOp {
    pub schemas: Vec<String>,
    #[serde(rename = "Operations")]
    pub operations: Vec<PatchOperation>,
}

impl PatchOp {
    pub fn new(operations: Vec<PatchOperation>) -> Self {
        Self {
            schemas: vec![PATCH_OP_SCHEMA.to_string()],
            operations,
        }
    }
}

/// One patch operation.
#[derive(Debug, Clone, Serialize)]
pub struct PatchOperation {
    pub op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub value: serde_json::Value,
}

/// Member value carried by an add/remove members patch.
#[derive(Debug, Clone, Serialize)]
pub struct PatchValue {
    pub value: String,
}

// ---------------------------------------------------------------------------
// Model mappings
// ---------------------------------------------------------------------------

impl ScimUser {
    /// Build the wire form of a model user for create/replace requests.
    pub fn from_model(user: &User) -> Self {
        let enterprise_user = user.enterprise_data.as_ref().map(enterprise_from_model);

        let mut schemas = vec![USER_SCHEMA.to_string()];
        if enterprise_user.is_some() {
            schemas.push(ENTERPRISE_USER_SCHEMA.to_string());
        }

        Self {
            schemas,
            id: some_if_present(&user.scimid),
            external_id: some_if_present(&user.ipid),
            user_name: user.user_name.clone(),
            name: user.name.as_ref().map(|n| ScimName {
                formatted: n.formatted.clone(),
                family_name: n.family_name.clone(),
                given_name: n.given_name.clone(),
                middle_name: n.middle_name.clone(),
                honorific_prefix: n.honorific_prefix.clone(),
                honorific_suffix: n.honorific_suffix.clone(),
            }),
            display_name: some_if_present(&user.display_name),
            nick_name: some_if_present(&user.nick_name),
            profile_url: some_if_present(&user.profile_url),
            title: some_if_present(&user.title),
            user_type: some_if_present(&user.user_type),
            preferred_language: some_if_present(&user.preferred_language),
            locale: some_if_present(&user.locale),
            timezone: some_if_present(&user.timezone),
            active: user.active,
            emails: user
                .emails
                .iter()
                .map(|e| ScimEmail {
                    value: e.value.clone(),
                    email_type: some_if_present(&e.kind),
                    primary: e.primary,
                })
                .collect(),
            addresses: user
                .addresses
                .iter()
                .map(|a| ScimAddress {
                    formatted: some_if_present(&a.formatted),
                    street_address: some_if_present(&a.street_address),
                    locality: some_if_present(&a.locality),
                    region: some_if_present(&a.region),
                    postal_code: some_if_present(&a.postal_code),
                    country: some_if_present(&a.country),
                    address_type: some_if_present(&a.kind),
                    primary: a.primary,
                })
                .collect(),
            phone_numbers: user
                .phone_numbers
                .iter()
                .map(|p| ScimPhoneNumber {
                    value: p.value.clone(),
                    phone_type: some_if_present(&p.kind),
                })
                .collect(),
            enterprise_user,
        }
    }

    /// Translate a wire user back into the model.
    pub fn into_model(self) -> User {
        let mut builder: UserBuilder = User::builder()
            .with_scimid(self.id.unwrap_or_default())
            .with_ipid(self.external_id.unwrap_or_default())
            .with_user_name(self.user_name)
            .with_display_name(self.display_name.unwrap_or_default())
            .with_nick_name(self.nick_name.unwrap_or_default())
            .with_profile_url(self.profile_url.unwrap_or_default())
            .with_title(self.title.unwrap_or_default())
            .with_user_type(self.user_type.unwrap_or_default())
            .with_preferred_language(self.preferred_language.unwrap_or_default())
            .with_locale(self.locale.unwrap_or_default())
            .with_timezone(self.timezone.unwrap_or_default())
            .with_active(self.active)
            .with_emails(
                self.emails
                    .into_iter()
                    .map(|e| Email {
                        value: e.value,
                        kind: e.email_type.unwrap_or_default(),
                        primary: e.primary,
                    })
                    .collect(),
            )
            .with_addresses(
                self.addresses
                    .into_iter()
                    .map(|a| Address {
                        formatted: a.formatted.unwrap_or_default(),
                        street_address: a.street_address.unwrap_or_default(),
                        locality: a.locality.unwrap_or_default(),
                        region: a.region.unwrap_or_default(),
                        postal_code: a.postal_code.unwrap_or_default(),
                        country: a.country.unwrap_or_default(),
                        kind: a.address_type.unwrap_or_default(),
                        primary: a.primary,
                    })
                    .collect(),
            )
            .with_phone_numbers(
                self.phone_numbers
                    .into_iter()
                    .map(|p| PhoneNumber {
                        value: p.value,
                        kind: p.phone_type.unwrap_or_default(),
                    })
                    .collect(),
            );

        if let Some(name) = self.name {
            builder = builder.with_name(Name {
                formatted: name.formatted,
                family_name: name.family_name,
                given_name: name.given_name,
                middle_name: name.middle_name,
                honorific_prefix: name.honorific_prefix,
                honorific_suffix: name.honorific_suffix,
            });
        }

        if let Some(enterprise) = self.enterprise_user {
            builder = builder.with_enterprise_data(EnterpriseData {
                employee_number: enterprise.employee_number.unwrap_or_default(),
                cost_center: enterprise.cost_center.unwrap_or_default(),
                organization: enterprise.organization.unwrap_or_default(),
                division: enterprise.division.unwrap_or_default(),
                department: enterprise.department.unwrap_or_default(),
                manager: enterprise.manager.map(|m| Manager {
                    value: m.value,
                    reference: m.reference.unwrap_or_default(),
                }),
            });
        }

        builder.build()
    }
}

fn enterprise_from_model(enterprise: &EnterpriseData) -> EnterpriseUser {
    EnterpriseUser {
        employee_number: some_if_present(&enterprise.employee_number),
        cost_center: some_if_present(&enterprise.cost_center),
        organization: some_if_present(&enterprise.organization),
        division: some_if_present(&enterprise.division),
        department: some_if_present(&enterprise.department),
        manager: enterprise.manager.as_ref().map(|m| ScimManager {
            value: m.value.clone(),
            reference: some_if_present(&m.reference),
        }),
    }
}

fn some_if_present(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model_user() -> User {
        User::builder()
            .with_ipid("u-1")
            .with_user_name("ada@example.com")
            .with_display_name("Ada Lovelace")
            .with_name(Name {
                given_name: Some("Ada".into()),
                family_name: Some("Lovelace".into()),
                ..Name::default()
            })
            .with_active(true)
            .with_emails(vec![Email {
                value: "ada@example.com".into(),
                kind: "work".into(),
                primary: true,
            }])
            .with_enterprise_data(EnterpriseData {
                department: "R&D".into(),
                cost_center: "cc-1".into(),
                ..EnterpriseData::default()
            })
            .build()
    }

    #[test]
    fn wire_form_carries_both_schemas_for_enterprise_users() {
        let wire = ScimUser::from_model(&model_user());
        assert_eq!(wire.schemas, vec![USER_SCHEMA, ENTERPRISE_USER_SCHEMA]);
        assert_eq!(wire.external_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn enterprise_extension_serializes_under_its_urn() {
        let wire = ScimUser::from_model(&model_user());
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(
            json["urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"]["department"],
            "R&D"
        );
        assert_eq!(json["userName"], "ada@example.com");
        assert_eq!(json["active"], true);
    }

    #[test]
    fn model_round_trip_preserves_content_hash() {
        let user = model_user();
        let round_tripped = ScimUser::from_model(&user).into_model();
        assert_eq!(user.hash_code, round_tripped.hash_code);
    }

    #[test]
    fn patch_op_matches_the_wire_contract() {
        let patch = PatchOp::new(vec![PatchOperation {
            op: "add".into(),
            path: Some("members".into()),
            value: json!([{"value": "scim-user-1"}]),
        }]);

        let encoded = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            encoded,
            json!({
                "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
                "Operations": [
                    {"op": "add", "path": "members", "value": [{"value": "scim-user-1"}]}
                ]
            })
        );
    }

    #[test]
    fn group_create_payload_is_display_name_plus_external_id() {
        let group = ScimGroup::new("devs", "g-1");
        let json = serde_json::to_value(&group).unwrap();

        assert_eq!(json["displayName"], "devs");
        assert_eq!(json["externalId"], "g-1");
        assert!(json.get("members").is_none());
    }

    #[test]
    fn list_response_parses_aws_shape() {
        let body = json!({
            "totalResults": 2,
            "itemsPerPage": 2,
            "startIndex": 1,
            "schemas": ["urn:ietf:params:scim:api:messages:2.0:ListResponse"],
            "Resources": [
                {"id": "s-1", "displayName": "devs", "schemas": []},
                {"id": "s-2", "displayName": "ops", "schemas": []}
            ]
        });

        let parsed: ListResponse<ScimGroup> = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.total_results, 2);
        assert_eq!(parsed.resources.len(), 2);
        assert_eq!(parsed.resources[1].display_name, "ops");
    }
}
