//! User entity and its nested value types.

use serde::{Deserialize, Serialize};

use crate::hash;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Name components, mirroring the SCIM Core User `name` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
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

/// An email address with its type and primary flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,

    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub primary: bool,
}

/// A physical address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub formatted: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub street_address: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub locality: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub postal_code: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country: String,

    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub primary: bool,
}

/// A phone number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,

    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

/// Reference to a user's manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,

    #[serde(rename = "$ref", default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
}

/// Enterprise extension attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseData {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub employee_number: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cost_center: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub organization: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub division: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub department: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<Manager>,
}

/// One person, as read from the upstream directory or the downstream SCIM
/// endpoint. `user_name` is the canonical login and must be unique within a
/// run's user set; `active` reflects the upstream non-suspended flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "ipid", default, skip_serializing_if = "String::is_empty")]
    pub ipid: String,

    #[serde(rename = "scimid", default, skip_serializing_if = "String::is_empty")]
    pub scimid: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub nick_name: String,

    #[serde(rename = "profileUrl", default, skip_serializing_if = "String::is_empty")]
    pub profile_url: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub preferred_language: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub locale: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timezone: String,

    #[serde(default)]
    pub active: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<Email>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phone_numbers: Vec<PhoneNumber>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise_data: Option<EnterpriseData>,

    #[serde(rename = "hashCode", default, skip_serializing_if = "String::is_empty")]
    pub hash_code: String,
}

impl User {
    pub fn builder() -> UserBuilder {
        UserBuilder::default()
    }

    /// The primary email address: the entry flagged `primary`, else the first
    /// entry, else none.
    #[must_use]
    pub fn primary_email_address(&self) -> Option<&str> {
        self.emails
            .iter()
            .find(|e| e.primary)
            .or_else(|| self.emails.first())
            .map(|e| e.value.as_str())
    }

    /// The reconciliation key: primary email, falling back to `user_name`.
    #[must_use]
    pub fn key(&self) -> &str {
        self.primary_email_address().unwrap_or(&self.user_name)
    }

    /// Recompute the content hash. `scimid` and the previous hash code never
    /// participate in the digest.
    pub fn set_hash_code(&mut self) {
        self.hash_code = hash::digest(self);
    }
}

/// Fluent builder; `build` computes the hash so a finished user is never
/// observable without one.
#[derive(Debug, Default)]
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    #[must_use]
    pub fn with_ipid(mut self, ipid: impl Into<String>) -> Self {
        self.user.ipid = ipid.into();
        self
    }

    #[must_use]
    pub fn with_scimid(mut self, scimid: impl Into<String>) -> Self {
        self.user.scimid = scimid.into();
        self
    }

    #[must_use]
    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user.user_name = user_name.into();
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.user.display_name = display_name.into();
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: Name) -> Self {
        self.user.name = Some(name);
        self
    }

    #[must_use]
    pub fn with_nick_name(mut self, nick_name: impl Into<String>) -> Self {
        self.user.nick_name = nick_name.into();
        self
    }

    #[must_use]
    pub fn with_profile_url(mut self, profile_url: impl Into<String>) -> Self {
        self.user.profile_url = profile_url.into();
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.user.title = title.into();
        self
    }

    #[must_use]
    pub fn with_user_type(mut self, user_type: impl Into<String>) -> Self {
        self.user.user_type = user_type.into();
        self
    }

    #[must_use]
    pub fn with_preferred_language(mut self, preferred_language: impl Into<String>) -> Self {
        self.user.preferred_language = preferred_language.into();
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.user.locale = locale.into();
        self
    }

    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.user.timezone = timezone.into();
        self
    }

    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.user.active = active;
        self
    }

    #[must_use]
    pub fn with_emails(mut self, emails: Vec<Email>) -> Self {
        self.user.emails = emails;
        self
    }

    #[must_use]
    pub fn with_addresses(mut self, addresses: Vec<Address>) -> Self {
        self.user.addresses = addresses;
        self
    }

    #[must_use]
    pub fn with_phone_numbers(mut self, phone_numbers: Vec<PhoneNumber>) -> Self {
        self.user.phone_numbers = phone_numbers;
        self
    }

    #[must_use]
    pub fn with_enterprise_data(mut self, enterprise_data: EnterpriseData) -> Self {
        self.user.enterprise_data = Some(enterprise_data);
        self
    }

    pub fn build(mut self) -> User {
        self.user.set_hash_code();
        self.user
    }
}
