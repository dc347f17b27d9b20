//! Declared-property lookup and validation.
//!
//! Templates in the wild spell the same property several ways, so every field
//! has an ordered alias list and the first non-empty match wins.

use validator::{Validate, ValidationErrors};

use super::types::Properties;
use crate::errors::{Error, Result};
use crate::platform::{NewAccessKey, NewUser, UserUpdate};

pub const LOGIN_ID_KEYS: &[&str] = &["loginId", "LoginId", "userName", "UserName", "Name"];
pub const EMAIL_KEYS: &[&str] = &["email", "Email"];
pub const DISPLAY_NAME_KEYS: &[&str] = &["displayName", "DisplayName", "Display Name"];
pub const PROJECT_ID_KEYS: &[&str] = &["projectId", "ProjectId"];
pub const SECRET_NAME_KEYS: &[&str] = &["secretName", "SecretName"];
pub const KEY_NAME_KEYS: &[&str] = &["name", "Name"];
pub const DESCRIPTION_KEYS: &[&str] = &["description", "Description"];

/// First non-empty value among `aliases`, trimmed.
pub fn lookup<'a>(properties: &'a Properties, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .filter_map(|key| properties.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

/// Validated user properties.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct UserProperties {
    #[validate(length(min = 1, max = 255, message = "loginId must be between 1 and 255 characters"))]
    pub login_id: String,

    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,

    #[validate(length(max = 255, message = "displayName must be at most 255 characters"))]
    pub display_name: Option<String>,
}

impl UserProperties {
    pub fn from_properties(properties: &Properties) -> Result<Self> {
        let login_id = lookup(properties, LOGIN_ID_KEYS).ok_or_else(|| {
            Error::validation_field("Missing required property 'loginId'", "loginId")
        })?;

        let parsed = Self {
            login_id: login_id.to_string(),
            email: lookup(properties, EMAIL_KEYS).map(str::to_string),
            display_name: lookup(properties, DISPLAY_NAME_KEYS).map(str::to_string),
        };
        parsed.validate().map_err(into_validation_error)?;
        Ok(parsed)
    }

    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            login_id: self.login_id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }

    /// Update body addressed at `key` (the bound physical id).
    pub fn to_update(&self, key: &str) -> UserUpdate {
        UserUpdate {
            login_id: key.to_string(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Validated access key properties.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct AccessKeyProperties {
    #[validate(length(min = 1, max = 255, message = "name must be between 1 and 255 characters"))]
    pub name: String,

    pub description: Option<String>,
}

impl AccessKeyProperties {
    pub fn from_properties(properties: &Properties) -> Result<Self> {
        let name = lookup(properties, KEY_NAME_KEYS)
            .ok_or_else(|| Error::validation_field("Missing required property 'name'", "name"))?;

        let parsed = Self {
            name: name.to_string(),
            description: lookup(properties, DESCRIPTION_KEYS).map(str::to_string),
        };
        parsed.validate().map_err(into_validation_error)?;
        Ok(parsed)
    }

    pub fn to_new_access_key(&self) -> NewAccessKey {
        NewAccessKey { name: self.name.clone(), description: self.description.clone(), expire_time: 0 }
    }
}

/// Report the first failing field as a property validation error.
fn into_validation_error(errors: ValidationErrors) -> Error {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    match fields.first() {
        Some((field, errs)) => {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            Error::validation_field(message, field.to_string())
        }
        None => Error::validation("Invalid resource properties"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_lookup_first_non_empty_alias_wins() {
        let p = props(&[("loginId", " "), ("userName", "alice"), ("Name", "bob")]);
        assert_eq!(lookup(&p, LOGIN_ID_KEYS), Some("alice"));
        assert_eq!(lookup(&p, EMAIL_KEYS), None);
    }

    #[test]
    fn test_user_properties_with_aliases() {
        let p = props(&[("Name", "alice"), ("Email", "a@example.com"), ("Display Name", "Alice")]);
        let user = UserProperties::from_properties(&p).unwrap();

        assert_eq!(user.login_id, "alice");
        assert_eq!(user.email.as_deref(), Some("a@example.com"));
        assert_eq!(user.display_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_missing_login_id() {
        let err = UserProperties::from_properties(&props(&[("email", "a@example.com")])).unwrap_err();
        match err {
            Error::Validation { field, .. } => assert_eq!(field.as_deref(), Some("loginId")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_email_rejected() {
        let err =
            UserProperties::from_properties(&props(&[("loginId", "alice"), ("email", "nope")])).unwrap_err();
        match err {
            Error::Validation { field, message } => {
                assert_eq!(field.as_deref(), Some("email"));
                assert!(message.contains("valid address"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_update_is_keyed_by_physical_id() {
        let user = UserProperties::from_properties(&props(&[("loginId", "alice")])).unwrap();
        let update = user.to_update("usr_123");
        assert_eq!(update.login_id, "usr_123");
    }

    #[test]
    fn test_access_key_properties() {
        let key = AccessKeyProperties::from_properties(&props(&[("name", "ci"), ("description", "pipeline")]))
            .unwrap();
        let body = key.to_new_access_key();

        assert_eq!(body.name, "ci");
        assert_eq!(body.description.as_deref(), Some("pipeline"));
        assert_eq!(body.expire_time, 0);

        assert!(AccessKeyProperties::from_properties(&props(&[("description", "x")])).is_err());
    }
}
