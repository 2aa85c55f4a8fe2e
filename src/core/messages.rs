//! Customer lifecycle messages exchanged over SQS/SNS.
//!
//! The body of a message is the JSON of the variant's payload; the variant
//! itself travels as the `MessageType` string attribute.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CustomerError;

/// Name of the message attribute carrying the type tag.
pub const MESSAGE_TYPE_ATTRIBUTE: &str = "MessageType";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    CustomerCreated,
    CustomerUpdated,
    CustomerDeleted,
}

impl MessageType {
    pub const ALL: [MessageType; 3] = [
        MessageType::CustomerCreated,
        MessageType::CustomerUpdated,
        MessageType::CustomerDeleted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::CustomerCreated => "CustomerCreated",
            MessageType::CustomerUpdated => "CustomerUpdated",
            MessageType::CustomerDeleted => "CustomerDeleted",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = CustomerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CustomerError::UnknownMessageType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerCreated {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[serde(rename = "GitHubUsername")]
    pub github_username: String,
    pub date_of_birth: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerUpdated {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[serde(rename = "GitHubUsername")]
    pub github_username: String,
    pub date_of_birth: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerDeleted {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerMessage {
    Created(CustomerCreated),
    Updated(CustomerUpdated),
    Deleted(CustomerDeleted),
}

impl CustomerMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            CustomerMessage::Created(_) => MessageType::CustomerCreated,
            CustomerMessage::Updated(_) => MessageType::CustomerUpdated,
            CustomerMessage::Deleted(_) => MessageType::CustomerDeleted,
        }
    }

    pub fn customer_id(&self) -> Uuid {
        match self {
            CustomerMessage::Created(m) => m.id,
            CustomerMessage::Updated(m) => m.id,
            CustomerMessage::Deleted(m) => m.id,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized.
    pub fn to_body(&self) -> Result<String, CustomerError> {
        let body = match self {
            CustomerMessage::Created(m) => serde_json::to_string(m)?,
            CustomerMessage::Updated(m) => serde_json::to_string(m)?,
            CustomerMessage::Deleted(m) => serde_json::to_string(m)?,
        };
        Ok(body)
    }

    /// Deserializes `body` into the variant selected by `message_type`.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the body does not match the variant's schema.
    pub fn decode(message_type: MessageType, body: &str) -> Result<Self, CustomerError> {
        let message = match message_type {
            MessageType::CustomerCreated => CustomerMessage::Created(serde_json::from_str(body)?),
            MessageType::CustomerUpdated => CustomerMessage::Updated(serde_json::from_str(body)?),
            MessageType::CustomerDeleted => CustomerMessage::Deleted(serde_json::from_str(body)?),
        };
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_parses_known_tags() {
        for t in MessageType::ALL {
            assert_eq!(t.as_str().parse::<MessageType>().unwrap(), t);
        }
    }

    #[test]
    fn test_message_type_rejects_unknown_tags() {
        let err = "OrderPlaced".parse::<MessageType>().unwrap_err();
        assert!(matches!(err, CustomerError::UnknownMessageType(ref t) if t == "OrderPlaced"));
        assert!("customercreated".parse::<MessageType>().is_err());
    }

    #[test]
    fn test_deleted_body_is_pascal_case() {
        let message = CustomerMessage::Deleted(CustomerDeleted { id: Uuid::nil() });
        assert_eq!(
            message.to_body().unwrap(),
            r#"{"Id":"00000000-0000-0000-0000-000000000000"}"#
        );
    }

    #[test]
    fn test_decode_with_wrong_schema_fails() {
        let err = CustomerMessage::decode(MessageType::CustomerCreated, r#"{"Id":"x"}"#);
        assert!(matches!(err, Err(CustomerError::Serialization(_))));
    }
}
