use aws_sdk_dynamodb::types;
use serde_dynamo::{Result, to_attribute_value};
use std::collections;
use uuid::Uuid;

/// Name of the partition key attribute of both tables.
pub const ID: &str = "id";

/// Partition key of a member or team item.
///
/// ```rust
/// use member_repository::common::key;
/// use uuid::Uuid;
///
/// let key = key::Key::from(Uuid::nil());
/// assert_eq!(key.name, key::ID);
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Key {
    /// The attribute name of the key.
    pub name: String,
    /// The identifier value.
    pub value: Uuid,
}

impl From<Uuid> for Key {
    fn from(value: Uuid) -> Self {
        Self {
            name: ID.to_string(),
            value,
        }
    }
}

impl TryFrom<Key> for collections::HashMap<String, types::AttributeValue> {
    type Error = serde_dynamo::Error;

    fn try_from(key: Key) -> Result<Self> {
        let value = to_attribute_value(key.value)?;
        Ok(Self::from([(key.name, value)]))
    }
}
