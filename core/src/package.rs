use serde::{Deserialize, Serialize};

use crate::MessageSchema;

/// One compilation unit: the messages whose validators are generated together.
///
/// A set typically mirrors one schema source file. `artifact` names the
/// generated message-definition file the validators accompany; downstream
/// tooling derives the validator artifact name from it.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::*;
///
/// let set = SchemaSet::new()
///     .with_package("shop.v1")
///     .with_message(MessageSchema::new("Order"))
///     .with_message(MessageSchema::new("LineItem"));
///
/// assert_eq!(set.message_count(), 2);
/// assert!(set.find_message(".shop.v1.LineItem").is_some());
/// assert!(set.find_message("LineItem").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSet {
    /// Package the messages are declared in (e.g. `shop.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Name of the generated message-definition artifact (e.g. `shop.pb.rs`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    /// Message schemas in declaration order.
    #[serde(default)]
    pub messages: Vec<MessageSchema>,
}

impl SchemaSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the package name.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Sets the artifact name.
    pub fn with_artifact(mut self, artifact: impl Into<String>) -> Self {
        self.artifact = Some(artifact.into());
        self
    }

    /// Appends a message.
    pub fn with_message(mut self, message: MessageSchema) -> Self {
        self.messages.push(message);
        self
    }

    /// Returns the number of messages in this set.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Finds a message by plain or fully qualified name.
    ///
    /// `.pkg.Name`, `pkg.Name` and `Name` all resolve to the message `Name`
    /// when the set's package is `pkg`.
    pub fn find_message(&self, type_name: &str) -> Option<&MessageSchema> {
        let local = self.local_name(type_name);
        self.messages.iter().find(|message| message.name == local)
    }

    /// Strips the leading dot and this set's package prefix from a type name.
    pub fn local_name<'a>(&self, type_name: &'a str) -> &'a str {
        strip_package(self.package.as_deref(), type_name)
    }
}

pub(crate) fn strip_package<'a>(package: Option<&str>, type_name: &'a str) -> &'a str {
    let name = type_name.strip_prefix('.').unwrap_or(type_name);
    match package {
        Some(package) => name
            .strip_prefix(package)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(name),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name_strips_package() {
        let set = SchemaSet::new().with_package("shop.v1");
        assert_eq!(set.local_name(".shop.v1.Order"), "Order");
        assert_eq!(set.local_name("shop.v1.Order"), "Order");
        assert_eq!(set.local_name("Order"), "Order");
        assert_eq!(set.local_name(".other.Order"), "other.Order");
    }

    #[test]
    fn test_local_name_without_package() {
        let set = SchemaSet::new();
        assert_eq!(set.local_name(".Order"), "Order");
    }
}
