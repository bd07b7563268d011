//! Kind registry -- an ordered, named collection of activity kinds.
//!
//! The bridge looks kinds up by name once, at creation time, and keeps the
//! resolved name next to the live handle so updates never have to guess.

use std::collections::HashMap;

use serde_json::Value;

use super::ActivityKind;
use super::catalog::{Counter, Progress, Status};
use super::schema::{self, FieldError, FieldSpec};

type NormalizeFn = fn(&Value) -> Result<Value, FieldError>;

/// Type-erased view of one [`ActivityKind`].
#[derive(Clone, Copy)]
pub struct KindDescriptor {
    pub name: &'static str,
    pub attribute_fields: &'static [FieldSpec],
    pub content_fields: &'static [FieldSpec],
    parse_attributes: NormalizeFn,
    parse_content: NormalizeFn,
}

impl KindDescriptor {
    /// Build the descriptor for kind `K`.
    pub fn of<K: ActivityKind>() -> Self {
        use super::Schema;

        Self {
            name: K::NAME,
            attribute_fields: <K::Attributes as Schema>::FIELDS,
            content_fields: <K::Content as Schema>::FIELDS,
            parse_attributes: schema::normalize::<K::Attributes>,
            parse_content: schema::normalize::<K::Content>,
        }
    }

    /// Validate and normalize an attributes payload.
    pub fn parse_attributes(&self, value: &Value) -> Result<Value, FieldError> {
        (self.parse_attributes)(value)
    }

    /// Validate and normalize a content payload.
    pub fn parse_content(&self, value: &Value) -> Result<Value, FieldError> {
        (self.parse_content)(value)
    }
}

impl std::fmt::Debug for KindDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindDescriptor")
            .field("name", &self.name)
            .field("attribute_fields", &self.attribute_fields)
            .field("content_fields", &self.content_fields)
            .finish()
    }
}

/// Registered kinds, keyed by name, in registration order.
///
/// # Example
///
/// ```ignore
/// let mut kinds = KindRegistry::builtin();
/// kinds.register::<MyKind>();
/// let counter = kinds.get("Counter").unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: Vec<KindDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl KindRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `Counter`, `Status` and `Progress`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register::<Counter>();
        registry.register::<Status>();
        registry.register::<Progress>();
        registry
    }

    /// Register kind `K` under [`ActivityKind::NAME`].
    ///
    /// A kind with the same name is replaced in place (keeping its
    /// position) and the old descriptor is returned.
    pub fn register<K: ActivityKind>(&mut self) -> Option<KindDescriptor> {
        self.insert(KindDescriptor::of::<K>())
    }

    /// Register a prebuilt descriptor.
    pub fn insert(&mut self, descriptor: KindDescriptor) -> Option<KindDescriptor> {
        match self.index.get(descriptor.name) {
            Some(&pos) => Some(std::mem::replace(&mut self.kinds[pos], descriptor)),
            None => {
                self.index.insert(descriptor.name, self.kinds.len());
                self.kinds.push(descriptor);
                None
            }
        }
    }

    /// Look up a kind by name.
    pub fn get(&self, name: &str) -> Option<&KindDescriptor> {
        self.index.get(name).map(|&pos| &self.kinds[pos])
    }

    /// Kind names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.kinds.iter().map(|k| k.name).collect()
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &KindDescriptor> {
        self.kinds.iter()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::schema::{FieldReader, FieldType, Schema};
    use serde::Serialize;
    use serde_json::json;

    #[derive(Debug, Serialize)]
    struct Empty {}

    impl Schema for Empty {
        const FIELDS: &'static [FieldSpec] = &[];

        fn read(_reader: &FieldReader<'_>) -> Result<Self, FieldError> {
            Ok(Self {})
        }
    }

    #[derive(Debug, Serialize)]
    struct Score {
        points: i64,
    }

    impl Schema for Score {
        const FIELDS: &'static [FieldSpec] = &[FieldSpec::required("points", FieldType::Integer)];

        fn read(reader: &FieldReader<'_>) -> Result<Self, FieldError> {
            Ok(Self {
                points: reader.required_int("points")?,
            })
        }
    }

    struct Scoreboard;

    impl ActivityKind for Scoreboard {
        const NAME: &'static str = "Scoreboard";
        type Attributes = Empty;
        type Content = Score;
    }

    /// Same name as a built-in, different shape.
    struct ShadowCounter;

    impl ActivityKind for ShadowCounter {
        const NAME: &'static str = "Counter";
        type Attributes = Empty;
        type Content = Score;
    }

    #[test]
    fn registry_starts_empty() {
        let registry = KindRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.names().is_empty());
    }

    #[test]
    fn builtin_kinds_in_registration_order() {
        let registry = KindRegistry::builtin();
        assert_eq!(registry.names(), vec!["Counter", "Status", "Progress"]);
    }

    #[test]
    fn get_missing_returns_none() {
        let registry = KindRegistry::builtin();
        assert!(registry.get("DoesNotExist").is_none());
        assert!(registry.get("counter").is_none());
    }

    #[test]
    fn register_third_party_kind() {
        let mut registry = KindRegistry::builtin();
        assert!(registry.register::<Scoreboard>().is_none());
        assert_eq!(
            registry.names(),
            vec!["Counter", "Status", "Progress", "Scoreboard"]
        );

        let kind = registry.get("Scoreboard").unwrap();
        assert_eq!(kind.parse_content(&json!({"points": 7})).unwrap(), json!({"points": 7}));
        assert_eq!(kind.parse_attributes(&json!({"anything": 1})).unwrap(), json!({}));
    }

    #[test]
    fn register_replaces_existing_in_place() {
        let mut registry = KindRegistry::builtin();
        let old = registry.register::<ShadowCounter>();
        assert_eq!(old.map(|d| d.name), Some("Counter"));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names()[0], "Counter");

        let counter = registry.get("Counter").unwrap();
        assert_eq!(counter.content_fields[0].name, "points");
    }

    #[test]
    fn descriptor_exposes_field_contracts() {
        let registry = KindRegistry::builtin();
        let status = registry.get("Status").unwrap();
        let required: Vec<_> = status
            .content_fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();
        assert_eq!(required, vec!["status"]);
        assert_eq!(status.attribute_fields.len(), 2);
    }

    #[test]
    fn registry_debug_shows_names() {
        let registry = KindRegistry::builtin();
        let debug = format!("{registry:?}");
        assert!(debug.contains("Progress"));
    }
}
