//! Serde helpers for partial updates.

/// Distinguish "field absent" from "field set to null" in JSON patches.
///
/// Use with `#[serde(default, with = "cargodesk_core::patch::double_option")]`
/// on an `Option<Option<T>>`: absent is `None`, `null` is `Some(None)`.
pub mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T: Serialize, S: Serializer>(
        value: &Option<Option<T>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T: Deserialize<'de>, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<T>>, D::Error> {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, with = "super::double_option")]
        owner: Option<Option<u32>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"owner": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"owner": 7}"#).unwrap();
        assert_eq!(absent.owner, None);
        assert_eq!(null.owner, Some(None));
        assert_eq!(set.owner, Some(Some(7)));
    }
}
