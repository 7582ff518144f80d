//! Serde adapters for record ids
//!
//! A record id crosses two boundaries with different shapes: the database
//! hands back a native id value, while JSON payloads carry the "table:key"
//! string. The adapters accept either on the way in and always emit the
//! string form on the way out, so a document reads the same from both
//! sides.

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;
use surrealdb::RecordId;

/// Missing or null booleans deserialize as false
pub fn bool_false<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(d)?.unwrap_or(false))
}

struct RecordIdVisitor;

impl<'de> Visitor<'de> for RecordIdVisitor {
    type Value = RecordId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a 'table:key' string or a native record id")
    }

    fn visit_str<E>(self, text: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        text.parse()
            .map_err(|_| de::Error::custom(format!("not a record id: {text}")))
    }

    fn visit_map<M>(self, access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        RecordId::deserialize(de::value::MapAccessDeserializer::new(access))
    }
}

/// Newtype so the visitor composes with `Option<_>`
struct AnyRecordId(RecordId);

impl<'de> Deserialize<'de> for AnyRecordId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        d.deserialize_any(RecordIdVisitor).map(AnyRecordId)
    }
}

/// `#[serde(with = "serde_helpers::record_id")]`
pub mod record_id {
    use super::*;

    pub fn serialize<S: Serializer>(id: &RecordId, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&id.to_string())
    }

    pub fn deserialize<'de, D>(d: D) -> Result<RecordId, D::Error>
    where
        D: Deserializer<'de>,
    {
        d.deserialize_any(RecordIdVisitor)
    }
}

/// `#[serde(with = "serde_helpers::option_record_id")]`
pub mod option_record_id {
    use super::*;

    pub fn serialize<S: Serializer>(id: &Option<RecordId>, s: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => s.serialize_some(&id.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<RecordId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<AnyRecordId>::deserialize(d)?.map(|id| id.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize, Deserialize)]
    struct Doc {
        #[serde(with = "super::record_id")]
        owner: RecordId,
    }

    #[test]
    fn test_string_form_round_trips() {
        let doc: Doc = serde_json::from_str(r#"{"owner":"user:u1"}"#).unwrap();
        assert_eq!(doc.owner.to_string(), "user:u1");
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            r#"{"owner":"user:u1"}"#
        );
    }

    #[test]
    fn test_garbage_string_rejected() {
        assert!(serde_json::from_str::<Doc>(r#"{"owner":"no-table-part"}"#).is_err());
    }
}
