use serde_json::{json, Map, Value};

/// A by-id reference to another resource and its two wire encodings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedReference {
    /// Key of the nested encoding, e.g. `user` for `{"user": {"id": 7}}`
    pub nested_key: String,
    /// Key of the flat encoding, e.g. `userId` for `{"userId": 7}`
    pub flat_key: String,
    pub id: i64,
}

impl LinkedReference {
    pub fn user(id: i64) -> Self {
        Self {
            nested_key: "user".to_string(),
            flat_key: "userId".to_string(),
            id,
        }
    }
}

/// Create request for a resource linked to another by id
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedCreate {
    pub path: String,
    pub reference: LinkedReference,
    pub fields: Map<String, Value>,
}

impl LinkedCreate {
    pub fn new(path: impl Into<String>, reference: LinkedReference, fields: Map<String, Value>) -> Self {
        Self {
            path: path.into(),
            reference,
            fields,
        }
    }

    pub fn nested_payload(&self) -> Value {
        let mut payload = self.fields.clone();
        payload.insert(
            self.reference.nested_key.clone(),
            json!({ "id": self.reference.id }),
        );
        Value::Object(payload)
    }

    pub fn flat_payload(&self) -> Value {
        let mut payload = self.fields.clone();
        payload.insert(self.reference.flat_key.clone(), json!(self.reference.id));
        Value::Object(payload)
    }
}
