use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decodes a form field the way loosely typed form posts arrive.
///
/// `null`, `false` and `0` count as absent. Strings pass through untouched;
/// `true` and non-zero numbers keep their JSON text. Arrays and objects are
/// not form values and fail decoding.
fn form_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::Bool(true)) => Ok(Some("true".to_string())),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other @ (Value::Array(_) | Value::Object(_))) => Err(de::Error::custom(format!(
            "expected a form value, found {}",
            other
        ))),
    }
}

/// Lead registration form data as submitted by a caller.
///
/// Every field is optional at this stage: an absent key, `null`, `false`
/// and `0` all decode to `None` and are reported as missing by the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    #[serde(default, deserialize_with = "form_field")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "form_field")]
    pub lastname: Option<String>,
    #[serde(default, deserialize_with = "form_field")]
    pub document_type: Option<String>,
    #[serde(default, deserialize_with = "form_field")]
    pub document_number: Option<String>,
    #[serde(default, deserialize_with = "form_field")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "form_field")]
    pub email: Option<String>,
}

impl CandidateRecord {
    /// Looks up a field by its wire name (`documentNumber`, not `document_number`).
    pub fn field(&self, wire_name: &str) -> Option<&str> {
        let value = match wire_name {
            "name" => &self.name,
            "lastname" => &self.lastname,
            "documentType" => &self.document_type,
            "documentNumber" => &self.document_number,
            "phone" => &self.phone,
            "email" => &self.email,
            _ => return None,
        };
        value.as_deref()
    }
}

/// Accepted lead. Created once by the validator, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub name: String,
    pub lastname: String,
    pub document_type: String,
    pub document_number: String,
    pub phone: String,
    pub email: String,
    /// Millisecond timestamp of acceptance, bumped when needed to stay unique.
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// Identity attached to a lead at acceptance time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadStamp {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// Body of a `201 Created` submission response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadCreatedResponse {
    pub success: bool,
    pub message: String,
    pub lead_id: String,
}

/// Body of the listing response.
#[derive(Debug, Serialize, Deserialize)]
pub struct LeadListResponse {
    pub success: bool,
    pub leads: Vec<LeadRecord>,
    pub total: usize,
}
