use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `POST /api/ping`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SweepRequest {
    pub ip: String,
    pub subnet: String,
}

impl SweepRequest {
    pub fn new(ip: impl Into<String>, subnet: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            subnet: subnet.into(),
        }
    }

    /// Lenient decode: anything that is not a JSON object with string fields
    /// yields empty strings, which validation then rejects.
    pub fn from_json_lenient(body: &[u8]) -> Self {
        let value: Value = serde_json::from_slice(body).unwrap_or_default();
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or("")
                .trim()
                .to_string()
        };
        Self {
            ip: field("ip"),
            subnet: field("subnet"),
        }
    }
}

/// Liveness of one host.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HostResult {
    #[serde(default, deserialize_with = "any_as_text")]
    pub host: String,
    #[serde(default, deserialize_with = "truthy")]
    pub alive: bool,
}

impl HostResult {
    pub fn badge(&self) -> &'static str {
        if self.alive {
            "ONLINE"
        } else {
            "OFFLINE"
        }
    }
}

/// Successful sweep payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SweepResponse {
    #[serde(default)]
    pub network: String,
    #[serde(
        default,
        deserialize_with = "whole_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub alive_count: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<HostResult>,
    #[serde(
        default,
        deserialize_with = "whole_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub scanned: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

fn null_as_empty<'de, D>(de: D) -> Result<Vec<HostResult>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<HostResult>>::deserialize(de)?.unwrap_or_default())
}

/// Non-negative integral number, including floats like `2.0`; anything else
/// reads as absent.
fn whole_number<'de, D>(de: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Number(n)) = Option::<Value>::deserialize(de)? else {
        return Ok(None);
    };
    Ok(n.as_u64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    }))
}

/// Strings verbatim, `null` as absent, any other value as its JSON text.
fn optional_text<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn any_as_text<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(de)?.unwrap_or_default())
}

/// `false`, `null`, `0`, `""` are false; every other value is true.
fn truthy<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Error payload sent alongside a non-2xx status.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorResponse {
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
}
