use serde::{Deserialize, Deserializer, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The percentage applied when a bill is submitted without one.
pub const DEFAULT_PCT: i64 = 20;

/// One expense report, as stored by the remote bills service.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    /// Assigned by the remote service when the bill is created. Absent on drafts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub expense_type: String,
    #[serde(default)]
    pub name: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub amount: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub vat: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub pct: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_admin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default)]
    pub status: BillStatus,
    #[serde(default)]
    pub email: String,
}

impl Bill {
    /// Returns the justification reference if both `file_url` and `file_name` are set.
    pub fn justification(&self) -> Option<(&str, &str)> {
        match (self.file_url.as_deref(), self.file_name.as_deref()) {
            (Some(url), Some(name)) => Some((url, name)),
            _ => None,
        }
    }
}

/// The review status of a bill. Statuses this crate does not know about are kept verbatim.
#[derive(Default, Debug, Clone, Eq, PartialEq, Hash)]
pub enum BillStatus {
    #[default]
    Pending,
    Accepted,
    Refused,
    Other(String),
}

impl BillStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Accepted => "accepted",
            BillStatus::Refused => "refused",
            BillStatus::Other(s) => s.as_str(),
        }
    }
}

impl Display for BillStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pending" => BillStatus::Pending,
            "accepted" => BillStatus::Accepted,
            "refused" => BillStatus::Refused,
            other => BillStatus::Other(other.to_string()),
        })
    }
}

serde_plain::derive_serialize_from_display!(BillStatus);
serde_plain::derive_deserialize_from_fromstr!(BillStatus, "a bill status");

/// The remote service stores some numbers as strings, and uses `""` for "not set".
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Int(i64),
        Float(f64),
        Str(String),
    }

    match Option::<NumOrStr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumOrStr::Int(n)) => Ok(Some(n)),
        Some(NumOrStr::Float(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Ok(Some(f as i64))
        }
        Some(NumOrStr::Float(f)) => Err(serde::de::Error::custom(format!(
            "invalid number '{f}': not a whole number"
        ))),
        Some(NumOrStr::Str(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<i64>()
                .map(Some)
                .map_err(|e| serde::de::Error::custom(format!("invalid number '{s}': {e}")))
        }
    }
}

/// The fields an employee fills in on the new bill form.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillForm {
    #[serde(rename = "type")]
    pub expense_type: String,
    pub name: String,
    pub date: String,
    pub amount: i64,
    pub vat: Option<i64>,
    pub pct: Option<i64>,
    pub commentary: Option<String>,
}
