use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Default map center (New York City).
pub const DEFAULT_CENTER: LatLng = LatLng::new(40.7128, -74.0060);
pub const DEFAULT_ZOOM: u8 = 13;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap contributors".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleStyle {
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f64,
}

impl Default for CircleStyle {
    fn default() -> Self {
        Self {
            color: "#2196F3".to_string(),
            fill_color: "#2196F3".to_string(),
            fill_opacity: 0.1,
        }
    }
}

/// Notification severity, rendered as the banner's second class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Success,
    Error,
}

impl Severity {
    pub fn as_class(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Sent,
    Received,
}

impl MessageKind {
    pub fn as_class(self) -> &'static str {
        match self {
            MessageKind::Sent => "sent",
            MessageKind::Received => "received",
        }
    }
}

/// Criteria for job cards. Unset criteria always pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub category: Option<String>,
    pub min_rate: Option<i64>,
    pub max_distance: Option<i64>,
    pub keyword: Option<String>,
}

impl JobFilter {
    /// Builds a filter from raw form field values. Blank fields are unset;
    /// numeric fields that do not start with an integer are unset as well.
    pub fn from_fields(category: &str, min_rate: &str, max_distance: &str, keyword: &str) -> Self {
        Self {
            category: non_blank(category),
            min_rate: non_blank(min_rate).and_then(|v| parse_int_prefix(&v)),
            max_distance: non_blank(max_distance).and_then(|v| parse_int_prefix(&v)),
            keyword: non_blank(keyword),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.min_rate.is_none()
            && self.max_distance.is_none()
            && self.keyword.is_none()
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Integer parsing with leading-prefix semantics: optional surrounding
/// whitespace and sign, then digits; anything after the digits is ignored.
/// `"20/hr"` is 20, `"12.9"` is 12, `"abc"` and `""` are `None`. Digit runs
/// beyond the `i64` range saturate.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // 位數過多時飽和到 i64 範圍，不視為無效
    let value = match digits[..end].parse::<i64>() {
        Ok(magnitude) if negative => -magnitude,
        Ok(magnitude) => magnitude,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    };
    Some(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSort {
    RateHighToLow,
    RateLowToHigh,
    Distance,
}

impl std::str::FromStr for JobSort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "rate-desc" => Ok(JobSort::RateHighToLow),
            "rate-asc" => Ok(JobSort::RateLowToHigh),
            "distance" => Ok(JobSort::Distance),
            other => Err(format!(
                "unknown sort order '{}', expected rate-desc, rate-asc or distance",
                other
            )),
        }
    }
}

/// Chat recipients are addressed by numeric user id or by an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipientId {
    Number(i64),
    Text(String),
}

impl From<i64> for RecipientId {
    fn from(id: i64) -> Self {
        RecipientId::Number(id)
    }
}

/// Only canonical integers become numbers; `"007"` or `"+7"` stay text so the
/// id goes over the wire exactly as given.
impl From<&str> for RecipientId {
    fn from(id: &str) -> Self {
        match id.parse::<i64>() {
            Ok(n) if n.to_string() == id => RecipientId::Number(n),
            _ => RecipientId::Text(id.to_string()),
        }
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipientId::Number(n) => write!(f, "{}", n),
            RecipientId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRequest {
    pub recipient_id: RecipientId,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub date: NaiveDate,
    pub time_slot: String,
    pub available: bool,
}

/// Response body of both endpoints. A body without `success` counts as false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAck {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    SendMessage,
    UpdateAvailability,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    Pending,
    Succeeded,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub id: u64,
    pub kind: RequestKind,
    pub state: RequestState,
}
