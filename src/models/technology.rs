use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A technology the user is learning.
///
/// Technologies live in a single ordered collection. Insertion order is the
/// display order, and no technology references another. The `id` is assigned
/// once at creation and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technology {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: Status,
    #[serde(default)]
    pub notes: String,
    /// Target date. Serialized as `""` when unset.
    #[serde(default, with = "deadline_format")]
    pub deadline: Option<NaiveDate>,
    /// Links to learning material, in the order they were added.
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Technology {
    /// A technology is overdue when its deadline falls before `today` and it
    /// has not been completed yet.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != Status::Completed && self.deadline.is_some_and(|d| d < today)
    }
}

/// Learning status of a technology.
///
/// - `NotStarted`: On the list, nothing done yet
/// - `InProgress`: Currently being learned
/// - `Completed`: Learned
///
/// Every transition is allowed, including setting the current status again.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    NotStarted,
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::NotStarted, Status::InProgress, Status::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not-started" => Some(Self::NotStarted),
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// The status reached by a single click-to-cycle interaction.
    pub fn next(&self) -> Self {
        match self {
            Self::NotStarted => Self::InProgress,
            Self::InProgress => Self::Completed,
            Self::Completed => Self::NotStarted,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for creating a new technology.
///
/// New technologies always start as `NotStarted` with no notes, deadline or
/// resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTechnologyInput {
    /// Falls back to a placeholder title when blank.
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Input for updating an existing technology. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTechnologyInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub notes: Option<String>,
    /// `Some(None)` clears the deadline; `None` leaves it untouched.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub deadline: Option<Option<NaiveDate>>,
    pub resources: Option<Vec<String>>,
    pub category: Option<String>,
}

/// A field that is present maps to `Some`, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Counts derived from the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub overdue: usize,
}

/// Deadlines are stored as ISO dates, with the empty string meaning "none".
pub mod deadline_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.serialize_str(&date.format(FORMAT).to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse(text).map(Some).map_err(serde::de::Error::custom),
        }
    }

    pub fn parse(text: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(text, FORMAT)
    }
}
