use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// One entry of the tracked collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<BookDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Book {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: None,
            status: None,
            rating: None,
            date: None,
            tags: Vec::new(),
            review: None,
            cover: None,
            url: None,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn status_label(&self) -> &'static str {
        Status::label_of(self.status.as_ref())
    }
}

/// Reading state. Unrecognized values are kept verbatim and carry no label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Reading,
    Read,
    WantToRead,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Reading => "reading",
            Status::Read => "read",
            Status::WantToRead => "want-to-read",
            Status::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Reading => "Currently Reading",
            Status::Read => "Read",
            Status::WantToRead => "Want to Read",
            Status::Other(_) => "",
        }
    }

    pub fn label_of(status: Option<&Status>) -> &'static str {
        status.map(Status::label).unwrap_or_default()
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "reading" => Status::Reading,
            "read" => Status::Read,
            "want-to-read" => Status::WantToRead,
            _ => Status::Other(raw),
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_owned()
    }
}

/// Rating as written in the source: a bare number or a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Number(f64),
    Text(String),
}

/// When the book was logged: text such as `2024-03-05`, or epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookDate {
    Millis(f64),
    Text(String),
}

impl BookDate {
    pub fn is_empty(&self) -> bool {
        match self {
            BookDate::Millis(_) => false,
            BookDate::Text(text) => text.trim().is_empty(),
        }
    }

    /// The value as written; whole millisecond counts print without a fraction.
    pub fn raw(&self) -> String {
        match self {
            BookDate::Millis(ms) if ms.fract() == 0.0 && ms.abs() < 1e15 => {
                format!("{}", *ms as i64)
            }
            BookDate::Millis(ms) => ms.to_string(),
            BookDate::Text(text) => text.trim().to_owned(),
        }
    }

    /// Calendar day (UTC for timestamps), or `None` when the value is not a date.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        match self {
            BookDate::Millis(ms) if ms.is_finite() => {
                DateTime::from_timestamp_millis(ms.trunc() as i64).map(|dt| dt.date_naive())
            }
            BookDate::Millis(_) => None,
            BookDate::Text(text) => {
                let text = text.trim();
                NaiveDate::parse_from_str(text, "%Y-%m-%d").ok().or_else(|| {
                    DateTime::parse_from_rfc3339(text)
                        .ok()
                        .map(|dt| dt.date_naive())
                })
            }
        }
    }

    /// Dates order chronologically and ahead of unparseable values, which
    /// order by their text.
    pub fn sort_key(&self) -> (Option<NaiveDate>, String) {
        (self.to_naive(), self.raw())
    }
}

impl From<&str> for BookDate {
    fn from(text: &str) -> Self {
        BookDate::Text(text.to_owned())
    }
}
