//! Record - the unit of data flowing through a pipeline
//!
//! A `Record` is an immutable envelope over a payload. Records carry no
//! identity beyond their payload; ordering is preserved from source to sink
//! only within a single worker's batch.

use bytes::Bytes;

/// Payload carried by a [`Record`]
///
/// The runtime is agnostic to payload shape. Sources pick whichever variant
/// matches what they produce; processors and sinks match on the variant they
/// understand and pass the rest through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordData {
    /// Raw bytes, e.g. an undecoded wire frame
    Bytes(Bytes),

    /// A UTF-8 line or message
    String(String),

    /// A structured event
    Event(serde_json::Value),
}

/// Immutable envelope over a payload
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    data: RecordData,
}

impl Record {
    /// Wrap a payload in a record
    pub fn new(data: RecordData) -> Self {
        Self { data }
    }

    /// Create a record over a string payload
    pub fn from_string(s: impl Into<String>) -> Self {
        Self::new(RecordData::String(s.into()))
    }

    /// Create a record over a raw byte payload
    pub fn from_bytes(b: impl Into<Bytes>) -> Self {
        Self::new(RecordData::Bytes(b.into()))
    }

    /// Create a record over a structured event payload
    pub fn from_event(event: serde_json::Value) -> Self {
        Self::new(RecordData::Event(event))
    }

    /// Borrow the payload
    #[inline]
    pub fn data(&self) -> &RecordData {
        &self.data
    }

    /// Consume the record, returning its payload
    #[inline]
    pub fn into_data(self) -> RecordData {
        self.data
    }

    /// Borrow the payload as a string slice, if it is a string
    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            RecordData::String(s) => Some(s),
            _ => None,
        }
    }

    /// Approximate payload size in bytes, for metrics
    ///
    /// Structured events are not serialized to measure them and count as 0.
    pub fn payload_len(&self) -> usize {
        match &self.data {
            RecordData::Bytes(b) => b.len(),
            RecordData::String(s) => s.len(),
            RecordData::Event(_) => 0,
        }
    }
}

impl From<String> for Record {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl From<&str> for Record {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

impl From<Bytes> for Record {
    fn from(b: Bytes) -> Self {
        Self::from_bytes(b)
    }
}

impl From<serde_json::Value> for Record {
    fn from(v: serde_json::Value) -> Self {
        Self::from_event(v)
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            RecordData::String(s) => f.write_str(s),
            RecordData::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            RecordData::Event(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
