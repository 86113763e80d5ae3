// src/utils/id_generator.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdType {
    User,
    Client,
    Driver,
    Ride,
    Complaint,
    Settlement,
}

impl IdType {
    pub fn prefix(&self) -> &'static str {
        match self {
            IdType::User => "usr",
            IdType::Client => "cli",
            IdType::Driver => "drv",
            IdType::Ride => "ride",
            IdType::Complaint => "cmp",
            IdType::Settlement => "stl",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "usr" => Some(IdType::User),
            "cli" => Some(IdType::Client),
            "drv" => Some(IdType::Driver),
            "ride" => Some(IdType::Ride),
            "cmp" => Some(IdType::Complaint),
            "stl" => Some(IdType::Settlement),
            _ => None,
        }
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdError {
    #[error("Invalid ID format")]
    InvalidFormat,

    #[error("Unknown ID prefix: {0}")]
    UnknownPrefix(String),

    #[error("Invalid date component in ID")]
    InvalidDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedId {
    pub id_type: IdType,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub suffix: String,
}

const SUFFIX_LEN: usize = 6;
const SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub struct IdGenerator;

impl IdGenerator {
    /// Generate an id with format `{prefix}-{YYMMDD}-{suffix}`.
    pub fn generate(id_type: IdType) -> String {
        Self::generate_with_timestamp(id_type, Utc::now())
    }

    /// Same, with an explicit timestamp (useful for testing).
    pub fn generate_with_timestamp(id_type: IdType, timestamp: DateTime<Utc>) -> String {
        let date_part = timestamp.format("%y%m%d").to_string();
        format!("{}-{}-{}", id_type.prefix(), date_part, Self::random_suffix())
    }

    fn random_suffix() -> String {
        use rand::Rng;

        let mut rng = rand::rng();
        (0..SUFFIX_LEN)
            .map(|_| {
                let idx = rng.random_range(0..SUFFIX_CHARS.len());
                SUFFIX_CHARS[idx] as char
            })
            .collect()
    }

    pub fn parse(id: &str) -> Result<ParsedId, IdError> {
        let parts: Vec<&str> = id.split('-').collect();
        if parts.len() != 3 {
            return Err(IdError::InvalidFormat);
        }

        let (prefix, date_part, suffix) = (parts[0], parts[1], parts[2]);
        if date_part.len() != 6 || suffix.len() != SUFFIX_LEN {
            return Err(IdError::InvalidFormat);
        }

        let id_type = IdType::from_prefix(prefix)
            .ok_or_else(|| IdError::UnknownPrefix(prefix.to_string()))?;

        let year = format!("20{}", &date_part[0..2])
            .parse::<i32>()
            .map_err(|_| IdError::InvalidDate)?;
        let month = date_part[2..4].parse::<u32>().map_err(|_| IdError::InvalidDate)?;
        let day = date_part[4..6].parse::<u32>().map_err(|_| IdError::InvalidDate)?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(IdError::InvalidDate);
        }

        Ok(ParsedId {
            id_type,
            year,
            month,
            day,
            suffix: suffix.to_string(),
        })
    }

    /// Check an id matches the expected format (and entity type, if given).
    pub fn validate(id: &str, expected: Option<IdType>) -> bool {
        match Self::parse(id) {
            Ok(parsed) => expected.is_none_or(|e| parsed.id_type == e),
            Err(_) => false,
        }
    }
}
