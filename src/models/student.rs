/// Student record model and the draft/patch shapes derived from it.

use crate::error::{ClientError, Result};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ClientError::Validation(format!("Unknown gender: {}", s)))
    }
}

/// Department a student is enrolled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    #[default]
    Cs,
    Civil,
    Mechanical,
    Electrical,
    It,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Cs,
        Category::Civil,
        Category::Mechanical,
        Category::Electrical,
        Category::It,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cs => "CS",
            Category::Civil => "CIVIL",
            Category::Mechanical => "MECHANICAL",
            Category::Electrical => "ELECTRICAL",
            Category::It => "IT",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ClientError::Validation(format!("Unknown category: {}", s)))
    }
}

/// Student record as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone_number: String,
    pub gender: Gender,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub institute: String,
    pub category: Category,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub profile_image_url: String,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

mod timestamp {
    use super::*;

    const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    /// Accepts RFC 3339 (`...Z`, `...+05:30`) or a zone-less local date-time.
    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => parse(&s).map(Some).map_err(serde::de::Error::custom),
        }
    }

    pub fn parse(s: &str) -> std::result::Result<NaiveDateTime, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.naive_utc());
        }
        NaiveDateTime::parse_from_str(s, LOCAL_FORMAT)
            .map_err(|e| format!("invalid timestamp '{}': {}", s, e))
    }
}

/// Editable fields of a student, named by their wire keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentField {
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    Gender,
    Address,
    Institute,
    Category,
    ProfileImageUrl,
}

impl StudentField {
    pub const ALL: [StudentField; 9] = [
        StudentField::FirstName,
        StudentField::LastName,
        StudentField::Email,
        StudentField::PhoneNumber,
        StudentField::Gender,
        StudentField::Address,
        StudentField::Institute,
        StudentField::Category,
        StudentField::ProfileImageUrl,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            StudentField::FirstName => "firstName",
            StudentField::LastName => "lastName",
            StudentField::Email => "email",
            StudentField::PhoneNumber => "phoneNumber",
            StudentField::Gender => "gender",
            StudentField::Address => "address",
            StudentField::Institute => "institute",
            StudentField::Category => "category",
            StudentField::ProfileImageUrl => "profileImageUrl",
        }
    }
}

impl FromStr for StudentField {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        StudentField::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| ClientError::Validation(format!("Unknown field: {}", s)))
    }
}

/// Client-held copy of a student's editable fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub gender: Gender,
    pub address: String,
    pub institute: String,
    pub category: Category,
    pub profile_image_url: String,
}

impl StudentDraft {
    /// Set one field from text input. Enum fields are parsed case-insensitively.
    pub fn set(&mut self, field: StudentField, value: &str) -> Result<()> {
        match field {
            StudentField::FirstName => self.first_name = value.to_string(),
            StudentField::LastName => self.last_name = value.to_string(),
            StudentField::Email => self.email = value.to_string(),
            StudentField::PhoneNumber => self.phone_number = value.to_string(),
            StudentField::Gender => self.gender = value.parse()?,
            StudentField::Address => self.address = value.to_string(),
            StudentField::Institute => self.institute = value.to_string(),
            StudentField::Category => self.category = value.parse()?,
            StudentField::ProfileImageUrl => self.profile_image_url = value.to_string(),
        }
        Ok(())
    }

    /// First name and email are the only required fields.
    pub fn has_required_fields(&self) -> bool {
        !self.first_name.trim().is_empty() && !self.email.trim().is_empty()
    }
}

impl From<&Student> for StudentDraft {
    fn from(student: &Student) -> Self {
        StudentDraft {
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            email: student.email.clone(),
            phone_number: student.phone_number.clone(),
            gender: student.gender,
            address: student.address.clone(),
            institute: student.institute.clone(),
            category: student.category,
            profile_image_url: student.profile_image_url.clone(),
        }
    }
}

/// Partial update body. Absent fields are left untouched by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

fn changed<T: PartialEq + Clone>(original: &T, edited: &T) -> Option<T> {
    (original != edited).then(|| edited.clone())
}

impl StudentPatch {
    /// Fields of `draft` that differ from `original`.
    pub fn between(original: &Student, draft: &StudentDraft) -> Self {
        StudentPatch {
            first_name: changed(&original.first_name, &draft.first_name),
            last_name: changed(&original.last_name, &draft.last_name),
            email: changed(&original.email, &draft.email),
            phone_number: changed(&original.phone_number, &draft.phone_number),
            gender: changed(&original.gender, &draft.gender),
            address: changed(&original.address, &draft.address),
            institute: changed(&original.institute, &draft.institute),
            category: changed(&original.category, &draft.category),
            profile_image_url: changed(&original.profile_image_url, &draft.profile_image_url),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    pub fn changed_fields(&self) -> Vec<StudentField> {
        let present = [
            self.first_name.is_some(),
            self.last_name.is_some(),
            self.email.is_some(),
            self.phone_number.is_some(),
            self.gender.is_some(),
            self.address.is_some(),
            self.institute.is_some(),
            self.category.is_some(),
            self.profile_image_url.is_some(),
        ];
        StudentField::ALL
            .into_iter()
            .zip(present)
            .filter_map(|(field, set)| set.then_some(field))
            .collect()
    }
}
