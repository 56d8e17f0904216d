// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::RecordId;

/// Rendered in place of an optional field a stored document does not carry.
pub const PLACEHOLDER: &str = "not available";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "M" => Some(Self::Male),
            "F" => Some(Self::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKey {
    Name,
    Age,
    NationalCode,
    Sex,
    Height,
    Weight,
    Birthplace,
}

impl FieldKey {
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Age,
        Self::NationalCode,
        Self::Sex,
        Self::Height,
        Self::Weight,
        Self::Birthplace,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Age => "age",
            Self::NationalCode => "national code",
            Self::Sex => "sex (M/F)",
            Self::Height => "height (m)",
            Self::Weight => "weight (kg)",
            Self::Birthplace => "birthplace",
        }
    }

    pub const fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Age => "age",
            Self::NationalCode => "national code",
            Self::Sex => "sex",
            Self::Height => "height",
            Self::Weight => "weight",
            Self::Birthplace => "birthplace",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|key| *key == self)
            .unwrap_or_default()
    }
}

/// A person that passed validation. Store writes only accept this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonFields {
    pub name: String,
    pub age: u32,
    pub national_code: String,
    pub sex: Sex,
    pub height: f64,
    pub weight: f64,
    pub birthplace: String,
}

/// A stored person as read back from the collection.
///
/// Documents written before a field existed may lack any of the optional
/// fields; they are kept as `None` and rendered with [`PLACEHOLDER`].
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRecord {
    pub id: RecordId,
    pub name: String,
    pub age: i64,
    pub national_code: Option<String>,
    pub sex: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub birthplace: Option<String>,
}

impl PersonRecord {
    pub fn from_fields(id: RecordId, fields: &PersonFields) -> Self {
        Self {
            id,
            name: fields.name.clone(),
            age: i64::from(fields.age),
            national_code: Some(fields.national_code.clone()),
            sex: Some(fields.sex.as_str().to_owned()),
            height: Some(fields.height),
            weight: Some(fields.weight),
            birthplace: Some(fields.birthplace.clone()),
        }
    }

    /// Typed view of the record, `None` when any field is absent or no longer
    /// representable as validated data.
    pub fn to_fields(&self) -> Option<PersonFields> {
        Some(PersonFields {
            name: self.name.clone(),
            age: u32::try_from(self.age).ok()?,
            national_code: self.national_code.clone()?,
            sex: Sex::parse(self.sex.as_deref()?)?,
            height: self.height?,
            weight: self.weight?,
            birthplace: self.birthplace.clone()?,
        })
    }

    pub fn to_row(&self) -> RecordRow {
        RecordRow {
            id: self.id.clone(),
            cells: [
                self.name.clone(),
                self.age.to_string(),
                text_or_placeholder(self.national_code.as_deref()),
                text_or_placeholder(self.sex.as_deref()),
                measure_or_placeholder(self.height),
                measure_or_placeholder(self.weight),
                text_or_placeholder(self.birthplace.as_deref()),
            ],
        }
    }
}

/// Display projection of one record: the id plus the seven field strings in
/// [`FieldKey::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub id: RecordId,
    pub cells: [String; 7],
}

impl RecordRow {
    pub fn cell(&self, key: FieldKey) -> &str {
        &self.cells[key.index()]
    }
}

pub fn format_measure(value: f64) -> String {
    value.to_string()
}

fn text_or_placeholder(value: Option<&str>) -> String {
    value.unwrap_or(PLACEHOLDER).to_owned()
}

fn measure_or_placeholder(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_owned(), format_measure)
}
