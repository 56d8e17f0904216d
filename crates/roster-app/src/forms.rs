// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{FieldKey, PersonFields, RecordRow, format_measure};
use crate::validation::{ValidationResult, validate};

/// Raw text of the edit form, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonForm {
    pub name: String,
    pub age: String,
    pub national_code: String,
    pub sex: String,
    pub height: String,
    pub weight: String,
    pub birthplace: String,
}

impl PersonForm {
    /// Loads a table row into the form verbatim, placeholders included.
    pub fn from_row(row: &RecordRow) -> Self {
        let mut form = Self::default();
        for key in FieldKey::ALL {
            form.field_mut(key).push_str(row.cell(key));
        }
        form
    }

    pub fn from_fields(fields: &PersonFields) -> Self {
        Self {
            name: fields.name.clone(),
            age: fields.age.to_string(),
            national_code: fields.national_code.clone(),
            sex: fields.sex.as_str().to_owned(),
            height: format_measure(fields.height),
            weight: format_measure(fields.weight),
            birthplace: fields.birthplace.clone(),
        }
    }

    pub fn field(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::Name => &self.name,
            FieldKey::Age => &self.age,
            FieldKey::NationalCode => &self.national_code,
            FieldKey::Sex => &self.sex,
            FieldKey::Height => &self.height,
            FieldKey::Weight => &self.weight,
            FieldKey::Birthplace => &self.birthplace,
        }
    }

    pub fn field_mut(&mut self, key: FieldKey) -> &mut String {
        match key {
            FieldKey::Name => &mut self.name,
            FieldKey::Age => &mut self.age,
            FieldKey::NationalCode => &mut self.national_code,
            FieldKey::Sex => &mut self.sex,
            FieldKey::Height => &mut self.height,
            FieldKey::Weight => &mut self.weight,
            FieldKey::Birthplace => &mut self.birthplace,
        }
    }

    pub fn clear(&mut self) {
        for key in FieldKey::ALL {
            self.field_mut(key).clear();
        }
    }

    pub fn is_blank(&self) -> bool {
        FieldKey::ALL.iter().all(|key| self.field(*key).is_empty())
    }

    pub fn validate(&self) -> ValidationResult<PersonFields> {
        validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::PersonForm;
    use crate::{FieldKey, PLACEHOLDER, PersonRecord, RecordId, ValidationError};

    #[test]
    fn from_row_copies_placeholders_verbatim() {
        let record = PersonRecord {
            id: RecordId::new("r1"),
            name: "Luis Vega".to_owned(),
            age: 52,
            national_code: None,
            sex: Some("M".to_owned()),
            height: Some(1.8),
            weight: None,
            birthplace: Some("Cusco".to_owned()),
        };
        let form = PersonForm::from_row(&record.to_row());
        assert_eq!(form.name, "Luis Vega");
        assert_eq!(form.age, "52");
        assert_eq!(form.national_code, PLACEHOLDER);
        assert_eq!(form.sex, "M");
        assert_eq!(form.height, "1.8");
        assert_eq!(form.weight, PLACEHOLDER);
        assert_eq!(form.birthplace, "Cusco");

        assert_eq!(form.validate(), Err(ValidationError::CodeInvalid));
    }

    #[test]
    fn clear_empties_every_field() {
        let mut form = PersonForm::default();
        for key in FieldKey::ALL {
            form.field_mut(key).push_str("x");
        }
        assert!(!form.is_blank());

        form.clear();
        assert!(form.is_blank());
        assert_eq!(form, PersonForm::default());
    }

    #[test]
    fn from_fields_revalidates_to_same_fields() {
        let form = PersonForm {
            name: "Marta Ruiz".to_owned(),
            age: "27".to_owned(),
            national_code: "RUMA970312MDFZRR05".to_owned(),
            sex: "F".to_owned(),
            height: "1.7".to_owned(),
            weight: "61".to_owned(),
            birthplace: "Puebla".to_owned(),
        };
        let fields = form.validate().expect("valid form");
        assert_eq!(PersonForm::from_fields(&fields).validate(), Ok(fields));
    }
}
