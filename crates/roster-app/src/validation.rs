// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use regex::Regex;
use std::sync::LazyLock;

use crate::forms::PersonForm;
use crate::model::{PersonFields, Sex};

static LETTERS_AND_SPACES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z\x{00C0}-\x{017F}\s]+$").expect("letters pattern compiles")
});

static NATIONAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{18}$").expect("national code pattern compiles"));

/// The first rule a form breaks. Rules are checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name is required -- enter a name and retry")]
    NameRequired,
    #[error("name may only contain letters and spaces")]
    NameFormat,
    #[error("age must be a positive whole number")]
    AgeInvalid,
    #[error("national code must be exactly 18 letters or digits")]
    CodeInvalid,
    #[error("sex must be M or F")]
    SexInvalid,
    #[error("height must be a positive number")]
    HeightInvalid,
    #[error("weight must be a positive number")]
    WeightInvalid,
    #[error("birthplace is required and may only contain letters and spaces")]
    BirthplaceFormat,
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

pub fn validate(form: &PersonForm) -> ValidationResult<PersonFields> {
    if form.name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if !is_letters_and_spaces(&form.name) {
        return Err(ValidationError::NameFormat);
    }
    let age = parse_age(&form.age).ok_or(ValidationError::AgeInvalid)?;
    let national_code = form.national_code.to_uppercase();
    if !NATIONAL_CODE.is_match(&national_code) {
        return Err(ValidationError::CodeInvalid);
    }
    let sex = Sex::parse(&form.sex.to_uppercase()).ok_or(ValidationError::SexInvalid)?;
    let height = parse_positive_measure(&form.height).ok_or(ValidationError::HeightInvalid)?;
    let weight = parse_positive_measure(&form.weight).ok_or(ValidationError::WeightInvalid)?;
    if !is_letters_and_spaces(&form.birthplace) {
        return Err(ValidationError::BirthplaceFormat);
    }

    Ok(PersonFields {
        name: form.name.clone(),
        age,
        national_code,
        sex,
        height,
        weight,
        birthplace: form.birthplace.clone(),
    })
}

pub fn is_letters_and_spaces(value: &str) -> bool {
    LETTERS_AND_SPACES.is_match(value)
}

fn parse_age(input: &str) -> Option<u32> {
    if input.is_empty() || !input.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    input.parse::<u32>().ok().filter(|age| *age > 0)
}

fn parse_positive_measure(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}

#[cfg(test)]
mod tests {
    use super::{ValidationError, validate};
    use crate::{PersonForm, Sex};

    fn valid_form() -> PersonForm {
        PersonForm {
            name: "Ana Lopez".to_owned(),
            age: "30".to_owned(),
            national_code: "abcd12345678efgh12".to_owned(),
            sex: "f".to_owned(),
            height: "1.65".to_owned(),
            weight: "58.2".to_owned(),
            birthplace: "Lima".to_owned(),
        }
    }

    #[test]
    fn valid_form_is_normalized() {
        let fields = validate(&valid_form()).expect("sample form is valid");
        assert_eq!(fields.name, "Ana Lopez");
        assert_eq!(fields.age, 30);
        assert_eq!(fields.national_code, "ABCD12345678EFGH12");
        assert_eq!(fields.sex, Sex::Female);
        assert_eq!(fields.height, 1.65);
        assert_eq!(fields.weight, 58.2);
        assert_eq!(fields.birthplace, "Lima");
    }

    #[test]
    fn accented_names_are_accepted() {
        let form = PersonForm {
            name: "José Núñez".to_owned(),
            birthplace: "Mérida".to_owned(),
            ..valid_form()
        };
        assert!(validate(&form).is_ok());
    }

    #[test]
    fn empty_name_is_required() {
        let form = PersonForm {
            name: String::new(),
            ..valid_form()
        };
        assert_eq!(validate(&form), Err(ValidationError::NameRequired));
    }

    #[test]
    fn blank_name_and_birthplace_follow_the_same_pattern_rule() {
        let blank_name = PersonForm {
            name: "   ".to_owned(),
            ..valid_form()
        };
        assert_eq!(
            validate(&blank_name).map(|fields| fields.name),
            Ok("   ".to_owned())
        );

        let blank_birthplace = PersonForm {
            birthplace: "   ".to_owned(),
            ..valid_form()
        };
        assert_eq!(
            validate(&blank_birthplace).map(|fields| fields.birthplace),
            Ok("   ".to_owned())
        );
    }

    #[test]
    fn name_with_digits_is_rejected() {
        let form = PersonForm {
            name: "Ana3".to_owned(),
            ..valid_form()
        };
        assert_eq!(validate(&form), Err(ValidationError::NameFormat));
    }

    #[test]
    fn first_failing_rule_wins() {
        let form = PersonForm {
            name: "Ana3".to_owned(),
            age: "-5".to_owned(),
            sex: "x".to_owned(),
            ..valid_form()
        };
        for _ in 0..3 {
            assert_eq!(validate(&form), Err(ValidationError::NameFormat));
        }
    }

    #[test]
    fn age_rejects_signs_decimals_zero_and_text() {
        for age in ["-5", "+5", "0", "00", "3.5", "", "abc", " 30", "99999999999"] {
            let form = PersonForm {
                age: age.to_owned(),
                ..valid_form()
            };
            assert_eq!(
                validate(&form),
                Err(ValidationError::AgeInvalid),
                "age {age:?}"
            );
        }
    }

    #[test]
    fn national_code_requires_eighteen_alphanumerics() {
        for code in [
            "ABCD12345678EFGH1",
            "ABCD12345678EFGH123",
            "ABCD-2345678EFGH12",
            "",
        ] {
            let form = PersonForm {
                national_code: code.to_owned(),
                ..valid_form()
            };
            assert_eq!(
                validate(&form),
                Err(ValidationError::CodeInvalid),
                "code {code:?}"
            );
        }
    }

    #[test]
    fn sex_is_case_insensitive_but_closed() {
        let male = PersonForm {
            sex: "m".to_owned(),
            ..valid_form()
        };
        assert_eq!(validate(&male).map(|fields| fields.sex), Ok(Sex::Male));

        for sex in ["", "X", "MF", "male"] {
            let form = PersonForm {
                sex: sex.to_owned(),
                ..valid_form()
            };
            assert_eq!(
                validate(&form),
                Err(ValidationError::SexInvalid),
                "sex {sex:?}"
            );
        }
    }

    #[test]
    fn measures_must_parse_and_be_positive() {
        for height in ["", "tall", "0", "-1.7", "NaN", "inf"] {
            let form = PersonForm {
                height: height.to_owned(),
                ..valid_form()
            };
            assert_eq!(
                validate(&form),
                Err(ValidationError::HeightInvalid),
                "height {height:?}"
            );
        }

        let form = PersonForm {
            weight: "0.0".to_owned(),
            ..valid_form()
        };
        assert_eq!(validate(&form), Err(ValidationError::WeightInvalid));
    }

    #[test]
    fn birthplace_must_be_present_and_alphabetic() {
        for birthplace in ["", "Lima 2", "São-Paulo"] {
            let form = PersonForm {
                birthplace: birthplace.to_owned(),
                ..valid_form()
            };
            assert_eq!(
                validate(&form),
                Err(ValidationError::BirthplaceFormat),
                "birthplace {birthplace:?}"
            );
        }
    }
}
