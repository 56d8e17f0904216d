// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod memory;

pub use memory::{CallCounts, MemoryStore};

use anyhow::{Context, Result};
use roster_app::{PersonFields, PersonForm, RecordId, RecordStore, Sex, StoreResult};
use std::path::PathBuf;

const FIRST_NAMES: [&str; 16] = [
    "Ana", "Luis", "Marta", "Jorge", "Lucía", "Andrés", "Sofía", "Tomás", "Inés", "Raúl", "Elena",
    "Joaquín", "Camila", "Mateo", "Valeria", "Óscar",
];
const LAST_NAMES: [&str; 16] = [
    "Lopez", "Vega", "Ruiz", "Herrera", "Núñez", "Castro", "Ortega", "Peña", "Rojas", "Medina",
    "Ibáñez", "Flores", "Silva", "Mendoza", "Zúñiga", "Ramos",
];
const BIRTHPLACES: [&str; 14] = [
    "Lima",
    "Cusco",
    "Puebla",
    "Bogotá",
    "Quito",
    "Sevilla",
    "Valparaíso",
    "Rosario",
    "Arequipa",
    "Mérida",
    "La Paz",
    "San José",
    "Córdoba",
    "Montevideo",
];
const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 18;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Produces reproducible people that always pass validation.
#[derive(Debug, Clone)]
pub struct PersonFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl PersonFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn person(&mut self) -> PersonFields {
        let name = format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES));
        let sex = if self.rng.bool() {
            Sex::Female
        } else {
            Sex::Male
        };
        PersonFields {
            name,
            age: self.int_range(18, 90) as u32,
            national_code: self.national_code(),
            sex,
            height: self.int_range(145, 205) as f64 / 100.0,
            weight: self.int_range(450, 1200) as f64 / 10.0,
            birthplace: self.pick(&BIRTHPLACES).to_owned(),
        }
    }

    /// A filled form as a user would type it for [`PersonFaker::person`].
    pub fn form(&mut self) -> PersonForm {
        PersonForm::from_fields(&self.person())
    }

    pub fn national_code(&mut self) -> String {
        (0..CODE_LEN)
            .map(|_| char::from(CODE_ALPHABET[self.rng.int_n(CODE_ALPHABET.len())]))
            .collect()
    }

    /// Inserts `count` generated people through `store`.
    pub fn populate<S: RecordStore>(
        &mut self,
        store: &mut S,
        count: usize,
    ) -> StoreResult<Vec<RecordId>> {
        (0..count).map(|_| store.insert(&self.person())).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        min + self.rng.next_u64() % (max - min + 1)
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("roster.db");
    Ok((dir, db_path))
}

/// A form that passes validation, for tests that need one fixed person.
pub fn sample_form() -> PersonForm {
    PersonForm {
        name: "Ana Lopez".to_owned(),
        age: "30".to_owned(),
        national_code: "ABCD12345678EFGH12".to_owned(),
        sex: "F".to_owned(),
        height: "1.65".to_owned(),
        weight: "58.2".to_owned(),
        birthplace: "Lima".to_owned(),
    }
}
