// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::FieldKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form(FieldKey),
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub focus: Focus,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            focus: Focus::Form(FieldKey::Name),
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextField,
    PrevField,
    ToggleFocus,
    FocusForm,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    FocusChanged(Focus),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextField => self.rotate_field(1),
            AppCommand::PrevField => self.rotate_field(-1),
            AppCommand::ToggleFocus => {
                self.focus = match self.focus {
                    Focus::Form(_) => Focus::Table,
                    Focus::Table => Focus::Form(FieldKey::Name),
                };
                vec![AppEvent::FocusChanged(self.focus)]
            }
            AppCommand::FocusForm => {
                self.focus = Focus::Form(FieldKey::Name);
                vec![AppEvent::FocusChanged(self.focus)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    pub fn focused_field(&self) -> Option<FieldKey> {
        match self.focus {
            Focus::Form(key) => Some(key),
            Focus::Table => None,
        }
    }

    fn rotate_field(&mut self, delta: isize) -> Vec<AppEvent> {
        let Focus::Form(current) = self.focus else {
            return Vec::new();
        };
        let fields = FieldKey::ALL;
        let len = fields.len() as isize;
        let next = (current.index() as isize + delta).rem_euclid(len) as usize;
        self.focus = Focus::Form(fields[next]);
        vec![AppEvent::FocusChanged(self.focus)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
