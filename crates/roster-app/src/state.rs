// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{info, warn};

use crate::{Focus, FormField, RecordStore, StudentForm, StudentRecord, SubmitError};

pub const SUBMIT_LABEL_ADD: &str = "Add Student";
pub const SUBMIT_LABEL_EDIT: &str = "Save Changes";
pub const DUPLICATE_ID_PROMPT: &str =
    "A student with this ID already exists. Do you want to add anyway?";
pub const DELETE_PROMPT: &str = "Delete this record?";

/// Distinguishes add mode from edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditCursor {
    #[default]
    None,
    Editing(usize),
}

impl EditCursor {
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::None => None,
            Self::Editing(index) => Some(index),
        }
    }

    pub const fn is_editing(self) -> bool {
        matches!(self, Self::Editing(_))
    }
}

/// A modal yes/no question. While one is open nothing else is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingConfirmation {
    DuplicateId(StudentRecord),
    Delete(usize),
}

impl PendingConfirmation {
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::DuplicateId(_) => DUPLICATE_ID_PROMPT,
            Self::Delete(_) => DELETE_PROMPT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub form: StudentForm,
    pub edit_cursor: EditCursor,
    pub focus: Focus,
    pub pending: Option<PendingConfirmation>,
    pub alert: Option<String>,
    pub status_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    SetField(FormField, String),
    InputChar(char),
    Backspace,
    FocusNext,
    FocusPrev,
    FocusTable,
    Submit,
    Reset,
    EditRow(usize),
    DeleteRow(usize),
    Confirm,
    Decline,
    DismissAlert,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    FieldChanged(FormField),
    FocusChanged(Focus),
    Rejected(SubmitError),
    ConfirmationRequested(PendingConfirmation),
    ConfirmationDeclined,
    AlertDismissed,
    RecordInserted(usize),
    RecordUpdated(usize),
    RecordDeleted(usize),
    EditStarted(usize),
    FormReset,
    StoreFailed(String),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn submit_label(&self) -> &'static str {
        if self.edit_cursor.is_editing() {
            SUBMIT_LABEL_EDIT
        } else {
            SUBMIT_LABEL_ADD
        }
    }

    pub fn is_modal(&self) -> bool {
        self.pending.is_some() || self.alert.is_some()
    }

    pub fn dispatch<S: RecordStore + ?Sized>(
        &mut self,
        store: &mut S,
        command: AppCommand,
    ) -> Vec<AppEvent> {
        match command {
            AppCommand::SetStatus(message) => return vec![self.set_status(message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                return vec![AppEvent::StatusCleared];
            }
            _ => {}
        }

        if self.pending.is_some() {
            return match command {
                AppCommand::Confirm => self.confirm(store),
                AppCommand::Decline => self.decline(),
                _ => Vec::new(),
            };
        }
        if self.alert.is_some() {
            return match command {
                AppCommand::DismissAlert => {
                    self.alert = None;
                    vec![AppEvent::AlertDismissed]
                }
                _ => Vec::new(),
            };
        }

        match command {
            AppCommand::SetField(field, value) => {
                *self.form.field_mut(field) = value;
                vec![AppEvent::FieldChanged(field)]
            }
            AppCommand::InputChar(ch) => match self.focus {
                Focus::Field(field) => {
                    self.form.field_mut(field).push(ch);
                    vec![AppEvent::FieldChanged(field)]
                }
                Focus::Table => Vec::new(),
            },
            AppCommand::Backspace => match self.focus {
                Focus::Field(field) => {
                    if self.form.field_mut(field).pop().is_some() {
                        vec![AppEvent::FieldChanged(field)]
                    } else {
                        Vec::new()
                    }
                }
                Focus::Table => Vec::new(),
            },
            AppCommand::FocusNext => self.set_focus(self.focus.rotate(1)),
            AppCommand::FocusPrev => self.set_focus(self.focus.rotate(-1)),
            AppCommand::FocusTable => self.set_focus(Focus::Table),
            AppCommand::Submit => self.submit(store),
            AppCommand::Reset => vec![self.reset_form()],
            AppCommand::EditRow(index) => self.start_edit(store, index),
            AppCommand::DeleteRow(index) => self.request_delete(store, index),
            AppCommand::Confirm
            | AppCommand::Decline
            | AppCommand::DismissAlert
            | AppCommand::SetStatus(_)
            | AppCommand::ClearStatus => Vec::new(),
        }
    }

    fn submit<S: RecordStore + ?Sized>(&mut self, store: &mut S) -> Vec<AppEvent> {
        let record = match self.form.validate() {
            Ok(record) => record,
            Err(error) => {
                self.alert = Some(error.to_string());
                return vec![AppEvent::Rejected(error)];
            }
        };

        if !self.edit_cursor.is_editing()
            && store.find_duplicate_index(&record.student_id).is_some()
        {
            let pending = PendingConfirmation::DuplicateId(record);
            self.pending = Some(pending.clone());
            return vec![AppEvent::ConfirmationRequested(pending)];
        }

        self.save(store, record)
    }

    fn save<S: RecordStore + ?Sized>(
        &mut self,
        store: &mut S,
        record: StudentRecord,
    ) -> Vec<AppEvent> {
        let student_id = record.student_id.clone();
        let saved = match self.edit_cursor {
            EditCursor::None => store
                .insert(record)
                .map(|()| AppEvent::RecordInserted(store.len().saturating_sub(1))),
            EditCursor::Editing(index) => store
                .update(index, record)
                .map(|()| AppEvent::RecordUpdated(index)),
        };

        match saved {
            Ok(event) => {
                info!(student_id = %student_id, event = ?event, "record saved");
                vec![event, self.reset_form()]
            }
            Err(error) => vec![self.store_failed("save", &error)],
        }
    }

    fn start_edit<S: RecordStore + ?Sized>(&mut self, store: &S, index: usize) -> Vec<AppEvent> {
        let Some(record) = store.records().get(index) else {
            return vec![self.set_status(format!("row {} no longer exists", index + 1))];
        };

        self.form = StudentForm::from_record(record);
        self.edit_cursor = EditCursor::Editing(index);
        let mut events = vec![AppEvent::EditStarted(index)];
        events.extend(self.set_focus(Focus::Field(FormField::Name)));
        events
    }

    fn request_delete<S: RecordStore + ?Sized>(
        &mut self,
        store: &S,
        index: usize,
    ) -> Vec<AppEvent> {
        if index >= store.len() {
            return vec![self.set_status(format!("row {} no longer exists", index + 1))];
        }
        let pending = PendingConfirmation::Delete(index);
        self.pending = Some(pending.clone());
        vec![AppEvent::ConfirmationRequested(pending)]
    }

    fn confirm<S: RecordStore + ?Sized>(&mut self, store: &mut S) -> Vec<AppEvent> {
        match self.pending.take() {
            Some(PendingConfirmation::DuplicateId(record)) => self.save(store, record),
            Some(PendingConfirmation::Delete(index)) => {
                let removed = match store.delete(index) {
                    Ok(removed) => removed,
                    Err(error) => return vec![self.store_failed("delete", &error)],
                };
                info!(student_id = %removed.student_id, index, "record deleted");
                let mut events = vec![AppEvent::RecordDeleted(index)];
                // Indices shift on removal, so an open edit can no longer be trusted.
                if self.edit_cursor.is_editing() {
                    events.push(self.reset_form());
                }
                events
            }
            None => Vec::new(),
        }
    }

    fn decline(&mut self) -> Vec<AppEvent> {
        if let Some(pending) = self.pending.take() {
            info!(prompt = pending.prompt(), "confirmation declined");
        }
        vec![AppEvent::ConfirmationDeclined]
    }

    fn reset_form(&mut self) -> AppEvent {
        self.form = StudentForm::default();
        self.edit_cursor = EditCursor::None;
        AppEvent::FormReset
    }

    fn set_focus(&mut self, focus: Focus) -> Vec<AppEvent> {
        self.focus = focus;
        vec![AppEvent::FocusChanged(focus)]
    }

    fn store_failed(&mut self, action: &str, error: &anyhow::Error) -> AppEvent {
        warn!(action, error = %format!("{error:#}"), "record store failed");
        let message = format!("could not {action} record: {error:#}");
        self.alert = Some(message.clone());
        AppEvent::StoreFailed(message)
    }

    fn set_status(&mut self, message: impl Into<String>) -> AppEvent {
        let message = message.into();
        self.status_line = Some(message.clone());
        AppEvent::StatusUpdated(message)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AppCommand, AppEvent, AppState, DELETE_PROMPT, EditCursor, PendingConfirmation,
        SUBMIT_LABEL_ADD, SUBMIT_LABEL_EDIT,
    };
    use crate::{Focus, FormField, RecordStore, StudentRecord, SubmitError};
    use anyhow::{Result, bail};

    #[derive(Debug, Default)]
    struct ListStore {
        records: Vec<StudentRecord>,
        writes: usize,
        fail_writes: bool,
    }

    impl ListStore {
        fn persist(&mut self) -> Result<()> {
            if self.fail_writes {
                bail!("disk full");
            }
            self.writes += 1;
            Ok(())
        }
    }

    impl RecordStore for ListStore {
        fn records(&self) -> &[StudentRecord] {
            &self.records
        }

        fn insert(&mut self, record: StudentRecord) -> Result<()> {
            self.records.push(record);
            if let Err(error) = self.persist() {
                self.records.pop();
                return Err(error);
            }
            Ok(())
        }

        fn update(&mut self, index: usize, record: StudentRecord) -> Result<()> {
            let Some(slot) = self.records.get_mut(index) else {
                bail!("no record at index {index}");
            };
            let previous = std::mem::replace(slot, record);
            if let Err(error) = self.persist() {
                self.records[index] = previous;
                return Err(error);
            }
            Ok(())
        }

        fn delete(&mut self, index: usize) -> Result<StudentRecord> {
            if index >= self.records.len() {
                bail!("no record at index {index}");
            }
            let removed = self.records.remove(index);
            if let Err(error) = self.persist() {
                self.records.insert(index, removed);
                return Err(error);
            }
            Ok(removed)
        }
    }

    fn fill(state: &mut AppState, store: &mut ListStore, values: [&str; 4]) {
        for (field, value) in FormField::ALL.into_iter().zip(values) {
            state.dispatch(store, AppCommand::SetField(field, value.to_owned()));
        }
    }

    fn john() -> [&'static str; 4] {
        ["John Doe", "101", "j@x.com", "1234567890"]
    }

    #[test]
    fn submit_on_empty_list_inserts_and_resets() {
        let mut state = AppState::default();
        let mut store = ListStore::default();
        fill(&mut state, &mut store, john());

        let events = state.dispatch(&mut store, AppCommand::Submit);
        assert_eq!(events, vec![AppEvent::RecordInserted(0), AppEvent::FormReset]);
        assert_eq!(
            store.records,
            vec![StudentRecord::new("John Doe", "101", "j@x.com", "1234567890")]
        );
        assert_eq!(store.writes, 1);
        assert!(state.form.is_blank());
        assert_eq!(state.edit_cursor, EditCursor::None);
        assert_eq!(state.submit_label(), SUBMIT_LABEL_ADD);
    }

    #[test]
    fn missing_field_alerts_without_mutation() {
        let mut state = AppState::default();
        let mut store = ListStore::default();
        fill(&mut state, &mut store, ["John Doe", "101", "", "1234567890"]);

        let events = state.dispatch(&mut store, AppCommand::Submit);
        assert_eq!(events, vec![AppEvent::Rejected(SubmitError::MissingField)]);
        assert!(store.records.is_empty());
        assert_eq!(store.writes, 0);
        assert_eq!(state.alert.as_deref(), Some("Please fill all fields."));
        assert_eq!(state.form.name, "John Doe");
    }

    #[test]
    fn alert_blocks_input_until_dismissed() {
        let mut state = AppState::default();
        let mut store = ListStore::default();
        state.dispatch(&mut store, AppCommand::Submit);
        assert!(state.is_modal());

        assert!(state.dispatch(&mut store, AppCommand::InputChar('x')).is_empty());
        assert!(state.dispatch(&mut store, AppCommand::Submit).is_empty());
        assert!(state.form.name.is_empty());

        let events = state.dispatch(&mut store, AppCommand::DismissAlert);
        assert_eq!(events, vec![AppEvent::AlertDismissed]);
        assert!(!state.is_modal());
    }

    #[test]
    fn declined_duplicate_keeps_single_record() {
        let mut state = AppState::default();
        let mut store = ListStore::default();
        fill(&mut state, &mut store, john());
        state.dispatch(&mut store, AppCommand::Submit);

        fill(&mut state, &mut store, ["Jane Roe", "101", "jr@x.com", "9876543210"]);
        let events = state.dispatch(&mut store, AppCommand::Submit);
        assert!(matches!(
            events.as_slice(),
            [AppEvent::ConfirmationRequested(PendingConfirmation::DuplicateId(record))]
                if record.name == "Jane Roe"
        ));

        let events = state.dispatch(&mut store, AppCommand::Decline);
        assert_eq!(events, vec![AppEvent::ConfirmationDeclined]);
        assert_eq!(store.records.len(), 1);
        assert_eq!(store.writes, 1);
        assert_eq!(state.form.name, "Jane Roe");
    }

    #[test]
    fn accepted_duplicate_is_appended() {
        let mut state = AppState::default();
        let mut store = ListStore::default();
        fill(&mut state, &mut store, john());
        state.dispatch(&mut store, AppCommand::Submit);
        fill(&mut state, &mut store, ["Jane Roe", "101", "jr@x.com", "9876543210"]);
        state.dispatch(&mut store, AppCommand::Submit);

        let events = state.dispatch(&mut store, AppCommand::Confirm);
        assert_eq!(events, vec![AppEvent::RecordInserted(1), AppEvent::FormReset]);
        assert_eq!(store.records.len(), 2);
        assert_eq!(store.find_duplicate_index("101"), Some(0));
    }

    #[test]
    fn edit_click_then_submit_updates_in_place() {
        let mut state = AppState::default();
        let mut store = ListStore::default();
        fill(&mut state, &mut store, john());
        state.dispatch(&mut store, AppCommand::Submit);
        state.dispatch(&mut store, AppCommand::FocusTable);

        let events = state.dispatch(&mut store, AppCommand::EditRow(0));
        assert_eq!(
            events,
            vec![
                AppEvent::EditStarted(0),
                AppEvent::FocusChanged(Focus::Field(FormField::Name)),
            ]
        );
        assert_eq!(state.form.student_id, "101");
        assert_eq!(state.submit_label(), SUBMIT_LABEL_EDIT);
        assert_eq!(store.writes, 1);

        state.dispatch(
            &mut store,
            AppCommand::SetField(FormField::Name, "Johnny Doe".to_owned()),
        );
        let events = state.dispatch(&mut store, AppCommand::Submit);
        assert_eq!(events, vec![AppEvent::RecordUpdated(0), AppEvent::FormReset]);
        assert_eq!(store.records.len(), 1);
        assert_eq!(store.records[0].name, "Johnny Doe");
        assert_eq!(state.edit_cursor, EditCursor::None);
    }

    #[test]
    fn edit_mode_skips_duplicate_prompt() {
        let mut state = AppState::default();
        let mut store = ListStore::default();
        fill(&mut state, &mut store, john());
        state.dispatch(&mut store, AppCommand::Submit);

        state.dispatch(&mut store, AppCommand::EditRow(0));
        let events = state.dispatch(&mut store, AppCommand::Submit);
        assert_eq!(events, vec![AppEvent::RecordUpdated(0), AppEvent::FormReset]);
        assert!(state.pending.is_none());
    }

    #[test]
    fn edit_of_missing_row_only_sets_status() {
        let mut state = AppState::default();
        let mut store = ListStore::default();
        let events = state.dispatch(&mut store, AppCommand::EditRow(3));
        assert_eq!(
            events,
            vec![AppEvent::StatusUpdated("row 4 no longer exists".to_owned())]
        );
        assert_eq!(state.edit_cursor, EditCursor::None);
    }

    #[test]
    fn confirmed_delete_of_only_record_empties_list() {
        let mut state = AppState::default();
        let mut store = ListStore::default();
        fill(&mut state, &mut store, john());
        state.dispatch(&mut store, AppCommand::Submit);

        let events = state.dispatch(&mut store, AppCommand::DeleteRow(0));
        assert_eq!(
            events,
            vec![AppEvent::ConfirmationRequested(PendingConfirmation::Delete(0))]
        );
        assert_eq!(state.pending.as_ref().map(|p| p.prompt()), Some(DELETE_PROMPT));

        let events = state.dispatch(&mut store, AppCommand::Confirm);
        assert_eq!(events, vec![AppEvent::RecordDeleted(0)]);
        assert!(store.records.is_empty());
        assert_eq!(store.writes, 2);
    }

    #[test]
    fn declined_delete_has_no_effect() {
        let mut state = AppState::default();
        let mut store = ListStore::default();
        fill(&mut state, &mut store, john());
        state.dispatch(&mut store, AppCommand::Submit);

        state.dispatch(&mut store, AppCommand::DeleteRow(0));
        state.dispatch(&mut store, AppCommand::Decline);
        assert_eq!(store.records.len(), 1);
        assert_eq!(store.writes, 1);
        assert!(state.pending.is_none());
    }

    #[test]
    fn delete_while_editing_resets_edit_cursor() {
        let mut state = AppState::default();
        let mut store = ListStore::default();
        fill(&mut state, &mut store, john());
        state.dispatch(&mut store, AppCommand::Submit);
        fill(&mut state, &mut store, ["Ann Lee", "102", "a@x.com", "5550001111"]);
        state.dispatch(&mut store, AppCommand::Submit);

        state.dispatch(&mut store, AppCommand::EditRow(1));
        state.dispatch(&mut store, AppCommand::DeleteRow(0));
        let events = state.dispatch(&mut store, AppCommand::Confirm);
        assert_eq!(events, vec![AppEvent::RecordDeleted(0), AppEvent::FormReset]);
        assert_eq!(state.edit_cursor, EditCursor::None);
        assert!(state.form.is_blank());

        fill(&mut state, &mut store, ["Zed Moe", "103", "z@x.com", "5550002222"]);
        state.dispatch(&mut store, AppCommand::Submit);
        assert_eq!(store.records.len(), 2);
        assert_eq!(store.records[0].name, "Ann Lee");
        assert_eq!(store.records[1].name, "Zed Moe");
    }

    #[test]
    fn reset_clears_form_and_cursor_without_mutation() {
        let mut state = AppState::default();
        let mut store = ListStore::default();
        fill(&mut state, &mut store, john());
        state.dispatch(&mut store, AppCommand::Submit);
        state.dispatch(&mut store, AppCommand::EditRow(0));

        let events = state.dispatch(&mut store, AppCommand::Reset);
        assert_eq!(events, vec![AppEvent::FormReset]);
        assert!(state.form.is_blank());
        assert_eq!(state.submit_label(), SUBMIT_LABEL_ADD);
        assert_eq!(store.records.len(), 1);
        assert_eq!(store.writes, 1);
    }

    #[test]
    fn store_failure_raises_alert_and_keeps_form() {
        let mut state = AppState::default();
        let mut store = ListStore {
            fail_writes: true,
            ..ListStore::default()
        };
        fill(&mut state, &mut store, john());

        let events = state.dispatch(&mut store, AppCommand::Submit);
        assert!(matches!(
            events.as_slice(),
            [AppEvent::StoreFailed(message)] if message.contains("disk full")
        ));
        assert!(state.alert.is_some());
        assert_eq!(state.form.name, "John Doe");
        assert!(store.records.is_empty());
    }

    #[test]
    fn retry_after_store_failure_does_not_prompt_or_duplicate() {
        let mut state = AppState::default();
        let mut store = ListStore {
            fail_writes: true,
            ..ListStore::default()
        };
        fill(&mut state, &mut store, john());
        state.dispatch(&mut store, AppCommand::Submit);
        state.dispatch(&mut store, AppCommand::DismissAlert);

        store.fail_writes = false;
        let events = state.dispatch(&mut store, AppCommand::Submit);
        assert_eq!(events, vec![AppEvent::RecordInserted(0), AppEvent::FormReset]);
        assert!(state.pending.is_none());
        assert_eq!(store.records.len(), 1);
    }

    #[test]
    fn failed_delete_keeps_record_and_edit_form() {
        let mut state = AppState::default();
        let mut store = ListStore::default();
        fill(&mut state, &mut store, john());
        state.dispatch(&mut store, AppCommand::Submit);
        state.dispatch(&mut store, AppCommand::EditRow(0));

        store.fail_writes = true;
        state.dispatch(&mut store, AppCommand::DeleteRow(0));
        let events = state.dispatch(&mut store, AppCommand::Confirm);
        assert!(matches!(events.as_slice(), [AppEvent::StoreFailed(_)]));
        assert_eq!(store.records.len(), 1);
        assert_eq!(state.edit_cursor, EditCursor::Editing(0));
        assert_eq!(state.form.name, "John Doe");
    }

    #[test]
    fn typing_goes_to_focused_field_only() {
        let mut state = AppState::default();
        let mut store = ListStore::default();
        state.dispatch(&mut store, AppCommand::InputChar('A'));
        state.dispatch(&mut store, AppCommand::FocusNext);
        state.dispatch(&mut store, AppCommand::InputChar('7'));
        state.dispatch(&mut store, AppCommand::InputChar('8'));
        state.dispatch(&mut store, AppCommand::Backspace);
        assert_eq!(state.form.name, "A");
        assert_eq!(state.form.student_id, "7");

        state.dispatch(&mut store, AppCommand::FocusTable);
        assert!(state.dispatch(&mut store, AppCommand::InputChar('z')).is_empty());
        assert_eq!(state.focus, Focus::Table);
    }

    #[test]
    fn status_commands_pass_through_modals() {
        let mut state = AppState::default();
        let mut store = ListStore::default();
        state.dispatch(&mut store, AppCommand::Submit);
        assert!(state.alert.is_some());

        state.dispatch(&mut store, AppCommand::SetStatus("saved".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("saved"));
        let events = state.dispatch(&mut store, AppCommand::ClearStatus);
        assert_eq!(events, vec![AppEvent::StatusCleared]);
        assert!(state.status_line.is_none());
    }
}
