// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::StudentRecord;

/// The ordered record list the controller mutates. Every successful
/// mutation is expected to be durable by the time the call returns; a
/// failed one leaves the list exactly as it was.
pub trait RecordStore {
    fn records(&self) -> &[StudentRecord];
    fn insert(&mut self, record: StudentRecord) -> Result<()>;
    fn update(&mut self, index: usize, record: StudentRecord) -> Result<()>;
    fn delete(&mut self, index: usize) -> Result<StudentRecord>;

    fn find_duplicate_index(&self, student_id: &str) -> Option<usize> {
        self.records()
            .iter()
            .position(|record| record.student_id == student_id)
    }

    fn len(&self) -> usize {
        self.records().len()
    }

    fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}
