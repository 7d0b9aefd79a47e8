// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use roster_app::{RecordStore, StudentRecord};

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];
const EMAIL_DOMAINS: [&str; 5] = [
    "example.edu",
    "students.example.org",
    "campus.test",
    "mail.example.com",
    "uni.example.net",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
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
}

/// Produces valid, reproducible student records for demos and tests.
#[derive(Debug, Clone)]
pub struct StudentFaker {
    rng: DeterministicRng,
    next_id: u64,
}

impl StudentFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1001,
        }
    }

    pub fn student(&mut self) -> StudentRecord {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let domain = self.pick(&EMAIL_DOMAINS);
        let student_id = self.next_id.to_string();
        self.next_id += 1;

        let contact = (0..10)
            .map(|position| {
                let digit = if position == 0 {
                    2 + self.rng.int_n(8)
                } else {
                    self.rng.int_n(10)
                };
                char::from(b'0' + digit as u8)
            })
            .collect::<String>();

        StudentRecord::new(
            format!("{first} {last}"),
            student_id,
            format!(
                "{}.{}@{domain}",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase()
            ),
            contact,
        )
    }

    pub fn students(&mut self, count: usize) -> Vec<StudentRecord> {
        (0..count).map(|_| self.student()).collect()
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }
}

pub fn john_doe() -> StudentRecord {
    StudentRecord::new("John Doe", "101", "j@x.com", "1234567890")
}

/// `RecordStore` over a plain vector that counts durable writes.
#[derive(Debug, Default)]
pub struct VecStore {
    pub records: Vec<StudentRecord>,
    pub writes: usize,
    pub fail_writes: bool,
}

impl VecStore {
    pub fn with_records(records: Vec<StudentRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    fn persist(&mut self) -> Result<()> {
        if self.fail_writes {
            bail!("simulated write failure");
        }
        self.writes += 1;
        Ok(())
    }
}

impl RecordStore for VecStore {
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
        let Some(existing) = self.records.get_mut(index) else {
            bail!("no record at index {index}");
        };
        let previous = std::mem::replace(existing, record);
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
