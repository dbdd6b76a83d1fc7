use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Mutex, MutexGuard};

use crate::errors::AppError;
use crate::models::{CandidateRecord, LeadRecord, LeadStamp};
use crate::validation::{Decision, SubmissionValidator};

/// Returns the first stored lead sharing `email` or `document_number`.
///
/// Linear scan with exact comparison; no trimming or case folding.
pub fn find_duplicate<'a>(
    records: &'a [LeadRecord],
    email: &str,
    document_number: &str,
) -> Option<&'a LeadRecord> {
    records
        .iter()
        .find(|lead| lead.email == email || lead.document_number == document_number)
}

/// Issues time-derived lead ids that never repeat and never go backwards.
#[derive(Debug, Default)]
struct IdSequence {
    last: Option<i64>,
}

impl IdSequence {
    /// Millisecond id for `now`, forced above the previous one.
    fn next_stamp(&mut self, now: DateTime<Utc>) -> LeadStamp {
        let millis = now.timestamp_millis();
        let id = match self.last {
            Some(last) if millis <= last => last + 1,
            _ => millis,
        };
        self.last = Some(id);

        // Keep createdAt consistent with the id when the id had to be bumped.
        let created_at = Utc.timestamp_millis_opt(id).single().unwrap_or(now);

        LeadStamp {
            id: id.to_string(),
            created_at,
        }
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    records: Vec<LeadRecord>,
    ids: IdSequence,
}

/// In-memory, insertion-ordered lead storage.
///
/// Lives as long as the server that owns it. Every read and write goes
/// through one mutex, and `submit` holds it across validation and insert
/// so two concurrent submissions can never both claim the same email or
/// document number.
#[derive(Debug, Default)]
pub struct LeadStore {
    inner: Mutex<StoreInner>,
}

impl LeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreInner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::InternalError("lead store lock poisoned".to_string()))
    }

    /// Appends an already validated record.
    pub fn insert(&self, record: LeadRecord) -> Result<(), AppError> {
        let mut inner = self.lock()?;
        inner.records.push(record);
        Ok(())
    }

    /// Snapshot of every stored lead, oldest first.
    pub fn all(&self) -> Result<Vec<LeadRecord>, AppError> {
        Ok(self.lock()?.records.clone())
    }

    pub fn count(&self) -> Result<usize, AppError> {
        Ok(self.lock()?.records.len())
    }

    /// Validates `candidate` and stores it on acceptance, as one critical section.
    pub fn submit(
        &self,
        candidate: &CandidateRecord,
        validator: &SubmissionValidator,
    ) -> Result<Decision, AppError> {
        self.submit_at(candidate, validator, Utc::now())
    }

    fn submit_at(
        &self,
        candidate: &CandidateRecord,
        validator: &SubmissionValidator,
        now: DateTime<Utc>,
    ) -> Result<Decision, AppError> {
        let mut guard = self.lock()?;
        let StoreInner { records, ids } = &mut *guard;

        let decision = validator.validate(candidate, records, || ids.next_stamp(now));

        if let Decision::Accepted(lead) = &decision {
            records.push(lead.clone());
        }

        Ok(decision)
    }
}
