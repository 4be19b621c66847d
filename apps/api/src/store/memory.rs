//! In-memory `JobStore` for tests. Counts profile fetches and can be told to fail.
//! Applications are unique per (job, candidate), like the Postgres table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::posting::{ApplicationRow, ApplicationStatus, EmployerPosting, JobPosting};
use crate::models::profile::{CandidateProfile, CertificateRow, DegreeRow, ExperienceRow, SkillRow};
use crate::models::requirement::RequirementClause;
use crate::store::JobStore;

#[derive(Default)]
struct Inner {
    profiles: HashMap<Uuid, CandidateProfile>,
    /// Insertion order doubles as storage order.
    postings: Vec<JobPosting>,
    clauses: HashMap<Uuid, Vec<RequirementClause>>,
    applications: Vec<ApplicationRow>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_reads: AtomicBool,
    hide_applications: AtomicBool,
    profile_fetches: AtomicUsize,
    clause_fetches: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_profile(&self, candidate_id: Uuid, profile: CandidateProfile) {
        self.inner.lock().unwrap().profiles.insert(candidate_id, profile);
    }

    pub fn put_posting(&self, posting: JobPosting, clauses: Vec<RequirementClause>) {
        let mut inner = self.inner.lock().unwrap();
        inner.clauses.insert(posting.id, clauses);
        inner.postings.push(posting);
    }

    pub fn put_application(&self, application: ApplicationRow) {
        self.inner.lock().unwrap().applications.push(application);
    }

    pub fn applications(&self) -> Vec<ApplicationRow> {
        self.inner.lock().unwrap().applications.clone()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes application reads come back empty, as if another request
    /// inserted between a read and a write.
    pub fn set_hide_applications(&self, hide: bool) {
        self.hide_applications.store(hide, Ordering::SeqCst);
    }

    pub fn clauses(&self, job_id: Uuid) -> Option<Vec<RequirementClause>> {
        self.inner.lock().unwrap().clauses.get(&job_id).cloned()
    }

    /// Number of per-section profile reads (four per full profile load).
    pub fn profile_fetches(&self) -> usize {
        self.profile_fetches.load(Ordering::SeqCst)
    }

    /// Number of calls into the clause fetch paths, batched or single.
    pub fn clause_fetches(&self) -> usize {
        self.clause_fetches.load(Ordering::SeqCst)
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("simulated store outage");
        }
        Ok(())
    }

    fn profile(&self, candidate_id: Uuid) -> Result<CandidateProfile> {
        self.check_read()?;
        self.profile_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .inner
            .lock()
            .unwrap()
            .profiles
            .get(&candidate_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn fetch_active_skills(&self, candidate_id: Uuid) -> Result<Vec<SkillRow>> {
        Ok(self.profile(candidate_id)?.skills)
    }

    async fn fetch_active_certificates(&self, candidate_id: Uuid) -> Result<Vec<CertificateRow>> {
        Ok(self.profile(candidate_id)?.certificates)
    }

    async fn fetch_experiences(&self, candidate_id: Uuid) -> Result<Vec<ExperienceRow>> {
        Ok(self.profile(candidate_id)?.experiences)
    }

    async fn fetch_degrees(&self, candidate_id: Uuid) -> Result<Vec<DegreeRow>> {
        Ok(self.profile(candidate_id)?.degrees)
    }

    async fn fetch_requirement_clauses(&self, job_id: Uuid) -> Result<Vec<RequirementClause>> {
        self.check_read()?;
        self.clause_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .inner
            .lock()
            .unwrap()
            .clauses
            .get(&job_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_requirement_clauses_batch(
        &self,
        job_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<RequirementClause>>> {
        self.check_read()?;
        self.clause_fetches.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.lock().unwrap();
        Ok(job_ids
            .iter()
            .filter_map(|id| inner.clauses.get(id).map(|c| (*id, c.clone())))
            .collect())
    }

    async fn fetch_candidate_applications(
        &self,
        candidate_id: Uuid,
    ) -> Result<HashMap<Uuid, ApplicationStatus>> {
        self.check_read()?;
        if self.hide_applications.load(Ordering::SeqCst) {
            return Ok(HashMap::new());
        }
        Ok(self
            .inner
            .lock()
            .unwrap()
            .applications
            .iter()
            .filter(|a| a.user_id == candidate_id)
            .map(|a| (a.job_id, a.status))
            .collect())
    }

    async fn fetch_active_postings(&self) -> Result<Vec<JobPosting>> {
        self.check_read()?;
        let mut postings: Vec<JobPosting> = self
            .inner
            .lock()
            .unwrap()
            .postings
            .iter()
            .filter(|p| p.is_active())
            .cloned()
            .collect();
        postings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(postings)
    }

    async fn fetch_posting(&self, job_id: Uuid) -> Result<Option<JobPosting>> {
        self.check_read()?;
        Ok(self
            .inner
            .lock()
            .unwrap()
            .postings
            .iter()
            .find(|p| p.id == job_id)
            .cloned())
    }

    async fn fetch_employer_postings(&self, employer_id: Uuid) -> Result<Vec<EmployerPosting>> {
        self.check_read()?;
        let inner = self.inner.lock().unwrap();
        let mut postings: Vec<EmployerPosting> = inner
            .postings
            .iter()
            .filter(|p| p.posted_by == employer_id)
            .map(|p| EmployerPosting {
                applications_count: inner
                    .applications
                    .iter()
                    .filter(|a| a.job_id == p.id)
                    .count() as i64,
                posting: p.clone(),
            })
            .collect();
        postings.sort_by(|a, b| b.posting.created_at.cmp(&a.posting.created_at));
        Ok(postings)
    }

    async fn insert_posting(
        &self,
        posting: &JobPosting,
        clauses: &[RequirementClause],
    ) -> Result<()> {
        self.put_posting(posting.clone(), clauses.to_vec());
        Ok(())
    }

    async fn replace_posting(
        &self,
        posting: &JobPosting,
        clauses: &[RequirementClause],
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let Some(slot) = inner.postings.iter_mut().find(|p| p.id == posting.id) else {
            bail!("posting {} does not exist", posting.id);
        };
        *slot = posting.clone();
        inner.clauses.insert(posting.id, clauses.to_vec());
        Ok(())
    }

    async fn update_posting_status(&self, job_id: Uuid, status: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(posting) = inner.postings.iter_mut().find(|p| p.id == job_id) {
            posting.status = status.to_string();
        }
        Ok(())
    }

    async fn delete_posting(&self, job_id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.postings.retain(|p| p.id != job_id);
        inner.clauses.remove(&job_id);
        inner.applications.retain(|a| a.job_id != job_id);
        Ok(())
    }

    async fn insert_application(&self, application: &ApplicationRow) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        let taken = inner
            .applications
            .iter()
            .any(|a| a.job_id == application.job_id && a.user_id == application.user_id);
        if taken {
            return Ok(false);
        }
        inner.applications.push(application.clone());
        Ok(true)
    }
}
