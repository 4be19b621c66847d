use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::models::posting::{ApplicationRow, ApplicationStatus, EmployerPosting, JobPosting};
use crate::models::profile::{CertificateRow, DegreeRow, ExperienceRow, SkillRow};
use crate::models::requirement::{
    CertificateClause, DegreeClause, ExperienceClause, MatchMode, RequirementClause, SkillClause,
};
use crate::store::JobStore;

/// Postgres-backed store. Requirement clauses live in one table per dimension.
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SkillClauseRow {
    job_id: Uuid,
    skill_title: String,
    skill_type: String,
    title_match_type: String,
    is_required: bool,
}

#[derive(FromRow)]
struct CertificateClauseRow {
    job_id: Uuid,
    certificate_title: String,
    title_match_type: String,
    issuer: Option<String>,
    issuer_match_type: String,
    is_required: bool,
}

#[derive(FromRow)]
struct ExperienceClauseRow {
    job_id: Uuid,
    years_required: i32,
    role_title: Option<String>,
    role_title_match_type: String,
    country: Option<String>,
    country_match_type: String,
    is_required: bool,
}

#[derive(FromRow)]
struct DegreeClauseRow {
    job_id: Uuid,
    degree_level: String,
    field_of_study: Option<String>,
    is_required: bool,
}

#[derive(FromRow)]
struct ApplicationStatusRow {
    job_id: Uuid,
    status: String,
}

impl From<SkillClauseRow> for RequirementClause {
    fn from(row: SkillClauseRow) -> Self {
        RequirementClause::Skill(SkillClause {
            skill_title: row.skill_title,
            skill_type: row.skill_type,
            title_match_type: MatchMode::parse_lenient(&row.title_match_type),
            is_required: row.is_required,
        })
    }
}

impl From<CertificateClauseRow> for RequirementClause {
    fn from(row: CertificateClauseRow) -> Self {
        RequirementClause::Certificate(CertificateClause {
            certificate_title: row.certificate_title,
            title_match_type: MatchMode::parse_lenient(&row.title_match_type),
            issuer: row.issuer,
            issuer_match_type: MatchMode::parse_lenient(&row.issuer_match_type),
            is_required: row.is_required,
        })
    }
}

impl From<ExperienceClauseRow> for RequirementClause {
    fn from(row: ExperienceClauseRow) -> Self {
        RequirementClause::Experience(ExperienceClause {
            // CHECK (years_required >= 0) in the schema
            years_required: row.years_required.max(0) as u32,
            role_title: row.role_title,
            role_title_match_type: MatchMode::parse_lenient(&row.role_title_match_type),
            country: row.country,
            country_match_type: MatchMode::parse_lenient(&row.country_match_type),
            is_required: row.is_required,
        })
    }
}

impl From<DegreeClauseRow> for RequirementClause {
    fn from(row: DegreeClauseRow) -> Self {
        RequirementClause::Degree(DegreeClause {
            degree_level: row.degree_level,
            field_of_study: row.field_of_study,
            is_required: row.is_required,
        })
    }
}

const SKILL_CLAUSES_SQL: &str = r#"
    SELECT job_id, skill_title, skill_type, title_match_type, is_required
    FROM job_required_skills
    WHERE job_id = ANY($1)
    ORDER BY id
"#;

const CERTIFICATE_CLAUSES_SQL: &str = r#"
    SELECT job_id, certificate_title, title_match_type, issuer, issuer_match_type, is_required
    FROM job_required_certificates
    WHERE job_id = ANY($1)
    ORDER BY id
"#;

const EXPERIENCE_CLAUSES_SQL: &str = r#"
    SELECT job_id, years_required, role_title, role_title_match_type,
           country, country_match_type, is_required
    FROM job_required_experiences
    WHERE job_id = ANY($1)
    ORDER BY id
"#;

const DEGREE_CLAUSES_SQL: &str = r#"
    SELECT job_id, degree_level, field_of_study, is_required
    FROM job_required_degrees
    WHERE job_id = ANY($1)
    ORDER BY id
"#;

#[async_trait]
impl JobStore for PgJobStore {
    async fn fetch_active_skills(&self, candidate_id: Uuid) -> Result<Vec<SkillRow>> {
        Ok(sqlx::query_as::<_, SkillRow>(
            "SELECT title, skill_type FROM skills WHERE user_id = $1 AND is_active",
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn fetch_active_certificates(&self, candidate_id: Uuid) -> Result<Vec<CertificateRow>> {
        Ok(sqlx::query_as::<_, CertificateRow>(
            "SELECT title, issuer FROM certificates WHERE user_id = $1 AND is_active",
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn fetch_experiences(&self, candidate_id: Uuid) -> Result<Vec<ExperienceRow>> {
        Ok(sqlx::query_as::<_, ExperienceRow>(
            r#"
            SELECT role_title, country, start_date, end_date, is_present
            FROM experiences
            WHERE user_id = $1
            ORDER BY start_date
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn fetch_degrees(&self, candidate_id: Uuid) -> Result<Vec<DegreeRow>> {
        Ok(sqlx::query_as::<_, DegreeRow>(
            "SELECT degree_level, field_of_study FROM degrees WHERE user_id = $1",
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn fetch_requirement_clauses(&self, job_id: Uuid) -> Result<Vec<RequirementClause>> {
        let mut batch = self.fetch_requirement_clauses_batch(&[job_id]).await?;
        Ok(batch.remove(&job_id).unwrap_or_default())
    }

    /// Four queries total regardless of how many postings are asked for.
    async fn fetch_requirement_clauses_batch(
        &self,
        job_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<RequirementClause>>> {
        let mut out: HashMap<Uuid, Vec<RequirementClause>> = HashMap::new();
        if job_ids.is_empty() {
            return Ok(out);
        }

        let skills = sqlx::query_as::<_, SkillClauseRow>(SKILL_CLAUSES_SQL)
            .bind(job_ids)
            .fetch_all(&self.pool)
            .await?;
        for row in skills {
            out.entry(row.job_id).or_default().push(row.into());
        }

        let certificates = sqlx::query_as::<_, CertificateClauseRow>(CERTIFICATE_CLAUSES_SQL)
            .bind(job_ids)
            .fetch_all(&self.pool)
            .await?;
        for row in certificates {
            out.entry(row.job_id).or_default().push(row.into());
        }

        let experiences = sqlx::query_as::<_, ExperienceClauseRow>(EXPERIENCE_CLAUSES_SQL)
            .bind(job_ids)
            .fetch_all(&self.pool)
            .await?;
        for row in experiences {
            out.entry(row.job_id).or_default().push(row.into());
        }

        let degrees = sqlx::query_as::<_, DegreeClauseRow>(DEGREE_CLAUSES_SQL)
            .bind(job_ids)
            .fetch_all(&self.pool)
            .await?;
        for row in degrees {
            out.entry(row.job_id).or_default().push(row.into());
        }

        Ok(out)
    }

    async fn fetch_candidate_applications(
        &self,
        candidate_id: Uuid,
    ) -> Result<HashMap<Uuid, ApplicationStatus>> {
        let rows = sqlx::query_as::<_, ApplicationStatusRow>(
            "SELECT job_id, status FROM applications WHERE user_id = $1",
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let status = ApplicationStatus::parse(&r.status).ok_or_else(|| {
                    anyhow!("application on job {} has unknown status '{}'", r.job_id, r.status)
                })?;
                Ok::<_, anyhow::Error>((r.job_id, status))
            })
            .collect()
    }

    async fn fetch_active_postings(&self) -> Result<Vec<JobPosting>> {
        Ok(sqlx::query_as::<_, JobPosting>(
            "SELECT * FROM job_postings WHERE status = 'active' ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn fetch_posting(&self, job_id: Uuid) -> Result<Option<JobPosting>> {
        Ok(
            sqlx::query_as::<_, JobPosting>("SELECT * FROM job_postings WHERE id = $1")
                .bind(job_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn fetch_employer_postings(&self, employer_id: Uuid) -> Result<Vec<EmployerPosting>> {
        Ok(sqlx::query_as::<_, EmployerPosting>(
            r#"
            SELECT p.*,
                   (SELECT COUNT(*) FROM applications a WHERE a.job_id = p.id) AS applications_count
            FROM job_postings p
            WHERE p.posted_by = $1
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_posting(
        &self,
        posting: &JobPosting,
        clauses: &[RequirementClause],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO job_postings
                (id, posted_by, title, description, company_name, location,
                 employment_type, employment_arrangement, salary_min, salary_max,
                 application_deadline, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(posting.id)
        .bind(posting.posted_by)
        .bind(&posting.title)
        .bind(&posting.description)
        .bind(&posting.company_name)
        .bind(&posting.location)
        .bind(&posting.employment_type)
        .bind(&posting.employment_arrangement)
        .bind(posting.salary_min)
        .bind(posting.salary_max)
        .bind(posting.application_deadline)
        .bind(&posting.status)
        .bind(posting.created_at)
        .execute(&mut *tx)
        .await?;

        insert_clauses(&mut tx, posting.id, clauses).await?;
        tx.commit().await?;

        info!(
            "Inserted job posting {} with {} requirement clauses",
            posting.id,
            clauses.len()
        );
        Ok(())
    }

    async fn replace_posting(
        &self,
        posting: &JobPosting,
        clauses: &[RequirementClause],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE job_postings
            SET title = $2, description = $3, company_name = $4, location = $5,
                employment_type = $6, employment_arrangement = $7, salary_min = $8,
                salary_max = $9, application_deadline = $10, status = $11
            WHERE id = $1
            "#,
        )
        .bind(posting.id)
        .bind(&posting.title)
        .bind(&posting.description)
        .bind(&posting.company_name)
        .bind(&posting.location)
        .bind(&posting.employment_type)
        .bind(&posting.employment_arrangement)
        .bind(posting.salary_min)
        .bind(posting.salary_max)
        .bind(posting.application_deadline)
        .bind(&posting.status)
        .execute(&mut *tx)
        .await?;

        // Full delete-and-reinsert: clauses have no identity of their own.
        for table in [
            "job_required_skills",
            "job_required_certificates",
            "job_required_experiences",
            "job_required_degrees",
        ] {
            sqlx::query(&format!("DELETE FROM {table} WHERE job_id = $1"))
                .bind(posting.id)
                .execute(&mut *tx)
                .await?;
        }

        insert_clauses(&mut tx, posting.id, clauses).await?;
        tx.commit().await?;

        info!(
            "Replaced job posting {} with {} requirement clauses",
            posting.id,
            clauses.len()
        );
        Ok(())
    }

    async fn update_posting_status(&self, job_id: Uuid, status: &str) -> Result<()> {
        sqlx::query("UPDATE job_postings SET status = $2 WHERE id = $1")
            .bind(job_id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        info!("Job posting {} is now {}", job_id, status);
        Ok(())
    }

    async fn delete_posting(&self, job_id: Uuid) -> Result<()> {
        // Clauses and applications go with it via ON DELETE CASCADE.
        sqlx::query("DELETE FROM job_postings WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;

        info!("Deleted job posting {}", job_id);
        Ok(())
    }

    async fn insert_application(&self, application: &ApplicationRow) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO applications (id, job_id, user_id, cover_letter, status, applied_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (job_id, user_id) DO NOTHING
            "#,
        )
        .bind(application.id)
        .bind(application.job_id)
        .bind(application.user_id)
        .bind(&application.cover_letter)
        .bind(application.status.as_str())
        .bind(application.applied_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

async fn insert_clauses(
    tx: &mut Transaction<'_, Postgres>,
    job_id: Uuid,
    clauses: &[RequirementClause],
) -> Result<()> {
    for clause in clauses {
        match clause {
            RequirementClause::Skill(c) => {
                sqlx::query(
                    r#"
                    INSERT INTO job_required_skills
                        (job_id, skill_title, skill_type, title_match_type, is_required)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(job_id)
                .bind(&c.skill_title)
                .bind(&c.skill_type)
                .bind(c.title_match_type.as_str())
                .bind(c.is_required)
                .execute(&mut **tx)
                .await?;
            }
            RequirementClause::Certificate(c) => {
                sqlx::query(
                    r#"
                    INSERT INTO job_required_certificates
                        (job_id, certificate_title, title_match_type, issuer,
                         issuer_match_type, is_required)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(job_id)
                .bind(&c.certificate_title)
                .bind(c.title_match_type.as_str())
                .bind(&c.issuer)
                .bind(c.issuer_match_type.as_str())
                .bind(c.is_required)
                .execute(&mut **tx)
                .await?;
            }
            RequirementClause::Experience(c) => {
                sqlx::query(
                    r#"
                    INSERT INTO job_required_experiences
                        (job_id, years_required, role_title, role_title_match_type,
                         country, country_match_type, is_required)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(job_id)
                .bind(i32::try_from(c.years_required)?)
                .bind(&c.role_title)
                .bind(c.role_title_match_type.as_str())
                .bind(&c.country)
                .bind(c.country_match_type.as_str())
                .bind(c.is_required)
                .execute(&mut **tx)
                .await?;
            }
            RequirementClause::Degree(c) => {
                sqlx::query(
                    r#"
                    INSERT INTO job_required_degrees
                        (job_id, degree_level, field_of_study, is_required)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(job_id)
                .bind(&c.degree_level)
                .bind(&c.field_of_study)
                .bind(c.is_required)
                .execute(&mut **tx)
                .await?;
            }
        }
    }
    Ok(())
}
