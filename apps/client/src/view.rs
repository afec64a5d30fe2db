//! Job detail view: what a visitor sees for one job and which action is
//! offered to them.

use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::api::{JobDetail, Viewer};

/// What the view offers below the job details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    Apply,
    SendResume { contact: String },
}

/// A job loaded once together with whoever is looking at it.
#[derive(Debug, Clone)]
pub struct JobDetailView {
    pub job: JobDetail,
    pub viewer: Option<Viewer>,
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// `MMM Do, YYYY`, e.g. `Jan 31st, 2030`.
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{} {}{}, {}",
        date.format("%b"),
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

impl JobDetailView {
    pub fn new(job: JobDetail, viewer: Option<Viewer>) -> Self {
        Self { job, viewer }
    }

    pub fn action(&self) -> ViewAction {
        match &self.viewer {
            Some(viewer) if viewer.role == "user" => ViewAction::Apply,
            _ => ViewAction::SendResume {
                contact: self.job.job_contact.clone(),
            },
        }
    }
}

impl fmt::Display for JobDetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let job = &self.job;
        if let Some(viewer) = &self.viewer {
            writeln!(f, "Signed in as {} ({})", viewer.username, viewer.role)?;
        }
        writeln!(f, "{}", job.position)?;
        writeln!(f, "{} · {} · {}", job.company, job.job_location, job.job_type)?;
        writeln!(f, "Posted: {}", format_date(job.created_at.date_naive()))?;
        writeln!(f, "Status: {}", job.job_status)?;
        writeln!(f)?;
        writeln!(f, "{}", job.job_description)?;
        writeln!(f)?;
        writeln!(f, "Requirements:")?;
        for skill in &job.job_skills {
            writeln!(f, "  - {skill}")?;
        }
        writeln!(f, "Facilities:")?;
        for facility in &job.job_facilities {
            writeln!(f, "  - {facility}")?;
        }
        writeln!(f)?;
        writeln!(f, "Salary: {}", job.job_salary)?;
        writeln!(f, "Deadline: {}", format_date(job.job_deadline))?;
        writeln!(f, "Vacancy: {}", job.job_vacancy)?;
        writeln!(f)?;
        match self.action() {
            ViewAction::Apply => writeln!(
                f,
                "Apply: jobboard-client apply {} --email <EMAIL> --password <PASSWORD> [--resume <PATH>]",
                job.id
            ),
            ViewAction::SendResume { contact } => {
                writeln!(f, "Send your cv/resume to: {contact}")
            }
        }
    }
}
