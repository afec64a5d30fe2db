use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::auth::gate;
use crate::auth::session::Session;
use crate::errors::AppError;
use crate::models::job::JobStatus;
use crate::models::user::Role;
use crate::state::AppState;

const STATS_MONTHS: u32 = 6;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminInfo {
    pub total_users: u64,
    pub admins: u64,
    pub recruiters: u64,
    pub applicants: u64,
    pub total_jobs: u64,
    pub pending_jobs: u64,
    pub interview_jobs: u64,
    pub declined_jobs: u64,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    /// `YYYY-MM`
    pub month: String,
    pub count: u64,
}

#[derive(Serialize)]
pub struct InfoResponse {
    pub status: bool,
    pub result: AdminInfo,
}

#[derive(Serialize)]
pub struct MonthlyStatsResponse {
    pub status: bool,
    pub result: Vec<MonthCount>,
}

/// First day of the month `back` months before `now`'s month.
fn month_start(now: DateTime<Utc>, back: u32) -> NaiveDate {
    let months = now.year() * 12 + now.month0() as i32 - back as i32;
    NaiveDate::from_ymd_opt(months.div_euclid(12), months.rem_euclid(12) as u32 + 1, 1)
        .unwrap_or(NaiveDate::MIN)
}

/// Buckets creation times into the last `STATS_MONTHS` calendar months,
/// oldest first. Months with no jobs are reported with a zero count.
pub fn monthly_counts(now: DateTime<Utc>, created: &[DateTime<Utc>]) -> Vec<MonthCount> {
    let mut buckets: Vec<MonthCount> = (0..STATS_MONTHS)
        .rev()
        .map(|back| MonthCount {
            month: month_start(now, back).format("%Y-%m").to_string(),
            count: 0,
        })
        .collect();
    for at in created {
        let label = at.format("%Y-%m").to_string();
        if let Some(bucket) = buckets.iter_mut().find(|b| b.month == label) {
            bucket.count += 1;
        }
    }
    buckets
}

/// GET /api/v1/admin/info
pub async fn handle_info(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<InfoResponse>, AppError> {
    session.authorize(gate::ADMINS)?;
    let result = AdminInfo {
        total_users: state.users.count().await?,
        admins: state.users.count_by_role(Role::Admin).await?,
        recruiters: state.users.count_by_role(Role::Recruiter).await?,
        applicants: state.users.count_by_role(Role::User).await?,
        total_jobs: state.jobs.count_by_status(None).await?,
        pending_jobs: state.jobs.count_by_status(Some(JobStatus::Pending)).await?,
        interview_jobs: state.jobs.count_by_status(Some(JobStatus::Interview)).await?,
        declined_jobs: state.jobs.count_by_status(Some(JobStatus::Declined)).await?,
    };
    Ok(Json(InfoResponse {
        status: true,
        result,
    }))
}

/// GET /api/v1/admin/monthly-stats
pub async fn handle_monthly_stats(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<MonthlyStatsResponse>, AppError> {
    session.authorize(gate::ADMINS)?;
    let now = Utc::now();
    let since = month_start(now, STATS_MONTHS - 1)
        .and_hms_opt(0, 0, 0)
        .map(|start| Utc.from_utc_datetime(&start))
        .unwrap_or(now);
    let created = state.jobs.created_since(since).await?;
    Ok(Json(MonthlyStatsResponse {
        status: true,
        result: monthly_counts(now, &created),
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::state::test_support::{body_json, TestApp};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_month_start_crosses_year() {
        let now = at(2024, 2, 15);
        assert_eq!(month_start(now, 0), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(month_start(now, 5), NaiveDate::from_ymd_opt(2023, 9, 1).unwrap());
    }

    #[test]
    fn test_monthly_counts_oldest_first() {
        let now = at(2024, 2, 15);
        let created = [at(2024, 2, 1), at(2024, 2, 10), at(2023, 11, 30), at(2023, 1, 1)];
        let counts = monthly_counts(now, &created);
        let months: Vec<&str> = counts.iter().map(|c| c.month.as_str()).collect();
        assert_eq!(
            months,
            vec!["2023-09", "2023-10", "2023-11", "2023-12", "2024-01", "2024-02"]
        );
        let totals: Vec<u64> = counts.iter().map(|c| c.count).collect();
        assert_eq!(totals, vec![0, 0, 1, 0, 0, 2]);
    }

    #[tokio::test]
    async fn test_info_counts_and_gate() {
        let app = TestApp::new().await;
        let admin = app.user(Role::Admin, "ada").await;
        let recruiter = app.user(Role::Recruiter, "rita").await;
        app.user(Role::User, "umar").await;
        app.job(&recruiter, "Acme Labs").await;
        app.job(&recruiter, "Globex Corp").await;

        let get = |cookie: String, uri: &str| {
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap()
        };

        let response = app
            .router()
            .oneshot(get(app.cookie(&recruiter), "/api/v1/admin/info"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .router()
            .oneshot(get(app.cookie(&admin), "/api/v1/admin/info"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["result"]["totalUsers"], 3);
        assert_eq!(body["result"]["recruiters"], 1);
        assert_eq!(body["result"]["totalJobs"], 2);
        assert_eq!(body["result"]["pendingJobs"], 2);

        let response = app
            .router()
            .oneshot(get(app.cookie(&admin), "/api/v1/admin/monthly-stats"))
            .await
            .unwrap();
        let body = body_json(response).await;
        let months = body["result"].as_array().unwrap();
        assert_eq!(months.len(), 6);
        assert_eq!(months[5]["count"], 2);
    }
}
