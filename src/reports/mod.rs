//! Reporting views over the stored clients and jobs.
//!
//! Everything here is a pure read: each function re-reads the collections
//! through the repository, derives its view, and mutates nothing. Income is
//! attributed to the month and year a job was *scheduled* for, not when it
//! was completed, so a job finished late still counts toward the month it
//! was booked in. Calendar bucketing uses the local timezone.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};

use crate::models::{Job, MonthlyIncome, YearlyIncome};
use crate::repo::Repository;

/// Shown wherever a job's client no longer exists.
pub const UNKNOWN_CLIENT: &str = "Unknown Client";

/// Income per month of `year` (a 4-digit year string), one entry per month
/// "01" through "12", zero when nothing was earned.
///
/// A completed job contributes its client's price to the month its
/// scheduled date falls in. Jobs whose client no longer resolves are
/// skipped.
pub fn monthly_income(repo: &Repository, year: &str) -> Vec<MonthlyIncome> {
    let clients = repo.get_clients();
    let mut months: Vec<MonthlyIncome> = (1..=12)
        .map(|m| MonthlyIncome {
            month: format!("{m:02}"),
            amount: 0.0,
        })
        .collect();

    for job in repo.get_jobs() {
        if !job.completed {
            continue;
        }
        let scheduled = job.scheduled_date.with_timezone(&Local);
        if scheduled.year().to_string() != year {
            continue;
        }
        if let Some(client) = clients.iter().find(|c| c.id == job.client_id) {
            months[scheduled.month0() as usize].amount += client.price;
        }
    }

    months
}

/// One entry per year that has at least one completed job, newest year
/// first, each with its monthly breakdown. A year whose completed jobs all
/// point at deleted clients still appears, with amount 0.
pub fn yearly_income(repo: &Repository) -> Vec<YearlyIncome> {
    let clients = repo.get_clients();
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();

    for job in repo.get_jobs() {
        if !job.completed {
            continue;
        }
        let year = job.scheduled_date.with_timezone(&Local).year().to_string();
        let total = totals.entry(year).or_insert(0.0);
        if let Some(client) = clients.iter().find(|c| c.id == job.client_id) {
            *total += client.price;
        }
    }

    totals
        .into_iter()
        .rev()
        .map(|(year, amount)| YearlyIncome {
            monthly_breakdown: monthly_income(repo, &year),
            year,
            amount,
        })
        .collect()
}

/// Total income for the current local year, 0 when there is none yet.
pub fn current_year_income(repo: &Repository) -> f64 {
    let year = Local::now().year().to_string();
    yearly_income(repo)
        .into_iter()
        .find(|y| y.year == year)
        .map_or(0.0, |y| y.amount)
}

/// Income for the current local month, 0 when there is none yet.
pub fn current_month_income(repo: &Repository) -> f64 {
    let now = Local::now();
    monthly_income(repo, &now.year().to_string())
        .get(now.month0() as usize)
        .map_or(0.0, |m| m.amount)
}

/// Incomplete jobs scheduled within the next `days` days, soonest first.
pub fn upcoming_jobs(repo: &Repository, days: i64) -> Vec<Job> {
    upcoming_jobs_on(repo, Local::now().date_naive(), days)
}

/// Window logic behind [`upcoming_jobs`], parameterized on "today".
///
/// Both ends of the window are whole local calendar days, inclusive: a job
/// scheduled for any time on the boundary day is in.
pub fn upcoming_jobs_on(repo: &Repository, today: NaiveDate, days: i64) -> Vec<Job> {
    let end = today + Duration::days(days);
    let mut jobs: Vec<Job> = repo
        .get_jobs()
        .into_iter()
        .filter(|job| {
            if job.completed {
                return false;
            }
            let day = scheduled_day(job);
            day >= today && day <= end
        })
        .collect();
    jobs.sort_by_key(|job| job.scheduled_date);
    jobs
}

/// The local calendar day a job is scheduled for.
pub fn scheduled_day(job: &Job) -> NaiveDate {
    job.scheduled_date.with_timezone(&Local).date_naive()
}

/// Name of the referenced client, or a placeholder when the reference
/// dangles.
pub fn client_name(repo: &Repository, client_id: &str) -> String {
    repo.get_client(client_id)
        .map_or_else(|| UNKNOWN_CLIENT.to_string(), |c| c.name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Newest,
    Oldest,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Newest => Self::Oldest,
            Self::Oldest => Self::Newest,
        }
    }
}

/// Client-detail order: jobs still to be done first, then most recently
/// scheduled within each group.
pub fn sort_client_jobs(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| {
        a.completed
            .cmp(&b.completed)
            .then_with(|| b.scheduled_date.cmp(&a.scheduled_date))
    });
}

/// Completed-tab order: completion date descending. A completed job with no
/// completion date is inconsistent state; it sorts as if dated at the epoch,
/// which puts it last.
pub fn sort_completed_jobs(jobs: &mut [Job]) {
    jobs.sort_by_key(|job| Reverse(job.completed_date.map_or(0, |d| d.timestamp_millis())));
}

/// The newest/oldest toggle sorts on when a job last mattered: its
/// completion date once completed, its scheduled date otherwise.
pub fn sort_jobs(jobs: &mut [Job], order: SortOrder) {
    match order {
        SortOrder::Newest => jobs.sort_by(|a, b| activity_date(b).cmp(&activity_date(a))),
        SortOrder::Oldest => jobs.sort_by(|a, b| activity_date(a).cmp(&activity_date(b))),
    }
}

fn activity_date(job: &Job) -> DateTime<Utc> {
    if job.completed {
        if let Some(done) = job.completed_date {
            return done;
        }
    }
    job.scheduled_date
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::Client;
    use crate::store::MemoryStore;

    fn test_repo() -> Repository {
        Repository::new(Box::new(MemoryStore::new()))
    }

    fn client(id: &str, name: &str, price: f64) -> Client {
        Client {
            id: id.to_string(),
            name: name.to_string(),
            phone: "555-0100".to_string(),
            address: "12 Elm St".to_string(),
            price,
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn job_on(id: &str, client_id: &str, scheduled: DateTime<Utc>, completed: bool) -> Job {
        Job {
            id: id.to_string(),
            client_id: client_id.to_string(),
            scheduled_date: scheduled,
            completed,
            completed_date: completed.then(|| scheduled),
            paid: false,
            paid_date: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    /// Noon local time on the given day, as the UTC instant that gets
    /// stored. Noon keeps the local calendar day stable regardless of the
    /// timezone the tests run in.
    fn local_noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        Local
            .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn monthly_income_always_has_twelve_months() {
        let repo = test_repo();
        let months = monthly_income(&repo, "2024");
        assert_eq!(months.len(), 12);
        let labels: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(labels[0], "01");
        assert_eq!(labels[11], "12");
        assert!(months.iter().all(|m| m.amount == 0.0));
    }

    #[test]
    fn completed_jobs_land_in_their_scheduled_month() {
        let repo = test_repo();
        repo.save_client(&client("c1", "A", 50.0)).unwrap();
        repo.save_job(&job_on("j1", "c1", local_noon(2024, 1, 15), true))
            .unwrap();
        repo.save_job(&job_on("j2", "c1", local_noon(2024, 2, 20), true))
            .unwrap();

        let months = monthly_income(&repo, "2024");
        assert_eq!(months[0].amount, 50.0);
        assert_eq!(months[1].amount, 50.0);
        assert!(months[2..].iter().all(|m| m.amount == 0.0));

        let yearly = yearly_income(&repo);
        assert_eq!(yearly.len(), 1);
        assert_eq!(yearly[0].year, "2024");
        assert_eq!(yearly[0].amount, 100.0);
    }

    #[test]
    fn income_is_attributed_by_scheduled_date_not_completion_date() {
        let repo = test_repo();
        repo.save_client(&client("c1", "A", 80.0)).unwrap();
        // Scheduled in June, finished in July.
        let mut j = job_on("j1", "c1", local_noon(2024, 6, 28), true);
        j.completed_date = Some(local_noon(2024, 7, 2));
        repo.save_job(&j).unwrap();

        let months = monthly_income(&repo, "2024");
        assert_eq!(months[5].amount, 80.0);
        assert_eq!(months[6].amount, 0.0);
    }

    #[test]
    fn incomplete_jobs_never_contribute() {
        let repo = test_repo();
        repo.save_client(&client("c1", "A", 50.0)).unwrap();
        repo.save_job(&job_on("j1", "c1", local_noon(2024, 3, 10), false))
            .unwrap();

        assert!(monthly_income(&repo, "2024").iter().all(|m| m.amount == 0.0));
        assert!(yearly_income(&repo).iter().all(|y| y.amount == 0.0));
    }

    #[test]
    fn monthly_total_matches_yearly_amount() {
        let repo = test_repo();
        repo.save_client(&client("c1", "A", 45.0)).unwrap();
        repo.save_client(&client("c2", "B", 60.0)).unwrap();
        let visits: [(&str, u32, u32); 4] = [("c1", 1, 5), ("c1", 1, 19), ("c2", 4, 2), ("c2", 11, 30)];
        for (i, (cid, month, day)) in visits.iter().enumerate() {
            repo.save_job(&job_on(&format!("j{i}"), cid, local_noon(2023, *month, *day), true))
                .unwrap();
        }

        let yearly = yearly_income(&repo);
        let year = yearly.iter().find(|y| y.year == "2023").unwrap();
        let monthly_sum: f64 = monthly_income(&repo, "2023").iter().map(|m| m.amount).sum();
        assert_eq!(monthly_sum, year.amount);
        assert_eq!(year.amount, 210.0);
    }

    #[test]
    fn yearly_income_sorts_years_descending() {
        let repo = test_repo();
        repo.save_client(&client("c1", "A", 10.0)).unwrap();
        for (i, year) in [2022, 2024, 2023].iter().enumerate() {
            repo.save_job(&job_on(&format!("j{i}"), "c1", local_noon(*year, 5, 1), true))
                .unwrap();
        }

        let years: Vec<String> = yearly_income(&repo).into_iter().map(|y| y.year).collect();
        assert_eq!(years, vec!["2024", "2023", "2022"]);
    }

    #[test]
    fn orphaned_jobs_are_excluded_from_sums_without_error() {
        let repo = test_repo();
        repo.save_client(&client("c1", "A", 50.0)).unwrap();
        repo.save_job(&job_on("j1", "c1", local_noon(2024, 1, 15), true))
            .unwrap();
        repo.save_job(&job_on("j2", "deleted-client", local_noon(2024, 1, 20), true))
            .unwrap();

        let months = monthly_income(&repo, "2024");
        assert_eq!(months[0].amount, 50.0);
        assert_eq!(yearly_income(&repo)[0].amount, 50.0);
    }

    #[test]
    fn fully_orphaned_year_still_gets_an_entry_at_zero() {
        let repo = test_repo();
        repo.save_job(&job_on("j1", "deleted-client", local_noon(2021, 8, 1), true))
            .unwrap();

        let yearly = yearly_income(&repo);
        assert_eq!(yearly.len(), 1);
        assert_eq!(yearly[0].year, "2021");
        assert_eq!(yearly[0].amount, 0.0);
    }

    #[test]
    fn current_period_income_is_zero_on_empty_store() {
        let repo = test_repo();
        assert_eq!(current_year_income(&repo), 0.0);
        assert_eq!(current_month_income(&repo), 0.0);
    }

    #[test]
    fn current_period_income_reflects_todays_completed_jobs() {
        let repo = test_repo();
        repo.save_client(&client("c1", "A", 75.0)).unwrap();
        let today = Local::now().date_naive();
        repo.save_job(&job_on(
            "j1",
            "c1",
            local_noon(today.year(), today.month(), today.day()),
            true,
        ))
        .unwrap();

        assert_eq!(current_year_income(&repo), 75.0);
        assert_eq!(current_month_income(&repo), 75.0);
    }

    #[test]
    fn upcoming_window_is_inclusive_of_both_boundary_days() {
        let repo = test_repo();
        let today = Local::now().date_naive();
        let day = |offset: i64| {
            let d = today + Duration::days(offset);
            local_noon(d.year(), d.month(), d.day())
        };
        repo.save_job(&job_on("past", "c1", day(-1), false)).unwrap();
        repo.save_job(&job_on("today", "c1", day(0), false)).unwrap();
        repo.save_job(&job_on("edge", "c1", day(7), false)).unwrap();
        repo.save_job(&job_on("beyond", "c1", day(8), false)).unwrap();
        repo.save_job(&job_on("done", "c1", day(3), true)).unwrap();

        let ids: Vec<String> = upcoming_jobs_on(&repo, today, 7)
            .into_iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(ids, vec!["today", "edge"]);
    }

    #[test]
    fn upcoming_jobs_sort_soonest_first() {
        let repo = test_repo();
        let today = Local::now().date_naive();
        let day = |offset: i64| {
            let d = today + Duration::days(offset);
            local_noon(d.year(), d.month(), d.day())
        };
        repo.save_job(&job_on("j3", "c1", day(5), false)).unwrap();
        repo.save_job(&job_on("j1", "c1", day(1), false)).unwrap();
        repo.save_job(&job_on("j2", "c1", day(2), false)).unwrap();

        let ids: Vec<String> = upcoming_jobs_on(&repo, today, 7)
            .into_iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(ids, vec!["j1", "j2", "j3"]);
    }

    #[test]
    fn client_name_falls_back_for_dangling_reference() {
        let repo = test_repo();
        repo.save_client(&client("c1", "Ann", 50.0)).unwrap();
        assert_eq!(client_name(&repo, "c1"), "Ann");
        assert_eq!(client_name(&repo, "gone"), UNKNOWN_CLIENT);
    }

    #[test]
    fn client_detail_order_puts_open_jobs_first_then_latest_scheduled() {
        let mut jobs = vec![
            job_on("done-old", "c1", local_noon(2024, 1, 1), true),
            job_on("open-old", "c1", local_noon(2024, 2, 1), false),
            job_on("done-new", "c1", local_noon(2024, 3, 1), true),
            job_on("open-new", "c1", local_noon(2024, 4, 1), false),
        ];
        sort_client_jobs(&mut jobs);
        let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["open-new", "open-old", "done-new", "done-old"]);
    }

    #[test]
    fn completed_order_treats_missing_date_as_epoch() {
        let mut early = job_on("early", "c1", local_noon(2024, 1, 1), true);
        early.completed_date = Some(local_noon(2024, 1, 2));
        let mut late = job_on("late", "c1", local_noon(2024, 1, 1), true);
        late.completed_date = Some(local_noon(2024, 5, 2));
        let mut dateless = job_on("dateless", "c1", local_noon(2024, 1, 1), true);
        dateless.completed_date = None;

        let mut jobs = vec![dateless, early, late];
        sort_completed_jobs(&mut jobs);
        let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["late", "early", "dateless"]);
    }

    #[test]
    fn newest_oldest_toggle_keys_on_completion_when_available() {
        // Scheduled earlier but completed later than the open job.
        let mut finished = job_on("finished", "c1", local_noon(2024, 1, 1), true);
        finished.completed_date = Some(local_noon(2024, 6, 1));
        let open = job_on("open", "c1", local_noon(2024, 3, 1), false);

        let mut jobs = vec![open.clone(), finished.clone()];
        sort_jobs(&mut jobs, SortOrder::Newest);
        assert_eq!(jobs[0].id, "finished");

        sort_jobs(&mut jobs, SortOrder::Oldest);
        assert_eq!(jobs[0].id, "open");
    }

    #[test]
    fn completed_job_without_date_sorts_by_scheduled_date() {
        let mut inconsistent = job_on("inconsistent", "c1", local_noon(2024, 5, 1), true);
        inconsistent.completed_date = None;
        let open = job_on("open", "c1", local_noon(2024, 2, 1), false);

        let mut jobs = vec![open, inconsistent];
        sort_jobs(&mut jobs, SortOrder::Newest);
        assert_eq!(jobs[0].id, "inconsistent");
    }
}
