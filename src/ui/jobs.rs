use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone, Utc};
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};

use crate::models::Job;
use crate::repo::Repository;
use crate::reports::{self, SortOrder};
use crate::ui::components::centered_rect;

#[derive(Clone, Copy, PartialEq)]
pub enum JobsTab {
    Today,
    Upcoming,
    Completed,
    All,
}

impl JobsTab {
    fn next(self) -> Self {
        match self {
            Self::Today => Self::Upcoming,
            Self::Upcoming => Self::Completed,
            Self::Completed => Self::All,
            Self::All => Self::Today,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Today => 0,
            Self::Upcoming => 1,
            Self::Completed => 2,
            Self::All => 3,
        }
    }
}

pub struct JobsState {
    jobs: Vec<Job>,
    client_names: HashMap<String, String>,
    pub tab: JobsTab,
    pub order: SortOrder,
    list_state: ListState,
    show_delete_confirmation: bool,
}

impl JobsState {
    pub fn new(jobs: Vec<Job>, client_names: HashMap<String, String>) -> Self {
        let mut state = Self {
            jobs,
            client_names,
            tab: JobsTab::Today,
            order: SortOrder::Newest,
            list_state: ListState::default(),
            show_delete_confirmation: false,
        };
        state.clamp_selection();
        state
    }

    /// Jobs for the active tab, in that tab's order.
    pub fn visible(&self) -> Vec<Job> {
        let now = Utc::now();
        let today = Local::now().date_naive();
        let mut jobs: Vec<Job> = match self.tab {
            // Everything scheduled today, done or not.
            JobsTab::Today => self
                .jobs
                .iter()
                .filter(|j| reports::scheduled_day(j) == today)
                .cloned()
                .collect(),
            JobsTab::Upcoming => self
                .jobs
                .iter()
                .filter(|j| !j.completed && j.scheduled_date > now)
                .cloned()
                .collect(),
            JobsTab::Completed => self.jobs.iter().filter(|j| j.completed).cloned().collect(),
            JobsTab::All => self.jobs.clone(),
        };
        if self.tab == JobsTab::Completed {
            reports::sort_completed_jobs(&mut jobs);
        } else {
            reports::sort_jobs(&mut jobs, self.order);
        }
        jobs
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
        self.clamp_selection();
    }

    pub fn toggle_order(&mut self) {
        self.order = self.order.toggled();
    }

    pub fn next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i < len - 1 => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected_job(&self) -> Option<Job> {
        self.list_state
            .selected()
            .and_then(|i| self.visible().into_iter().nth(i))
    }

    pub fn selected_job_id(&self) -> Option<String> {
        self.selected_job().map(|j| j.id)
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.list_state.select(None);
        } else {
            match self.list_state.selected() {
                Some(i) if i < len => {}
                _ => self.list_state.select(Some(0)),
            }
        }
    }

    fn client_name(&self, client_id: &str) -> &str {
        self.client_names
            .get(client_id)
            .map_or(reports::UNKNOWN_CLIENT, String::as_str)
    }
}

pub enum JobAction {
    Back,
    NewJob,
    EditJob(String),
    DeleteJob(String),
    ToggleComplete(String),
    TogglePaid(String),
}

pub fn load_jobs_screen(repo: &Repository) -> JobsState {
    let jobs = repo.get_jobs();
    let client_names = repo
        .get_clients()
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    JobsState::new(jobs, client_names)
}

/// Flip a job's completed flag. The completion date is set and cleared with
/// the flag, never separately.
pub fn set_completed(repo: &Repository, id: &str, completed: bool) -> Result<()> {
    if let Some(mut job) = repo.get_job(id) {
        job.completed = completed;
        job.completed_date = completed.then(completion_timestamp);
        repo.save_job(&job)?;
    }
    Ok(())
}

/// Flip a job's paid flag, keeping the paid date in step with it.
pub fn set_paid(repo: &Repository, id: &str, paid: bool) -> Result<()> {
    if let Some(mut job) = repo.get_job(id) {
        job.paid = paid;
        job.paid_date = paid.then(Utc::now);
        repo.save_job(&job)?;
    }
    Ok(())
}

/// Today at local noon. Noon keeps the recorded day stable when the
/// timestamp is rendered back in any nearby timezone.
fn completion_timestamp() -> DateTime<Utc> {
    let today = Local::now().date_naive();
    today
        .and_hms_opt(12, 0, 0)
        .and_then(|noon| Local.from_local_datetime(&noon).single())
        .map_or_else(Utc::now, |ts| ts.with_timezone(&Utc))
}

pub fn render_jobs<B: Backend>(frame: &mut Frame<B>, state: &mut JobsState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(size);

    let visible = state.visible();

    let titles: Vec<Spans> = [
        format!("Today ({})", count_today(&state.jobs)),
        format!("Upcoming ({})", count_upcoming(&state.jobs)),
        format!(
            "Completed ({})",
            state.jobs.iter().filter(|j| j.completed).count()
        ),
        format!("All ({})", state.jobs.len()),
    ]
    .into_iter()
    .map(Spans::from)
    .collect();
    let order_label = match state.order {
        SortOrder::Newest => "newest first",
        SortOrder::Oldest => "oldest first",
    };
    let tabs = Tabs::new(titles)
        .select(state.tab.index())
        .block(
            Block::default()
                .title(format!("Jobs - {order_label}"))
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, chunks[0]);

    let items: Vec<ListItem> = visible
        .iter()
        .map(|job| {
            let date = job
                .scheduled_date
                .with_timezone(&Local)
                .format("%b %d, %Y")
                .to_string();
            let mut spans = vec![
                Span::raw(format!("{date}  ")),
                Span::raw(state.client_name(&job.client_id).to_string()),
            ];
            if job.completed {
                spans.push(Span::styled(
                    "  [Done]",
                    Style::default().fg(Color::Green),
                ));
            }
            if job.paid {
                spans.push(Span::styled("  [Paid]", Style::default().fg(Color::Cyan)));
            }
            ListItem::new(Spans::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, chunks[1], &mut state.list_state);

    let buttons_text = if state.selected_job().is_some() {
        "<Tab> Tabs | <O> Order | <N> New | <E> Edit | <C> Complete | <P> Paid | <D> Delete | <Esc> Back"
    } else {
        "<Tab> Tabs | <O> Order | <N> New Job | <Esc> Back"
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[2]);

    if state.show_delete_confirmation {
        render_delete_confirmation(frame, size);
    }
}

fn count_today(jobs: &[Job]) -> usize {
    let today = Local::now().date_naive();
    jobs.iter()
        .filter(|j| reports::scheduled_day(j) == today)
        .count()
}

fn count_upcoming(jobs: &[Job]) -> usize {
    let now = Utc::now();
    jobs.iter()
        .filter(|j| !j.completed && j.scheduled_date > now)
        .count()
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    let popup_area = centered_rect(50, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Delete this job?"),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(popup, popup_area);
}

pub fn handle_input(state: &mut JobsState) -> Result<Option<JobAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if state.show_delete_confirmation {
                    state.toggle_delete_confirmation();
                } else {
                    return Ok(Some(JobAction::Back));
                }
            }
            KeyCode::Tab => {
                if !state.show_delete_confirmation {
                    state.next_tab();
                }
            }
            KeyCode::Char('o') => {
                if !state.show_delete_confirmation {
                    state.toggle_order();
                }
            }
            KeyCode::Char('n') => {
                if state.show_delete_confirmation {
                    state.toggle_delete_confirmation();
                } else {
                    return Ok(Some(JobAction::NewJob));
                }
            }
            KeyCode::Char('e') => {
                if !state.show_delete_confirmation {
                    if let Some(id) = state.selected_job_id() {
                        return Ok(Some(JobAction::EditJob(id)));
                    }
                }
            }
            KeyCode::Char('c') => {
                if !state.show_delete_confirmation {
                    if let Some(id) = state.selected_job_id() {
                        return Ok(Some(JobAction::ToggleComplete(id)));
                    }
                }
            }
            KeyCode::Char('p') => {
                if !state.show_delete_confirmation {
                    if let Some(id) = state.selected_job_id() {
                        return Ok(Some(JobAction::TogglePaid(id)));
                    }
                }
            }
            KeyCode::Char('d') => {
                if !state.show_delete_confirmation && state.selected_job().is_some() {
                    state.toggle_delete_confirmation();
                }
            }
            KeyCode::Char('y') => {
                if state.show_delete_confirmation {
                    if let Some(id) = state.selected_job_id() {
                        state.toggle_delete_confirmation();
                        return Ok(Some(JobAction::DeleteJob(id)));
                    }
                }
            }
            KeyCode::Down => {
                if !state.show_delete_confirmation {
                    state.next();
                }
            }
            KeyCode::Up => {
                if !state.show_delete_confirmation {
                    state.previous();
                }
            }
            _ => {}
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn test_repo() -> Repository {
        Repository::new(Box::new(MemoryStore::new()))
    }

    fn job(id: &str) -> Job {
        Job {
            id: id.to_string(),
            client_id: "c1".to_string(),
            scheduled_date: Utc::now(),
            completed: false,
            completed_date: None,
            paid: false,
            paid_date: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn completing_sets_date_and_uncompleting_clears_it() {
        let repo = test_repo();
        repo.save_job(&job("j1")).unwrap();

        set_completed(&repo, "j1", true).unwrap();
        let done = repo.get_job("j1").unwrap();
        assert!(done.completed);
        assert!(done.completed_date.is_some());

        set_completed(&repo, "j1", false).unwrap();
        let undone = repo.get_job("j1").unwrap();
        assert!(!undone.completed);
        assert!(undone.completed_date.is_none());
    }

    #[test]
    fn paying_sets_date_and_unpaying_clears_it() {
        let repo = test_repo();
        repo.save_job(&job("j1")).unwrap();

        set_paid(&repo, "j1", true).unwrap();
        let paid = repo.get_job("j1").unwrap();
        assert!(paid.paid);
        assert!(paid.paid_date.is_some());

        set_paid(&repo, "j1", false).unwrap();
        let unpaid = repo.get_job("j1").unwrap();
        assert!(!unpaid.paid);
        assert!(unpaid.paid_date.is_none());
    }

    #[test]
    fn toggling_a_missing_job_is_a_no_op() {
        let repo = test_repo();
        set_completed(&repo, "ghost", true).unwrap();
        set_paid(&repo, "ghost", true).unwrap();
        assert!(repo.get_jobs().is_empty());
    }

    #[test]
    fn completion_timestamp_lands_on_today() {
        let ts = completion_timestamp();
        assert_eq!(
            ts.with_timezone(&Local).date_naive(),
            Local::now().date_naive()
        );
    }
}
