use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use uuid::Uuid;

use crate::models::{Client, Job};
use crate::ui::components::date_input::DateInputState;

pub enum JobWizardAction {
    Cancel,
    Save(Job),
}

#[derive(Clone, Copy, PartialEq)]
pub enum JobField {
    Client,
    Date,
    Notes,
}

pub struct JobWizardState {
    existing: Option<Job>,
    clients: Vec<Client>,
    client_index: usize,
    client_locked: bool,
    pub date: DateInputState,
    pub notes: String,
    pub current_field: JobField,
    pub editing: bool,
}

impl JobWizardState {
    /// Wizard for a new job. When `client_id` is given (scheduling from a
    /// client's detail screen) the client picker is preselected and locked.
    pub fn new(clients: Vec<Client>, client_id: Option<&str>) -> Self {
        let client_index = client_id
            .and_then(|id| clients.iter().position(|c| c.id == id))
            .unwrap_or(0);
        Self {
            existing: None,
            client_locked: client_id.is_some()
                && clients.get(client_index).is_some_and(|c| Some(c.id.as_str()) == client_id),
            clients,
            client_index,
            date: DateInputState::new(Local::now().date_naive()),
            notes: String::new(),
            current_field: JobField::Client,
            editing: false,
        }
    }

    pub fn from_existing(clients: Vec<Client>, job: Job) -> Self {
        let client_index = clients
            .iter()
            .position(|c| c.id == job.client_id)
            .unwrap_or(0);
        Self {
            client_index,
            client_locked: false,
            date: DateInputState::new(job.scheduled_date.with_timezone(&Local).date_naive()),
            notes: job.notes.clone().unwrap_or_default(),
            existing: Some(job),
            clients,
            current_field: JobField::Client,
            editing: false,
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            JobField::Client => JobField::Date,
            JobField::Date => JobField::Notes,
            JobField::Notes => JobField::Client,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            JobField::Client => JobField::Notes,
            JobField::Date => JobField::Client,
            JobField::Notes => JobField::Date,
        };
    }

    pub fn next_client(&mut self) {
        if self.client_locked || self.clients.is_empty() {
            return;
        }
        self.client_index = (self.client_index + 1) % self.clients.len();
    }

    pub fn previous_client(&mut self) {
        if self.client_locked || self.clients.is_empty() {
            return;
        }
        self.client_index = match self.client_index {
            0 => self.clients.len() - 1,
            i => i - 1,
        };
    }

    pub fn selected_client(&self) -> Option<&Client> {
        self.clients.get(self.client_index)
    }

    pub fn is_valid(&self) -> bool {
        self.selected_client().is_some()
    }

    /// The job to persist, or None while no client can be selected. An edit
    /// keeps the job's identity and its completion and payment state.
    pub fn build_job(&self) -> Option<Job> {
        let client = self.selected_client()?;
        let scheduled_date = schedule_timestamp(self.date.date);
        let notes = self.notes.trim();
        let notes = (!notes.is_empty()).then(|| notes.to_string());
        Some(match &self.existing {
            Some(job) => Job {
                client_id: client.id.clone(),
                scheduled_date,
                notes,
                ..job.clone()
            },
            None => Job {
                id: Uuid::new_v4().to_string(),
                client_id: client.id.clone(),
                scheduled_date,
                completed: false,
                completed_date: None,
                paid: false,
                paid_date: None,
                notes,
                created_at: Utc::now(),
            },
        })
    }
}

/// The chosen day at local noon, stored as UTC. Noon keeps the day stable
/// when the timestamp is rendered back in any nearby timezone.
fn schedule_timestamp(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(12, 0, 0)
        .and_then(|noon| Local.from_local_datetime(&noon).single())
        .map_or_else(Utc::now, |ts| ts.with_timezone(&Utc))
}

pub fn render_job_wizard<B: Backend>(frame: &mut Frame<B>, state: &JobWizardState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(size);

    let title = if state.existing.is_some() {
        "Edit Job"
    } else {
        "Schedule Job"
    };
    let header = Paragraph::new(title)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let focus_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let marker = |field: JobField| {
        if state.current_field == field {
            if state.editing { "» " } else { "> " }
        } else {
            "  "
        }
    };
    let style_for = |field: JobField| {
        if state.current_field == field {
            focus_style
        } else {
            Style::default()
        }
    };

    let client_label = match state.selected_client() {
        Some(client) => {
            if state.client_locked {
                format!("{} (fixed)", client.name)
            } else {
                format!("< {} >", client.name)
            }
        }
        None => "no clients yet - add one first".to_string(),
    };
    let notes_cursor = if state.current_field == JobField::Notes && state.editing {
        "_"
    } else {
        ""
    };

    let mut lines = vec![
        Spans::from(""),
        Spans::from(vec![
            Span::styled(format!("{}Client: ", marker(JobField::Client)), style_for(JobField::Client)),
            Span::raw(client_label),
        ]),
        Spans::from(""),
        Spans::from(vec![
            Span::styled(format!("{}Date: ", marker(JobField::Date)), style_for(JobField::Date)),
            Span::raw(state.date.display()),
        ]),
        Spans::from(""),
        Spans::from(vec![
            Span::styled(format!("{}Notes: ", marker(JobField::Notes)), style_for(JobField::Notes)),
            Span::raw(format!("{}{notes_cursor}", state.notes)),
        ]),
    ];
    if !state.is_valid() {
        lines.push(Spans::from(""));
        lines.push(Spans::from(Span::styled(
            "A job needs a client.",
            Style::default().fg(Color::Red),
        )));
    }

    let form = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(form, chunks[1]);

    let buttons_text = if state.editing {
        "<Enter/Esc> Done editing"
    } else if state.is_valid() {
        "<Up/Down> Move | <Left/Right> Pick client | <Enter> Edit field | <S> Save | <Esc> Cancel"
    } else {
        "<Esc> Cancel"
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[2]);
}

pub fn handle_input(state: &mut JobWizardState) -> Result<Option<JobWizardAction>> {
    if let Event::Key(key) = event::read()? {
        if state.editing {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => {
                    state.editing = false;
                    if state.date.editing {
                        state.date.toggle_editing();
                    }
                }
                other => match state.current_field {
                    JobField::Date => state.date.handle_input(other),
                    JobField::Notes => match other {
                        KeyCode::Char(c) => state.notes.push(c),
                        KeyCode::Backspace => {
                            state.notes.pop();
                        }
                        _ => {}
                    },
                    JobField::Client => {}
                },
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Ok(Some(JobWizardAction::Cancel)),
            KeyCode::Up => state.previous_field(),
            KeyCode::Down | KeyCode::Tab => state.next_field(),
            KeyCode::Left => {
                if state.current_field == JobField::Client {
                    state.previous_client();
                }
            }
            KeyCode::Right => {
                if state.current_field == JobField::Client {
                    state.next_client();
                }
            }
            KeyCode::Enter => match state.current_field {
                JobField::Date => {
                    state.editing = true;
                    state.date.toggle_editing();
                }
                JobField::Notes => state.editing = true,
                JobField::Client => {}
            },
            KeyCode::Char('s') => {
                if let Some(job) = state.build_job() {
                    return Ok(Some(JobWizardAction::Save(job)));
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

    fn client(id: &str, name: &str) -> Client {
        Client {
            id: id.to_string(),
            name: name.to_string(),
            phone: "555-0100".to_string(),
            address: "12 Elm St".to_string(),
            price: 40.0,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn new_job_starts_unfinished_and_unpaid() {
        let state = JobWizardState::new(vec![client("c1", "Ann")], None);
        let job = state.build_job().unwrap();
        assert_eq!(job.client_id, "c1");
        assert!(!job.completed && job.completed_date.is_none());
        assert!(!job.paid && job.paid_date.is_none());
        assert!(!job.id.is_empty());
    }

    #[test]
    fn no_clients_means_no_job() {
        let state = JobWizardState::new(Vec::new(), None);
        assert!(!state.is_valid());
        assert!(state.build_job().is_none());
    }

    #[test]
    fn locked_client_cannot_be_changed() {
        let clients = vec![client("c1", "Ann"), client("c2", "Bob")];
        let mut state = JobWizardState::new(clients, Some("c2"));
        state.next_client();
        state.previous_client();
        assert_eq!(state.build_job().unwrap().client_id, "c2");
    }

    #[test]
    fn editing_preserves_completion_and_payment_state() {
        let clients = vec![client("c1", "Ann")];
        let done_at = Utc::now();
        let original = Job {
            id: "j1".to_string(),
            client_id: "c1".to_string(),
            scheduled_date: Utc::now(),
            completed: true,
            completed_date: Some(done_at),
            paid: true,
            paid_date: Some(done_at),
            notes: Some("side gate".to_string()),
            created_at: done_at,
        };
        let state = JobWizardState::from_existing(clients, original.clone());
        let updated = state.build_job().unwrap();
        assert_eq!(updated.id, "j1");
        assert!(updated.completed);
        assert_eq!(updated.completed_date, Some(done_at));
        assert!(updated.paid);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[test]
    fn scheduled_timestamp_round_trips_to_the_chosen_day() {
        let day = NaiveDate::from_ymd_opt(2024, 9, 14).unwrap();
        let ts = schedule_timestamp(day);
        assert_eq!(ts.with_timezone(&Local).date_naive(), day);
    }
}
