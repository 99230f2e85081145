use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};

use crate::models::{Client, Job};
use crate::repo::Repository;
use crate::reports;
use crate::ui::components::centered_rect;

#[derive(Clone, Copy, PartialEq)]
pub enum DetailTab {
    Details,
    Jobs,
}

pub struct ClientDetailState {
    pub client: Client,
    jobs: Vec<Job>,
    tab: DetailTab,
    list_state: ListState,
    show_delete_confirmation: bool,
}

impl ClientDetailState {
    pub fn new(client: Client, mut jobs: Vec<Job>) -> Self {
        reports::sort_client_jobs(&mut jobs);
        let mut list_state = ListState::default();
        if !jobs.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            client,
            jobs,
            tab: DetailTab::Details,
            list_state,
            show_delete_confirmation: false,
        }
    }

    pub fn toggle_tab(&mut self) {
        self.tab = match self.tab {
            DetailTab::Details => DetailTab::Jobs,
            DetailTab::Jobs => DetailTab::Details,
        };
    }

    pub fn next(&mut self) {
        if self.jobs.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i < self.jobs.len() - 1 => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.jobs.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.jobs.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected_job_id(&self) -> Option<String> {
        self.list_state
            .selected()
            .and_then(|i| self.jobs.get(i))
            .map(|j| j.id.clone())
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }
}

pub enum ClientDetailAction {
    Back,
    EditClient(String),
    DeleteClient(String),
    ScheduleJob(String),
    EditJob(String),
    ToggleComplete(String),
    TogglePaid(String),
    DeleteJob(String),
}

pub fn load_client_detail(repo: &Repository, client_id: &str) -> Option<ClientDetailState> {
    let client = repo.get_client(client_id)?;
    let jobs = repo.get_client_jobs(client_id);
    Some(ClientDetailState::new(client, jobs))
}

pub fn render_client_detail<B: Backend>(frame: &mut Frame<B>, state: &mut ClientDetailState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(size);

    let titles: Vec<Spans> = vec![
        Spans::from("Details"),
        Spans::from(format!("Jobs ({})", state.jobs.len())),
    ];
    let tabs = Tabs::new(titles)
        .select(match state.tab {
            DetailTab::Details => 0,
            DetailTab::Jobs => 1,
        })
        .block(
            Block::default()
                .title(state.client.name.clone())
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, chunks[0]);

    match state.tab {
        DetailTab::Details => render_details(frame, state, chunks[1]),
        DetailTab::Jobs => render_jobs_tab(frame, state, chunks[1]),
    }

    let buttons_text = match state.tab {
        DetailTab::Details => {
            "<Tab> Jobs | <S> Schedule Job | <E> Edit | <D> Delete | <Esc> Back"
        }
        DetailTab::Jobs => {
            "<Tab> Details | <S> Schedule | <C> Complete | <P> Paid | <Enter> Edit Job | <X> Delete Job | <Esc> Back"
        }
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[2]);

    if state.show_delete_confirmation {
        render_delete_confirmation(frame, size);
    }
}

fn render_details<B: Backend>(frame: &mut Frame<B>, state: &ClientDetailState, area: Rect) {
    let client = &state.client;
    let completed = state.jobs.iter().filter(|j| j.completed).count();
    let upcoming = state.jobs.len() - completed;
    let paid_total = state.jobs.iter().filter(|j| j.paid).count() as f64 * client.price;

    let mut lines = vec![
        Spans::from(""),
        Spans::from(vec![
            Span::styled("Phone:    ", Style::default().fg(Color::DarkGray)),
            Span::raw(client.phone.clone()),
        ]),
        Spans::from(vec![
            Span::styled("Address:  ", Style::default().fg(Color::DarkGray)),
            Span::raw(client.address.clone()),
        ]),
        Spans::from(vec![
            Span::styled("Price:    ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("${:.2} per visit", client.price),
                Style::default().fg(Color::Green),
            ),
        ]),
        Spans::from(vec![
            Span::styled("Since:    ", Style::default().fg(Color::DarkGray)),
            Span::raw(
                client
                    .created_at
                    .with_timezone(&Local)
                    .format("%B %d, %Y")
                    .to_string(),
            ),
        ]),
    ];
    if let Some(notes) = &client.notes {
        lines.push(Spans::from(vec![
            Span::styled("Notes:    ", Style::default().fg(Color::DarkGray)),
            Span::raw(notes.clone()),
        ]));
    }
    lines.push(Spans::from(""));
    lines.push(Spans::from(Span::styled(
        "Job Summary",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Spans::from(format!(
        "  {} total | {} completed | {} upcoming | ${:.0} collected",
        state.jobs.len(),
        completed,
        upcoming,
        paid_total,
    )));

    let details = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(details, area);
}

fn render_jobs_tab<B: Backend>(frame: &mut Frame<B>, state: &mut ClientDetailState, area: Rect) {
    let items: Vec<ListItem> = state
        .jobs
        .iter()
        .map(|job| {
            let date = job
                .scheduled_date
                .with_timezone(&Local)
                .format("%b %d, %Y")
                .to_string();
            let mut spans = vec![Span::raw(date)];
            if job.completed {
                spans.push(Span::styled("  [Done]", Style::default().fg(Color::Green)));
            } else {
                spans.push(Span::styled(
                    "  [Scheduled]",
                    Style::default().fg(Color::Yellow),
                ));
            }
            if job.paid {
                spans.push(Span::styled("  [Paid]", Style::default().fg(Color::Cyan)));
            }
            if let Some(notes) = &job.notes {
                spans.push(Span::styled(
                    format!("  {notes}"),
                    Style::default().fg(Color::DarkGray),
                ));
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
    frame.render_stateful_widget(list, area, &mut state.list_state);
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    let popup_area = centered_rect(50, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Delete this client?"),
        Spans::from(""),
        Spans::from("All of this client's jobs will also be deleted."),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(popup, popup_area);
}

pub fn handle_input(state: &mut ClientDetailState) -> Result<Option<ClientDetailAction>> {
    if let Event::Key(key) = event::read()? {
        if state.show_delete_confirmation {
            match key.code {
                KeyCode::Char('y') => {
                    state.toggle_delete_confirmation();
                    return Ok(Some(ClientDetailAction::DeleteClient(
                        state.client.id.clone(),
                    )));
                }
                KeyCode::Char('n') | KeyCode::Esc | KeyCode::Char('q') => {
                    state.toggle_delete_confirmation();
                }
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Some(ClientDetailAction::Back)),
            KeyCode::Tab => state.toggle_tab(),
            KeyCode::Char('s') => {
                return Ok(Some(ClientDetailAction::ScheduleJob(
                    state.client.id.clone(),
                )));
            }
            KeyCode::Char('e') => {
                if state.tab == DetailTab::Details {
                    return Ok(Some(ClientDetailAction::EditClient(state.client.id.clone())));
                }
            }
            KeyCode::Char('d') => {
                if state.tab == DetailTab::Details {
                    state.toggle_delete_confirmation();
                }
            }
            KeyCode::Char('c') => {
                if state.tab == DetailTab::Jobs {
                    if let Some(id) = state.selected_job_id() {
                        return Ok(Some(ClientDetailAction::ToggleComplete(id)));
                    }
                }
            }
            KeyCode::Char('p') => {
                if state.tab == DetailTab::Jobs {
                    if let Some(id) = state.selected_job_id() {
                        return Ok(Some(ClientDetailAction::TogglePaid(id)));
                    }
                }
            }
            KeyCode::Char('x') => {
                if state.tab == DetailTab::Jobs {
                    if let Some(id) = state.selected_job_id() {
                        return Ok(Some(ClientDetailAction::DeleteJob(id)));
                    }
                }
            }
            KeyCode::Enter => {
                if state.tab == DetailTab::Jobs {
                    if let Some(id) = state.selected_job_id() {
                        return Ok(Some(ClientDetailAction::EditJob(id)));
                    }
                }
            }
            KeyCode::Down => {
                if state.tab == DetailTab::Jobs {
                    state.next();
                }
            }
            KeyCode::Up => {
                if state.tab == DetailTab::Jobs {
                    state.previous();
                }
            }
            _ => {}
        }
    }
    Ok(None)
}
