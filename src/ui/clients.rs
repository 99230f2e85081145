use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::Client;
use crate::repo::Repository;
use crate::ui::components::centered_rect;

// Represents the state of the client list screen
pub struct ClientsState {
    clients: Vec<Client>,
    filter: String,
    filtering: bool,
    list_state: ListState,
    show_delete_confirmation: bool,
}

impl ClientsState {
    pub fn new(clients: Vec<Client>) -> Self {
        let mut list_state = ListState::default();
        if !clients.is_empty() {
            list_state.select(Some(0));
        }

        Self {
            clients,
            filter: String::new(),
            filtering: false,
            list_state,
            show_delete_confirmation: false,
        }
    }

    /// Clients matching the filter, case-insensitively, on name or address.
    fn visible(&self) -> Vec<&Client> {
        if self.filter.is_empty() {
            return self.clients.iter().collect();
        }
        let needle = self.filter.to_lowercase();
        self.clients
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.address.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }

    pub fn selected_client(&self) -> Option<&Client> {
        self.list_state
            .selected()
            .and_then(|i| self.visible().get(i).copied())
    }

    pub fn selected_client_id(&self) -> Option<String> {
        self.selected_client().map(|c| c.id.clone())
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
}

pub enum ClientAction {
    Back,
    NewClient,
    EditClient(String),
    DeleteClient(String),
    SelectClient(String),
}

/// Clients in display order: by name, case-insensitively.
pub fn load_clients(repo: &Repository) -> Vec<Client> {
    let mut clients = repo.get_clients();
    clients.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    clients
}

pub fn render_clients<B: Backend>(frame: &mut Frame<B>, state: &mut ClientsState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(size);

    let filter_label = if state.filtering {
        format!("Search: {}_", state.filter)
    } else if state.filter.is_empty() {
        "Press </> to search".to_string()
    } else {
        format!("Search: {} (</> to edit)", state.filter)
    };
    let filter_line = Paragraph::new(filter_label)
        .block(Block::default().title("Clients").borders(Borders::ALL));
    frame.render_widget(filter_line, chunks[0]);

    let items: Vec<ListItem> = state
        .visible()
        .iter()
        .map(|client| {
            ListItem::new(Spans::from(vec![
                Span::raw(client.name.clone()),
                Span::styled(
                    format!("  ${:.2}/visit", client.price),
                    Style::default().fg(Color::Green),
                ),
            ]))
        })
        .collect();

    let clients_list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(clients_list, chunks[1], &mut state.list_state);

    let buttons_text = if state.selected_client().is_some() {
        "<N> New Client | <E> Edit | <D> Delete | <Enter> Details | <Esc> Back"
    } else {
        "<N> New Client | <Esc> Back"
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[2]);

    if state.show_delete_confirmation {
        render_delete_confirmation(frame, size);
    }
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    let popup_area = centered_rect(50, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Are you sure you want to delete this client?"),
        Spans::from(""),
        Spans::from("All of this client's jobs will also be deleted."),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(popup, popup_area);
}

pub fn handle_input(state: &mut ClientsState) -> Result<Option<ClientAction>> {
    if let Event::Key(key) = event::read()? {
        if state.filtering {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => state.filtering = false,
                KeyCode::Backspace => {
                    state.filter.pop();
                    state.clamp_selection();
                }
                KeyCode::Char(c) => {
                    state.filter.push(c);
                    state.clamp_selection();
                }
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if state.show_delete_confirmation {
                    state.toggle_delete_confirmation();
                } else if !state.filter.is_empty() {
                    state.filter.clear();
                    state.clamp_selection();
                } else {
                    return Ok(Some(ClientAction::Back));
                }
            }
            KeyCode::Char('/') => {
                if !state.show_delete_confirmation {
                    state.filtering = true;
                }
            }
            KeyCode::Char('n') => {
                if state.show_delete_confirmation {
                    state.toggle_delete_confirmation();
                } else {
                    return Ok(Some(ClientAction::NewClient));
                }
            }
            KeyCode::Char('e') => {
                if !state.show_delete_confirmation {
                    if let Some(id) = state.selected_client_id() {
                        return Ok(Some(ClientAction::EditClient(id)));
                    }
                }
            }
            KeyCode::Char('d') => {
                if !state.show_delete_confirmation && state.selected_client().is_some() {
                    state.toggle_delete_confirmation();
                }
            }
            KeyCode::Char('y') => {
                if state.show_delete_confirmation {
                    if let Some(id) = state.selected_client_id() {
                        state.toggle_delete_confirmation();
                        return Ok(Some(ClientAction::DeleteClient(id)));
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
            KeyCode::Enter => {
                if !state.show_delete_confirmation {
                    if let Some(id) = state.selected_client_id() {
                        return Ok(Some(ClientAction::SelectClient(id)));
                    }
                }
            }
            _ => {}
        }
    }
    Ok(None)
}
