use anyhow::Result;
use chrono::Utc;
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

use crate::models::Client;

pub enum ClientWizardAction {
    Cancel,
    Save(Client),
}

#[derive(Clone, Copy, PartialEq)]
pub enum ClientField {
    Name,
    Phone,
    Address,
    Price,
    Notes,
}

pub struct ClientWizardState {
    existing: Option<Client>,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub price: String,
    pub notes: String,
    pub current_field: ClientField,
    pub editing: bool,
}

impl ClientWizardState {
    pub fn new() -> Self {
        Self {
            existing: None,
            name: String::new(),
            phone: String::new(),
            address: String::new(),
            price: String::new(),
            notes: String::new(),
            current_field: ClientField::Name,
            editing: false,
        }
    }

    pub fn from_existing(client: Client) -> Self {
        Self {
            name: client.name.clone(),
            phone: client.phone.clone(),
            address: client.address.clone(),
            price: format!("{:.2}", client.price),
            notes: client.notes.clone().unwrap_or_default(),
            existing: Some(client),
            current_field: ClientField::Name,
            editing: false,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            ClientField::Name => ClientField::Phone,
            ClientField::Phone => ClientField::Address,
            ClientField::Address => ClientField::Price,
            ClientField::Price => ClientField::Notes,
            ClientField::Notes => ClientField::Name,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            ClientField::Name => ClientField::Notes,
            ClientField::Phone => ClientField::Name,
            ClientField::Address => ClientField::Phone,
            ClientField::Price => ClientField::Address,
            ClientField::Notes => ClientField::Price,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let field_value = match self.current_field {
            ClientField::Name => &mut self.name,
            ClientField::Phone => &mut self.phone,
            ClientField::Address => &mut self.address,
            ClientField::Price => &mut self.price,
            ClientField::Notes => &mut self.notes,
        };

        match key {
            KeyCode::Char(c) => {
                // The price field only accepts a decimal number.
                if self.current_field == ClientField::Price
                    && !(c.is_ascii_digit() || c == '.')
                {
                    return;
                }
                field_value.push(c);
            }
            KeyCode::Backspace => {
                field_value.pop();
            }
            _ => {}
        }
    }

    fn parsed_price(&self) -> Option<f64> {
        self.price.trim().parse::<f64>().ok().filter(|p| *p > 0.0)
    }

    /// Form-level validation: the store does not re-check any of this.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.phone.trim().is_empty()
            && !self.address.trim().is_empty()
            && self.parsed_price().is_some()
    }

    /// The client to persist, or None while the form is invalid. A new
    /// client gets a fresh id and creation timestamp; an edit keeps both.
    pub fn build_client(&self) -> Option<Client> {
        let price = self.parsed_price()?;
        if !self.is_valid() {
            return None;
        }
        let notes = self.notes.trim();
        let (id, created_at) = match &self.existing {
            Some(client) => (client.id.clone(), client.created_at),
            None => (Uuid::new_v4().to_string(), Utc::now()),
        };
        Some(Client {
            id,
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            price,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
            created_at,
        })
    }
}

pub fn render_client_wizard<B: Backend>(frame: &mut Frame<B>, state: &ClientWizardState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(size);

    let title = if state.existing.is_some() {
        "Edit Client"
    } else {
        "New Client"
    };
    let header = Paragraph::new(title)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let fields = [
        (ClientField::Name, "Name", state.name.as_str()),
        (ClientField::Phone, "Phone", state.phone.as_str()),
        (ClientField::Address, "Address", state.address.as_str()),
        (ClientField::Price, "Price per visit ($)", state.price.as_str()),
        (ClientField::Notes, "Notes (optional)", state.notes.as_str()),
    ];

    let mut lines: Vec<Spans> = Vec::new();
    for (field, label, value) in fields {
        let focused = state.current_field == field;
        let marker = if focused {
            if state.editing { "» " } else { "> " }
        } else {
            "  "
        };
        let style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let cursor = if focused && state.editing { "_" } else { "" };
        lines.push(Spans::from(vec![
            Span::styled(format!("{marker}{label}: "), style),
            Span::raw(format!("{value}{cursor}")),
        ]));
        lines.push(Spans::from(""));
    }

    if !state.is_valid() {
        lines.push(Spans::from(Span::styled(
            "Name, phone and address are required; price must be greater than 0.",
            Style::default().fg(Color::Red),
        )));
    }

    let form = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(form, chunks[1]);

    let buttons_text = if state.editing {
        "<Enter/Esc> Done editing"
    } else if state.is_valid() {
        "<Up/Down> Move | <Enter> Edit field | <S> Save | <Esc> Cancel"
    } else {
        "<Up/Down> Move | <Enter> Edit field | <Esc> Cancel"
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[2]);
}

pub fn handle_input(state: &mut ClientWizardState) -> Result<Option<ClientWizardAction>> {
    if let Event::Key(key) = event::read()? {
        if state.editing {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => state.toggle_editing(),
                other => state.edit_current_field(other),
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Ok(Some(ClientWizardAction::Cancel)),
            KeyCode::Up => state.previous_field(),
            KeyCode::Down | KeyCode::Tab => state.next_field(),
            KeyCode::Enter => state.toggle_editing(),
            KeyCode::Char('s') => {
                if let Some(client) = state.build_client() {
                    return Ok(Some(ClientWizardAction::Save(client)));
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

    fn filled_form() -> ClientWizardState {
        let mut state = ClientWizardState::new();
        state.name = "Ann Lee".to_string();
        state.phone = "555-0100".to_string();
        state.address = "12 Elm St".to_string();
        state.price = "45".to_string();
        state
    }

    #[test]
    fn complete_form_builds_a_client() {
        let state = filled_form();
        let client = state.build_client().unwrap();
        assert_eq!(client.name, "Ann Lee");
        assert_eq!(client.price, 45.0);
        assert!(client.notes.is_none());
        assert!(!client.id.is_empty());
    }

    #[test]
    fn missing_required_field_is_invalid() {
        let mut state = filled_form();
        state.address.clear();
        assert!(!state.is_valid());
        assert!(state.build_client().is_none());
    }

    #[test]
    fn price_must_be_positive() {
        let mut state = filled_form();
        state.price = "0".to_string();
        assert!(!state.is_valid());
        state.price = "-5".to_string();
        assert!(!state.is_valid());
        state.price = "37.50".to_string();
        assert!(state.is_valid());
    }

    #[test]
    fn editing_keeps_id_and_creation_date() {
        let original = filled_form().build_client().unwrap();
        let mut state = ClientWizardState::from_existing(original.clone());
        state.name = "Ann B. Lee".to_string();
        let updated = state.build_client().unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.name, "Ann B. Lee");
    }

    #[test]
    fn price_field_rejects_letters() {
        let mut state = ClientWizardState::new();
        state.current_field = ClientField::Price;
        state.editing = true;
        for c in "4x5".chars() {
            state.edit_current_field(KeyCode::Char(c));
        }
        assert_eq!(state.price, "45");
    }
}
