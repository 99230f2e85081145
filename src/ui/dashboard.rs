use anyhow::Result;
use chrono::{Datelike, Local};
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{BarChart, Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{Client, Job, YearlyIncome};
use crate::repo::Repository;
use crate::reports;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// How far ahead the dashboard's upcoming list looks, in days.
const UPCOMING_WINDOW_DAYS: i64 = 7;

pub struct DashboardState {
    current_month_income: f64,
    current_year_income: f64,
    yearly: Vec<YearlyIncome>,
    year_index: usize,
    upcoming: Vec<(Job, String)>,
    clients: Vec<Client>,
}

impl DashboardState {
    pub fn selected_year(&self) -> Option<&YearlyIncome> {
        self.yearly.get(self.year_index)
    }

    pub fn next_year(&mut self) {
        // Years are listed newest first, so "next" moves back in time.
        if self.year_index + 1 < self.yearly.len() {
            self.year_index += 1;
        }
    }

    pub fn previous_year(&mut self) {
        self.year_index = self.year_index.saturating_sub(1);
    }
}

pub enum DashboardAction {
    Exit,
    Clients,
    Jobs,
    NewClient,
    NewJob,
}

pub fn load_dashboard(repo: &Repository) -> DashboardState {
    let yearly = reports::yearly_income(repo);
    let current_year = Local::now().year().to_string();
    let year_index = yearly
        .iter()
        .position(|y| y.year == current_year)
        .unwrap_or(0);
    let upcoming = reports::upcoming_jobs(repo, UPCOMING_WINDOW_DAYS)
        .into_iter()
        .map(|job| {
            let name = reports::client_name(repo, &job.client_id);
            (job, name)
        })
        .collect();

    DashboardState {
        current_month_income: reports::current_month_income(repo),
        current_year_income: reports::current_year_income(repo),
        yearly,
        year_index,
        upcoming,
        clients: repo.get_clients(),
    }
}

pub fn render_dashboard<B: Backend>(frame: &mut Frame<B>, state: &DashboardState) {
    let size = frame.size();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(9),
            Constraint::Length(3),
        ])
        .split(size);

    let stats = Paragraph::new(Spans::from(vec![
        Span::raw("This month: "),
        Span::styled(
            format!("${:.0}", state.current_month_income),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw("    This year: "),
        Span::styled(
            format!("${:.0}", state.current_year_income),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("    Clients: {}", state.clients.len())),
    ]))
    .block(Block::default().title("Dashboard").borders(Borders::ALL));
    frame.render_widget(stats, rows[0]);

    render_income_chart(frame, state, rows[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[2]);

    let upcoming_items: Vec<ListItem> = if state.upcoming.is_empty() {
        vec![ListItem::new("No upcoming jobs scheduled")]
    } else {
        state
            .upcoming
            .iter()
            .map(|(job, name)| {
                let date = job
                    .scheduled_date
                    .with_timezone(&Local)
                    .format("%a %b %d")
                    .to_string();
                ListItem::new(Spans::from(vec![
                    Span::styled(date, Style::default().fg(Color::Yellow)),
                    Span::raw(format!("  {name}")),
                ]))
            })
            .collect()
    };
    let upcoming_list = List::new(upcoming_items).block(
        Block::default()
            .title(format!("Upcoming Jobs (next {UPCOMING_WINDOW_DAYS} days)"))
            .borders(Borders::ALL),
    );
    frame.render_widget(upcoming_list, columns[0]);

    let client_items: Vec<ListItem> = if state.clients.is_empty() {
        vec![ListItem::new("No clients yet - press <A> to add one")]
    } else {
        state
            .clients
            .iter()
            .take(5)
            .map(|client| {
                ListItem::new(Spans::from(vec![
                    Span::raw(client.name.clone()),
                    Span::styled(
                        format!("  ${:.0}", client.price),
                        Style::default().fg(Color::Green),
                    ),
                ]))
            })
            .collect()
    };
    let clients_list = List::new(client_items)
        .block(Block::default().title("Clients").borders(Borders::ALL));
    frame.render_widget(clients_list, columns[1]);

    let buttons = Paragraph::new(
        "<C> Clients | <J> Jobs | <A> Add Client | <N> Schedule Job | <Left/Right> Year | <Q> Quit",
    )
    .block(Block::default().borders(Borders::TOP))
    .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, rows[3]);
}

fn render_income_chart<B: Backend>(
    frame: &mut Frame<B>,
    state: &DashboardState,
    area: tui::layout::Rect,
) {
    let Some(year) = state.selected_year() else {
        let empty = Paragraph::new("No completed jobs yet - income will chart here.")
            .block(Block::default().title("Income").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    };

    let data: Vec<(&str, u64)> = year
        .monthly_breakdown
        .iter()
        .enumerate()
        .map(|(i, m)| (MONTH_NAMES[i], m.amount.round().max(0.0) as u64))
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(format!(
                    "Income {} - ${:.0} total",
                    year.year, year.amount
                ))
                .borders(Borders::ALL),
        )
        .data(&data)
        .bar_width(5)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(chart, area);
}

pub fn handle_input(state: &mut DashboardState) -> Result<Option<DashboardAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Some(DashboardAction::Exit)),
            KeyCode::Char('c') => return Ok(Some(DashboardAction::Clients)),
            KeyCode::Char('j') => return Ok(Some(DashboardAction::Jobs)),
            KeyCode::Char('a') => return Ok(Some(DashboardAction::NewClient)),
            KeyCode::Char('n') => return Ok(Some(DashboardAction::NewJob)),
            KeyCode::Left => state.previous_year(),
            KeyCode::Right => state.next_year(),
            _ => {}
        }
    }
    Ok(None)
}
