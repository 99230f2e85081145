mod cli;
mod config;
mod logging;
mod models;
mod repo;
mod reports;
mod store;
mod ui;

use std::io;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};

use crate::repo::Repository;
use crate::ui::{
    client_detail::{
        ClientDetailAction, ClientDetailState, handle_input as handle_client_detail_input,
        load_client_detail, render_client_detail,
    },
    client_wizard::{
        ClientWizardAction, ClientWizardState, handle_input as handle_client_wizard_input,
        render_client_wizard,
    },
    clients::{
        ClientAction, ClientsState, handle_input as handle_clients_input, load_clients,
        render_clients,
    },
    dashboard::{
        DashboardAction, DashboardState, handle_input as handle_dashboard_input, load_dashboard,
        render_dashboard,
    },
    job_wizard::{
        JobWizardAction, JobWizardState, handle_input as handle_job_wizard_input,
        render_job_wizard,
    },
    jobs::{
        JobAction, JobsState, handle_input as handle_jobs_input, load_jobs_screen, render_jobs,
        set_completed, set_paid,
    },
};

// Represents the current screen in the app
enum AppScreen {
    Dashboard,
    Clients,
    ClientDetail,
    ClientWizard(ScreenTarget),
    Jobs,
    JobWizard(ScreenTarget),
}

/// Where a wizard goes when it closes.
#[derive(Clone)]
enum ScreenTarget {
    Dashboard,
    Clients,
    ClientDetail(String),
    Jobs,
}

// Main application state
struct AppState {
    repo: Repository,
    screen: AppScreen,
    dashboard_state: Option<DashboardState>,
    clients_state: Option<ClientsState>,
    client_detail_state: Option<ClientDetailState>,
    client_wizard_state: Option<ClientWizardState>,
    jobs_state: Option<JobsState>,
    job_wizard_state: Option<JobWizardState>,
}

impl AppState {
    fn new(repo: Repository) -> Self {
        Self {
            repo,
            screen: AppScreen::Dashboard,
            dashboard_state: None,
            clients_state: None,
            client_detail_state: None,
            client_wizard_state: None,
            jobs_state: None,
            job_wizard_state: None,
        }
    }
}

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // Load configuration; the CLI flag wins over the environment.
    let config = config::init()?;
    let data_dir = args.data_dir.unwrap_or_else(|| config.data_dir());
    logging::init(&data_dir)?;
    tracing::info!(data_dir = %data_dir.display(), "starting lawncare manager");

    let repo = repo::init(&data_dir)?;

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state and land on the dashboard
    let mut app_state = AppState::new(repo);
    show_dashboard(&mut app_state);

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state);

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        println!("Error: {err}");
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| match app_state.screen {
            AppScreen::Dashboard => {
                if let Some(state) = &app_state.dashboard_state {
                    render_dashboard(f, state);
                }
            }
            AppScreen::Clients => {
                if let Some(state) = &mut app_state.clients_state {
                    render_clients(f, state);
                }
            }
            AppScreen::ClientDetail => {
                if let Some(state) = &mut app_state.client_detail_state {
                    render_client_detail(f, state);
                }
            }
            AppScreen::ClientWizard(_) => {
                if let Some(state) = &app_state.client_wizard_state {
                    render_client_wizard(f, state);
                }
            }
            AppScreen::Jobs => {
                if let Some(state) = &mut app_state.jobs_state {
                    render_jobs(f, state);
                }
            }
            AppScreen::JobWizard(_) => {
                if let Some(state) = &app_state.job_wizard_state {
                    render_job_wizard(f, state);
                }
            }
        })?;

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Dashboard => handle_dashboard_screen(app_state)?,
            AppScreen::Clients => handle_clients_screen(app_state)?,
            AppScreen::ClientDetail => handle_client_detail_screen(app_state)?,
            AppScreen::ClientWizard(_) => handle_client_wizard_screen(app_state)?,
            AppScreen::Jobs => handle_jobs_screen(app_state)?,
            AppScreen::JobWizard(_) => handle_job_wizard_screen(app_state)?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

// Screen loaders: every navigation re-reads the store so each screen sees
// the latest collections.

fn show_dashboard(app_state: &mut AppState) {
    app_state.dashboard_state = Some(load_dashboard(&app_state.repo));
    app_state.screen = AppScreen::Dashboard;
}

fn show_clients(app_state: &mut AppState) {
    app_state.clients_state = Some(ClientsState::new(load_clients(&app_state.repo)));
    app_state.screen = AppScreen::Clients;
}

fn show_client_detail(app_state: &mut AppState, client_id: &str) {
    match load_client_detail(&app_state.repo, client_id) {
        Some(state) => {
            app_state.client_detail_state = Some(state);
            app_state.screen = AppScreen::ClientDetail;
        }
        // The client is gone (deleted elsewhere); fall back to the list.
        None => show_clients(app_state),
    }
}

fn show_jobs(app_state: &mut AppState) {
    app_state.jobs_state = Some(load_jobs_screen(&app_state.repo));
    app_state.screen = AppScreen::Jobs;
}

fn show_target(app_state: &mut AppState, target: &ScreenTarget) {
    match target {
        ScreenTarget::Dashboard => show_dashboard(app_state),
        ScreenTarget::Clients => show_clients(app_state),
        ScreenTarget::ClientDetail(id) => {
            let id = id.clone();
            show_client_detail(app_state, &id);
        }
        ScreenTarget::Jobs => show_jobs(app_state),
    }
}

fn open_client_wizard(app_state: &mut AppState, state: ClientWizardState, back: ScreenTarget) {
    app_state.client_wizard_state = Some(state);
    app_state.screen = AppScreen::ClientWizard(back);
}

fn open_job_wizard(app_state: &mut AppState, state: JobWizardState, back: ScreenTarget) {
    app_state.job_wizard_state = Some(state);
    app_state.screen = AppScreen::JobWizard(back);
}

fn handle_dashboard_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.dashboard_state {
        Some(state) => handle_dashboard_input(state)?,
        None => None,
    };

    match action {
        Some(DashboardAction::Exit) => return Ok(true),
        Some(DashboardAction::Clients) => show_clients(app_state),
        Some(DashboardAction::Jobs) => show_jobs(app_state),
        Some(DashboardAction::NewClient) => {
            open_client_wizard(app_state, ClientWizardState::new(), ScreenTarget::Dashboard);
        }
        Some(DashboardAction::NewJob) => {
            let clients = load_clients(&app_state.repo);
            open_job_wizard(
                app_state,
                JobWizardState::new(clients, None),
                ScreenTarget::Dashboard,
            );
        }
        None => {}
    }

    Ok(false)
}

fn handle_clients_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.clients_state {
        Some(state) => handle_clients_input(state)?,
        None => None,
    };

    match action {
        Some(ClientAction::Back) => show_dashboard(app_state),
        Some(ClientAction::SelectClient(client_id)) => {
            show_client_detail(app_state, &client_id);
        }
        Some(ClientAction::NewClient) => {
            open_client_wizard(app_state, ClientWizardState::new(), ScreenTarget::Clients);
        }
        Some(ClientAction::EditClient(client_id)) => {
            if let Some(client) = app_state.repo.get_client(&client_id) {
                open_client_wizard(
                    app_state,
                    ClientWizardState::from_existing(client),
                    ScreenTarget::Clients,
                );
            }
        }
        Some(ClientAction::DeleteClient(client_id)) => {
            // Removes the client and every job that references it.
            app_state.repo.delete_client(&client_id)?;
            show_clients(app_state);
        }
        None => {}
    }

    Ok(false)
}

fn handle_client_detail_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.client_detail_state {
        Some(state) => handle_client_detail_input(state)?,
        None => None,
    };

    match action {
        Some(ClientDetailAction::Back) => show_clients(app_state),
        Some(ClientDetailAction::EditClient(client_id)) => {
            if let Some(client) = app_state.repo.get_client(&client_id) {
                open_client_wizard(
                    app_state,
                    ClientWizardState::from_existing(client),
                    ScreenTarget::ClientDetail(client_id),
                );
            }
        }
        Some(ClientDetailAction::DeleteClient(client_id)) => {
            app_state.repo.delete_client(&client_id)?;
            show_clients(app_state);
        }
        Some(ClientDetailAction::ScheduleJob(client_id)) => {
            let clients = load_clients(&app_state.repo);
            open_job_wizard(
                app_state,
                JobWizardState::new(clients, Some(&client_id)),
                ScreenTarget::ClientDetail(client_id),
            );
        }
        Some(ClientDetailAction::EditJob(job_id)) => {
            if let Some(job) = app_state.repo.get_job(&job_id) {
                let clients = load_clients(&app_state.repo);
                let back = ScreenTarget::ClientDetail(job.client_id.clone());
                open_job_wizard(app_state, JobWizardState::from_existing(clients, job), back);
            }
        }
        Some(ClientDetailAction::ToggleComplete(job_id)) => {
            if let Some(job) = app_state.repo.get_job(&job_id) {
                set_completed(&app_state.repo, &job_id, !job.completed)?;
                reload_client_detail(app_state);
            }
        }
        Some(ClientDetailAction::TogglePaid(job_id)) => {
            if let Some(job) = app_state.repo.get_job(&job_id) {
                set_paid(&app_state.repo, &job_id, !job.paid)?;
                reload_client_detail(app_state);
            }
        }
        Some(ClientDetailAction::DeleteJob(job_id)) => {
            app_state.repo.delete_job(&job_id)?;
            reload_client_detail(app_state);
        }
        None => {}
    }

    Ok(false)
}

fn reload_client_detail(app_state: &mut AppState) {
    let client_id = app_state
        .client_detail_state
        .as_ref()
        .map(|state| state.client.id.clone());
    if let Some(client_id) = client_id {
        show_client_detail(app_state, &client_id);
    }
}

fn handle_jobs_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.jobs_state {
        Some(state) => handle_jobs_input(state)?,
        None => None,
    };

    match action {
        Some(JobAction::Back) => show_dashboard(app_state),
        Some(JobAction::NewJob) => {
            let clients = load_clients(&app_state.repo);
            open_job_wizard(
                app_state,
                JobWizardState::new(clients, None),
                ScreenTarget::Jobs,
            );
        }
        Some(JobAction::EditJob(job_id)) => {
            if let Some(job) = app_state.repo.get_job(&job_id) {
                let clients = load_clients(&app_state.repo);
                open_job_wizard(
                    app_state,
                    JobWizardState::from_existing(clients, job),
                    ScreenTarget::Jobs,
                );
            }
        }
        Some(JobAction::ToggleComplete(job_id)) => {
            if let Some(job) = app_state.repo.get_job(&job_id) {
                set_completed(&app_state.repo, &job_id, !job.completed)?;
                reload_jobs(app_state);
            }
        }
        Some(JobAction::TogglePaid(job_id)) => {
            if let Some(job) = app_state.repo.get_job(&job_id) {
                set_paid(&app_state.repo, &job_id, !job.paid)?;
                reload_jobs(app_state);
            }
        }
        Some(JobAction::DeleteJob(job_id)) => {
            app_state.repo.delete_job(&job_id)?;
            reload_jobs(app_state);
        }
        None => {}
    }

    Ok(false)
}

/// Reload the jobs screen without losing the active tab and sort order.
fn reload_jobs(app_state: &mut AppState) {
    let previous = app_state
        .jobs_state
        .as_ref()
        .map(|state| (state.tab, state.order));
    let mut fresh = load_jobs_screen(&app_state.repo);
    if let Some((tab, order)) = previous {
        fresh.tab = tab;
        fresh.order = order;
    }
    app_state.jobs_state = Some(fresh);
    app_state.screen = AppScreen::Jobs;
}

fn handle_client_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.client_wizard_state {
        Some(state) => handle_client_wizard_input(state)?,
        None => None,
    };

    let back = match &app_state.screen {
        AppScreen::ClientWizard(back) => back.clone(),
        _ => ScreenTarget::Clients,
    };

    match action {
        Some(ClientWizardAction::Cancel) => {
            app_state.client_wizard_state = None;
            show_target(app_state, &back);
        }
        Some(ClientWizardAction::Save(client)) => {
            app_state.repo.save_client(&client)?;
            app_state.client_wizard_state = None;
            show_target(app_state, &back);
        }
        None => {}
    }

    Ok(false)
}

fn handle_job_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.job_wizard_state {
        Some(state) => handle_job_wizard_input(state)?,
        None => None,
    };

    let back = match &app_state.screen {
        AppScreen::JobWizard(back) => back.clone(),
        _ => ScreenTarget::Jobs,
    };

    match action {
        Some(JobWizardAction::Cancel) => {
            app_state.job_wizard_state = None;
            show_target(app_state, &back);
        }
        Some(JobWizardAction::Save(job)) => {
            app_state.repo.save_job(&job)?;
            app_state.job_wizard_state = None;
            show_target(app_state, &back);
        }
        None => {}
    }

    Ok(false)
}
