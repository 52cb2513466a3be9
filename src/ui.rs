// UI layer: an interactive menu built on `dialoguer`, standing in for the
// desktop form. It owns the in-memory connection list, the selected
// connection and the current access token; `api` and `store` stay
// stateless.

use crate::api::{AccessToken, ContentClient};
use crate::store::{ConnectionProfile, ConnectionStore, StoreError};
use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::{Confirm, Editor, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// State behind the menu. Every change to the list is saved right away;
/// if the save fails the list is put back the way it was.
pub struct Session {
    store: ConnectionStore,
    connections: Vec<ConnectionProfile>,
    selected: Option<usize>,
    token: Option<AccessToken>,
}

impl Session {
    /// Load the stored connections. Nothing is selected yet.
    pub fn open(store: ConnectionStore) -> Result<Self, StoreError> {
        let connections = store.load()?;
        Ok(Self {
            store,
            connections,
            selected: None,
            token: None,
        })
    }

    pub fn connections(&self) -> &[ConnectionProfile] {
        &self.connections
    }

    pub fn selected(&self) -> Option<&ConnectionProfile> {
        self.selected.and_then(|i| self.connections.get(i))
    }

    /// Change the selection. Any token from the previous connection is
    /// dropped.
    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index.filter(|&i| i < self.connections.len());
        self.token = None;
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    pub fn set_token(&mut self, token: Option<AccessToken>) {
        self.token = token;
    }

    /// Append a connection, save, and select it.
    pub fn add(&mut self, profile: ConnectionProfile) -> Result<(), StoreError> {
        self.connections.push(profile);
        if let Err(e) = self.store.save(&self.connections) {
            self.connections.pop();
            return Err(e);
        }
        self.select(Some(self.connections.len() - 1));
        Ok(())
    }

    /// Replace the selected connection and save. Returns `Ok(false)` when
    /// nothing is selected.
    pub fn update_selected(&mut self, profile: ConnectionProfile) -> Result<bool, StoreError> {
        let Some(i) = self.selected else {
            return Ok(false);
        };
        let previous = std::mem::replace(&mut self.connections[i], profile);
        if let Err(e) = self.store.save(&self.connections) {
            self.connections[i] = previous;
            return Err(e);
        }
        self.token = None;
        Ok(true)
    }

    /// Remove the selected connection and save. Returns the removed
    /// profile, or `None` when nothing is selected.
    pub fn remove_selected(&mut self) -> Result<Option<ConnectionProfile>, StoreError> {
        let Some(i) = self.selected else {
            return Ok(None);
        };
        let removed = self.connections.remove(i);
        if let Err(e) = self.store.save(&self.connections) {
            self.connections.insert(i, removed);
            return Err(e);
        }
        self.select(None);
        Ok(Some(removed))
    }
}

/// Main interactive menu. Runs until the user chooses "Exit".
pub async fn main_menu(client: ContentClient, store: ConnectionStore) -> Result<()> {
    let mut session = Session::open(store).context("Failed to load saved connections")?;

    loop {
        let status = match session.selected() {
            Some(p) if session.token().is_some() => format!("Connected: {p}"),
            Some(p) => format!("Selected: {p}"),
            None => "No connection selected.".to_string(),
        };
        println!("{}", status.dim());

        let items = vec![
            "Select connection",
            "Connect",
            "New connection",
            "Edit connection",
            "Remove connection",
            "Send content request",
            "Exit",
        ];
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => handle_select(&mut session)?,
            1 => handle_connect(&client, &mut session).await?,
            2 => handle_new(&mut session)?,
            3 => handle_edit(&mut session)?,
            4 => handle_remove(&mut session)?,
            5 => handle_send(&client, &session).await?,
            6 => break,
            _ => {}
        }
    }
    Ok(())
}

fn handle_select(session: &mut Session) -> Result<()> {
    if session.connections().is_empty() {
        println!("{}", "No connections saved yet. Create one first.".yellow());
        return Ok(());
    }
    let index = Select::new()
        .with_prompt("Connection")
        .items(session.connections())
        .default(0)
        .interact_opt()?;
    session.select(index);
    Ok(())
}

async fn handle_connect(client: &ContentClient, session: &mut Session) -> Result<()> {
    let Some(profile) = session.selected().cloned() else {
        println!("{}", "Please select a connection first.".yellow());
        return Ok(());
    };

    let spinner = spinner("Requesting access token..")?;
    let result = client
        .get_access_token(&profile.base_url, &profile.client_id, &profile.client_secret)
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(token) => {
            info!(connection = %profile, "connected");
            session.set_token(Some(token));
            println!("{}", "Connection successful!".green());
        }
        Err(e) => {
            session.set_token(None);
            println!("{} {}", "Connection failed:".red(), e);
        }
    }
    Ok(())
}

fn handle_new(session: &mut Session) -> Result<()> {
    let Some(profile) = prompt_profile(None)? else {
        return Ok(());
    };
    let name = profile.display_name.clone();
    match session.add(profile) {
        Ok(()) => println!("{}", format!("Connection \"{name}\" saved.").green()),
        Err(e) => println!("{} {}", "Saving failed:".red(), e),
    }
    Ok(())
}

fn handle_edit(session: &mut Session) -> Result<()> {
    let Some(current) = session.selected().cloned() else {
        println!("{}", "Please select a connection first.".yellow());
        return Ok(());
    };
    let Some(profile) = prompt_profile(Some(&current))? else {
        return Ok(());
    };
    let name = profile.display_name.clone();
    match session.update_selected(profile) {
        Ok(_) => println!("{}", format!("Connection \"{name}\" saved.").green()),
        Err(e) => println!("{} {}", "Saving failed:".red(), e),
    }
    Ok(())
}

fn handle_remove(session: &mut Session) -> Result<()> {
    let Some(name) = session.selected().map(|p| p.display_name.clone()) else {
        println!("{}", "Please select a connection first.".yellow());
        return Ok(());
    };
    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Are you sure you want to remove the connection \"{name}\"?"
        ))
        .default(false)
        .interact()?;
    if !confirmed {
        return Ok(());
    }
    match session.remove_selected() {
        Ok(_) => println!("{}", format!("Connection \"{name}\" removed.").green()),
        Err(e) => println!("{} {}", "Removing failed:".red(), e),
    }
    Ok(())
}

async fn handle_send(client: &ContentClient, session: &Session) -> Result<()> {
    let (Some(profile), Some(token)) = (session.selected(), session.token()) else {
        println!("{}", "Please connect first.".yellow());
        return Ok(());
    };

    let body = read_payload()?;
    if body.trim().is_empty() {
        println!("{}", "Request body cannot be empty.".yellow());
        return Ok(());
    }

    let spinner = spinner("Sending request...")?;
    let result = client.create_content(&profile.base_url, token, &body).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            println!("{}", "Content created successfully!".green());
            println!("{response}");
        }
        Err(e) => println!("{}\n{}", "Request failed:".red(), e),
    }
    Ok(())
}

/// Ask for all four connection fields. `Ok(None)` means the form was
/// cancelled or left incomplete.
fn prompt_profile(current: Option<&ConnectionProfile>) -> Result<Option<ConnectionProfile>> {
    let defaults = current.cloned().unwrap_or_default();
    let display_name = prompt_text("Display name", &defaults.display_name)?;
    let base_url = prompt_text("Base URL", &defaults.base_url)?;
    let client_id = prompt_text("Client ID", &defaults.client_id)?;
    // `Password` hides input in terminal; empty input keeps the old secret.
    let mut client_secret: String = Password::new()
        .with_prompt("Client secret")
        .allow_empty_password(current.is_some())
        .interact()?;
    if client_secret.is_empty() {
        client_secret = defaults.client_secret;
    }

    match ConnectionProfile::new(&display_name, &base_url, &client_id, &client_secret) {
        Ok(profile) => Ok(Some(profile)),
        Err(e) => {
            println!("{}", e.to_string().yellow());
            Ok(None)
        }
    }
}

fn prompt_text(prompt: &str, default: &str) -> Result<String> {
    let mut input = Input::<String>::new();
    input.with_prompt(prompt).allow_empty(true);
    if !default.is_empty() {
        input.with_initial_text(default);
    }
    Ok(input.interact_text()?)
}

/// Get the JSON body for the content request from an editor or a file.
fn read_payload() -> Result<String> {
    let sources = vec!["Write in editor", "Open JSON file", "Enter file path"];
    let source = Select::new()
        .with_prompt("Request body")
        .items(&sources)
        .default(0)
        .interact()?;

    let path = match source {
        0 => {
            let text = Editor::new().extension(".json").edit("{\n}\n")?;
            return Ok(text.unwrap_or_default());
        }
        1 => rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file(),
        _ => None,
    };
    let path = match path {
        Some(p) => p,
        None => {
            let typed: String = Input::new().with_prompt("JSON file path").interact_text()?;
            PathBuf::from(typed)
        }
    };
    std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Spinner shown while a request is in flight.
fn spinner(message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn profile(name: &str) -> ConnectionProfile {
        ConnectionProfile::new(name, "https://cms.example.com", "id", "secret").unwrap()
    }

    fn session(dir: &TempDir) -> Session {
        Session::open(ConnectionStore::new(dir.path().join("connections.json"))).unwrap()
    }

    #[test]
    fn add_saves_and_selects() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        s.add(profile("A")).unwrap();
        s.add(profile("B")).unwrap();

        assert_eq!(s.selected().map(|p| p.display_name.as_str()), Some("B"));
        assert_eq!(session(&dir).connections(), s.connections());
    }

    #[test]
    fn selecting_drops_token() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        s.add(profile("A")).unwrap();
        s.set_token(Some(AccessToken::new("tok")));
        s.select(Some(0));
        assert!(s.token().is_none());
    }

    #[test]
    fn select_out_of_range_clears_selection() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        s.add(profile("A")).unwrap();
        s.select(Some(5));
        assert!(s.selected().is_none());
    }

    #[test]
    fn update_replaces_selected() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        s.add(profile("A")).unwrap();
        s.add(profile("B")).unwrap();
        s.select(Some(0));

        assert!(s.update_selected(profile("A2")).unwrap());
        let names: Vec<_> = session(&dir)
            .connections()
            .iter()
            .map(|p| p.display_name.clone())
            .collect();
        assert_eq!(names, ["A2", "B"]);
    }

    #[test]
    fn remove_without_selection_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        s.add(profile("A")).unwrap();
        s.select(None);
        assert!(s.remove_selected().unwrap().is_none());
        assert_eq!(s.connections().len(), 1);
    }

    #[test]
    fn remove_deletes_from_disk() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        s.add(profile("A")).unwrap();
        s.add(profile("B")).unwrap();
        s.select(Some(0));

        let removed = s.remove_selected().unwrap().unwrap();
        assert_eq!(removed.display_name, "A");
        assert!(s.selected().is_none());
        assert_eq!(session(&dir).connections(), [profile("B")]);
    }

    #[test]
    fn failed_save_leaves_list_untouched() {
        let dir = TempDir::new().unwrap();
        // The store path is a directory, so every write fails.
        let mut s = Session {
            store: ConnectionStore::new(dir.path()),
            connections: Vec::new(),
            selected: None,
            token: None,
        };
        assert!(s.add(profile("A")).is_err());
        assert!(s.connections().is_empty());
        assert!(s.selected().is_none());
    }
}
