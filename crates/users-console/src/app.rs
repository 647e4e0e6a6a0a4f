use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use users_shared::{api::UserInput, User};

use crate::api::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    SignIn,
    Users,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInField {
    Email,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
}

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Refresh,
}

/// Create/edit form state. `editing` holds the id when editing an existing user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    pub editing: Option<String>,
    pub created_at: Option<String>,
    pub name: String,
    pub email: String,
    pub field: FormField,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            editing: None,
            created_at: None,
            name: String::new(),
            email: String::new(),
            field: FormField::Name,
        }
    }
}

impl UserForm {
    pub fn edit(user: &User) -> Self {
        Self {
            editing: Some(user.id.clone()),
            created_at: Some(user.record.created_at.clone()),
            name: user.record.name.clone(),
            email: user.record.email.clone(),
            field: FormField::Name,
        }
    }

    pub fn input(&self) -> UserInput {
        UserInput {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            created_at: self.created_at.clone(),
        }
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            FormField::Name => FormField::Email,
            FormField::Email => FormField::Name,
        };
    }

    fn active_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
        }
    }
}

/// Apply a character/backspace key to a text field. Returns whether it was consumed.
pub fn edit_text(text: &mut String, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            text.push(c);
            true
        }
        KeyCode::Backspace => {
            text.pop();
            true
        }
        _ => false,
    }
}

pub struct App {
    pub api: ApiClient,
    pub view: View,

    pub error_message: Option<String>,
    pub status_message: Option<String>,

    // Sign-in form
    pub sign_in_email: String,
    pub sign_in_password: String,
    pub sign_in_field: SignInField,

    // Users table
    pub users: Vec<User>,
    pub selected: usize,

    pub form: UserForm,
}

impl App {
    pub fn new(api: ApiClient) -> Self {
        let view = if api.auth().is_signed_in() {
            View::Users
        } else {
            View::SignIn
        };

        Self {
            api,
            view,
            error_message: None,
            status_message: None,
            sign_in_email: String::new(),
            sign_in_password: String::new(),
            sign_in_field: SignInField::Email,
            users: Vec::new(),
            selected: 0,
            form: UserForm::default(),
        }
    }

    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.users.get(self.selected)
    }

    /// Handle key events, returns true if app should quit
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        // Clear error on any key press
        if self.error_message.is_some() {
            self.error_message = None;
            return Ok(false);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(true);
        }

        match self.view {
            View::SignIn => self.handle_sign_in_key(key).await,
            View::Users => self.handle_users_key(key).await,
            View::Form => self.handle_form_key(key).await,
        }
    }

    async fn handle_sign_in_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Esc => return Ok(true),
            KeyCode::Tab | KeyCode::BackTab => {
                self.sign_in_field = match self.sign_in_field {
                    SignInField::Email => SignInField::Password,
                    SignInField::Password => SignInField::Email,
                };
            }
            KeyCode::Enter => self.sign_in().await,
            _ => {
                let field = match self.sign_in_field {
                    SignInField::Email => &mut self.sign_in_email,
                    SignInField::Password => &mut self.sign_in_password,
                };
                edit_text(field, key);
            }
        }
        Ok(false)
    }

    async fn sign_in(&mut self) {
        if self.sign_in_email.trim().is_empty() || self.sign_in_password.is_empty() {
            self.set_error("Email and password are required".to_string());
            return;
        }

        let result = self
            .api
            .auth_mut()
            .sign_in(self.sign_in_email.trim(), &self.sign_in_password)
            .await;

        match result {
            Ok(_) => {
                self.sign_in_password.clear();
                self.view = View::Users;
                self.refresh().await;
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    async fn handle_users_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected + 1 < self.users.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('r') => self.refresh().await,
            KeyCode::Char('n') => {
                self.form = UserForm::default();
                self.view = View::Form;
            }
            KeyCode::Char('e') | KeyCode::Enter => self.edit_selected().await,
            KeyCode::Char('d') => self.delete_selected().await,
            KeyCode::Char('o') => {
                if let Err(e) = self.api.auth_mut().sign_out() {
                    self.set_error(e.to_string());
                }
                self.users.clear();
                self.selected = 0;
                self.view = View::SignIn;
            }
            _ => {}
        }
        Ok(false)
    }

    async fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Esc => self.view = View::Users,
            KeyCode::Tab | KeyCode::BackTab => self.form.toggle_field(),
            KeyCode::Enter => self.save_form().await,
            _ => {
                edit_text(self.form.active_mut(), key);
            }
        }
        Ok(false)
    }

    async fn save_form(&mut self) {
        let input = self.form.input();
        let result = match self.form.editing.clone() {
            Some(id) => self.api.update_user(&id, &input).await,
            None => self.api.create_user(&input).await,
        };

        match result {
            Ok(user) => {
                self.status_message = Some(format!("Saved {}", user.record.name));
                self.view = View::Users;
                self.refresh().await;
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    /// Open the form on a fresh copy of the selected user.
    async fn edit_selected(&mut self) {
        let Some(id) = self.selected_user().map(|u| u.id.clone()) else {
            return;
        };

        match self.api.get_user(&id).await {
            Ok(user) => {
                self.form = UserForm::edit(&user);
                self.view = View::Form;
            }
            Err(e) => {
                self.set_error(e.to_string());
                self.refresh().await;
            }
        }
    }

    async fn delete_selected(&mut self) {
        let Some(id) = self.selected_user().map(|u| u.id.clone()) else {
            return;
        };

        match self.api.delete_user(&id).await {
            Ok(message) => {
                self.status_message = Some(message);
                self.refresh().await;
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    pub async fn refresh(&mut self) {
        let result = self.api.list_users().await;

        match result {
            Ok(users) => {
                self.users = users;
                self.selected = self.selected.min(self.users.len().saturating_sub(1));
            }
            Err(e) => {
                tracing::error!("Failed to load users: {}", e);
                self.set_error(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use users_shared::UserRecord;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn edit_text_types_and_deletes() {
        let mut text = String::new();

        assert!(edit_text(&mut text, key(KeyCode::Char('a'))));
        assert!(edit_text(&mut text, key(KeyCode::Char('b'))));
        assert!(edit_text(&mut text, key(KeyCode::Backspace)));
        assert!(!edit_text(&mut text, key(KeyCode::Left)));
        assert!(!edit_text(
            &mut text,
            KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL)
        ));

        assert_eq!(text, "a");
    }

    #[test]
    fn edit_form_keeps_id_and_created_at() {
        let user = UserRecord {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-02-01T00:00:00.000Z".to_string(),
        }
        .with_id("abc");

        let mut form = UserForm::edit(&user);
        form.toggle_field();
        edit_text(form.active_mut(), key(KeyCode::Char('!')));

        assert_eq!(form.editing.as_deref(), Some("abc"));
        assert_eq!(
            form.input(),
            UserInput {
                name: Some("Ada".to_string()),
                email: Some("ada@example.com!".to_string()),
                created_at: Some("2024-01-01T00:00:00.000Z".to_string()),
            }
        );
    }

    #[test]
    fn new_form_leaves_created_at_to_the_server() {
        let form = UserForm::default();
        assert_eq!(form.input().created_at, None);
        assert_eq!(form.field, FormField::Name);
    }
}
