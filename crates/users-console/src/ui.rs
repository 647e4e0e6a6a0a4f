use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, FormField, SignInField, View};

pub fn draw(f: &mut Frame, app: &App) {
    match app.view {
        View::SignIn => draw_sign_in(f, app),
        View::Users => draw_users(f, app),
        View::Form => {
            draw_users(f, app);
            draw_form(f, app);
        }
    }

    if let Some(ref error) = app.error_message {
        draw_error_popup(f, error);
    }
}

/// Full-screen error shown when the client cannot start.
pub fn draw_fatal(f: &mut Frame, message: &str) {
    let area = f.area();

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Error: {message}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to exit",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(block);

    f.render_widget(text, centered_rect(70, 30, area));
}

fn input_block(title: &str, active: bool) -> Block<'_> {
    let style = if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style)
}

fn draw_sign_in(f: &mut Frame, app: &App) {
    let form_area = centered_rect(50, 50, f.area());

    let form_block = Block::default()
        .title(" Sign in ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = form_block.inner(form_area);
    f.render_widget(form_block, form_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Email
            Constraint::Length(3), // Password
            Constraint::Length(2), // Hint
            Constraint::Min(0),
        ])
        .split(inner);

    let email = Paragraph::new(app.sign_in_email.as_str()).block(input_block(
        " Email ",
        app.sign_in_field == SignInField::Email,
    ));
    f.render_widget(email, chunks[0]);

    let masked = "*".repeat(app.sign_in_password.chars().count());
    let password = Paragraph::new(masked).block(input_block(
        " Password ",
        app.sign_in_field == SignInField::Password,
    ));
    f.render_widget(password, chunks[1]);

    let hint = Paragraph::new("Tab: switch field | Enter: sign in | Esc: quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(hint, chunks[2]);
}

fn draw_users(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let who = app
        .api
        .auth()
        .current()
        .and_then(|identity| identity.email.or(identity.display_name))
        .unwrap_or_else(|| "Signed out".to_string());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "USERS",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(who, Style::default().fg(Color::Yellow)),
    ]))
    .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, chunks[0]);

    let rows = app.users.iter().map(|user| {
        Row::new(vec![
            Cell::from(user.record.name.as_str()),
            Cell::from(user.record.email.as_str()),
            Cell::from(user.record.created_at.as_str()),
            Cell::from(user.record.updated_at.as_str()),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(20),
            Constraint::Percentage(30),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ],
    )
    .header(
        Row::new(vec!["Name", "Email", "Created", "Updated"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
    .block(
        Block::default()
            .title(format!(" {} users ", app.users.len()))
            .borders(Borders::ALL),
    );

    let mut state = TableState::default();
    if !app.users.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(table, chunks[1], &mut state);

    let status = app.status_message.as_deref().unwrap_or(
        "j/k: move | n: new | e: edit | d: delete | r: refresh | o: sign out | q: quit",
    );
    f.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}

fn draw_form(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 40, f.area());
    f.render_widget(Clear, area);

    let title = if app.form.editing.is_some() {
        " Edit user "
    } else {
        " New user "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let name = Paragraph::new(app.form.name.as_str())
        .block(input_block(" Name ", app.form.field == FormField::Name));
    f.render_widget(name, chunks[0]);

    let email = Paragraph::new(app.form.email.as_str())
        .block(input_block(" Email ", app.form.field == FormField::Email));
    f.render_widget(email, chunks[1]);

    let hint = Paragraph::new("Tab: switch field | Enter: save | Esc: cancel")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(hint, chunks[2]);
}

fn draw_error_popup(f: &mut Frame, error: &str) {
    let area = centered_rect(60, 20, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let text = Paragraph::new(error)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(block);

    f.render_widget(text, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;

    #[test]
    fn fatal_screen_shows_the_message() {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

        terminal
            .draw(|f| draw_fatal(f, "Missing required environment variables: X"))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Missing required"));
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(50, 40, area);

        assert!(inner.x >= area.x && inner.right() <= area.right());
        assert!(inner.y >= area.y && inner.bottom() <= area.bottom());
        assert_eq!(inner.width, 50);
    }
}
