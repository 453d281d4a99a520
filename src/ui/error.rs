//! Full-screen error display.
//!
//! The terminal counterpart of a blocking alert dialog: a red screen with a
//! short, generic message, dismissed by any key. Diagnostic detail belongs in
//! the logs, not here.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::Paragraph};
use std::io::{self, Stdout};

/// Blocking full-screen error message.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// Creates a new error screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(ErrorScreen { terminal })
    }

    /// Displays the message on a red background and waits for any key press.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn show_error(&mut self, error_message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();

                let background = Paragraph::new("")
                    .style(Style::default().bg(Color::Rgb(200, 30, 30)));
                frame.render_widget(background, area);

                let message = Paragraph::new(vec![
                    Line::from(Span::styled(
                        error_message.to_string(),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(Span::styled(
                        "press any key to continue",
                        Style::default().fg(Color::Rgb(255, 200, 200)),
                    )),
                ])
                .alignment(Alignment::Center)
                .wrap(ratatui::widgets::Wrap { trim: true })
                .style(Style::default().bg(Color::Rgb(200, 30, 30)));

                let inner = Rect {
                    x: area.x + area.width / 10,
                    y: area.y + area.height / 3,
                    width: area.width - area.width / 5,
                    height: area.height - area.height / 3,
                };

                frame.render_widget(message, inner);
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
