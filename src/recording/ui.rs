//! Terminal user interface for the record workflow.
//!
//! Shows a start screen while idle and, during recording, a live level
//! sparkline with the elapsed time in `MM:SS`. The elapsed display is
//! recomputed from the wall clock on every tick, so it stays correct even
//! when rendering stalls.

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    widgets::{Paragraph, Sparkline},
};
use std::error::Error;
use std::io::{stdout, Stdout};

use super::session::{format_elapsed, RecorderState};

/// User input command during the record workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderCommand {
    /// Keep going (no key pressed)
    Continue,
    /// Begin recording (Enter while idle)
    Start,
    /// Stop recording and upload (Enter while recording)
    Stop,
    /// Exit without uploading (Escape or 'q')
    Cancel,
}

/// Terminal UI for the record workflow.
pub struct RecorderTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    level_history: Vec<u64>,
    last_level_time: std::time::Instant,
    level_interval: std::time::Duration,
    terminal_width: usize,
    sample_rate: u32,
}

impl RecorderTui {
    /// Creates a new TUI instance and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new(sample_rate: u32) -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let size = terminal.size()?;
        let terminal_width = size.width as usize;

        Ok(RecorderTui {
            terminal,
            level_history: vec![0u64; terminal_width],
            last_level_time: std::time::Instant::now(),
            level_interval: std::time::Duration::from_millis(50),
            terminal_width,
            sample_rate,
        })
    }

    /// Updates the rate used to size the level-meter window.
    ///
    /// Called once the stream is open, since the device may capture at a
    /// different rate than the one requested.
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }

    /// Renders the idle screen shown before recording starts.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_idle(&mut self) -> Result<(), Box<dyn Error>> {
        self.terminal.draw(|frame| {
            let area = frame.area();

            let lines = vec![
                Line::from(Span::styled(
                    "vnote recorder",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from("Press Enter to start recording"),
                Line::from(Span::styled(
                    "Esc or q to quit",
                    Style::default().fg(Color::DarkGray),
                )),
            ];

            let vertical_pad = area.height.saturating_sub(lines.len() as u16) / 2;
            let centered = Rect {
                x: area.x,
                y: area.y + vertical_pad,
                width: area.width,
                height: area.height.saturating_sub(vertical_pad),
            };

            let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
            frame.render_widget(paragraph, centered);
        })?;

        Ok(())
    }

    /// Renders the recording screen: level sparkline plus a footer with the
    /// elapsed time.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_recording(
        &mut self,
        recent_samples: &[i16],
        elapsed_secs: u64,
    ) -> Result<(), Box<dyn Error>> {
        let level = input_level_percent(recent_samples, self.sample_rate);

        if self.last_level_time.elapsed() >= self.level_interval {
            self.level_history.push(level as u64);
            if self.level_history.len() > self.terminal_width {
                let excess = self.level_history.len() - self.terminal_width;
                self.level_history.drain(0..excess);
            }
            self.last_level_time = std::time::Instant::now();
        }

        let size = self.terminal.size()?;
        let current_width = size.width as usize;
        if current_width != self.terminal_width {
            self.terminal_width = current_width;
            self.level_history.resize(current_width, 0);
        }

        let elapsed_display = format_elapsed(elapsed_secs);

        self.terminal.draw(|frame| {
            let area = frame.area();
            let footer_height = 1;

            let sparkline_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(footer_height),
            };

            let sparkline = Sparkline::default()
                .data(&self.level_history)
                .max(100)
                .style(Style::default().fg(Color::Rgb(206, 224, 220)));

            frame.render_widget(sparkline, sparkline_area);

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(footer_height),
                width: area.width,
                height: footer_height,
            };

            let footer = ratatui::widgets::Paragraph::new(Line::from(vec![
                Span::styled("● ", Style::default().fg(Color::Red)),
                Span::raw(elapsed_display.clone()),
                Span::styled(
                    "   Enter: stop and upload · Esc: cancel",
                    Style::default().fg(Color::DarkGray),
                ),
            ]));

            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Processes user input and returns the appropriate command for the
    /// current recorder state.
    ///
    /// Enter starts while idle and stops while recording; it is ignored while
    /// the microphone request is in flight. Escape, 'q', and Ctrl+C cancel.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self, state: RecorderState) -> Result<RecorderCommand, Box<dyn Error>> {
        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Enter if state.can_start() => {
                        tracing::debug!("Enter pressed: starting recording");
                        RecorderCommand::Start
                    }
                    KeyCode::Enter if state.can_stop() => {
                        tracing::debug!("Enter pressed: stopping recording");
                        RecorderCommand::Stop
                    }
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Escape or 'q' pressed: cancelling");
                        RecorderCommand::Cancel
                    }
                    KeyCode::Char('c')
                        if key
                            .modifiers
                            .contains(crossterm::event::KeyModifiers::CONTROL) =>
                    {
                        tracing::debug!("Ctrl+C pressed: cancelling");
                        RecorderCommand::Cancel
                    }
                    _ => RecorderCommand::Continue,
                });
            }
        }
        Ok(RecorderCommand::Continue)
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> Result<(), Box<dyn Error>> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// Maps the RMS of the most recent ~50ms of samples to a 0-100 level.
///
/// A square-root curve keeps quiet speech visible without letting loud
/// input pin the meter.
fn input_level_percent(samples: &[i16], sample_rate: u32) -> u8 {
    if samples.is_empty() {
        return 0;
    }

    let window = std::cmp::min((sample_rate / 20) as usize, samples.len()).max(1);
    let recent = &samples[samples.len() - window..];

    let sum_of_squares: f64 = recent
        .iter()
        .map(|&s| {
            let normalized = s as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();
    let rms = (sum_of_squares / recent.len() as f64).sqrt();

    (rms.sqrt() * 100.0).clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_silence_is_zero() {
        assert_eq!(input_level_percent(&[0; 800], 16000), 0);
        assert_eq!(input_level_percent(&[], 16000), 0);
    }

    #[test]
    fn test_level_full_scale_is_maxed() {
        let loud = vec![i16::MAX; 800];
        assert_eq!(input_level_percent(&loud, 16000), 100);
    }

    #[test]
    fn test_level_window_follows_sample_rate() {
        // 100ms of silence followed by 50ms of full-scale input at 16kHz
        let mut samples = vec![0i16; 1600];
        samples.extend(std::iter::repeat(i16::MAX).take(800));

        // At 16kHz the 50ms window covers only the loud tail; at 48kHz it
        // reaches back into the silence and the reading drops
        let at_device_rate = input_level_percent(&samples, 16000);
        let at_wrong_rate = input_level_percent(&samples, 48000);
        assert_eq!(at_device_rate, 100);
        assert!(at_wrong_rate < at_device_rate);
    }
}
