use chrono::{DateTime, FixedOffset, Local, SecondsFormat};

use super::client::{LogSink, SubmitOutcome};
use crate::models::LogEntry;

/// Placeholder selection when the directory offered no systems.
pub const UNAVAILABLE_SYSTEM: &str = "Unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    SystemPicker,
    ManualSystem,
    Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    CtrlEnter,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key was consumed and the form should be submitted.
    Submit,
    Propagate,
}

/// Message shown to the operator after a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Submitted,
    MissingSystem,
    MissingAction,
    ServerError(String),
    ConnectionFailed(String),
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::Submitted => "Success",
            Notice::MissingSystem | Notice::MissingAction => "Missing Info",
            Notice::ServerError(_) => "Error",
            Notice::ConnectionFailed(_) => "Connection Failed",
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::Submitted)
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::Submitted => write!(f, "Log submitted successfully."),
            Notice::MissingSystem => write!(f, "System name is required."),
            Notice::MissingAction => write!(f, "Action field cannot be blank."),
            Notice::ServerError(body) => write!(f, "Server error:\n{body}"),
            Notice::ConnectionFailed(reason) => {
                write!(f, "Could not connect to server:\n{reason}")
            }
        }
    }
}

/// State of the capture form, independent of how it is drawn.
#[derive(Debug, Clone)]
pub struct CaptureForm {
    current_user: String,
    systems: Vec<String>,
    selected_system: String,
    manual_system: String,
    action_text: String,
    focus: Field,
    action_flagged: bool,
}

impl CaptureForm {
    pub fn new(current_user: impl Into<String>, systems: Vec<String>) -> Self {
        let selected_system = systems
            .first()
            .cloned()
            .unwrap_or_else(|| UNAVAILABLE_SYSTEM.to_string());

        Self {
            current_user: current_user.into(),
            systems,
            selected_system,
            manual_system: String::new(),
            action_text: String::new(),
            focus: Field::ManualSystem,
            action_flagged: false,
        }
    }

    pub fn current_user(&self) -> &str {
        &self.current_user
    }

    pub fn systems(&self) -> &[String] {
        &self.systems
    }

    pub fn selected_system(&self) -> &str {
        &self.selected_system
    }

    pub fn manual_system(&self) -> &str {
        &self.manual_system
    }

    pub fn action_text(&self) -> &str {
        &self.action_text
    }

    pub fn focused(&self) -> Field {
        self.focus
    }

    /// Whether the action field is highlighted after a failed validation.
    pub fn action_flagged(&self) -> bool {
        self.action_flagged
    }

    /// Pick the directory entry at `index`. Out-of-range picks change nothing.
    pub fn select(&mut self, index: usize) -> Option<&str> {
        let name = self.systems.get(index)?;
        self.selected_system = name.clone();
        Some(&self.selected_system)
    }

    pub fn set_manual_system(&mut self, text: impl Into<String>) {
        self.manual_system = text.into();
    }

    pub fn set_action_text(&mut self, text: impl Into<String>) {
        self.action_text = text.into();
    }

    pub fn set_focus(&mut self, field: Field) {
        self.focus = field;
    }

    /// Manual entry wins over the directory selection when it is not blank.
    pub fn effective_system(&self) -> &str {
        let manual = self.manual_system.trim();
        if manual.is_empty() {
            self.selected_system.trim()
        } else {
            manual
        }
    }

    /// Ctrl+Enter in the action field submits and is not passed on.
    pub fn handle_key(&self, key: Key) -> KeyOutcome {
        if self.focus == Field::Action && key == Key::CtrlEnter {
            KeyOutcome::Submit
        } else {
            KeyOutcome::Propagate
        }
    }

    /// Validate the form and build the payload stamped with `now`.
    pub fn prepare(&mut self, now: DateTime<FixedOffset>) -> Result<LogEntry, Notice> {
        let system = self.effective_system().to_string();
        if system.is_empty() {
            return Err(Notice::MissingSystem);
        }

        let action = self.action_text.trim().to_string();
        if action.is_empty() {
            self.focus = Field::Action;
            self.action_flagged = true;
            return Err(Notice::MissingAction);
        }
        self.action_flagged = false;

        Ok(LogEntry {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, false),
            user: self.current_user.clone(),
            action,
            system,
        })
    }

    pub async fn submit<S: LogSink + ?Sized>(&mut self, sink: &S) -> Notice {
        self.submit_at(sink, Local::now().fixed_offset()).await
    }

    pub async fn submit_at<S: LogSink + ?Sized>(
        &mut self,
        sink: &S,
        now: DateTime<FixedOffset>,
    ) -> Notice {
        let entry = match self.prepare(now) {
            Ok(entry) => entry,
            Err(notice) => return notice,
        };

        match sink.send(&entry).await {
            SubmitOutcome::Accepted => {
                self.action_text.clear();
                self.manual_system.clear();
                self.focus = Field::Action;
                self.action_flagged = false;
                Notice::Submitted
            }
            SubmitOutcome::Rejected { body, .. } => Notice::ServerError(body),
            SubmitOutcome::Unreachable(reason) => Notice::ConnectionFailed(reason),
        }
    }
}
