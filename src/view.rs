use crate::error::{AppError, Result};
use crate::report::Report;

/// What the analyzer is showing.
///
/// ```text
/// Idle ──submit──▶ Loading ──ok──▶ Success ──reset──▶ Idle
///   ▲                 │                │  ▲
///   └──reset── Error ◀┘ err            └──┘ history selection
///              │  ▲
///              └──┘ retry (via Loading)
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Success(Report),
    Error(String),
}

impl ViewState {
    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Idle => "idle",
            ViewState::Loading => "loading",
            ViewState::Success(_) => "showing a report",
            ViewState::Error(_) => "showing an error",
        }
    }

    /// Idle or Error → Loading. Clears any previous report or error.
    pub fn begin_loading(&mut self) -> Result<()> {
        match self {
            ViewState::Idle | ViewState::Error(_) => {
                *self = ViewState::Loading;
                Ok(())
            }
            _ => Err(self.invalid("start a request")),
        }
    }

    /// Loading → Success.
    pub fn succeed(&mut self, report: Report) -> Result<()> {
        match self {
            ViewState::Loading => {
                *self = ViewState::Success(report);
                Ok(())
            }
            _ => Err(self.invalid("show a result")),
        }
    }

    /// Loading → Error. The message must be non-empty.
    pub fn fail(&mut self, message: String) -> Result<()> {
        match self {
            ViewState::Loading => {
                let message = if message.trim().is_empty() {
                    "unknown error".to_string()
                } else {
                    message
                };
                *self = ViewState::Error(message);
                Ok(())
            }
            _ => Err(self.invalid("show an error")),
        }
    }

    /// Success or Error → Idle. Idle stays Idle.
    pub fn reset(&mut self) -> Result<()> {
        match self {
            ViewState::Loading => Err(self.invalid("reset")),
            _ => {
                *self = ViewState::Idle;
                Ok(())
            }
        }
    }

    /// Show a stored report directly, without an oracle call.
    pub fn show(&mut self, report: Report) -> Result<()> {
        match self {
            ViewState::Loading => Err(self.invalid("open history")),
            _ => {
                *self = ViewState::Success(report);
                Ok(())
            }
        }
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            ViewState::Success(report) => Some(report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    /// Copy and download.
    pub fn can_export(&self) -> bool {
        matches!(self, ViewState::Success(_))
    }

    pub fn inputs_editable(&self) -> bool {
        matches!(self, ViewState::Idle | ViewState::Error(_))
    }

    fn invalid(&self, action: &'static str) -> AppError {
        AppError::InvalidTransition {
            from: self.name(),
            action,
        }
    }
}
