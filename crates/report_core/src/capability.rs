use std::fmt;

/// Operational status of the remote PDF renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityState {
    Ok,
    Upgrade,
    Broken,
    Install,
    Workers,
    Unknown,
}

impl CapabilityState {
    /// Maps a server token to a state. Unrecognised tokens are `Unknown`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "ok" => CapabilityState::Ok,
            "upgrade" => CapabilityState::Upgrade,
            "broken" => CapabilityState::Broken,
            "install" => CapabilityState::Install,
            "workers" => CapabilityState::Workers,
            _ => CapabilityState::Unknown,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            CapabilityState::Ok => "ok",
            CapabilityState::Upgrade => "upgrade",
            CapabilityState::Broken => "broken",
            CapabilityState::Install => "install",
            CapabilityState::Workers => "workers",
            CapabilityState::Unknown => "unknown",
        }
    }

    /// Whether a PDF can be rendered for printing in this state.
    pub fn can_print(&self) -> bool {
        matches!(self, CapabilityState::Ok | CapabilityState::Upgrade)
    }

    /// Message shown to the user for degraded states; `None` when nothing is shown.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            CapabilityState::Broken => Some(
                "Your installation of Wkhtmltopdf seems to be broken. The report will be shown \
                 in html. See https://wkhtmltopdf.org/",
            ),
            CapabilityState::Install => Some(
                "Unable to find Wkhtmltopdf on this system. The report will be shown in html. \
                 See https://wkhtmltopdf.org/",
            ),
            CapabilityState::Upgrade => Some(
                "You should upgrade your version of Wkhtmltopdf to at least 0.12.0 in order to \
                 get a correct display of headers and footers as well as support for \
                 table-breaking between pages. See https://wkhtmltopdf.org/",
            ),
            CapabilityState::Workers => Some(
                "You need to start the server with at least two workers to print a pdf version \
                 of the reports.",
            ),
            CapabilityState::Ok | CapabilityState::Unknown => None,
        }
    }
}

impl fmt::Display for CapabilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}
