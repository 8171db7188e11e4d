//! Lines typed by the user.

use smartmail_core::{Intent, RefreshInterval};

/// One parsed line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Forward to the dashboard.
    Intent(Intent),
    /// Print the command list.
    Help,
    /// Leave the event loop.
    Quit,
}

/// Why a line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// Not a known command.
    #[error("Unknown command: {0} (type `help`)")]
    Unknown(String),

    /// `interval` without a usable value.
    #[error("Usage: interval <milliseconds>, greater than zero")]
    BadInterval,
}

/// Help text for [`Input::Help`].
pub const HELP: &str = "\
Commands:
  login            Sign in with Google
  logout           Sign out
  refresh          Fetch today's emails now
  status           Re-check the authentication status
  interval <ms>    Change the refresh interval
  help             Show this list
  quit             Exit";

/// Parses one line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns an error for unknown commands or a bad interval.
pub fn parse_input(line: &str) -> Result<Option<Input>, InputError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };

    let input = match command.to_ascii_lowercase().as_str() {
        "login" => Input::Intent(Intent::Login),
        "logout" => Input::Intent(Intent::Logout),
        "refresh" | "r" => Input::Intent(Intent::Refresh),
        "status" => Input::Intent(Intent::CheckStatus),
        "interval" => {
            let interval = words
                .next()
                .and_then(|ms| ms.parse::<u64>().ok())
                .and_then(|ms| RefreshInterval::from_millis(ms).ok())
                .ok_or(InputError::BadInterval)?;
            Input::Intent(Intent::SetInterval(interval))
        }
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        _ => return Err(InputError::Unknown(command.to_string())),
    };

    Ok(Some(input))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_intents() {
        assert_eq!(
            parse_input("login").unwrap(),
            Some(Input::Intent(Intent::Login))
        );
        assert_eq!(
            parse_input("  Refresh ").unwrap(),
            Some(Input::Intent(Intent::Refresh))
        );
        assert_eq!(parse_input("quit").unwrap(), Some(Input::Quit));
        assert_eq!(parse_input("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_interval() {
        let expected = RefreshInterval::from_millis(60_000).unwrap();
        assert_eq!(
            parse_input("interval 60000").unwrap(),
            Some(Input::Intent(Intent::SetInterval(expected)))
        );
        assert_eq!(parse_input("interval 0"), Err(InputError::BadInterval));
        assert_eq!(parse_input("interval"), Err(InputError::BadInterval));
        assert_eq!(parse_input("interval soon"), Err(InputError::BadInterval));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_input("compose"),
            Err(InputError::Unknown("compose".to_string()))
        );
    }
}
