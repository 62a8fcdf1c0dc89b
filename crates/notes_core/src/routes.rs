//! Navigation route table for app screens.
//!
//! # Responsibility
//! - Name every screen destination with a stable string.
//! - Build and parse the note screen destination and its id argument.
//!
//! # Invariants
//! - `NOTE_DEFAULT_ID` means "new note" and never names a stored note.
//! - Note ids are percent-encoded inside destinations.

pub const NOTES_LIST_SCREEN: &str = "NotesListScreen";
pub const NOTE_SCREEN: &str = "NoteScreen";
pub const SIGN_IN_SCREEN: &str = "SignInScreen";
pub const SIGN_UP_SCREEN: &str = "SignUpScreen";
pub const SPLASH_SCREEN: &str = "SplashScreen";

pub const NOTE_ID: &str = "noteId";
pub const NOTE_DEFAULT_ID: &str = "-1";
/// Optional argument template appended to `NOTE_SCREEN`: `?noteId={noteId}`.
pub const NOTE_ID_ARG: &str = "?noteId={noteId}";

/// App screens addressable through navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Splash,
    SignIn,
    SignUp,
    NotesList,
    Note,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Splash,
        Screen::SignIn,
        Screen::SignUp,
        Screen::NotesList,
        Screen::Note,
    ];

    pub fn route(self) -> &'static str {
        match self {
            Screen::Splash => SPLASH_SCREEN,
            Screen::SignIn => SIGN_IN_SCREEN,
            Screen::SignUp => SIGN_UP_SCREEN,
            Screen::NotesList => NOTES_LIST_SCREEN,
            Screen::Note => NOTE_SCREEN,
        }
    }

    /// Resolves a destination to its screen; arguments after `?` are ignored.
    pub fn from_route(route: &str) -> Option<Self> {
        let name = route.split_once('?').map_or(route, |(name, _)| name);
        Self::ALL.into_iter().find(|screen| screen.route() == name)
    }
}

/// Templated note destination registered with the navigator.
pub fn note_route_pattern() -> String {
    format!("{NOTE_SCREEN}{NOTE_ID_ARG}")
}

/// Concrete note destination; `None` opens the screen for a new note.
pub fn note_destination(note_id: Option<&str>) -> String {
    let note_id = urlencoding::encode(note_id.unwrap_or(NOTE_DEFAULT_ID));
    format!("{NOTE_SCREEN}?{NOTE_ID}={note_id}")
}

/// Extracts the stored note id from a concrete note destination.
///
/// Returns `None` for other screens, a missing, empty or undecodable
/// argument, and the new-note placeholder.
pub fn note_id_from_destination(destination: &str) -> Option<String> {
    let (screen, query) = destination.split_once('?')?;
    if screen != NOTE_SCREEN {
        return None;
    }

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == NOTE_ID)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
        .filter(|value| !value.is_empty() && value != NOTE_DEFAULT_ID)
}
