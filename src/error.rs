use thiserror::Error;

/// Ways a word provider can fail. All of them are recovered by the fallback list.
#[derive(Debug, Error)]
pub enum WordSourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP error, status {0}")]
    Status(u16),
    #[error("unreadable word list: {0}")]
    Decode(String),
}

/// Failure to get a game going at all; the game stays idle.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("could not spawn word loader: {0}")]
    SpawnLoader(#[source] std::io::Error),
    #[error("could not spawn countdown: {0}")]
    SpawnCountdown(#[source] std::io::Error),
}

/// Shown to the player when a start had to be aborted.
pub const START_FAILED_MESSAGE: &str = "An error occurred while starting the game.";
