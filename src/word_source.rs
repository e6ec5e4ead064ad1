use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::WordSourceError;

static WORDS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/words");

pub const DEFAULT_WORD_SOURCE_URL: &str = "https://random-word-api.herokuapp.com/word";
pub const DEFAULT_WORD_COUNT: usize = 20;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;

pub const EMPTY_RESULT_WARNING: &str = "Failed to fetch random words. Using the fallback list.";

/// Anything that can hand out a batch of candidate words.
pub trait WordSource: Send + Sync {
    /// May return fewer words than asked for, or none at all.
    fn fetch_words(&self, count: usize) -> Result<Vec<String>, WordSourceError>;
}

/// Words from a remote provider answering `GET <url>?number=<count>` with a
/// JSON array of strings.
#[derive(Debug, Clone)]
pub struct HttpWordSource {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpWordSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, WordSourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("keyrush/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl WordSource for HttpWordSource {
    fn fetch_words(&self, count: usize) -> Result<Vec<String>, WordSourceError> {
        debug!(url = %self.url, count, "fetching words");

        let resp = self
            .client
            .get(&self.url)
            .query(&[("number", count)])
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(WordSourceError::Status(status.as_u16()));
        }

        let body = resp.text()?;
        parse_word_array(&body)
    }
}

/// Decode the provider's response body.
pub fn parse_word_array(body: &str) -> Result<Vec<String>, WordSourceError> {
    serde_json::from_str::<Vec<String>>(body).map_err(|e| WordSourceError::Decode(e.to_string()))
}

/// A fixed list, used offline and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticWordSource {
    words: Vec<String>,
}

impl StaticWordSource {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// The built-in fallback list as a source of its own.
    pub fn fallback() -> Self {
        Self {
            words: fallback_words(),
        }
    }
}

impl WordSource for StaticWordSource {
    fn fetch_words(&self, count: usize) -> Result<Vec<String>, WordSourceError> {
        Ok(self.words.iter().take(count).cloned().collect())
    }
}

#[derive(Deserialize, Clone, Debug)]
struct WordFile {
    #[allow(dead_code)]
    name: String,
    size: u32,
    words: Vec<String>,
}

/// The built-in list used whenever the provider fails, lowercased.
pub fn fallback_words() -> Vec<String> {
    let file = read_word_file("fallback.json").unwrap_or_else(|e| {
        // the file is embedded at compile time; this only trips on a broken build
        warn!(error = %e, "embedded fallback list unreadable");
        WordFile {
            name: "fallback".to_string(),
            size: 1,
            words: vec!["game".to_string()],
        }
    });
    debug_assert_eq!(file.size as usize, file.words.len());

    file.words.iter().map(|w| w.to_lowercase()).collect()
}

fn read_word_file(file_name: &str) -> Result<WordFile, WordSourceError> {
    let file = WORDS_DIR
        .get_file(file_name)
        .ok_or_else(|| WordSourceError::Decode(format!("{file_name} not embedded")))?;

    let contents = file
        .contents_utf8()
        .ok_or_else(|| WordSourceError::Decode(format!("{file_name} is not utf-8")))?;

    serde_json::from_str(contents).map_err(|e| WordSourceError::Decode(e.to_string()))
}

/// Words for one game plus whatever the player should be warned about.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordBatch {
    pub words: Vec<String>,
    pub warning: Option<String>,
}

/// Fetch `count` words from `source`, falling back to the built-in list on
/// failure or an empty answer. The result is shuffled either way.
pub fn acquire_words<R: Rng + ?Sized>(
    source: &dyn WordSource,
    count: usize,
    rng: &mut R,
) -> WordBatch {
    let (mut words, warning) = match source.fetch_words(count) {
        Ok(fetched) => {
            let words = clean_words(fetched);
            if words.is_empty() {
                warn!("word source returned no usable words, using fallback list");
                (fallback_words(), Some(EMPTY_RESULT_WARNING.to_string()))
            } else {
                info!(count = words.len(), "fetched words");
                (words, None)
            }
        }
        Err(e) => {
            warn!(error = %e, "word source failed, using fallback list");
            (
                fallback_words(),
                Some(format!(
                    "Failed to load words ({e}). Using the fallback list."
                )),
            )
        }
    };

    words.shuffle(rng);

    WordBatch { words, warning }
}

fn clean_words(words: Vec<String>) -> Vec<String> {
    words
        .into_iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .collect()
}
