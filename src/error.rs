#[derive(Debug, thiserror::Error)]
pub enum WordListError {
    #[error("expected DISPLAY=ROMAJI, got `{0}`")]
    MissingSeparator(String),

    #[error("empty display or romaji in `{0}`")]
    EmptyField(String),

    #[error("no built-in word set named `{0}`")]
    UnknownSet(String),

    #[error("word set `{0}` is not valid utf-8")]
    NotUtf8(String),

    #[error("word set parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
