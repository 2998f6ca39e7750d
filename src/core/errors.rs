use thiserror::Error;

#[derive(Error, Debug)]
pub enum KikitoriError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Vibrato error: {0}")]
    Vibrato(Box<vibrato::errors::VibratoError>),

    #[error("Failed to parse {format} subtitle: {message}")]
    SubtitleParse { format: &'static str, message: String },

    #[error("No subtitles found in the file")]
    EmptySubtitle,

    #[error("Failed to load unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Unknown language code: {0}")]
    UnknownLanguage(String),

    #[error("Grade must be between 0 and 5, got {0}")]
    InvalidGrade(u8),

    #[error("Tokenizer error: {0}")]
    Tokenize(String),

    #[error("Dictionary lookup error: {0}")]
    Lookup(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("KikitoriError: {0}")]
    Custom(String),
}

impl KikitoriError {
    pub fn parse(format: &'static str, message: impl Into<String>) -> Self {
        KikitoriError::SubtitleParse { format, message: message.into() }
    }
}

impl From<std::io::Error> for KikitoriError {
    fn from(error: std::io::Error) -> Self {
        KikitoriError::Io(Box::new(error))
    }
}

impl From<vibrato::errors::VibratoError> for KikitoriError {
    fn from(error: vibrato::errors::VibratoError) -> Self {
        KikitoriError::Vibrato(Box::new(error))
    }
}
