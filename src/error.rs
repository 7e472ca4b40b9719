// Copyright (c) 2026 rezky_nightky

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaverError {
    #[error("unknown effect: {0} (see --list-effects)")]
    UnknownEffect(String),

    #[error("invalid --colormode: {0} (allowed: 0,16,8/256,24/32)")]
    InvalidColorMode(u16),

    #[error("failed to apply {name} {value} ({reason})")]
    InvalidArgument {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("unsupported charset: {0} (allowed: auto, binary, digits, hex, ascii, letters, katakana, matrix, blocks)")]
    UnknownCharset(String),

    #[error("failed to read settings from {path}: {source}")]
    ReadSettings {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse settings from {path}: {source}")]
    ParseSettings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to read typewriter text from {path}: {source}")]
    ReadText {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file {path}: {source}")]
    OpenLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to install logger: {0}")]
    InstallLogger(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SaverError>;
