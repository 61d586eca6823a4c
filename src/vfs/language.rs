use std::fmt;

/// Language mode of a buffer, derived from its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    Html,
    Css,
    JavaScript,
    Json,
    Xml,
    #[default]
    PlainText,
}

impl Language {
    /// Map a file extension to a language. Matching is case-sensitive.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "html" => Self::Html,
            "css" => Self::Css,
            "js" => Self::JavaScript,
            "json" => Self::Json,
            "xml" => Self::Xml,
            _ => Self::PlainText,
        }
    }

    /// Editor language tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::JavaScript => "javascript",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::PlainText => "plaintext",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Text after the last `.` of `name`, or `None` when there is no dot.
pub fn extension(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Language for a file name. Names without an extension are plain text.
pub fn language_for(name: &str) -> Language {
    extension(name).map_or(Language::PlainText, Language::from_extension)
}
