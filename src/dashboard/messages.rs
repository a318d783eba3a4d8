//! Flash Messages
//!
//! User-facing messages queued by views and form handlers. They survive
//! the post-redirect-get cycle as URL-encoded query parameters.

use axum::response::Redirect;
use serde::Deserialize;

/// Severity of a flash message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    const ALL: [Level; 4] = [Level::Success, Level::Info, Level::Warning, Level::Error];

    /// Query parameter name and CSS class
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

impl Message {
    pub fn css_class(&self) -> &'static str {
        self.level.as_str()
    }
}

/// Flash messages carried in a redirect's query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlashQuery {
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Ordered message queue for one response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Messages {
    items: Vec<Message>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_query(query: &FlashQuery) -> Self {
        let mut messages = Self::new();
        for (level, text) in [
            (Level::Success, &query.success),
            (Level::Info, &query.info),
            (Level::Warning, &query.warning),
            (Level::Error, &query.error),
        ] {
            if let Some(text) = text.as_deref().filter(|t| !t.is_empty()) {
                messages.add(level, text);
            }
        }
        messages
    }

    pub fn add(&mut self, level: Level, text: impl Into<String>) {
        self.items.push(Message {
            level,
            text: text.into(),
        });
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.add(Level::Success, text);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.add(Level::Info, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.add(Level::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.add(Level::Error, text);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Encode as query parameters; messages of one level are joined
    pub fn to_query(&self) -> String {
        Level::ALL
            .iter()
            .filter_map(|level| {
                let texts: Vec<&str> = self
                    .items
                    .iter()
                    .filter(|m| m.level == *level)
                    .map(|m| m.text.as_str())
                    .collect();
                if texts.is_empty() {
                    None
                } else {
                    Some(format!(
                        "{}={}",
                        level.as_str(),
                        urlencoding::encode(&texts.join(" "))
                    ))
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Redirect to `path`, carrying these messages along
    pub fn redirect(&self, path: &str) -> Redirect {
        Redirect::to(&self.location(path))
    }

    pub fn location(&self, path: &str) -> String {
        let query = self.to_query();
        if query.is_empty() {
            path.to_string()
        } else if path.contains('?') {
            format!("{}&{}", path, query)
        } else {
            format!("{}?{}", path, query)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_encoding() {
        let mut messages = Messages::new();
        messages.success("Creating share \"demo\"");
        messages.warning("Unable to retrieve share project information.");

        let location = messages.location("/");
        assert_eq!(
            location,
            "/?success=Creating%20share%20%22demo%22&warning=Unable%20to%20retrieve%20share%20project%20information."
        );
        assert_eq!(messages.location("/?tab=snapshots").matches('?').count(), 1);
        assert_eq!(Messages::new().location("/"), "/");
    }

    #[test]
    fn test_from_query_keeps_level_order() {
        let query = FlashQuery {
            error: Some("Unable to create share.".into()),
            info: Some(String::new()),
            success: Some("ok".into()),
            warning: None,
        };
        let messages = Messages::from_query(&query);
        let levels: Vec<_> = messages.iter().map(|m| m.level).collect();
        assert_eq!(levels, vec![Level::Success, Level::Error]);
    }

    #[test]
    fn test_same_level_joined() {
        let mut messages = Messages::new();
        messages.error("a.");
        messages.error("b.");
        assert_eq!(messages.to_query(), "error=a.%20b.");
    }
}
