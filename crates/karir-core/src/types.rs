//! Chat session identifiers

use std::fmt;
use std::sync::Arc;

/// Conversation id, usually `{page}:{name}`. Clones share one allocation.
#[derive(Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct SessionKey(Arc<str>);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().into())
    }

    /// Key for a named conversation on one chat page.
    pub fn scoped(page: &str, name: &str) -> Self {
        Self::new(format!("{}:{}", page, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Text before the first `:`, if any.
    pub fn scope(&self) -> Option<&str> {
        self.0.split_once(':').map(|(scope, _)| scope)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SessionKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_keys_keep_their_page() {
        let key = SessionKey::scoped("vacancies", "main");
        assert_eq!(key.as_str(), "vacancies:main");
        assert_eq!(key.scope(), Some("vacancies"));
        assert_eq!(SessionKey::from("plain").scope(), None);
    }
}
