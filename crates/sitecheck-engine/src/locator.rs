use serde::{Deserialize, Serialize};
use std::fmt;

/// An element query, resolved inside the page by `dom/resolver.js`.
///
/// The serialized shape is the contract with the resolver: every variant is an object
/// tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// Plain CSS selector.
    Css { selector: String },
    /// ARIA role (explicit or implicit) with an optional accessible name.
    /// Without `exact` the name matches as a case-insensitive substring.
    Role {
        role: String,
        name: Option<String>,
        exact: bool,
    },
    /// Innermost element whose visible text matches.
    Text { text: String, exact: bool },
    /// Form control labelled by `text` (aria-label, `<label>` or placeholder).
    Label { text: String },
    /// `child` searched inside every match of `parent`.
    Within {
        parent: Box<Locator>,
        child: Box<Locator>,
    },
    /// Matches of `base` whose text contains `text`.
    HasText { base: Box<Locator>, text: String },
    /// The `index`-th match of `base`, zero-based.
    Nth { base: Box<Locator>, index: usize },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css {
            selector: selector.into(),
        }
    }

    pub fn role(role: impl Into<String>) -> Self {
        Locator::Role {
            role: role.into(),
            name: None,
            exact: false,
        }
    }

    pub fn role_named(role: impl Into<String>, name: impl Into<String>) -> Self {
        Locator::Role {
            role: role.into(),
            name: Some(name.into()),
            exact: false,
        }
    }

    /// `role=heading` whose accessible name equals `name` exactly.
    pub fn heading(name: impl Into<String>) -> Self {
        Locator::role_named("heading", name).exact()
    }

    pub fn button(name: impl Into<String>) -> Self {
        Locator::role_named("button", name)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Locator::Text {
            text: text.into(),
            exact: false,
        }
    }

    pub fn label(text: impl Into<String>) -> Self {
        Locator::Label { text: text.into() }
    }

    /// Require an exact name/text match. No-op for other variants.
    pub fn exact(self) -> Self {
        match self {
            Locator::Role { role, name, .. } => Locator::Role {
                role,
                name,
                exact: true,
            },
            Locator::Text { text, .. } => Locator::Text { text, exact: true },
            other => other,
        }
    }

    pub fn locator(self, child: Locator) -> Self {
        Locator::Within {
            parent: Box::new(self),
            child: Box::new(child),
        }
    }

    pub fn filter_text(self, text: impl Into<String>) -> Self {
        Locator::HasText {
            base: Box::new(self),
            text: text.into(),
        }
    }

    pub fn nth(self, index: usize) -> Self {
        Locator::Nth {
            base: Box::new(self),
            index,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css { selector } => write!(f, "{}", selector),
            Locator::Role { role, name, exact } => match name {
                Some(name) if *exact => write!(f, "role={}[name=\"{}\"s]", role, name),
                Some(name) => write!(f, "role={}[name=\"{}\"]", role, name),
                None => write!(f, "role={}", role),
            },
            Locator::Text { text, exact: true } => write!(f, "text=\"{}\"s", text),
            Locator::Text { text, .. } => write!(f, "text={}", text),
            Locator::Label { text } => write!(f, "label={}", text),
            Locator::Within { parent, child } => write!(f, "{} >> {}", parent, child),
            Locator::HasText { base, text } => write!(f, "{} >> has-text=\"{}\"", base, text),
            Locator::Nth { base, index } => write!(f, "{} >> nth={}", base, index),
        }
    }
}
