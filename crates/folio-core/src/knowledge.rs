//! Knowledge base — the FAQ topic table, showcase projects and preset questions.
//!
//! Built-in content ships with the crate; a YAML content file can replace it.
//! Topic order matters: it is the tie-break order of the matcher.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::matcher::TopicMatcher;
use crate::types::{ProjectSection, Topic};

#[derive(Debug, Error, PartialEq)]
pub enum ContentError {
    #[error("topic #{0} has an empty id")]
    EmptyTopicId(usize),
    #[error("duplicate topic id '{0}'")]
    DuplicateTopic(String),
    #[error("topic '{0}' has an empty keyword")]
    EmptyKeyword(String),
    #[error("project #{0} has an empty command")]
    EmptyCommand(usize),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub projects: Vec<ProjectSection>,
    /// Questions answered up front when a session starts
    #[serde(default)]
    pub presets: Vec<String>,
}

impl KnowledgeBase {
    /// Load a content file, normalize keywords and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read content: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid content file: {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut kb: KnowledgeBase =
            serde_yaml::from_str(yaml).context("Failed to parse content YAML")?;
        kb.normalize();
        kb.validate()?;
        info!(
            "Loaded {} topics, {} projects, {} presets",
            kb.topics.len(),
            kb.projects.len(),
            kb.presets.len()
        );
        Ok(kb)
    }

    /// Keywords are matched against a lower-cased question, so they are
    /// stored lower-cased and trimmed.
    fn normalize(&mut self) {
        for topic in &mut self.topics {
            topic.id = topic.id.trim().to_string();
            for kw in &mut topic.keywords {
                *kw = kw.trim().to_lowercase();
            }
        }
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        let mut seen = HashSet::new();
        for (i, topic) in self.topics.iter().enumerate() {
            if topic.id.is_empty() {
                return Err(ContentError::EmptyTopicId(i));
            }
            if !seen.insert(topic.id.as_str()) {
                return Err(ContentError::DuplicateTopic(topic.id.clone()));
            }
            // An empty keyword is a substring of every question.
            if topic.keywords.iter().any(|k| k.is_empty()) {
                return Err(ContentError::EmptyKeyword(topic.id.clone()));
            }
        }
        for (i, project) in self.projects.iter().enumerate() {
            if project.command.trim().is_empty() {
                return Err(ContentError::EmptyCommand(i));
            }
        }
        Ok(())
    }

    pub fn topic(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    /// The built-in site content.
    pub fn builtin() -> Self {
        Self {
            topics: builtin_topics(),
            projects: builtin_projects(),
            presets: BUILTIN_PRESETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Loaded content plus the matcher built over its topic table, shared by
/// every session.
pub struct Site {
    pub knowledge: KnowledgeBase,
    pub matcher: TopicMatcher,
}

impl Site {
    pub fn new(knowledge: KnowledgeBase) -> Self {
        let matcher = TopicMatcher::new(knowledge.topics.clone());
        Self { knowledge, matcher }
    }

    pub fn builtin() -> Self {
        Self::new(KnowledgeBase::builtin())
    }

    /// Content from the configured file, or the built-in content when no
    /// file is configured.
    pub fn load(config: &Config) -> Result<Self> {
        match config.resolve_content_path() {
            Some(path) => Ok(Self::new(KnowledgeBase::load(&path)?)),
            None => Ok(Self::builtin()),
        }
    }
}

const BUILTIN_PRESETS: &[&str] = &["What is the app about?", "Which platforms will it run on?"];

fn topic(id: &str, summary: &str, keywords: &[&str], response: &str) -> Topic {
    Topic {
        id: id.to_string(),
        summary: summary.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        response: response.to_string(),
    }
}

fn builtin_topics() -> Vec<Topic> {
    vec![
        topic(
            "about",
            "What the app is about and its purpose",
            &[
                "about", "what", "app", "application", "purpose", "what is", "describe",
                "overview", "this app", "the app",
            ],
            "<p><strong>About EZMoney</strong></p>\n\
             <p>EZMoney is a personal budgeting app that turns bank exports into a clear monthly plan, \
             so you always know what is safe to spend.</p>",
        ),
        topic(
            "features",
            "Key features and functionality",
            &[
                "feature", "features", "functionality", "what can", "capabilities", "what does",
                "do", "include", "offer", "provide",
            ],
            "<p><strong>Key Features</strong></p>\n\
             <ul>\n<li>Automatic categorization of transactions</li>\n\
             <li>Envelope-style monthly budgets</li>\n\
             <li>Recurring bill reminders</li>\n\
             <li>Spending trends at a glance</li>\n</ul>",
        ),
        topic(
            "technology",
            "Technology stack and how it's built",
            &[
                "technology", "tech", "stack", "built", "framework", "language", "programming",
                "code", "technical", "built with", "uses", "developed",
            ],
            "<p><strong>Technology Stack</strong></p>\n\
             <ul>\n<li>Rust core shared by every client</li>\n\
             <li>Local-first storage with optional sync</li>\n\
             <li>Native shells per platform</li>\n</ul>",
        ),
        topic(
            "release",
            "Release date and timeline",
            &[
                "release", "launch", "when", "date", "available", "coming", "beta",
                "early access", "timeline",
            ],
            "<p><strong>Release Information</strong></p>\n\
             <p>A public beta is planned first, followed by a general release once \
             feedback from early testers has been folded in.</p>",
        ),
        topic(
            "pricing",
            "Pricing information",
            &[
                "price", "pricing", "cost", "free", "paid", "subscription", "purchase", "buy",
                "money",
            ],
            "<p><strong>Pricing Information</strong></p>\n\
             <p>The core budgeting features are free. An optional subscription adds sync \
             across devices and shared budgets.</p>",
        ),
        topic(
            "platform",
            "Platform availability (iOS, Android, Web, etc.)",
            &[
                "platform", "ios", "android", "web", "desktop", "windows", "mac", "linux",
                "mobile", "where",
            ],
            "<p><strong>Platform Availability</strong></p>\n\
             <ul>\n<li>iOS and Android</li>\n<li>Web</li>\n\
             <li>Desktop (Windows, macOS, Linux)</li>\n</ul>",
        ),
        topic(
            "contact",
            "Contact information and how to stay updated",
            &[
                "contact", "email", "reach", "connect", "get in touch", "support", "help",
                "newsletter", "updates",
            ],
            "<p><strong>Stay Connected</strong></p>\n\
             <p>Join the newsletter from the home page for release news, or use the \
             contact form to reach the team directly.</p>",
        ),
        topic(
            "beta",
            "Beta testing and early access opportunities",
            &[
                "beta", "testing", "test", "early access", "waitlist", "sign up", "join",
            ],
            "<p><strong>Beta Testing &amp; Early Access</strong></p>\n\
             <p>Sign up for the waitlist to be invited to the beta. Testers get early \
             access to every new feature.</p>",
        ),
    ]
}

fn builtin_projects() -> Vec<ProjectSection> {
    vec![
        ProjectSection {
            id: "ezmoney".into(),
            command: "cat ~/projects/ezmoney/README.md".into(),
            info: "<p><strong>EZMoney</strong></p>\n\
                   <p>Personal budgeting that stays out of your way.</p>"
                .into(),
        },
        ProjectSection {
            id: "folio".into(),
            command: "cargo run -p folio-tui".into(),
            info: "<p><strong>Folio</strong></p>\n\
                   <p>This site: a terminal and a chat window on a tiny desktop.</p>"
                .into(),
        },
        ProjectSection {
            id: "contact".into(),
            command: "echo $CONTACT".into(),
            info: "<p>Ask the chat window anything about the app.</p>".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_is_valid() {
        let kb = KnowledgeBase::builtin();
        assert!(kb.validate().is_ok());
        assert_eq!(kb.topics.len(), 8);
        assert_eq!(kb.topics[0].id, "about");
        assert_eq!(kb.topics[7].id, "beta");
        for t in &kb.topics {
            for k in &t.keywords {
                assert_eq!(k, &k.to_lowercase());
            }
        }
    }

    #[test]
    fn test_load_normalizes_keywords() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "topics:\n  - id: pricing\n    summary: Pricing\n    keywords: [\" Price \", COST]\n    response: \"<p>p</p>\""
        )
        .unwrap();

        let kb = KnowledgeBase::load(tmp.path()).unwrap();
        assert_eq!(kb.topics[0].keywords, vec!["price", "cost"]);
        assert!(kb.projects.is_empty());
        assert!(kb.presets.is_empty());
    }

    #[test]
    fn test_duplicate_topic_rejected() {
        let yaml = "topics:\n  - {id: a, summary: A, keywords: [x], response: ''}\n  - {id: a, summary: B, keywords: [y], response: ''}\n";
        let err = KnowledgeBase::from_yaml(yaml).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ContentError>(),
            Some(&ContentError::DuplicateTopic("a".into()))
        );
    }

    #[test]
    fn test_empty_keyword_rejected() {
        let yaml = "topics:\n  - {id: a, summary: A, keywords: ['  '], response: ''}\n";
        let err = KnowledgeBase::from_yaml(yaml).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ContentError>(),
            Some(&ContentError::EmptyKeyword("a".into()))
        );
    }

    #[test]
    fn test_site_load_without_content_path_is_builtin() {
        let site = Site::load(&Config::default()).unwrap();
        assert_eq!(site.matcher.topics().len(), site.knowledge.topics.len());
        assert_eq!(site.knowledge.presets.len(), 2);
    }

    #[test]
    fn test_site_load_with_missing_file_fails() {
        let config = Config {
            content_path: Some("/nonexistent/content.yaml".into()),
            ..Config::default()
        };
        assert!(Site::load(&config).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(KnowledgeBase::load(Path::new("/nonexistent/content.yaml")).is_err());
    }
}
