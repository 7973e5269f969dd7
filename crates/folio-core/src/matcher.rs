//! Keyword-scoring topic matcher.
//!
//! Scores every topic by how many of its keywords occur in the lower-cased
//! question (presence only, no frequency weighting) and picks the highest.
//! Ties go to the topic declared first. A linear scan is plenty for a
//! handful of topics.

use crate::types::{ScoredMatch, Topic};

pub struct TopicMatcher {
    topics: Vec<Topic>,
    fallback: String,
}

impl TopicMatcher {
    pub fn new(topics: Vec<Topic>) -> Self {
        let fallback = fallback_body(&topics);
        Self { topics, fallback }
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// The answer given when nothing matches.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// All topics with a positive score, best first, table order on ties.
    pub fn rank(&self, question: &str) -> Vec<ScoredMatch> {
        let lowered = question.to_lowercase();
        let mut matches: Vec<ScoredMatch> = self
            .topics
            .iter()
            .filter_map(|topic| {
                let score = score(topic, &lowered);
                (score > 0).then(|| ScoredMatch {
                    topic_id: topic.id.clone(),
                    score,
                    response: topic.response.clone(),
                })
            })
            .collect();
        // sort_by is stable, so equal scores keep table order
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches
    }

    pub fn best(&self, question: &str) -> Option<ScoredMatch> {
        self.rank(question).into_iter().next()
    }

    /// Answer a question. Never fails: unmatched questions get the fallback.
    pub fn respond(&self, question: &str) -> &str {
        let lowered = question.to_lowercase();
        let mut best: Option<(&Topic, u32)> = None;
        for topic in &self.topics {
            let s = score(topic, &lowered);
            // strict > keeps the earliest topic on ties
            if s > 0 && best.map_or(true, |(_, top)| s > top) {
                best = Some((topic, s));
            }
        }
        match best {
            Some((topic, _)) => &topic.response,
            None => &self.fallback,
        }
    }
}

/// Count of the topic's keywords found in an already lower-cased question.
pub fn score(topic: &Topic, lowered_question: &str) -> u32 {
    topic
        .keywords
        .iter()
        .filter(|k| lowered_question.contains(k.as_str()))
        .count() as u32
}

/// Fallback answer listing every topic and inviting a rephrase.
pub fn fallback_body(topics: &[Topic]) -> String {
    let mut body = String::from(
        "<p>I'd be happy to help you learn more about the app! Based on your question, \
         here's what I can tell you about:</p>\n<p><strong>Available Topics:</strong></p>\n<ul>\n",
    );
    for topic in topics {
        body.push_str("<li>");
        body.push_str(&topic.summary);
        body.push_str("</li>\n");
    }
    body.push_str(
        "</ul>\n<p>Try asking about any of these topics related to the app, \
         or be more specific with your question!</p>",
    );
    body
}
