//! Intent resolver: maps raw chat text to a stored question and answer.
//!
//! Resolution order:
//! 1. every stored regex, by id ascending, first match wins;
//! 2. otherwise the lowest-id trigger question whose text prefixes the input.
//!
//! "Nothing matched" is the empty [`DictionaryMessage`], never an error.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use regex::Regex;

use scenariobot_domain::dictionary::{DictionaryMessage, QuestionRegex, format_answer};
use scenariobot_domain::error::BotError;

use crate::ports::DictionaryRepository;

/// Resolves text against the dictionary.
///
/// Compiled regexes are cached by pattern; patterns that fail to compile are
/// logged once and skipped.
pub struct IntentResolver<D> {
    dictionary: D,
    compiled: Mutex<HashMap<String, Option<Regex>>>,
}

impl<D: DictionaryRepository> IntentResolver<D> {
    pub fn new(dictionary: D) -> Self {
        Self {
            dictionary,
            compiled: Mutex::default(),
        }
    }

    /// Resolve `text` into a dictionary envelope.
    ///
    /// When the matching regex has a capture group and the group participated
    /// in the match, the captured text replaces the first `%s` of the answer.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the dictionary.
    #[tracing::instrument(skip(self))]
    pub async fn find_answer(&self, text: &str) -> Result<DictionaryMessage, BotError> {
        let mut regexes = self.dictionary.regexes().await?;
        regexes.sort_by_key(|r| r.id);

        if let Some((regex, captured)) = self.first_match(&regexes, text)
            && let Some(mut found) = self.dictionary.find_by_regex(regex.id).await?
        {
            let group = found.capture_group.or(regex.capture_group);
            if let (Some(_), Some(value)) = (group, captured) {
                found.answer = format_answer(&found.answer, &value);
            }
            tracing::debug!(regex_id = %regex.id, question_id = %found.question_id, "matched by regex");
            return Ok(found);
        }

        match self.dictionary.find_by_prefix(text).await? {
            Some(found) => {
                tracing::debug!(question_id = %found.question_id, "matched by prefix");
                Ok(found)
            }
            None => Ok(DictionaryMessage::default()),
        }
    }

    /// Up to `limit` trigger questions sharing the most words with `text`.
    ///
    /// Questions without any shared word are never suggested. Ties keep
    /// dictionary order.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the dictionary.
    pub async fn suggest(&self, text: &str, limit: usize) -> Result<Vec<String>, BotError> {
        let words = word_set(text);
        if words.is_empty() {
            return Ok(Vec::new());
        }
        let mut scored: Vec<(usize, String)> = self
            .dictionary
            .trigger_questions()
            .await?
            .into_iter()
            .map(|question| (word_set(&question).intersection(&words).count(), question))
            .filter(|(shared, _)| *shared > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        let mut seen = HashSet::new();
        Ok(scored
            .into_iter()
            .map(|(_, question)| question)
            .filter(|question| seen.insert(question.clone()))
            .take(limit)
            .collect())
    }

    /// The first regex matching `text`, with the text of its capture group.
    fn first_match<'a>(
        &self,
        regexes: &'a [QuestionRegex],
        text: &str,
    ) -> Option<(&'a QuestionRegex, Option<String>)> {
        let mut compiled = self.compiled.lock().unwrap_or_else(PoisonError::into_inner);
        for stored in regexes {
            let regex = compiled
                .entry(stored.pattern.clone())
                .or_insert_with(|| match Regex::new(&stored.pattern) {
                    Ok(regex) => Some(regex),
                    Err(err) => {
                        tracing::warn!(regex_id = %stored.id, pattern = %stored.pattern, error = %err, "skipping invalid regex");
                        None
                    }
                });
            let Some(regex) = regex else { continue };
            if let Some(captures) = regex.captures(text) {
                let captured = stored
                    .capture_group
                    .and_then(|group| captures.get(group))
                    .map(|m| m.as_str().to_string());
                return Some((stored, captured));
            }
        }
        None
    }
}

fn word_set(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}
