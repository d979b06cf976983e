//! Decoding of query results.
//!
//! `query_answers` replies are double-encoded: the reply is a JSON array of
//! strings, and each string holds another JSON document of the form
//!
//! ```text
//! {"__Subst": [[{"__Var": "X"}, <value>], ...]}
//! ```
//!
//! Decoding is therefore two passes: the outer array first, then each
//! element's string content. Values are kept as the JSON source text they
//! arrived as, so numbers, strings and nested terms all survive untouched.
//!
//! `query_claims` and `query_all_claims` replies are a single JSON array
//! whose elements are returned as-is.
//!
//! ```
//! use etb_client::results::AnswerSet;
//!
//! let reply = r#"["{\"__Subst\":[[{\"__Var\":\"X\"},1]]}"]"#;
//! let answers = AnswerSet::decode(reply).unwrap();
//! assert_eq!(answers[0].get("X"), Some("1"));
//! ```

use std::ops::Index;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::DecodeError;

/// Inner document of one answer element.
#[derive(Deserialize, Serialize)]
struct SubstDocument {
    #[serde(rename = "__Subst")]
    entries: Vec<(VarTag, Box<RawValue>)>,
}

#[derive(Deserialize, Serialize)]
struct VarTag {
    #[serde(rename = "__Var")]
    name: String,
}

/// Parse the outer reply array, keeping each element as source text.
///
/// A blank reply is what the ETB server sends for a query with no answers
/// yet, so it is read as an empty array.
fn split_reply(reply: &str) -> Result<Vec<Box<RawValue>>, DecodeError> {
    if reply.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(reply).map_err(DecodeError::NotAnArray)
}

// =============================================================================
// Answers
// =============================================================================

/// One variable binding within an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    name: String,
    value: String,
}

impl Binding {
    /// Build a binding from a name and the JSON source text of its value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value as JSON source text, exactly as the server serialised it.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The value with JSON string quoting removed.
    ///
    /// String values yield their content; anything else (numbers, nested
    /// terms) yields the raw text.
    pub fn value_str(&self) -> String {
        serde_json::from_str::<String>(&self.value).unwrap_or_else(|_| self.value.clone())
    }
}

/// One solution to a query: an ordered list of bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Answer {
    bindings: Vec<Binding>,
}

impl Answer {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    /// Decode one answer from the string content of a reply element.
    pub fn decode(document: &str) -> Result<Self, serde_json::Error> {
        let doc: SubstDocument = serde_json::from_str(document)?;
        let bindings = doc
            .entries
            .into_iter()
            .map(|(var, value)| Binding {
                name: var.name,
                value: value.get().to_string(),
            })
            .collect();
        Ok(Self { bindings })
    }

    /// Value of the first binding named `name`.
    ///
    /// Names are not required to be unique; later duplicates are shadowed.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Encode back into the inner `__Subst` document.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let entries = self
            .bindings
            .iter()
            .map(|b| {
                let value = RawValue::from_string(b.value.clone())?;
                Ok((
                    VarTag {
                        name: b.name.clone(),
                    },
                    value,
                ))
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        serde_json::to_string(&SubstDocument { entries })
    }
}

impl<'a> IntoIterator for &'a Answer {
    type Item = &'a Binding;
    type IntoIter = std::slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

/// Decoded reply of `query_answers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: Vec<Answer>,
}

impl AnswerSet {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self { answers }
    }

    /// Decode a `query_answers` reply.
    ///
    /// Every element must be a JSON string whose content is a `__Subst`
    /// document; the first element that is not fails the whole decode.
    pub fn decode(reply: &str) -> Result<Self, DecodeError> {
        let answers = split_reply(reply)?
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let document: String = serde_json::from_str(raw.get())
                    .map_err(|source| DecodeError::NotEncoded { index, source })?;
                Answer::decode(&document)
                    .map_err(|source| DecodeError::Substitution { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { answers })
    }

    /// Encode into the double-encoded form the server sends.
    pub fn to_reply(&self) -> Result<String, serde_json::Error> {
        let documents = self
            .answers
            .iter()
            .map(Answer::encode)
            .collect::<Result<Vec<_>, _>>()?;
        serde_json::to_string(&documents)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Answer> {
        self.answers.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Answer> {
        self.answers.get(index)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl Index<usize> for AnswerSet {
    type Output = Answer;

    fn index(&self, index: usize) -> &Answer {
        &self.answers[index]
    }
}

impl<'a> IntoIterator for &'a AnswerSet {
    type Item = &'a Answer;
    type IntoIter = std::slice::Iter<'a, Answer>;

    fn into_iter(self) -> Self::IntoIter {
        self.answers.iter()
    }
}

impl IntoIterator for AnswerSet {
    type Item = Answer;
    type IntoIter = std::vec::IntoIter<Answer>;

    fn into_iter(self) -> Self::IntoIter {
        self.answers.into_iter()
    }
}

// =============================================================================
// Claims
// =============================================================================

/// Decoded reply of `query_claims` / `query_all_claims`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClaimSet {
    claims: Vec<String>,
}

impl ClaimSet {
    pub fn new(claims: Vec<String>) -> Self {
        Self { claims }
    }

    /// Decode a claims reply.
    ///
    /// String elements yield their content. The ETB server serialises
    /// claim literals as JSON objects; those yield their JSON source text.
    pub fn decode(reply: &str) -> Result<Self, DecodeError> {
        let claims = split_reply(reply)?
            .into_iter()
            .map(|raw| {
                serde_json::from_str::<String>(raw.get()).unwrap_or_else(|_| raw.get().to_string())
            })
            .collect();
        Ok(Self { claims })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.claims.iter()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.claims
    }
}

impl<'a> IntoIterator for &'a ClaimSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.claims.iter()
    }
}

impl IntoIterator for ClaimSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.claims.into_iter()
    }
}
