//! Tag extraction from dictionary definitions
//!
//! Best-effort text heuristics over the locale section of a definition
//! page. Kept apart from classification: an extractor can be swapped
//! without touching disposition logic, and it never fails, a section it
//! cannot read yields empty lists.
//!
//! The default grammar is a table of [`TagRule`]s, one row per marker
//! family, matched as lower-cased substrings of the HTML-stripped
//! definition text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;

/// One part-of-speech entry of a locale section
///
/// Lists given as `null` read as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LexicalEntry {
    #[serde(rename = "partOfSpeech", default)]
    pub part_of_speech: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub definitions: Vec<DefinitionEntry>,
}

/// One sense within an entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefinitionEntry {
    /// HTML fragment
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub examples: Vec<serde_json::Value>,
    #[serde(rename = "parsedExamples", default, deserialize_with = "null_as_empty")]
    pub parsed_examples: Vec<serde_json::Value>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Pluggable extraction capability used by the lookup client
pub trait TagExtractor: Send + Sync {
    /// Upper-cased, deduplicated, first-seen order
    fn parts_of_speech(&self, section: &[LexicalEntry]) -> Vec<String>;

    /// Additional tags for a section whose PoS list is `parts_of_speech`
    fn tags(&self, parts_of_speech: &[String], section: &[LexicalEntry]) -> Vec<String>;
}

/// Grammatical dimension a rule reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFamily {
    Number,
    Gender,
    Tense,
    Person,
    Mood,
    Form,
}

/// Declarative extraction rule
///
/// Applies when the section has one of `applies_to` among its parts of
/// speech and any definition contains one of `markers`.
#[derive(Debug, Clone, Copy)]
pub struct TagRule {
    pub family: TagFamily,
    pub applies_to: &'static [&'static str],
    pub markers: &'static [&'static str],
    pub tags: &'static [&'static str],
}

const NOUN: &[&str] = &["NOUN"];
const NOMINAL: &[&str] = &["NOUN", "ADJECTIVE"];
const VERB: &[&str] = &["VERB"];

/// Default rule table
pub const DEFAULT_RULES: &[TagRule] = &[
    TagRule {
        family: TagFamily::Number,
        applies_to: NOUN,
        markers: &[
            "plural of",
            "plural form of",
            "plurals of",
            "pluriel de",
            "plural von",
            "plural de",
            "forma plural",
        ],
        tags: &["PLURAL"],
    },
    TagRule {
        family: TagFamily::Gender,
        applies_to: NOMINAL,
        markers: &["feminine of", "feminine singular of", "feminine plural of", "féminin de"],
        tags: &["FEM"],
    },
    TagRule {
        family: TagFamily::Gender,
        applies_to: NOMINAL,
        markers: &["masculine of", "masculine plural of", "masculin de"],
        tags: &["MASC"],
    },
    TagRule {
        family: TagFamily::Tense,
        applies_to: VERB,
        markers: &["past participle", "participe passé", "partizip ii"],
        tags: &["PAST_PART", "INFLECTED_FORM"],
    },
    TagRule {
        family: TagFamily::Tense,
        applies_to: VERB,
        markers: &["present participle", "gerund", "participe présent", "partizip i"],
        tags: &["PRES_PART", "INFLECTED_FORM"],
    },
    TagRule {
        family: TagFamily::Tense,
        applies_to: VERB,
        markers: &["past tense", "preterite", "prétérit", "imparfait"],
        tags: &["PAST", "INFLECTED_FORM"],
    },
    TagRule {
        family: TagFamily::Person,
        applies_to: VERB,
        markers: &["third-person singular", "3rd-person singular", "3rd person singular"],
        tags: &["3PS", "INFLECTED_FORM"],
    },
    TagRule {
        family: TagFamily::Mood,
        applies_to: VERB,
        markers: &["imperative"],
        tags: &["IMP", "INFLECTED_FORM"],
    },
    TagRule {
        family: TagFamily::Mood,
        applies_to: VERB,
        markers: &["subjunctive"],
        tags: &["SUBJ", "INFLECTED_FORM"],
    },
    TagRule {
        family: TagFamily::Mood,
        applies_to: VERB,
        markers: &["infinitive"],
        tags: &["INF"],
    },
    TagRule {
        family: TagFamily::Form,
        applies_to: VERB,
        markers: &["form of", "inflection of", "conjugation of", "conjugated form of"],
        tags: &["FORM_OF", "INFLECTED_FORM"],
    },
];

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("static regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Strip tags, unescape common entities, collapse whitespace
pub fn strip_html(fragment: &str) -> String {
    let text = HTML_TAG.replace_all(fragment, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&");
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Rule-table extractor over definition text
#[derive(Debug, Clone)]
pub struct DefinitionHeuristics {
    rules: &'static [TagRule],
}

impl Default for DefinitionHeuristics {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES,
        }
    }
}

impl DefinitionHeuristics {
    pub fn with_rules(rules: &'static [TagRule]) -> Self {
        Self { rules }
    }

    fn definition_texts(section: &[LexicalEntry]) -> Vec<String> {
        section
            .iter()
            .flat_map(|e| e.definitions.iter())
            .filter_map(|d| d.definition.as_deref())
            .map(|html| strip_html(html).to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }

    fn has_example(section: &[LexicalEntry]) -> bool {
        section
            .iter()
            .flat_map(|e| e.definitions.iter())
            .any(|d| !d.examples.is_empty() || !d.parsed_examples.is_empty())
    }
}

impl TagExtractor for DefinitionHeuristics {
    fn parts_of_speech(&self, section: &[LexicalEntry]) -> Vec<String> {
        let mut pos_list: Vec<String> = Vec::new();
        for entry in section {
            let Some(pos) = entry.part_of_speech.as_deref() else {
                continue;
            };
            let pos = pos.trim().to_uppercase();
            if !pos.is_empty() && !pos_list.contains(&pos) {
                pos_list.push(pos);
            }
        }
        pos_list
    }

    fn tags(&self, parts_of_speech: &[String], section: &[LexicalEntry]) -> Vec<String> {
        let texts = Self::definition_texts(section);
        let contains_any =
            |markers: &[&str]| texts.iter().any(|t| markers.iter().any(|m| t.contains(m)));
        let has_pos = |wanted: &[&str]| parts_of_speech.iter().any(|p| wanted.contains(&p.as_str()));

        let mut tags = BTreeSet::new();

        if Self::has_example(section) {
            tags.insert("HAS_EXAMPLE");
        }

        let mut number_matched = false;
        for rule in self.rules {
            if has_pos(rule.applies_to) && contains_any(rule.markers) {
                tags.extend(rule.tags.iter().copied());
                if rule.family == TagFamily::Number {
                    number_matched = true;
                }
            }
        }

        if has_pos(NOUN) && !number_matched {
            tags.insert("SINGULAR");
        }

        tags.into_iter().map(str::to_string).collect()
    }
}
