//! Skill normalization: trims, title-cases, filters and de-duplicates candidates.

use std::collections::HashSet;

use serde::Serialize;

/// Tokens that extractors occasionally emit but are never skills.
/// Compared against the lower-cased normalized form.
pub const BLACKLIST: [&str; 3] = ["json", "[]", ""];

/// An ordered list of unique, non-blacklisted, title-cased skills.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkillList(Vec<String>);

impl SkillList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a SkillList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Upper-cases the first letter of every word and lower-cases the rest.
/// A word starts at any letter not preceded by another letter, so
/// "problem-solving" becomes "Problem-Solving" and "AWS" becomes "Aws".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Normalizes one candidate, returning `None` when it is blacklisted or empty.
pub fn normalize_skill(candidate: &str) -> Option<String> {
    let normalized = title_case(candidate.trim());
    let lowered = normalized.to_lowercase();
    if normalized.is_empty() || BLACKLIST.contains(&lowered.as_str()) {
        return None;
    }
    Some(normalized)
}

/// Normalizes every candidate and drops blacklisted entries and duplicates.
/// The first occurrence of each normalized skill keeps its position.
pub fn normalize_and_dedupe<I, S>(candidates: I) -> SkillList
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut skills = Vec::new();
    for candidate in candidates {
        if let Some(skill) = normalize_skill(candidate.as_ref()) {
            if seen.insert(skill.clone()) {
                skills.push(skill);
            }
        }
    }
    SkillList(skills)
}
