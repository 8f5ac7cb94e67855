//! Wake-phrase detection over recognizer transcripts
//!
//! Pure text matching: no state, no side effects, callable concurrently.
//! Detection works on a normalized form of the transcript so punctuation
//! and casing noise from the recognizer cannot mask the activation phrase.

/// Outcome of a wake-phrase check.
#[derive(Debug, Clone, PartialEq)]
pub struct WakeDetection {
    pub detected: bool,
    /// The variant that matched, in normalized form
    pub phrase: Option<String>,
    /// 1.0 on any match, 0.0 otherwise; informational only
    pub confidence: f32,
}

impl WakeDetection {
    fn miss() -> Self {
        Self {
            detected: false,
            phrase: None,
            confidence: 0.0,
        }
    }
}

/// Matches a fixed list of accepted phrase variants against transcripts.
#[derive(Debug, Clone)]
pub struct WakePhraseMatcher {
    phrases: Vec<String>,
}

impl WakePhraseMatcher {
    /// Variants are normalized on construction; empty ones are dropped.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| normalize(p.as_ref()))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Whether the text contains any accepted phrase variant. First variant
    /// in list order wins.
    pub fn detect(&self, text: &str) -> WakeDetection {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return WakeDetection::miss();
        }
        for phrase in &self.phrases {
            if normalized.contains(phrase.as_str()) {
                return WakeDetection {
                    detected: true,
                    phrase: Some(phrase.clone()),
                    confidence: 1.0,
                };
            }
        }
        WakeDetection::miss()
    }

    /// The command text trailing the wake phrase.
    ///
    /// The variant is located in the lower-cased original (not the
    /// normalized form) so casing and punctuation after the phrase survive;
    /// leading non-alphanumerics are stripped from the remainder. When no
    /// variant is found verbatim, the trimmed original comes back unchanged.
    pub fn extract_command(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        for phrase in &self.phrases {
            if let Some(idx) = lowered.find(phrase.as_str()) {
                let end = idx + phrase.len();
                // Lowercasing can change byte lengths outside ASCII; fall
                // back to slicing the lowered text when offsets disagree.
                let tail = match text.get(end..) {
                    Some(tail) if lowered.len() == text.len() => tail,
                    _ => &lowered[end..],
                };
                return tail
                    .trim_start_matches(|c: char| !c.is_alphanumeric())
                    .trim()
                    .to_string();
            }
        }
        text.trim().to_string()
    }
}

/// Lower-case, drop everything outside `[a-z0-9 ]`, collapse whitespace.
fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut cleaned = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch);
        } else if ch.is_whitespace() {
            cleaned.push(' ');
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
