//! Entity tagging backends.
//!
//! The rule tagger groups runs of capitalised words and classifies each run
//! with suffix rules and small gazetteers, emitting spaCy-style labels
//! (`PERSON`, `ORG`, `GPE`, `LOC`). The hosted tagger calls a token
//! classification model. Both outputs pass through the same allow-list.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use super::hosted::HostedInference;
use super::preprocessing::{truncate_to_max_tokens, MAX_MODEL_TOKENS};
use super::stopwords::is_stop_word;
use super::AnalysisError;
use crate::models::{EntityLabel, EntityMention};

static ORG_SUFFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "inc", "corp", "corporation", "co", "company", "ltd", "llc", "plc", "group",
        "holdings", "bank", "university", "college", "institute", "association",
        "agency", "ministry", "department", "council", "committee", "commission",
        "foundation", "fund", "party", "club", "fc", "league", "federation", "union",
        "airlines", "airways", "motors", "technologies", "systems", "labs", "studios",
        "pictures", "records", "entertainment", "media", "news", "times", "post",
        "journal", "network", "partners", "capital", "securities", "exchange",
        "reserve", "court", "senate", "parliament", "congress", "police", "army",
    ]
    .into_iter()
    .collect()
});

static ORGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "apple", "google", "alphabet", "microsoft", "amazon", "meta", "facebook",
        "tesla", "nvidia", "intel", "amd", "ibm", "oracle", "netflix", "disney",
        "openai", "anthropic", "samsung", "sony", "toyota", "boeing", "airbus",
        "spacex", "twitter", "uber", "spotify", "walmart", "nike", "pfizer", "moderna",
        "goldman sachs", "jpmorgan", "morgan stanley", "blackrock", "berkshire hathaway",
        "nasa", "fbi", "cia", "nato", "fifa", "uefa", "nba", "nfl", "nhl", "mlb",
        "reuters", "bloomberg", "cnn", "bbc", "fox news", "associated press",
        "the new york times", "new york times", "wall street journal", "white house",
        "pentagon", "kremlin", "federal reserve", "european union", "united nations",
        "world health organization", "who", "imf", "world bank", "opec", "sec",
        "wall street", "nasdaq", "hollywood",
    ]
    .into_iter()
    .collect()
});

static GPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "us", "u.s", "u.s.", "usa", "america", "united states", "uk", "u.k.", "britain",
        "great britain", "united kingdom", "england", "scotland", "wales", "ireland",
        "france", "germany", "italy", "spain", "portugal", "netherlands", "belgium",
        "switzerland", "austria", "sweden", "norway", "denmark", "finland", "poland",
        "ukraine", "russia", "turkey", "greece", "israel", "iran", "iraq", "syria",
        "lebanon", "egypt", "saudi arabia", "qatar", "india", "pakistan", "china",
        "japan", "south korea", "north korea", "korea", "taiwan", "vietnam",
        "thailand", "indonesia", "philippines", "australia", "new zealand", "canada",
        "mexico", "brazil", "argentina", "chile", "colombia", "venezuela", "nigeria",
        "kenya", "south africa", "ethiopia", "gaza", "new york", "los angeles",
        "chicago", "houston", "san francisco", "washington", "boston", "miami",
        "seattle", "london", "paris", "berlin", "madrid", "rome", "moscow", "kyiv",
        "beijing", "shanghai", "hong kong", "tokyo", "seoul", "delhi", "new delhi",
        "mumbai", "sydney", "toronto", "dubai", "singapore", "california", "texas",
        "florida", "ohio", "georgia", "arizona", "nevada",
    ]
    .into_iter()
    .collect()
});

static LOCATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "europe", "asia", "africa", "antarctica", "north america", "south america",
        "latin america", "middle east", "silicon valley", "the middle east",
        "pacific", "atlantic", "indian ocean", "mediterranean", "arctic", "amazon river",
        "himalayas", "alps", "sahara", "caribbean", "balkans", "scandinavia",
        "red sea", "black sea", "gulf", "west bank",
    ]
    .into_iter()
    .collect()
});

static TITLES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "mr", "mrs", "ms", "dr", "prof", "sir", "dame", "president", "vice",
        "senator", "sen", "rep", "governor", "gov", "mayor", "minister", "chancellor",
        "king", "queen", "prince", "princess", "pope", "judge", "ceo", "cfo", "coach",
        "general", "gen", "captain", "chairman", "chairwoman", "founder", "director",
        "secretary", "ambassador", "officer", "star", "singer", "actor", "actress",
    ]
    .into_iter()
    .collect()
});

static FIRST_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "joe", "donald", "barack", "kamala", "elon", "jeff", "mark", "bill", "tim",
        "sundar", "satya", "sam", "jensen", "warren", "taylor", "beyonce", "lebron",
        "michael", "john", "james", "robert", "david", "richard", "william", "thomas",
        "charles", "emmanuel", "vladimir", "xi", "narendra", "rishi", "keir", "olaf",
        "justin", "mary", "patricia", "jennifer", "linda", "elizabeth", "susan",
        "sarah", "jessica", "karen", "nancy", "lisa", "emma", "olivia", "sophia",
        "lionel", "cristiano", "serena", "roger", "rafael", "novak", "tom", "chris",
        "kevin", "brian", "george", "paul", "peter", "steve", "daniel", "andrew",
        "anna", "maria", "laura", "rachel", "ryan", "jack", "harry", "oliver",
    ]
    .into_iter()
    .collect()
});

static NON_ENTITY_CAPS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
        "january", "february", "march", "april", "may", "june", "july", "august",
        "september", "october", "november", "december", "breaking", "update", "live",
        "watch", "report", "exclusive", "opinion", "analysis", "video", "photos",
    ]
    .into_iter()
    .collect()
});

const CONNECTORS: [&str; 6] = ["of", "and", "&", "for", "de", "la"];

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    byte_start: usize,
    start: usize,
    end: usize,
}

/// Word-bound tokens with character offsets; whitespace is dropped.
fn tokens(text: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut chars = 0usize;
    for (byte_start, segment) in text.split_word_bound_indices() {
        let len = segment.chars().count();
        if !segment.trim().is_empty() {
            out.push(Token {
                text: segment,
                byte_start,
                start: chars,
                end: chars + len,
            });
        }
        chars += len;
    }
    out
}

fn is_capitalized(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_uppercase() => word.chars().any(char::is_alphabetic),
        _ => false,
    }
}

fn is_acronym(word: &str) -> bool {
    let letters = word.chars().filter(|c| c.is_alphabetic()).count();
    (2..=6).contains(&letters)
        && word.chars().all(|c| c.is_uppercase() || c == '.' || c == '&')
}

fn strip_possessive(word: &str) -> &str {
    word.strip_suffix("'s")
        .or_else(|| word.strip_suffix("\u{2019}s"))
        .unwrap_or(word)
}

/// Capitalisation + gazetteer tagger.
#[derive(Debug, Clone, Default)]
pub struct RuleTagger;

impl RuleTagger {
    pub fn new() -> Self {
        Self
    }

    pub fn tag(&self, text: &str) -> Vec<EntityMention> {
        let toks = tokens(text);
        let mut out = Vec::new();
        let mut i = 0;

        while i < toks.len() {
            if !self.can_start(toks[i].text) {
                i += 1;
                continue;
            }

            let mut span = vec![i];
            let mut k = i + 1;
            while k < toks.len() {
                let word = toks[k].text;
                if is_capitalized(word) && !self.breaks_span(word) {
                    span.push(k);
                    k += 1;
                } else if CONNECTORS.contains(&word.to_lowercase().as_str())
                    && k + 1 < toks.len()
                    && is_capitalized(toks[k + 1].text)
                    && !self.breaks_span(toks[k + 1].text)
                {
                    span.push(k);
                    span.push(k + 1);
                    k += 2;
                } else {
                    break;
                }
                // a possessive closes the name
                if toks[k - 1].text != strip_possessive(toks[k - 1].text) {
                    break;
                }
            }

            if let Some(mention) = self.classify_span(text, &toks, &span) {
                out.push(mention);
            }
            i = k;
        }

        out
    }

    fn can_start(&self, word: &str) -> bool {
        is_capitalized(word) && !self.breaks_span(word)
    }

    fn breaks_span(&self, word: &str) -> bool {
        NON_ENTITY_CAPS.contains(word.to_lowercase().as_str())
    }

    fn classify_span(&self, text: &str, toks: &[Token<'_>], span: &[usize]) -> Option<EntityMention> {
        let mut first = 0;
        let mut after_title = self.preceded_by_title(toks, span[0]);

        // leading stopwords ("The", "In") and titles are not part of the name
        while first < span.len() {
            let lower = toks[span[first]].text.to_lowercase();
            let lower = lower.trim_end_matches('.');
            if TITLES.contains(lower) && first + 1 < span.len() {
                after_title = true;
                first += 1;
            } else if is_stop_word(lower) && !is_acronym(toks[span[first]].text) {
                first += 1;
            } else {
                break;
            }
        }
        let mut last = span.len();
        while last > first && is_stop_word(&toks[span[last - 1]].text.to_lowercase()) {
            last -= 1;
        }
        if first >= last {
            return None;
        }

        let head = toks[span[first]];
        let tail = toks[span[last - 1]];
        let tail_text = strip_possessive(tail.text);
        let byte_end = tail.byte_start + tail_text.len();
        let surface = text.get(head.byte_start..byte_end)?.trim();
        if surface.is_empty() {
            return None;
        }
        let end = tail.start + tail_text.chars().count();

        let words: Vec<&str> = surface.split_whitespace().collect();
        let label = self.label_for(surface, &words, after_title)?;

        Some(EntityMention {
            text: surface.to_string(),
            label,
            start: head.start,
            end,
            score: None,
        })
    }

    fn preceded_by_title(&self, toks: &[Token<'_>], idx: usize) -> bool {
        let mut j = idx;
        while j > 0 {
            j -= 1;
            let word = toks[j].text;
            if word == "." {
                continue;
            }
            return TITLES.contains(word.to_lowercase().trim_end_matches('.'));
        }
        false
    }

    fn label_for(&self, surface: &str, words: &[&str], after_title: bool) -> Option<EntityLabel> {
        let lower = surface.to_lowercase();
        let last = words.last()?.to_lowercase();

        if after_title && !ORGS.contains(lower.as_str()) {
            return Some(EntityLabel::Person);
        }
        if GPES.contains(lower.as_str()) {
            return Some(EntityLabel::Gpe);
        }
        if LOCATIONS.contains(lower.as_str()) {
            return Some(EntityLabel::Loc);
        }
        if ORGS.contains(lower.as_str())
            || (words.len() > 1 && ORG_SUFFIXES.contains(last.trim_end_matches('.')))
            || (words.len() == 1 && is_acronym(words[0]))
        {
            return Some(EntityLabel::Org);
        }

        let first = words[0].to_lowercase();
        if FIRST_NAMES.contains(first.as_str()) {
            return Some(EntityLabel::Person);
        }
        let capitalised = words.iter().all(|w| is_capitalized(w));
        if (2..=3).contains(&words.len()) && capitalised {
            return Some(EntityLabel::Person);
        }
        None
    }
}

#[derive(Debug, Clone)]
pub struct HostedTagger {
    inference: HostedInference,
    model: String,
}

impl HostedTagger {
    pub fn new(inference: HostedInference, model: impl Into<String>) -> Self {
        Self {
            inference,
            model: model.into(),
        }
    }

    async fn tag(&self, text: &str) -> Result<Vec<EntityMention>, AnalysisError> {
        let raw = self.inference.token_classify(&self.model, text).await?;
        Ok(raw
            .into_iter()
            .filter_map(|r| {
                let label = EntityLabel::from_raw(r.label())?;
                let word = r.clean_word();
                if word.is_empty() {
                    return None;
                }
                let start = r.start.unwrap_or(0);
                let end = r.end.unwrap_or(start + word.chars().count());
                Some(EntityMention {
                    text: word,
                    label,
                    start,
                    end,
                    score: r.score,
                })
            })
            .collect())
    }
}

/// A loaded entity tagger.
#[derive(Debug, Clone)]
pub enum EntityBackend {
    Rules(RuleTagger),
    Hosted(HostedTagger),
}

impl EntityBackend {
    pub fn name(&self) -> &str {
        match self {
            EntityBackend::Rules(_) => "rules",
            EntityBackend::Hosted(t) => &t.model,
        }
    }

    /// One mention list per input, order preserved.
    pub async fn extract(&self, texts: &[String]) -> Result<Vec<Vec<EntityMention>>, AnalysisError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            let text = truncate_to_max_tokens(text, MAX_MODEL_TOKENS);
            let mentions = match self {
                EntityBackend::Rules(tagger) => tagger.tag(text),
                EntityBackend::Hosted(tagger) => {
                    if text.is_empty() {
                        Vec::new()
                    } else {
                        tagger.tag(text).await?
                    }
                }
            };
            debug!("{} tagged {} entities", self.name(), mentions.len());
            out.push(mentions);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(text: &str) -> Vec<(String, EntityLabel)> {
        RuleTagger::new()
            .tag(text)
            .into_iter()
            .map(|m| (m.text, m.label))
            .collect()
    }

    #[test]
    fn organisations_places_and_people() {
        let found = labels("Elon Musk said Tesla will open a factory in Germany.");
        assert_eq!(
            found,
            vec![
                ("Elon Musk".to_string(), EntityLabel::Person),
                ("Tesla".to_string(), EntityLabel::Org),
                ("Germany".to_string(), EntityLabel::Gpe),
            ]
        );
    }

    #[test]
    fn leading_article_and_suffix() {
        let found = labels("Shares of the Acme Holdings rose as The Federal Reserve met.");
        assert!(found.contains(&("Acme Holdings".to_string(), EntityLabel::Org)));
        assert!(found.contains(&("Federal Reserve".to_string(), EntityLabel::Org)));
    }

    #[test]
    fn titles_mark_people() {
        let found = labels("President Lula met Dr. Okafor in Europe");
        assert!(found.contains(&("Lula".to_string(), EntityLabel::Person)));
        assert!(found.contains(&("Okafor".to_string(), EntityLabel::Person)));
        assert!(found.contains(&("Europe".to_string(), EntityLabel::Loc)));
    }

    #[test]
    fn offsets_are_characters() {
        let text = "Café owners in Paris";
        let mentions = RuleTagger::new().tag(text);
        let paris = mentions.iter().find(|m| m.text == "Paris").unwrap();
        assert_eq!(paris.start, 15);
        assert_eq!(paris.end, 20);
    }

    #[test]
    fn possessive_is_dropped() {
        let found = labels("Apple's new phone");
        assert_eq!(found, vec![("Apple".to_string(), EntityLabel::Org)]);
    }

    #[tokio::test]
    async fn rules_backend_returns_one_list_per_text() {
        let backend = EntityBackend::Rules(RuleTagger::new());
        let texts = vec!["NASA launches".to_string(), String::new()];
        let out = backend.extract(&texts).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0][0].label, EntityLabel::Org);
        assert!(out[1].is_empty());
    }

    #[tokio::test]
    async fn offsets_index_the_untouched_input() {
        let backend = EntityBackend::Rules(RuleTagger::new());
        let text = "Talks  held\nin Paris";
        let out = backend.extract(&[text.to_string()]).await.unwrap();
        let paris = out[0].iter().find(|m| m.text == "Paris").unwrap();
        let sliced: String = text
            .chars()
            .skip(paris.start)
            .take(paris.end - paris.start)
            .collect();
        assert_eq!(sliced, "Paris");
    }
}
