//! Rule-based English lemmatizer.
//!
//! An irregular-form table handles the common exceptions; everything else goes
//! through ordered suffix rules for plurals, `-ing` and `-ed`. Input is
//! expected lower-cased.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

static IRREGULAR: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("was", "be"), ("were", "be"), ("is", "be"), ("are", "be"), ("been", "be"),
        ("am", "be"), ("has", "have"), ("had", "have"), ("does", "do"), ("did", "do"),
        ("went", "go"), ("gone", "go"), ("goes", "go"), ("said", "say"), ("says", "say"),
        ("made", "make"), ("took", "take"), ("taken", "take"), ("gave", "give"),
        ("given", "give"), ("came", "come"), ("saw", "see"), ("seen", "see"),
        ("knew", "know"), ("known", "know"), ("got", "get"), ("gotten", "get"),
        ("found", "find"), ("thought", "think"), ("told", "tell"), ("became", "become"),
        ("left", "leave"), ("felt", "feel"), ("brought", "bring"), ("began", "begin"),
        ("begun", "begin"), ("kept", "keep"), ("held", "hold"), ("wrote", "write"),
        ("written", "write"), ("stood", "stand"), ("heard", "hear"), ("meant", "mean"),
        ("met", "meet"), ("ran", "run"), ("paid", "pay"), ("sat", "sit"), ("spoke", "speak"),
        ("spoken", "speak"), ("led", "lead"), ("grew", "grow"), ("grown", "grow"),
        ("lost", "lose"), ("fell", "fall"), ("fallen", "fall"), ("sent", "send"),
        ("built", "build"), ("understood", "understand"), ("drew", "draw"),
        ("drawn", "draw"), ("broke", "break"), ("broken", "break"), ("spent", "spend"),
        ("rose", "rise"), ("risen", "rise"), ("won", "win"), ("sold", "sell"),
        ("bought", "buy"), ("caught", "catch"), ("fought", "fight"), ("taught", "teach"),
        ("struck", "strike"), ("hit", "hit"), ("cut", "cut"), ("set", "set"),
        ("shot", "shoot"), ("chose", "choose"), ("chosen", "choose"), ("drove", "drive"),
        ("driven", "drive"), ("ate", "eat"), ("eaten", "eat"), ("flew", "fly"),
        ("flown", "fly"), ("forgot", "forget"), ("froze", "freeze"), ("hid", "hide"),
        ("slid", "slide"), ("swore", "swear"), ("threw", "throw"), ("thrown", "throw"),
        ("woke", "wake"), ("wore", "wear"), ("sank", "sink"), ("sung", "sing"),
        ("sang", "sing"), ("used", "use"), ("dying", "die"), ("lying", "lie"),
        ("men", "man"), ("women", "woman"), ("children", "child"), ("people", "people"),
        ("feet", "foot"), ("teeth", "tooth"), ("mice", "mouse"), ("geese", "goose"),
        ("lives", "life"), ("wives", "wife"), ("knives", "knife"), ("leaves", "leaf"),
        ("halves", "half"), ("shelves", "shelf"), ("thieves", "thief"),
        ("wolves", "wolf"), ("data", "datum"), ("criteria", "criterion"),
        ("phenomena", "phenomenon"), ("crises", "crisis"), ("analyses", "analysis"),
        ("theses", "thesis"), ("better", "well"), ("best", "well"), ("worse", "bad"),
        ("worst", "bad"),
    ]
    .into_iter()
    .collect()
});

/// Words ending in `s` that are already in base form.
static INVARIANT_S: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "news", "series", "species", "physics", "economics", "politics", "mathematics",
        "athletics", "analysis", "crisis", "thesis", "basis", "diagnosis", "emphasis",
        "bus", "gas", "lens", "yes", "this", "thus", "plus", "bonus", "virus", "campus",
        "census", "status", "focus", "consensus", "chaos", "billiards", "always",
        "perhaps", "various", "famous", "serious", "previous", "anonymous", "obvious",
        "dangerous", "us", "its", "his", "hers", "ours", "yours", "theirs", "whereas",
        "across", "less", "unless", "nevertheless", "mess", "boss", "loss", "press",
        "access", "process", "success", "business", "congress", "progress", "address",
        "class", "glass", "grass", "pass", "mass", "chess", "stress", "dress",
        "texas", "paris", "athens", "lewis", "james", "jones", "williams", "davis",
        "olympics", "tennis", "kudos", "pros", "cons", "alias", "atlas", "canvas",
        "iris", "oasis", "tuberculosis", "sars", "ios", "windows",
    ]
    .into_iter()
    .collect()
});

/// Words ending in `-ing`/`-ed` that are not inflections.
static INVARIANT_ING_ED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "morning", "evening", "during", "nothing", "something", "anything", "everything",
        "thing", "king", "ring", "spring", "string", "wing", "sing", "bring", "ceiling",
        "wedding", "pudding", "lightning", "interesting", "ping", "ding", "beijing",
        "viking", "sterling", "bed", "red", "shed", "need", "seed", "speed", "feed",
        "greed", "breed", "deed", "indeed", "hundred", "sacred", "naked", "wicked",
        "ahead", "dead", "head", "bread", "spread", "thread", "embed", "hybrid", "wed",
        "med", "fed", "ted", "united", "limited", "related",
    ]
    .into_iter()
    .collect()
});

const MIN_STEM: usize = 3;

pub fn lemmatize(word: &str) -> String {
    if let Some(lemma) = IRREGULAR.get(word) {
        return (*lemma).to_string();
    }
    if word.chars().count() <= MIN_STEM {
        return word.to_string();
    }
    if let Some(lemma) = strip_ing_ed(word) {
        return lemma;
    }
    if let Some(lemma) = strip_plural(word) {
        return lemma;
    }
    word.to_string()
}

fn strip_plural(word: &str) -> Option<String> {
    if !word.ends_with('s') || INVARIANT_S.contains(word) {
        return None;
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return None;
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() >= 2 {
            return Some(format!("{stem}y"));
        }
    }
    for suffix in ["sses", "ches", "shes", "xes", "zzes"] {
        if word.ends_with(suffix) {
            return Some(word[..word.len() - 2].to_string());
        }
    }
    let stem = &word[..word.len() - 1];
    (stem.len() >= MIN_STEM - 1).then(|| stem.to_string())
}

fn strip_ing_ed(word: &str) -> Option<String> {
    if INVARIANT_ING_ED.contains(word) {
        return None;
    }

    if let Some(stem) = word.strip_suffix("ied") {
        if stem.len() >= 2 {
            return Some(format!("{stem}y"));
        }
    }

    let stem = word
        .strip_suffix("ing")
        .or_else(|| word.strip_suffix("ed"))?;

    if stem.len() < MIN_STEM || !has_vowel(stem) {
        return None;
    }
    if word.ends_with("ed") && stem.ends_with('e') {
        // agreed -> agree
        return Some(word[..word.len() - 1].to_string());
    }

    Some(restore_stem(stem))
}

fn restore_stem(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    let last = chars[n - 1];

    // stopp -> stop, plann -> plan
    if n >= 2 && last == chars[n - 2] && !is_vowel(last) && !matches!(last, 'l' | 's' | 'z') {
        return chars[..n - 1].iter().collect();
    }

    // creat -> create, organiz -> organize, troubl -> trouble
    if stem.ends_with("at") || stem.ends_with("iz") || stem.ends_with("bl") {
        return format!("{stem}e");
    }

    // leav -> leave, produc -> produce, argu -> argue
    if matches!(last, 'v' | 'z' | 'c' | 'u') {
        return format!("{stem}e");
    }

    // rais -> raise, clos -> close
    if last == 's' && n <= 4 && n >= 2 && is_vowel(chars[n - 2]) {
        return format!("{stem}e");
    }

    // mak -> make, tak -> take
    if n == 3 && !is_vowel(chars[0]) && is_vowel(chars[1]) && !is_vowel(last)
        && !matches!(last, 'w' | 'x' | 'y')
    {
        return format!("{stem}e");
    }

    stem.to_string()
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn has_vowel(s: &str) -> bool {
    s.chars().any(|c| is_vowel(c) || c == 'y')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plurals() {
        assert_eq!(lemmatize("markets"), "market");
        assert_eq!(lemmatize("companies"), "company");
        assert_eq!(lemmatize("watches"), "watch");
        assert_eq!(lemmatize("prices"), "price");
        assert_eq!(lemmatize("news"), "news");
        assert_eq!(lemmatize("children"), "child");
    }

    #[test]
    fn verb_forms() {
        assert_eq!(lemmatize("running"), "run");
        assert_eq!(lemmatize("making"), "make");
        assert_eq!(lemmatize("reported"), "report");
        assert_eq!(lemmatize("announced"), "announce");
        assert_eq!(lemmatize("created"), "create");
        assert_eq!(lemmatize("raised"), "raise");
        assert_eq!(lemmatize("tried"), "try");
        assert_eq!(lemmatize("went"), "go");
    }

    #[test]
    fn non_inflections_are_kept() {
        assert_eq!(lemmatize("morning"), "morning");
        assert_eq!(lemmatize("speed"), "speed");
        assert_eq!(lemmatize("bring"), "bring");
        assert_eq!(lemmatize("gas"), "gas");
    }
}
