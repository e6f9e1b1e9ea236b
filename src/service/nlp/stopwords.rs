use std::collections::HashSet;

use once_cell::sync::Lazy;

/// English stopwords, matched against the lower-cased token.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // articles, determiners
        "a", "an", "the", "this", "that", "these", "those", "each", "every", "either",
        "neither", "another", "such", "some", "any", "all", "both", "few", "many", "much",
        "more", "most", "less", "least", "several", "enough", "whole",
        // pronouns
        "i", "me", "my", "myself", "mine", "we", "us", "our", "ours", "ourselves", "you",
        "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself", "she",
        "her", "hers", "herself", "it", "its", "itself", "they", "them", "their", "theirs",
        "themselves", "what", "which", "who", "whom", "whose", "whoever", "whatever",
        "whichever", "one", "ones", "someone", "something", "somewhere", "somehow",
        "anyone", "anything", "anywhere", "anyhow", "everyone", "everything", "everywhere",
        "nobody", "noone", "nothing", "nowhere", "none", "other", "others", "own", "self",
        // auxiliaries and modals
        "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
        "having", "do", "does", "did", "doing", "done", "would", "should", "could", "ought",
        "might", "must", "shall", "will", "can", "cannot", "may", "need", "get", "gets",
        "got", "make", "made", "say", "said", "go", "see", "take", "give", "put", "show",
        "call", "keep", "become", "became", "becomes", "becoming", "seem", "seemed",
        "seeming", "seems",
        // prepositions
        "at", "by", "for", "from", "in", "into", "of", "on", "onto", "to", "with", "within",
        "without", "about", "above", "across", "after", "afterwards", "against", "along",
        "alongside", "amid", "amidst", "among", "amongst", "around", "before", "behind",
        "below", "beneath", "beside", "besides", "between", "beyond", "down", "during",
        "except", "inside", "near", "off", "out", "outside", "over", "past", "per",
        "since", "through", "throughout", "thru", "toward", "towards", "under",
        "underneath", "until", "unto", "up", "upon", "via", "versus",
        // conjunctions
        "and", "but", "or", "nor", "so", "yet", "if", "because", "as", "although", "though",
        "unless", "whereas", "whether", "while", "whilst", "than", "then", "once", "also",
        "therefore", "thus", "hence", "however", "moreover", "furthermore", "nevertheless",
        "otherwise", "meanwhile", "whereby", "wherein", "whereupon", "thereafter",
        "thereby", "therein", "thereupon", "hereafter", "hereby", "herein", "hereupon",
        // adverbs
        "here", "there", "when", "where", "why", "how", "again", "further", "already",
        "always", "almost", "alone", "else", "elsewhere", "ever", "even", "just", "only",
        "quite", "rather", "really", "very", "too", "well", "still", "now", "never",
        "often", "sometime", "sometimes", "soon", "together", "indeed", "perhaps",
        "mostly", "nevertheless", "namely", "no", "not", "nor", "back", "away", "last",
        "first", "next", "front", "top", "bottom", "side", "full", "part", "empty",
        "various", "regarding", "using", "used", "latterly", "formerly", "former",
        "latter", "beforehand", "forty", "fifty", "sixty", "hundred",
        // numbers
        "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
        "twelve", "fifteen", "twenty", "third", "fourth", "fifth",
        // contraction fragments
        "s", "t", "d", "ll", "m", "re", "ve", "nt", "ca", "wo", "sha",
    ]
    .into_iter()
    .collect()
});

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token.to_lowercase().as_str())
}
