use crate::config::SearchConfig;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// Corpus-specific noise words that survive the English list on wiki dumps.
pub const CORPUS_STOPWORDS: &[&str] = &["category", "references", "also", "links", "extenal", "see", "thumb"];

const ENGLISH_STOPWORDS: &[&str] = &[
    "i","me","my","myself","we","our","ours","ourselves","you","you're","you've","you'll","you'd","your","yours","yourself","yourselves",
    "he","him","his","himself","she","she's","her","hers","herself","it","it's","its","itself",
    "they","them","their","theirs","themselves","what","which","who","whom","this","that","that'll","these","those",
    "am","is","are","was","were","be","been","being","have","has","had","having","do","does","did","doing",
    "a","an","the","and","but","if","or","because","as","until","while","of","at","by","for","with","about","against",
    "between","into","through","during","before","after","above","below","to","from","up","down","in","out","on","off",
    "over","under","again","further","then","once","here","there","when","where","why","how","all","any","both","each",
    "few","more","most","other","some","such","no","nor","not","only","own","same","so","than","too","very",
    "s","t","can","will","just","don","don't","should","should've","now","d","ll","m","o","re","ve","y",
    "ain","aren","aren't","couldn","couldn't","didn","didn't","doesn","doesn't","hadn","hadn't","hasn","hasn't",
    "haven","haven't","isn","isn't","ma","mightn","mightn't","mustn","mustn't","needn","needn't","shan","shan't",
    "shouldn","shouldn't","wasn","wasn't","weren","weren't","won","won't","wouldn","wouldn't",
];

lazy_static! {
    // A leading word char (or #/@) followed by 2..=24 word chars, each optionally after ' or -.
    // Word chars exclude combining marks so terms line up with the offline index builder.
    static ref RE_WORD: Regex = Regex::new(r"[#@\w&&[^\p{M}]](?:['\-]?[\w&&[^\p{M}]]){2,24}").expect("valid regex");
    static ref DEFAULT_TOKENIZER: Tokenizer = Tokenizer::default();
}

/// Lowercasing regex tokenizer with a fixed stopword set.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stopwords: HashSet<String>,
}

impl Tokenizer {
    /// English stopwords plus the given corpus-specific words.
    pub fn new<I, S>(corpus_stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut stopwords: HashSet<String> = ENGLISH_STOPWORDS.iter().map(|w| w.to_string()).collect();
        stopwords.extend(corpus_stopwords.into_iter().map(Into::into));
        Self { stopwords }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.corpus_stopwords.iter().cloned())
    }

    pub fn is_stopword(&self, token: &str) -> bool { self.stopwords.contains(token) }

    /// Terms in left-to-right order, duplicates kept.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        RE_WORD
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !self.is_stopword(token))
            .map(str::to_string)
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self { Self::new(CORPUS_STOPWORDS.iter().copied()) }
}

/// Tokenize with the default stopword configuration.
pub fn tokenize(text: &str) -> Vec<String> {
    DEFAULT_TOKENIZER.tokenize(text)
}
