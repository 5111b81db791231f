// src/infrastructure/classifiers/lexicon.rs
use crate::domain::categorization::{CategoryScores, Classification};
use crate::domain::classifier::Classifier;
use crate::domain::error::DomainResult;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use tracing::instrument;

/// Dimension of the hashed bag-of-words embedding.
const EMBEDDING_DIM: usize = 64;

/// Smoothing constant for keyword scores: score = hits / (hits + SMOOTHING).
/// One hit scores 0.25, three hits 0.5, plenty of hits approaches 1.0.
const SMOOTHING: f32 = 3.0;

/// The fixed category set, modeled on the top-level web directory taxonomy.
pub const CATEGORIES: [&str; 14] = [
    "Arts",
    "Business",
    "Computers",
    "Games",
    "Health",
    "Home",
    "Kids_and_Teens",
    "News",
    "Recreation",
    "Reference",
    "Science",
    "Shopping",
    "Society",
    "Sports",
];

/// Keyword-lexicon classifier that runs entirely locally. It strips markup,
/// tokenizes, and counts hits against a small per-category lexicon. Crude,
/// but it needs no network and no model files.
pub struct LexiconClassifier {
    // token -> indices into CATEGORIES
    lexicon: HashMap<&'static str, Vec<usize>>,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        let mut lexicon: HashMap<&'static str, Vec<usize>> = HashMap::new();
        for (index, words) in LEXICON.iter().enumerate() {
            for word in *words {
                lexicon.entry(word).or_default().push(index);
            }
        }
        Self { lexicon }
    }

    fn score(&self, text: &str) -> CategoryScores {
        let mut hits = [0u32; CATEGORIES.len()];
        for token in tokenize(&strip_tags(text)) {
            if let Some(indices) = self.lexicon.get(token.as_str()) {
                for &index in indices {
                    hits[index] += 1;
                }
            }
        }
        // sparse map: a category with zero hits gets no entry at all, so an
        // unmatched page ends up with no top category instead of a zero one
        let entries = CATEGORIES
            .iter()
            .zip(hits.iter())
            .filter(|(_, &count)| count > 0)
            .map(|(name, &count)| {
                let count = count as f32;
                (name.to_string(), count / (count + SMOOTHING))
            })
            .collect();
        CategoryScores::new(entries)
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for LexiconClassifier {
    #[instrument(skip(self, html), level = "debug")]
    fn classify(&self, url: &str, html: &str) -> DomainResult<Classification> {
        let text = format!("{} {}", url, html);
        let scores = self.score(&text);
        let embeddings = hashed_embedding(&strip_tags(&text));
        Ok(Classification { scores, embeddings })
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

/// Drop everything between `<` and `>`, including script/style bodies, and
/// lowercase the rest.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut skip_until: Option<&str> = None;
    let lower = html.to_lowercase();
    let bytes = lower.as_bytes();
    let mut i = 0;
    while i < lower.len() {
        if let Some(closer) = skip_until {
            if lower[i..].starts_with(closer) {
                i += closer.len();
                skip_until = None;
                in_tag = false;
                out.push(' ');
            } else {
                // advance a whole char: the body may contain multi-byte
                // text and `lower[i..]` must stay on a boundary
                i += lower[i..].chars().next().map_or(1, char::len_utf8);
            }
            continue;
        }
        match bytes[i] {
            b'<' => {
                in_tag = true;
                if lower[i..].starts_with("<script") {
                    skip_until = Some("</script>");
                } else if lower[i..].starts_with("<style") {
                    skip_until = Some("</style>");
                }
                i += 1;
            }
            b'>' => {
                in_tag = false;
                out.push(' ');
                i += 1;
            }
            _ if in_tag => i += 1,
            _ => {
                // bytes[i] starts a char boundary because ASCII markers above
                // never split multi-byte sequences
                let ch = lower[i..].chars().next().unwrap_or(' ');
                out.push(ch);
                i += ch.len_utf8();
            }
        }
    }
    out
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(|t| t.to_string())
}

/// L2-normalized hashed bag-of-words vector. Deterministic for a given text.
fn hashed_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBEDDING_DIM];
    for token in tokenize(text) {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        let hash = hasher.finish();
        let bucket = (hash % EMBEDDING_DIM as u64) as usize;
        let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
    }
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut vector {
            *v /= norm;
        }
    }
    vector
}

static LEXICON: [&[&str]; 14] = [
    // Arts
    &[
        "art", "artist", "museum", "gallery", "painting", "music", "album", "film", "movie",
        "cinema", "theater", "theatre", "novel", "poetry", "sculpture", "photography", "opera",
        "band", "concert", "literature",
    ],
    // Business
    &[
        "business", "market", "markets", "company", "startup", "revenue", "profit", "investor",
        "investment", "finance", "financial", "economy", "economic", "stock", "stocks", "trade",
        "entrepreneur", "corporate", "bank", "banking",
    ],
    // Computers
    &[
        "software", "hardware", "programming", "code", "developer", "computer", "computing",
        "linux", "server", "database", "algorithm", "compiler", "internet", "network", "security",
        "encryption", "cloud", "api", "opensource", "kernel",
    ],
    // Games
    &[
        "game", "games", "gaming", "gamer", "console", "playstation", "xbox", "nintendo", "chess",
        "puzzle", "multiplayer", "arcade", "rpg", "quest", "dungeon", "esports",
    ],
    // Health
    &[
        "health", "medical", "medicine", "doctor", "hospital", "disease", "therapy", "patient",
        "diet", "nutrition", "vaccine", "symptom", "mental", "fitness", "cancer", "diabetes",
        "wellness", "surgery",
    ],
    // Home
    &[
        "home", "house", "garden", "gardening", "kitchen", "recipe", "recipes", "cooking",
        "baking", "furniture", "decor", "renovation", "diy", "cleaning", "household",
    ],
    // Kids_and_Teens
    &[
        "kids", "children", "teen", "teens", "school", "homework", "toys", "cartoon", "parenting",
        "playground", "teenager",
    ],
    // News
    &[
        "news", "breaking", "report", "reported", "journalist", "headline", "press", "media",
        "election", "government", "politics", "political", "minister", "president", "parliament",
        "crisis", "war",
    ],
    // Recreation
    &[
        "travel", "trip", "vacation", "hiking", "camping", "outdoor", "fishing", "boating",
        "tourism", "hotel", "restaurant", "leisure", "hobby", "adventure",
    ],
    // Reference
    &[
        "encyclopedia", "dictionary", "wiki", "wikipedia", "reference", "glossary", "manual",
        "documentation", "tutorial", "guide", "howto", "definition", "archive", "library",
    ],
    // Science
    &[
        "science", "scientist", "research", "study", "physics", "chemistry", "biology",
        "astronomy", "experiment", "theory", "quantum", "evolution", "climate", "genome",
        "neuroscience", "mathematics",
    ],
    // Shopping
    &[
        "shop", "shopping", "buy", "price", "discount", "sale", "deal", "deals", "cart",
        "checkout", "shipping", "retailer", "store", "coupon", "amazon",
    ],
    // Society
    &[
        "society", "culture", "religion", "philosophy", "history", "community", "law", "legal",
        "rights", "ethics", "social", "tradition", "activism", "charity",
    ],
    // Sports
    &[
        "sports", "sport", "football", "soccer", "basketball", "baseball", "tennis", "golf",
        "olympics", "athlete", "league", "championship", "tournament", "coach", "cricket",
        "hockey", "marathon",
    ],
];
