//! Article statistics and frequency-based keywords
//!
//! Works on a saved or freshly scraped `ArticleRecord`; no network or
//! browser access.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use crate::page_extractor::ArticleRecord;
use crate::utils::url_path_extension;

/// Characters per minute used for the reading-time estimate
const READING_CHARS_PER_MINUTE: usize = 300;
const MIN_KEYWORD_COUNT: usize = 2;
pub const DEFAULT_KEYWORD_LIMIT: usize = 10;

static TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{Han}+|[A-Za-z][A-Za-z0-9'-]+").expect("BUG: hardcoded regex pattern is invalid")
});

const CJK_STOP_WORDS: &[&str] = &[
    "一个", "没有", "自己", "可以", "能够", "应该", "必须", "如果", "因为", "所以", "但是", "然后",
    "现在", "已经", "还是", "只是", "或者", "以及", "并且", "而且", "不过", "虽然", "尽管", "除了",
    "通过", "关于", "对于", "由于", "为了", "根据", "按照", "依据", "基于", "我们", "他们", "你们",
];

/// Function characters that rarely end a meaningful term
const CJK_WEAK_ENDINGS: &[char] = &[
    '的', '了', '在', '是', '有', '和', '就', '不', '都', '也', '很', '到', '说', '要', '去', '会',
    '着', '没', '看', '好', '这', '那', '它', '他', '她', '们', '来', '过', '时', '大', '小', '多',
    '少',
];

const LATIN_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "are", "was", "were", "have", "has",
    "not", "but", "you", "your", "our", "its", "can", "will", "all", "any", "into", "than",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStatistics {
    pub total: usize,
    pub downloaded: usize,
    pub failed: usize,
    /// Distinct file extensions, lower-case, without the dot
    pub image_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleStatistics {
    pub title: String,
    pub author: String,
    pub publish_time: String,
    pub source_url: Option<String>,
    pub total_characters: usize,
    pub word_count: usize,
    /// Non-empty lines of the body text
    pub paragraphs: usize,
    pub reading_minutes: usize,
    pub images: ImageStatistics,
    pub keywords: Vec<Keyword>,
}

impl ArticleStatistics {
    #[must_use]
    pub fn from_record(record: &ArticleRecord) -> Self {
        let total_characters = record.body_text.chars().count();

        Self {
            title: record.title.clone(),
            author: record.author.clone(),
            publish_time: record.publish_time.clone(),
            source_url: record.source_url.clone(),
            total_characters,
            word_count: record.word_count,
            paragraphs: record
                .body_text
                .lines()
                .filter(|line| !line.trim().is_empty())
                .count(),
            reading_minutes: (total_characters / READING_CHARS_PER_MINUTE).max(1),
            images: image_statistics(record),
            keywords: extract_keywords(&record.body_text, DEFAULT_KEYWORD_LIMIT),
        }
    }
}

fn image_statistics(record: &ArticleRecord) -> ImageStatistics {
    let downloaded = record.downloaded_images();
    let image_types: BTreeSet<String> = record
        .images
        .iter()
        .filter_map(|image| {
            image
                .file_extension()
                .map(str::to_string)
                .or_else(|| {
                    image
                        .url
                        .as_deref()
                        .and_then(url_path_extension)
                        .map(|ext| ext.trim_start_matches('.').to_string())
                })
        })
        .map(|ext| ext.to_ascii_lowercase())
        .collect();

    ImageStatistics {
        total: record.images.len(),
        downloaded,
        failed: record.images.len() - downloaded,
        image_types: image_types.into_iter().collect(),
    }
}

fn push_cjk_terms(run: &[char], counts: &mut HashMap<String, usize>) {
    for start in 0..run.len() {
        for len in [4, 3, 2] {
            let Some(slice) = run.get(start..start + len) else {
                continue;
            };
            if slice.last().is_some_and(|c| CJK_WEAK_ENDINGS.contains(c)) {
                continue;
            }
            let term: String = slice.iter().collect();
            if CJK_STOP_WORDS.contains(&term.as_str()) {
                continue;
            }
            *counts.entry(term).or_default() += 1;
        }
    }
}

/// Most frequent terms in `text`, at most `limit` of them.
///
/// CJK runs contribute every 2-4 character n-gram; Latin words of three or
/// more letters are lower-cased. Terms seen fewer than twice are dropped.
/// Ties are broken alphabetically so the output is stable.
#[must_use]
pub fn extract_keywords(text: &str, limit: usize) -> Vec<Keyword> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for token in TOKENS.find_iter(text).map(|m| m.as_str()) {
        if token.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            let word = token.to_ascii_lowercase();
            if word.len() >= 3 && !LATIN_STOP_WORDS.contains(&word.as_str()) {
                *counts.entry(word).or_default() += 1;
            }
        } else {
            let run: Vec<char> = token.chars().collect();
            push_cjk_terms(&run, &mut counts);
        }
    }

    let mut keywords: Vec<Keyword> = counts
        .into_iter()
        .filter(|(_, count)| *count >= MIN_KEYWORD_COUNT)
        .map(|(word, count)| Keyword { word, count })
        .collect();
    keywords.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    keywords.truncate(limit);
    keywords
}
