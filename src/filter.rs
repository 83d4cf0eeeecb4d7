use crate::models::{Chapter, RevelationPlace, Verse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevelationFilter {
    #[default]
    All,
    Meccan,
    Medinan,
}

impl RevelationFilter {
    pub fn next(&self) -> Self {
        match self {
            RevelationFilter::All => RevelationFilter::Meccan,
            RevelationFilter::Meccan => RevelationFilter::Medinan,
            RevelationFilter::Medinan => RevelationFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RevelationFilter::All => "all",
            RevelationFilter::Meccan => "Meccan",
            RevelationFilter::Medinan => "Medinan",
        }
    }

    pub fn accepts(&self, place: RevelationPlace) -> bool {
        match self {
            RevelationFilter::All => true,
            RevelationFilter::Meccan => place == RevelationPlace::Meccan,
            RevelationFilter::Medinan => place == RevelationPlace::Medinan,
        }
    }
}

/// Local filter over the fetched chapter list, fed by the filter box and the quick search box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterFilter {
    pub text: String,
    pub quick_text: String,
    pub place: RevelationFilter,
}

impl ChapterFilter {
    pub fn query(&self) -> String {
        format!("{} {}", self.text, self.quick_text).trim().to_string()
    }

    pub fn is_active(&self) -> bool {
        !self.query().is_empty() || self.place != RevelationFilter::All
    }

    pub fn matches(&self, chapter: &Chapter) -> bool {
        let raw = self.query();
        let lowered = raw.to_lowercase();
        let text_match = (!raw.is_empty() && chapter.name_arabic.contains(&raw))
            || chapter.name_simple.to_lowercase().contains(&lowered)
            || chapter.translated().to_lowercase().contains(&lowered);
        text_match && self.place.accepts(chapter.revelation_place)
    }

    pub fn apply<'a>(&self, chapters: &'a [Chapter]) -> Vec<&'a Chapter> {
        chapters.iter().filter(|c| self.matches(c)).collect()
    }
}

/// Case-insensitive containment over what the verse list shows for `verse`.
pub fn verse_matches(verse: &Verse, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    let translation = verse.first_translation().unwrap_or_default();
    [verse.verse_key.as_str(), verse.text_uthmani.as_str(), translation.as_str()]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

/// Positions of the verses passing `query`, in sequence order.
pub fn filter_verses(verses: &[Verse], query: &str) -> Vec<usize> {
    verses
        .iter()
        .enumerate()
        .filter(|(_, v)| verse_matches(v, query))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TranslatedName, VerseTranslation};

    fn chapter(id: u32, arabic: &str, simple: &str, translated: &str, place: RevelationPlace) -> Chapter {
        Chapter {
            id,
            name_arabic: arabic.to_string(),
            name_simple: simple.to_string(),
            translated_name: Some(TranslatedName {
                name: translated.to_string(),
            }),
            verses_count: 7,
            revelation_place: place,
        }
    }

    fn chapters() -> Vec<Chapter> {
        vec![
            chapter(1, "الفاتحة", "Al-Fatihah", "The Opener", RevelationPlace::Meccan),
            chapter(2, "البقرة", "Al-Baqarah", "The Cow", RevelationPlace::Medinan),
            chapter(55, "الرحمن", "Ar-Rahman", "The Beneficent", RevelationPlace::Medinan),
        ]
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = ChapterFilter::default();
        assert_eq!(filter.apply(&chapters()).len(), 3);
        assert!(!filter.is_active());
    }

    #[test]
    fn test_matches_arabic_simple_and_translated_names() {
        let list = chapters();
        let mut filter = ChapterFilter {
            text: "البقرة".to_string(),
            ..ChapterFilter::default()
        };
        assert_eq!(filter.apply(&list).iter().map(|c| c.id).collect::<Vec<_>>(), vec![2]);

        filter.text = "FATIHAH".to_string();
        assert_eq!(filter.apply(&list).iter().map(|c| c.id).collect::<Vec<_>>(), vec![1]);

        filter.text = "cow".to_string();
        assert_eq!(filter.apply(&list).iter().map(|c| c.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_text_and_quick_text_are_joined() {
        let filter = ChapterFilter {
            text: "  the".to_string(),
            quick_text: "cow ".to_string(),
            place: RevelationFilter::All,
        };
        assert_eq!(filter.query(), "the cow");
        assert_eq!(filter.apply(&chapters()).len(), 1);
    }

    #[test]
    fn test_revelation_filter() {
        let list = chapters();
        let mut filter = ChapterFilter {
            place: RevelationFilter::Medinan,
            ..ChapterFilter::default()
        };
        assert_eq!(filter.apply(&list).len(), 2);
        filter.text = "rahman".to_string();
        assert_eq!(filter.apply(&list).iter().map(|c| c.id).collect::<Vec<_>>(), vec![55]);
        filter.place = RevelationFilter::Meccan;
        assert!(filter.apply(&list).is_empty());
        assert_eq!(RevelationFilter::Medinan.next(), RevelationFilter::All);
    }

    #[test]
    fn test_verse_filter() {
        let verses = vec![
            Verse {
                id: 1,
                verse_key: "1:1".to_string(),
                text_uthmani: "بِسْمِ ٱللَّهِ".to_string(),
                translations: vec![VerseTranslation {
                    resource_id: Some(20),
                    text: "In the Name of Allah".to_string(),
                }],
            },
            Verse {
                id: 2,
                verse_key: "1:2".to_string(),
                text_uthmani: "ٱلْحَمْدُ لِلَّهِ".to_string(),
                translations: vec![],
            },
        ];
        assert_eq!(filter_verses(&verses, ""), vec![0, 1]);
        assert_eq!(filter_verses(&verses, "name of"), vec![0]);
        assert_eq!(filter_verses(&verses, "1:2"), vec![1]);
        assert_eq!(filter_verses(&verses, "ٱلْحَمْدُ"), vec![1]);
        assert!(filter_verses(&verses, "zzz").is_empty());
    }
}
