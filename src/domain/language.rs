/// The 99 languages Whisper was trained on, in the order of their special
/// tokens. Names follow the model's own vocabulary (lowercase).
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "english"),
    ("zh", "chinese"),
    ("de", "german"),
    ("es", "spanish"),
    ("ru", "russian"),
    ("ko", "korean"),
    ("fr", "french"),
    ("ja", "japanese"),
    ("pt", "portuguese"),
    ("tr", "turkish"),
    ("pl", "polish"),
    ("ca", "catalan"),
    ("nl", "dutch"),
    ("ar", "arabic"),
    ("sv", "swedish"),
    ("it", "italian"),
    ("id", "indonesian"),
    ("hi", "hindi"),
    ("fi", "finnish"),
    ("vi", "vietnamese"),
    ("he", "hebrew"),
    ("uk", "ukrainian"),
    ("el", "greek"),
    ("ms", "malay"),
    ("cs", "czech"),
    ("ro", "romanian"),
    ("da", "danish"),
    ("hu", "hungarian"),
    ("ta", "tamil"),
    ("no", "norwegian"),
    ("th", "thai"),
    ("ur", "urdu"),
    ("hr", "croatian"),
    ("bg", "bulgarian"),
    ("lt", "lithuanian"),
    ("la", "latin"),
    ("mi", "maori"),
    ("ml", "malayalam"),
    ("cy", "welsh"),
    ("sk", "slovak"),
    ("te", "telugu"),
    ("fa", "persian"),
    ("lv", "latvian"),
    ("bn", "bengali"),
    ("sr", "serbian"),
    ("az", "azerbaijani"),
    ("sl", "slovenian"),
    ("kn", "kannada"),
    ("et", "estonian"),
    ("mk", "macedonian"),
    ("br", "breton"),
    ("eu", "basque"),
    ("is", "icelandic"),
    ("hy", "armenian"),
    ("ne", "nepali"),
    ("mn", "mongolian"),
    ("bs", "bosnian"),
    ("kk", "kazakh"),
    ("sq", "albanian"),
    ("sw", "swahili"),
    ("gl", "galician"),
    ("mr", "marathi"),
    ("pa", "punjabi"),
    ("si", "sinhala"),
    ("km", "khmer"),
    ("sn", "shona"),
    ("yo", "yoruba"),
    ("so", "somali"),
    ("af", "afrikaans"),
    ("oc", "occitan"),
    ("ka", "georgian"),
    ("be", "belarusian"),
    ("tg", "tajik"),
    ("sd", "sindhi"),
    ("gu", "gujarati"),
    ("am", "amharic"),
    ("yi", "yiddish"),
    ("lo", "lao"),
    ("uz", "uzbek"),
    ("fo", "faroese"),
    ("ht", "haitian creole"),
    ("ps", "pashto"),
    ("tk", "turkmen"),
    ("nn", "nynorsk"),
    ("mt", "maltese"),
    ("sa", "sanskrit"),
    ("lb", "luxembourgish"),
    ("my", "myanmar"),
    ("bo", "tibetan"),
    ("tl", "tagalog"),
    ("mg", "malagasy"),
    ("as", "assamese"),
    ("tt", "tatar"),
    ("haw", "hawaiian"),
    ("ln", "lingala"),
    ("ha", "hausa"),
    ("ba", "bashkir"),
    ("jw", "javanese"),
    ("su", "sundanese"),
];

/// Human-readable name for a language code, if the code is known.
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// One language candidate with the model's likelihood for it.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageScore {
    pub code: String,
    pub probability: f32,
}

/// Pick the most probable language. Equal probabilities are broken
/// deterministically in favor of the lexicographically smallest code.
pub fn best_language(scores: &[LanguageScore]) -> Option<&LanguageScore> {
    scores.iter().reduce(|best, candidate| {
        if candidate.probability > best.probability
            || (candidate.probability == best.probability && candidate.code < best.code)
        {
            candidate
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(code: &str, probability: f32) -> LanguageScore {
        LanguageScore {
            code: code.to_string(),
            probability,
        }
    }

    #[test]
    fn table_covers_all_whisper_languages() {
        assert_eq!(LANGUAGES.len(), 99);
    }

    #[test]
    fn known_codes_resolve_to_names() {
        assert_eq!(language_name("en"), Some("english"));
        assert_eq!(language_name("haw"), Some("hawaiian"));
        assert_eq!(language_name("xx"), None);
    }

    #[test]
    fn best_language_picks_maximum_probability() {
        let scores = [score("en", 0.1), score("de", 0.8), score("fr", 0.1)];
        assert_eq!(best_language(&scores).unwrap().code, "de");
    }

    #[test]
    fn best_language_breaks_ties_on_smallest_code() {
        let scores = [score("sv", 0.4), score("da", 0.4), score("no", 0.2)];
        assert_eq!(best_language(&scores).unwrap().code, "da");
    }

    #[test]
    fn best_language_is_none_for_empty_scores() {
        assert!(best_language(&[]).is_none());
    }
}
