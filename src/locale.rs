//! Locale registry: language and territory codes.
//!
//! Catalog language codes look like `de`, `pt_BR` or `fil_PH`: an ISO 639
//! language code, optionally followed by `_` (or `-`) and an ISO 3166
//! territory code. Only languages known to the registry resolve to a
//! [`Language`]; unknown codes behave like the neutral "C" locale.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

/// (code, English name, default territory)
const LANGUAGES: &[(&str, &str, &str)] = &[
    ("aa", "Afar", "ET"),
    ("ab", "Abkhazian", "GE"),
    ("af", "Afrikaans", "ZA"),
    ("am", "Amharic", "ET"),
    ("ar", "Arabic", "EG"),
    ("as", "Assamese", "IN"),
    ("ay", "Aymara", "BO"),
    ("az", "Azerbaijani", "AZ"),
    ("ba", "Bashkir", "RU"),
    ("be", "Belarusian", "BY"),
    ("bg", "Bulgarian", "BG"),
    ("bi", "Bislama", "VU"),
    ("bn", "Bengali", "BD"),
    ("bo", "Tibetan", "CN"),
    ("br", "Breton", "FR"),
    ("bs", "Bosnian", "BA"),
    ("ca", "Catalan", "ES"),
    ("co", "Corsican", "FR"),
    ("cs", "Czech", "CZ"),
    ("cy", "Welsh", "GB"),
    ("da", "Danish", "DK"),
    ("de", "German", "DE"),
    ("dv", "Divehi", "MV"),
    ("dz", "Dzongkha", "BT"),
    ("el", "Greek", "GR"),
    ("en", "English", "US"),
    ("eo", "Esperanto", ""),
    ("es", "Spanish", "ES"),
    ("et", "Estonian", "EE"),
    ("eu", "Basque", "ES"),
    ("fa", "Persian", "IR"),
    ("fi", "Finnish", "FI"),
    ("fil", "Filipino", "PH"),
    ("fj", "Fijian", "FJ"),
    ("fo", "Faroese", "FO"),
    ("fr", "French", "FR"),
    ("fur", "Friulian", "IT"),
    ("fy", "Western Frisian", "NL"),
    ("ga", "Irish", "IE"),
    ("gd", "Gaelic", "GB"),
    ("gl", "Galician", "ES"),
    ("gn", "Guarani", "PY"),
    ("gu", "Gujarati", "IN"),
    ("gv", "Manx", "IM"),
    ("ha", "Hausa", "NG"),
    ("he", "Hebrew", "IL"),
    ("hi", "Hindi", "IN"),
    ("hr", "Croatian", "HR"),
    ("hu", "Hungarian", "HU"),
    ("hy", "Armenian", "AM"),
    ("ia", "Interlingua", ""),
    ("id", "Indonesian", "ID"),
    ("ie", "Interlingue", ""),
    ("ik", "Inupiak", "US"),
    ("is", "Icelandic", "IS"),
    ("it", "Italian", "IT"),
    ("iu", "Inuktitut", "CA"),
    ("ja", "Japanese", "JP"),
    ("jv", "Javanese", "ID"),
    ("ka", "Georgian", "GE"),
    ("kk", "Kazakh", "KZ"),
    ("kl", "Greenlandic", "GL"),
    ("km", "Khmer", "KH"),
    ("kn", "Kannada", "IN"),
    ("ko", "Korean", "KR"),
    ("ks", "Kashmiri", "IN"),
    ("ku", "Kurdish", "TR"),
    ("kw", "Cornish", "GB"),
    ("ky", "Kirghiz", "KG"),
    ("la", "Latin", "VA"),
    ("lb", "Luxembourgish", "LU"),
    ("ln", "Lingala", "CD"),
    ("lo", "Lao", "LA"),
    ("lt", "Lithuanian", "LT"),
    ("lv", "Latvian", "LV"),
    ("mg", "Malagasy", "MG"),
    ("mi", "Maori", "NZ"),
    ("mk", "Macedonian", "MK"),
    ("ml", "Malayalam", "IN"),
    ("mn", "Mongolian", "MN"),
    ("mr", "Marathi", "IN"),
    ("ms", "Malay", "MY"),
    ("mt", "Maltese", "MT"),
    ("my", "Burmese", "MM"),
    ("na", "Nauru", "NR"),
    ("nah", "Nahuatl", "MX"),
    ("nb", "Norwegian Bokmal", "NO"),
    ("ne", "Nepali", "NP"),
    ("nl", "Dutch", "NL"),
    ("nn", "Norwegian Nynorsk", "NO"),
    ("nso", "Northern Sotho", "ZA"),
    ("oc", "Occitan", "FR"),
    ("om", "Oromo", "ET"),
    ("or", "Oriya", "IN"),
    ("pa", "Punjabi", "IN"),
    ("pl", "Polish", "PL"),
    ("ps", "Pashto", "AF"),
    ("pt", "Portuguese", "BR"),
    ("qu", "Quechua", "PE"),
    ("rm", "Romansh", "CH"),
    ("rn", "Rundi", "BI"),
    ("ro", "Romanian", "RO"),
    ("ru", "Russian", "RU"),
    ("rw", "Kinyarwanda", "RW"),
    ("sa", "Sanskrit", "IN"),
    ("sd", "Sindhi", "PK"),
    ("se", "Northern Sami", "NO"),
    ("si", "Sinhala", "LK"),
    ("sk", "Slovak", "SK"),
    ("sl", "Slovenian", "SI"),
    ("sm", "Samoan", "WS"),
    ("sn", "Shona", "ZW"),
    ("so", "Somali", "SO"),
    ("sq", "Albanian", "AL"),
    ("sr", "Serbian", "RS"),
    ("ss", "Swati", "ZA"),
    ("st", "Southern Sotho", "ZA"),
    ("su", "Sundanese", "ID"),
    ("sv", "Swedish", "SE"),
    ("sw", "Swahili", "TZ"),
    ("ta", "Tamil", "IN"),
    ("te", "Telugu", "IN"),
    ("tg", "Tajik", "TJ"),
    ("th", "Thai", "TH"),
    ("ti", "Tigrinya", "ET"),
    ("tk", "Turkmen", "TM"),
    ("tl", "Tagalog", "PH"),
    ("tn", "Tswana", "ZA"),
    ("to", "Tongan", "TO"),
    ("tr", "Turkish", "TR"),
    ("ts", "Tsonga", "ZA"),
    ("tt", "Tatar", "RU"),
    ("ug", "Uigur", "CN"),
    ("uk", "Ukrainian", "UA"),
    ("ur", "Urdu", "PK"),
    ("uz", "Uzbek", "UZ"),
    ("vi", "Vietnamese", "VN"),
    ("vo", "Volapuk", ""),
    ("wa", "Walloon", "BE"),
    ("wo", "Wolof", "SN"),
    ("xh", "Xhosa", "ZA"),
    ("yi", "Yiddish", "UA"),
    ("yo", "Yoruba", "NG"),
    ("za", "Zhuang", "CN"),
    ("zh", "Chinese", "CN"),
    ("zu", "Zulu", "ZA"),
];

/// Lower-case code → position in [`LANGUAGES`].
static LANGUAGE_INDEX: LazyLock<HashMap<&'static str, usize>> = LazyLock::new(|| {
    LANGUAGES.iter().enumerate().map(|(index, (code, _, _))| (*code, index)).collect()
});

/// A language known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Language {
    /// Lower-case ISO 639 code.
    code: &'static str,
}

impl Language {
    #[must_use]
    pub const fn code(self) -> &'static str {
        self.code
    }

    /// English display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        LANGUAGE_INDEX
            .get(self.code)
            .and_then(|&index| LANGUAGES.get(index))
            .map_or(self.code, |(_, name, _)| *name)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An ISO 3166 alpha-2 territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Territory {
    /// Upper-case ASCII letters.
    code: [u8; 2],
}

impl Territory {
    #[must_use]
    pub fn code(&self) -> &str {
        std::str::from_utf8(&self.code).unwrap_or_default()
    }
}

impl std::fmt::Display for Territory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Resolves an ISO 639 code (case-insensitive).
#[must_use]
pub fn code_to_language(code: &str) -> Option<Language> {
    let lower = code.trim().to_ascii_lowercase();
    LANGUAGE_INDEX
        .get(lower.as_str())
        .and_then(|&index| LANGUAGES.get(index))
        .map(|&(code, _, _)| Language { code })
}

#[must_use]
pub const fn language_to_code(language: Language) -> &'static str {
    language.code
}

/// Resolves a two-letter territory code (case-insensitive).
#[must_use]
pub fn code_to_territory(code: &str) -> Option<Territory> {
    let bytes = code.trim().as_bytes();
    match bytes {
        [a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => {
            Some(Territory { code: [a.to_ascii_uppercase(), b.to_ascii_uppercase()] })
        }
        _ => None,
    }
}

#[must_use]
pub fn territory_to_code(territory: Territory) -> String {
    territory.code().to_string()
}

/// The territory assumed when a catalog names only a language.
#[must_use]
pub fn default_territory_for(language: Language) -> Option<Territory> {
    LANGUAGE_INDEX
        .get(language.code)
        .and_then(|&index| LANGUAGES.get(index))
        .and_then(|(_, _, territory)| code_to_territory(territory))
}

/// Splits a catalog language code such as `pt_BR` into its parts.
///
/// A bare language code gets the language's default territory. Unknown
/// languages yield `None` for the language.
#[must_use]
pub fn language_and_territory(language_code: &str) -> (Option<Language>, Option<Territory>) {
    if let Some((language, territory)) = language_code.split_once(['_', '-']) {
        return (code_to_language(language), code_to_territory(territory));
    }
    let language = code_to_language(language_code);
    (language, language.and_then(default_territory_for))
}

/// Builds a catalog language code (`language[_TERRITORY]`).
#[must_use]
pub fn make_language_code(language: Language, territory: Option<Territory>) -> String {
    match territory {
        Some(territory) => format!("{}_{}", language.code, territory.code()),
        None => language.code.to_string(),
    }
}

/// Parses a locale name like `de`, `de_DE` or `de-DE` into its canonical form.
fn canonical_locale_name(name: &str) -> Option<String> {
    let (language, territory) = match name.split_once(['_', '-']) {
        Some((language, territory)) => {
            (code_to_language(language)?, Some(code_to_territory(territory)?))
        }
        None => {
            let language = code_to_language(name)?;
            (language, default_territory_for(language))
        }
    };
    Some(make_language_code(language, territory))
}

/// Guesses the target language from a catalog file name.
///
/// `myapp_de_DE.qm` → `de_DE`, `translations/fr.json` → `fr_FR`. Leading
/// components separated by `_` or `.` are dropped until the remainder
/// parses as a locale name.
#[must_use]
pub fn guess_language_code_from_file_name(path: &Path) -> String {
    let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
        return String::new();
    };
    let mut name = stem;
    loop {
        if let Some(code) = canonical_locale_name(name) {
            tracing::debug!(file = %path.display(), language = %code, "Guessed catalog language");
            return code;
        }
        match name.find(['_', '.']) {
            Some(pos) => name = name.get(pos + 1..).unwrap_or_default(),
            None => break,
        }
    }
    String::new()
}
