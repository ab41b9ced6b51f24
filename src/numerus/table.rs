//! Static plural rule table.

use super::program::{
    Q_AND,
    Q_BETWEEN,
    Q_EQ,
    Q_GEQ,
    Q_LEQ,
    Q_MOD_10,
    Q_MOD_100,
    Q_NEQ,
    Q_NEWRULE,
    Q_NOT_BETWEEN,
    Q_OR,
};
use crate::locale::{
    self,
    Language,
    Territory,
};

/// One singular form, everything else plural.
const ENGLISH_STYLE_RULES: &[u8] = &[Q_EQ, 1];
/// 0 and 1 singular.
const FRENCH_STYLE_RULES: &[u8] = &[Q_LEQ, 1];
/// Latvian: ends in 1 (not 11), non-zero, zero.
const LATVIAN_RULES: &[u8] =
    &[Q_MOD_10 | Q_EQ, 1, Q_AND, Q_MOD_100 | Q_NEQ, 11, Q_NEWRULE, Q_NEQ, 0];
/// Icelandic: ends in 1 but not 11.
const ICELANDIC_RULES: &[u8] = &[Q_MOD_10 | Q_EQ, 1, Q_AND, Q_MOD_100 | Q_NEQ, 11];
/// Singular, dual, plural.
const IRISH_STYLE_RULES: &[u8] = &[Q_EQ, 1, Q_NEWRULE, Q_EQ, 2];
/// Scottish Gaelic: 1/11, 2/12, 3 to 19, other.
const GAELIC_STYLE_RULES: &[u8] =
    &[Q_EQ, 1, Q_OR, Q_EQ, 11, Q_NEWRULE, Q_EQ, 2, Q_OR, Q_EQ, 12, Q_NEWRULE, Q_BETWEEN, 3, 19];
/// Czech and Slovak: 1, 2 to 4, other.
const SLOVAK_STYLE_RULES: &[u8] = &[Q_EQ, 1, Q_NEWRULE, Q_BETWEEN, 2, 4];
/// Macedonian: ends in 1, ends in 2, other.
const MACEDONIAN_RULES: &[u8] = &[Q_MOD_10 | Q_EQ, 1, Q_NEWRULE, Q_MOD_10 | Q_EQ, 2];
/// Lithuanian: ends in 1, ends in 2 to 9, teens and tens.
const LITHUANIAN_RULES: &[u8] = &[
    Q_MOD_10 | Q_EQ,
    1,
    Q_AND,
    Q_MOD_100 | Q_NEQ,
    11,
    Q_NEWRULE,
    Q_MOD_10 | Q_NEQ,
    0,
    Q_AND,
    Q_MOD_100 | Q_NOT_BETWEEN,
    10,
    19,
];
/// East Slavic: ends in 1, ends in 2 to 4, other.
const RUSSIAN_STYLE_RULES: &[u8] = &[
    Q_MOD_10 | Q_EQ,
    1,
    Q_AND,
    Q_MOD_100 | Q_NEQ,
    11,
    Q_NEWRULE,
    Q_MOD_10 | Q_BETWEEN,
    2,
    4,
    Q_AND,
    Q_MOD_100 | Q_NOT_BETWEEN,
    10,
    19,
];
/// Polish: 1, ends in 2 to 4, other.
const POLISH_RULES: &[u8] = &[
    Q_EQ,
    1,
    Q_NEWRULE,
    Q_MOD_10 | Q_BETWEEN,
    2,
    4,
    Q_AND,
    Q_MOD_100 | Q_NOT_BETWEEN,
    10,
    19,
];
/// Romanian: 1, 0 or ends in 01 to 19, other.
const ROMANIAN_RULES: &[u8] = &[Q_EQ, 1, Q_NEWRULE, Q_EQ, 0, Q_OR, Q_MOD_100 | Q_BETWEEN, 1, 19];
/// Slovenian: ends in 01, 02, 03 to 04, other.
const SLOVENIAN_RULES: &[u8] = &[
    Q_MOD_100 | Q_EQ,
    1,
    Q_NEWRULE,
    Q_MOD_100 | Q_EQ,
    2,
    Q_NEWRULE,
    Q_MOD_100 | Q_BETWEEN,
    3,
    4,
];
/// Maltese: 1, 0 or ends in 01 to 10, ends in 11 to 19, other.
const MALTESE_RULES: &[u8] = &[
    Q_EQ,
    1,
    Q_NEWRULE,
    Q_EQ,
    0,
    Q_OR,
    Q_MOD_100 | Q_BETWEEN,
    1,
    10,
    Q_NEWRULE,
    Q_MOD_100 | Q_BETWEEN,
    11,
    19,
];
/// Welsh: 0, 1, 2 to 5, 6, other.
const WELSH_RULES: &[u8] =
    &[Q_EQ, 0, Q_NEWRULE, Q_EQ, 1, Q_NEWRULE, Q_BETWEEN, 2, 5, Q_NEWRULE, Q_EQ, 6];
/// Arabic: 0, 1, 2, ends in 03 to 10, ends in 11 to 99, other.
const ARABIC_RULES: &[u8] = &[
    Q_EQ,
    0,
    Q_NEWRULE,
    Q_EQ,
    1,
    Q_NEWRULE,
    Q_EQ,
    2,
    Q_NEWRULE,
    Q_MOD_100 | Q_BETWEEN,
    3,
    10,
    Q_NEWRULE,
    Q_MOD_100 | Q_GEQ,
    11,
];
/// Tagalog: 0 and 1, ends in 4, 6 or 9, other.
const TAGALOG_RULES: &[u8] = &[
    Q_LEQ,
    1,
    Q_NEWRULE,
    Q_MOD_10 | Q_EQ,
    4,
    Q_OR,
    Q_MOD_10 | Q_EQ,
    6,
    Q_OR,
    Q_MOD_10 | Q_EQ,
    9,
];

/// One row of the plural table.
#[derive(Debug, Clone, Copy)]
pub struct NumerusTableEntry {
    pub rules: &'static [u8],
    pub forms: &'static [&'static str],
    pub languages: &'static [&'static str],
    /// Parallel to `languages`; empty means "any territory" for every language.
    pub territories: &'static [Option<&'static str>],
    /// Equivalent gettext `Plural-Forms` header.
    pub gettext_rules: &'static str,
}

impl NumerusTableEntry {
    /// Whether the row covers `language` in `territory`.
    fn matches(&self, language: Language, territory: Option<Territory>) -> bool {
        self.languages.iter().enumerate().any(|(j, code)| {
            if *code != language.code() {
                return false;
            }
            let entry_territory = self.territories.get(j).copied().flatten();
            match (entry_territory, territory) {
                (None, None) => true,
                (Some(code), Some(territory)) => code == territory.code(),
                _ => false,
            }
        })
    }
}

pub const NUMERUS_TABLE: &[NumerusTableEntry] = &[
    NumerusTableEntry {
        rules: &[],
        forms: &["Universal Form"],
        languages: &[
            "bi", "my", "zh", "dz", "fj", "gn", "hu", "id", "ja", "jv", "ko", "ms", "na", "om",
            "fa", "su", "tt", "th", "bo", "tr", "vi", "yo", "za",
        ],
        territories: &[],
        gettext_rules: "nplurals=1; plural=0;",
    },
    NumerusTableEntry {
        rules: ENGLISH_STYLE_RULES,
        forms: &["Singular", "Plural"],
        languages: &[
            "ab", "aa", "af", "sq", "am", "as", "ay", "az", "ba", "eu", "bn", "bg", "ca", "kw",
            "co", "da", "nl", "en", "eo", "et", "fo", "fi", "fur", "fy", "gl", "ka", "de", "el",
            "kl", "gu", "ha", "he", "hi", "ia", "ie", "it", "kn", "ks", "kk", "km", "rw", "ky",
            "ku", "lo", "la", "ln", "lb", "mg", "ml", "mr", "mn", "ne", "nso", "nb", "nn", "oc",
            "or", "ps", "pt", "pa", "qu", "rm", "rn", "sn", "sd", "si", "so", "st", "es", "sw",
            "ss", "sv", "tg", "ta", "te", "to", "ts", "tn", "tk", "ug", "ur", "uz", "vo", "wo",
            "xh", "yi", "zu", "nah",
        ],
        territories: &[],
        gettext_rules: "nplurals=2; plural=(n != 1);",
    },
    NumerusTableEntry {
        rules: FRENCH_STYLE_RULES,
        forms: &["Singular", "Plural"],
        languages: &["hy", "br", "fr", "pt", "fil", "ti", "wa"],
        territories: &[None, None, None, Some("BR"), None, None, None],
        gettext_rules: "nplurals=2; plural=(n > 1);",
    },
    NumerusTableEntry {
        rules: LATVIAN_RULES,
        forms: &["Singular", "Plural", "Nullar"],
        languages: &["lv"],
        territories: &[],
        gettext_rules: "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n != 0 ? 1 : 2);",
    },
    NumerusTableEntry {
        rules: ICELANDIC_RULES,
        forms: &["Singular", "Plural"],
        languages: &["is"],
        territories: &[],
        gettext_rules: "nplurals=2; plural=(n%10==1 && n%100!=11 ? 0 : 1);",
    },
    NumerusTableEntry {
        rules: IRISH_STYLE_RULES,
        forms: &["Singular", "Dual", "Plural"],
        languages: &["dv", "iu", "ik", "ga", "gv", "mi", "se", "sm", "sa"],
        territories: &[],
        gettext_rules: "nplurals=3; plural=(n==1 ? 0 : n==2 ? 1 : 2);",
    },
    NumerusTableEntry {
        rules: GAELIC_STYLE_RULES,
        forms: &["1/11", "2/12", "Few", "Many"],
        languages: &["gd"],
        territories: &[],
        gettext_rules: "nplurals=4; plural=(n==1 || n==11) ? 0 : (n==2 || n==12) ? 1 : (n > 2 && n < 20) ? 2 : 3;",
    },
    NumerusTableEntry {
        rules: SLOVAK_STYLE_RULES,
        forms: &["Singular", "Paucal", "Plural"],
        languages: &["sk", "cs"],
        territories: &[],
        gettext_rules: "nplurals=3; plural=((n==1) ? 0 : (n>=2 && n<=4) ? 1 : 2);",
    },
    NumerusTableEntry {
        rules: MACEDONIAN_RULES,
        forms: &["Singular", "Dual", "Plural"],
        languages: &["mk"],
        territories: &[],
        gettext_rules: "nplurals=3; plural=(n%100==1 ? 0 : n%100==2 ? 1 : 2);",
    },
    NumerusTableEntry {
        rules: LITHUANIAN_RULES,
        forms: &["Singular", "Paucal", "Plural"],
        languages: &["lt"],
        territories: &[],
        gettext_rules: "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && (n%100<10 || n%100>=20) ? 1 : 2);",
    },
    NumerusTableEntry {
        rules: RUSSIAN_STYLE_RULES,
        forms: &["Singular", "Dual", "Plural"],
        languages: &["bs", "be", "hr", "ru", "sr", "uk"],
        territories: &[],
        gettext_rules: "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);",
    },
    NumerusTableEntry {
        rules: POLISH_RULES,
        forms: &["Singular", "Paucal", "Plural"],
        languages: &["pl"],
        territories: &[],
        gettext_rules: "nplurals=3; plural=(n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);",
    },
    NumerusTableEntry {
        rules: ROMANIAN_RULES,
        forms: &["Singular", "Paucal", "Plural"],
        languages: &["ro"],
        territories: &[],
        gettext_rules: "nplurals=3; plural=(n==1 ? 0 : (n==0 || (n%100 > 0 && n%100 < 20)) ? 1 : 2);",
    },
    NumerusTableEntry {
        rules: SLOVENIAN_RULES,
        forms: &["Singular", "Dual", "Trial", "Plural"],
        languages: &["sl"],
        territories: &[],
        gettext_rules: "nplurals=4; plural=(n%100==1 ? 0 : n%100==2 ? 1 : n%100==3 || n%100==4 ? 2 : 3);",
    },
    NumerusTableEntry {
        rules: MALTESE_RULES,
        forms: &["Singular", "Paucal", "Greater Paucal", "Plural"],
        languages: &["mt"],
        territories: &[],
        gettext_rules: "nplurals=4; plural=(n==1 ? 0 : (n==0 || (n%100>=1 && n%100<=10)) ? 1 : (n%100>=11 && n%100<=19) ? 2 : 3);",
    },
    NumerusTableEntry {
        rules: WELSH_RULES,
        forms: &["Nullar", "Singular", "Dual", "Sexal", "Plural"],
        languages: &["cy"],
        territories: &[],
        gettext_rules: "nplurals=5; plural=(n==0 ? 0 : n==1 ? 1 : (n>=2 && n<=5) ? 2 : n==6 ? 3 : 4);",
    },
    NumerusTableEntry {
        rules: ARABIC_RULES,
        forms: &["Nullar", "Singular", "Dual", "Minority Plural", "Plural", "Plural (100-102, ...)"],
        languages: &["ar"],
        territories: &[],
        gettext_rules: "nplurals=6; plural=(n==0 ? 0 : n==1 ? 1 : n==2 ? 2 : (n%100>=3 && n%100<=10) ? 3 : n%100>=11 ? 4 : 5);",
    },
    NumerusTableEntry {
        rules: TAGALOG_RULES,
        forms: &["Singular", "Plural (consonant-ended)", "Plural (vowel-ended)"],
        languages: &["tl"],
        territories: &[],
        gettext_rules: "nplurals=3; plural=(n==1 ? 0 : (n%10==4 || n%10==6 || n%10== 9) ? 1 : 2);",
    },
];

/// Result of a successful table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumerusInfo {
    pub rules: &'static [u8],
    pub forms: &'static [&'static str],
    pub gettext_rules: &'static str,
}

impl NumerusInfo {
    #[must_use]
    pub const fn form_count(&self) -> usize {
        self.forms.len()
    }
}

/// Finds the plural rules for a language.
///
/// A territory-specific row wins; otherwise the lookup retries with "any
/// territory". `None` means the language is not covered at all.
#[must_use]
pub fn lookup(language: Language, territory: Option<Territory>) -> Option<NumerusInfo> {
    let mut territory = territory;
    loop {
        if let Some(entry) = NUMERUS_TABLE.iter().find(|entry| entry.matches(language, territory))
        {
            return Some(NumerusInfo {
                rules: entry.rules,
                forms: entry.forms,
                gettext_rules: entry.gettext_rules,
            });
        }
        if territory.is_none() {
            return None;
        }
        territory = None;
    }
}

/// Looks up the rules for a catalog language code such as `pt_BR`.
#[must_use]
pub fn lookup_code(language_code: &str) -> Option<NumerusInfo> {
    let (language, territory) = locale::language_and_territory(language_code);
    lookup(language?, territory)
}

/// Number of plural forms for a catalog language code, if covered.
#[must_use]
pub fn form_count(language_code: &str) -> Option<usize> {
    lookup_code(language_code).map(|info| info.form_count())
}

/// Lists every covered language with its code and gettext rule, sorted.
#[must_use]
pub fn numerus_info_report() -> String {
    let mut lines: Vec<String> = NUMERUS_TABLE
        .iter()
        .flat_map(|entry| {
            entry.languages.iter().enumerate().map(move |(j, code)| {
                let territory = entry.territories.get(j).copied().flatten();
                let name = locale::code_to_language(code).map_or("(!!!)", Language::name);
                let (label, locale_name) = match territory {
                    Some(territory) => (format!("{name} ({territory})"), format!("{code}_{territory}")),
                    None => (name.to_string(), (*code).to_string()),
                };
                format!("{label:<40} {locale_name:<8} {}", entry.gettext_rules)
            })
        })
        .collect();
    lines.sort();
    lines.join("\n")
}
