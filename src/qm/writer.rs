//! Encoder: catalog → compiled binary catalog.

use std::collections::{
    BTreeMap,
    BTreeSet,
    HashSet,
};
use std::io::Write;

use serde::{
    Deserialize,
    Serialize,
};

use super::context_table;
use super::error::QmError;
use super::format::{
    BlockTag,
    MAGIC,
    RecordTag,
    put_field,
    utf16_be,
    wire_u32,
};
use super::hash::record_hash;
use crate::catalog::{
    Catalog,
    CatalogEntry,
    EntryType,
};
use crate::diagnostics::Diagnostics;
use crate::numerus;

/// How much of each record key is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SaveMode {
    /// Every record carries its full key.
    #[default]
    Everything,
    /// Records carry only what distinguishes them from their neighbours, and
    /// a context hash table is added.
    Stripped,
}

/// Knobs of one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseOptions {
    /// Key records by message id instead of context/source/comment.
    pub id_based: bool,
    /// Written in front of the source text for untranslated unfinished
    /// entries.
    pub untranslated_prefix: Option<String>,
    pub ignore_unfinished: bool,
    pub save_mode: SaveMode,
    /// Drop the comment from record keys when (context, source) is unique.
    pub squeeze_comments: bool,
}

impl ReleaseOptions {
    /// Untranslated prefix, empty when unset.
    fn prefix(&self) -> &str {
        self.untranslated_prefix.as_deref().unwrap_or_default()
    }

    /// Whether empty translations of unfinished entries are filled in.
    fn fills_untranslated(&self) -> bool {
        self.id_based || !self.prefix().is_empty()
    }
}

/// Counters of one compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseStats {
    pub finished: usize,
    pub unfinished: usize,
    pub untranslated: usize,
    pub missing_ids: usize,
    pub dropped_data: usize,
}

/// Output of [`compile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    pub bytes: Vec<u8>,
    pub stats: ReleaseStats,
}

/// Sort key of a record: hash first, then the raw key bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RecordKey {
    /// Hash of source text and comment.
    hash: u32,
    /// UTF-8 context.
    context: Vec<u8>,
    /// UTF-8 source text.
    source_text: Vec<u8>,
    /// UTF-8 comment.
    comment: Vec<u8>,
}

impl RecordKey {
    /// Key of a record; the hash covers source text and comment.
    fn new(context: &str, source_text: &str, comment: &str) -> Self {
        Self {
            hash: record_hash(source_text.as_bytes(), comment.as_bytes()),
            context: context.as_bytes().to_vec(),
            source_text: source_text.as_bytes().to_vec(),
            comment: comment.as_bytes().to_vec(),
        }
    }
}

/// How much of the key two neighbouring records share.
///
/// In stripped mode a record is written with one level more than it shares
/// with either neighbour, which is exactly the part a lookup needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prefix {
    /// Different hashes.
    None,
    /// Same hash, different context.
    Hash,
    /// Same hash and context, different source text.
    HashContext,
    /// Only the comment differs.
    HashContextSourceText,
    /// Identical keys.
    HashContextSourceTextComment,
}

impl Prefix {
    /// Level shared by `a` and `b`.
    fn common(a: &RecordKey, b: &RecordKey) -> Self {
        if a.hash != b.hash {
            Self::None
        } else if a.context != b.context {
            Self::Hash
        } else if a.source_text != b.source_text {
            Self::HashContext
        } else if a.comment != b.comment {
            Self::HashContextSourceText
        } else {
            Self::HashContextSourceTextComment
        }
    }

    /// One level deeper, saturating at the full key.
    const fn next(self) -> Self {
        match self {
            Self::None => Self::Hash,
            Self::Hash => Self::HashContext,
            Self::HashContext => Self::HashContextSourceText,
            Self::HashContextSourceText | Self::HashContextSourceTextComment => {
                Self::HashContextSourceTextComment
            }
        }
    }
}

/// Appends one record: its translations, the key fields `prefix` asks for,
/// then the End tag.
///
/// The hash alone identifies records at `None` and `Hash`, so they carry no
/// key fields.
fn write_record(
    out: &mut Vec<u8>,
    key: &RecordKey,
    translations: &[String],
    prefix: Prefix,
) -> Result<(), QmError> {
    for translation in translations {
        put_field(out, RecordTag::Translation as u8, &utf16_be(translation))?;
    }
    match prefix {
        Prefix::None | Prefix::Hash => {}
        Prefix::HashContext => {
            put_field(out, RecordTag::Context as u8, &key.context)?;
        }
        Prefix::HashContextSourceText => {
            put_field(out, RecordTag::SourceText as u8, &key.source_text)?;
            put_field(out, RecordTag::Context as u8, &key.context)?;
        }
        Prefix::HashContextSourceTextComment => {
            put_field(out, RecordTag::Comment as u8, &key.comment)?;
            put_field(out, RecordTag::SourceText as u8, &key.source_text)?;
            put_field(out, RecordTag::Context as u8, &key.context)?;
        }
    }
    out.push(RecordTag::End as u8);
    Ok(())
}

/// Records collected for one catalog, kept sorted and unique by key.
#[derive(Debug, Default)]
struct Releaser {
    /// Translations per key, in output order.
    records: BTreeMap<RecordKey, Vec<String>>,
}

impl Releaser {
    /// Adds `entry` keyed by context, source text and comment.
    ///
    /// Unless `force_comment` is set the comment-less key is tried first.
    /// The first entry for a key wins.
    fn insert(&mut self, entry: &CatalogEntry, translations: Vec<String>, force_comment: bool) {
        if !force_comment {
            let squeezed = RecordKey::new(&entry.context, &entry.source_text, "");
            if !self.records.contains_key(&squeezed) {
                self.records.insert(squeezed, translations);
                return;
            }
        }
        let key = RecordKey::new(&entry.context, &entry.source_text, &entry.comment);
        self.records.entry(key).or_insert(translations);
    }

    /// Adds `entry` keyed by its id alone.
    fn insert_id_based(&mut self, entry: &CatalogEntry, translations: Vec<String>) {
        let key = RecordKey::new("", &entry.id, "");
        self.records.entry(key).or_insert(translations);
    }

    /// Builds the Hashes, Messages and Contexts blocks.
    fn squeeze(
        &self,
        mode: SaveMode,
        diagnostics: &mut Diagnostics,
    ) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>), QmError> {
        let keys: Vec<(&RecordKey, &Vec<String>)> = self.records.iter().collect();
        let mut messages = Vec::new();
        let mut offsets: Vec<(u32, u32)> = Vec::with_capacity(keys.len());

        let mut next_prefix = Prefix::None;
        for (i, (key, translations)) in keys.iter().enumerate() {
            let previous_prefix = next_prefix;
            next_prefix = keys
                .get(i + 1)
                .map_or(Prefix::None, |(next_key, _)| Prefix::common(key, next_key));
            let prefix = match mode {
                SaveMode::Everything => Prefix::HashContextSourceTextComment,
                SaveMode::Stripped => previous_prefix.max(next_prefix.next()),
            };
            offsets.push((key.hash, wire_u32(messages.len())?));
            write_record(&mut messages, key, translations, prefix)?;
        }

        offsets.sort_unstable();
        let hashes = offsets
            .iter()
            .flat_map(|(hash, offset)| hash.to_be_bytes().into_iter().chain(offset.to_be_bytes()))
            .collect();

        let contexts = if mode == SaveMode::Stripped && !keys.is_empty() {
            let unique: BTreeSet<Vec<u8>> = keys.iter().map(|(key, _)| key.context.clone()).collect();
            context_table::build(&unique, diagnostics)
        } else {
            Vec::new()
        };

        tracing::debug!(
            records = keys.len(),
            message_bytes = messages.len(),
            context_bytes = contexts.len(),
            "Squeezed catalog"
        );
        Ok((hashes, messages, contexts))
    }
}

/// Dependencies block: each name as a byte length followed by UTF-16BE.
fn dependency_block(dependencies: &[String]) -> Result<Vec<u8>, QmError> {
    let mut block = Vec::new();
    for dependency in dependencies {
        let encoded = utf16_be(dependency);
        block.extend_from_slice(&wire_u32(encoded.len())?.to_be_bytes());
        block.extend_from_slice(&encoded);
    }
    Ok(block)
}

/// Compiles `catalog` into the binary format.
///
/// Retired entries never make it into the output. Policy problems (entries
/// without ids in id-based mode, dropped context, an oversized context pool)
/// are reported to `diagnostics` and do not fail the call.
///
/// # Errors
/// Only fails when a field or the message block outgrows 32-bit lengths.
pub fn compile(
    catalog: &Catalog,
    options: &ReleaseOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Compiled, QmError> {
    let mut releaser = Releaser::default();
    let mut stats = ReleaseStats::default();

    // (context, source) pairs that also exist without a comment
    let commentless: HashSet<(&str, &str)> = catalog
        .messages()
        .iter()
        .filter(|entry| entry.comment.is_empty())
        .map(|entry| (entry.context.as_str(), entry.source_text.as_str()))
        .collect();

    for entry in catalog.messages() {
        if entry.entry_type.is_retired() {
            continue;
        }
        if options.id_based && entry.id.is_empty() {
            stats.missing_ids += 1;
            continue;
        }
        if entry.entry_type == EntryType::Unfinished {
            if entry.translation().is_empty() && !options.fills_untranslated() {
                stats.untranslated += 1;
                continue;
            }
            if options.ignore_unfinished {
                continue;
            }
            stats.unfinished += 1;
        } else {
            stats.finished += 1;
        }

        let mut translations = entry.translations.clone();
        if entry.entry_type == EntryType::Unfinished && options.fills_untranslated() {
            for translation in translations.iter_mut().filter(|t| t.is_empty()) {
                *translation = format!("{}{}", options.prefix(), entry.source_text);
            }
        }

        if options.id_based {
            if !entry.context.is_empty() || !entry.comment.is_empty() {
                stats.dropped_data += 1;
            }
            releaser.insert_id_based(entry, translations);
        } else {
            let force_comment = !options.squeeze_comments
                || entry.comment.is_empty()
                || entry.context.is_empty()
                || commentless.contains(&(entry.context.as_str(), entry.source_text.as_str()));
            releaser.insert(entry, translations, force_comment);
        }
    }

    if stats.missing_ids > 0 {
        diagnostics
            .append_error(format!("Dropped {} message(s) which had no ID.", stats.missing_ids));
    }
    if stats.dropped_data > 0 {
        diagnostics.append_error(format!(
            "Excess context/disambiguation dropped from {} message(s).",
            stats.dropped_data
        ));
    }

    let (hashes, messages, contexts) = releaser.squeeze(options.save_mode, diagnostics)?;
    let rules = numerus::lookup_code(catalog.language_code()).map(|info| info.rules).unwrap_or_default();

    let dependencies = dependency_block(catalog.dependencies())?;

    let mut bytes = MAGIC.to_vec();
    let blocks: [(BlockTag, &[u8]); 6] = [
        (BlockTag::Language, catalog.language_code().as_bytes()),
        (BlockTag::Dependencies, &dependencies),
        (BlockTag::Hashes, &hashes),
        (BlockTag::Messages, &messages),
        (BlockTag::Contexts, &contexts),
        (BlockTag::NumerusRules, rules),
    ];
    for (tag, payload) in blocks {
        if !payload.is_empty() {
            put_field(&mut bytes, tag as u8, payload)?;
        }
    }

    diagnostics.append_info(format!(
        "Generated {} translation(s) ({} finished and {} unfinished)",
        stats.finished + stats.unfinished,
        stats.finished,
        stats.unfinished
    ));
    if stats.untranslated > 0 {
        diagnostics
            .append_info(format!("Ignored {} untranslated source text(s)", stats.untranslated));
    }

    Ok(Compiled { bytes, stats })
}

/// Compiles `catalog` and writes the result to `writer`.
///
/// # Errors
/// Fails on I/O errors and on the conditions of [`compile`].
pub fn write_to<W: Write>(
    writer: &mut W,
    catalog: &Catalog,
    options: &ReleaseOptions,
    diagnostics: &mut Diagnostics,
) -> Result<ReleaseStats, QmError> {
    let compiled = compile(catalog, options, diagnostics)?;
    writer.write_all(&compiled.bytes)?;
    writer.flush()?;
    Ok(compiled.stats)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::{
        entry,
        entry_with_id,
        finished,
        translated,
    };

    fn catalog_of(language: &str, entries: Vec<CatalogEntry>) -> Catalog {
        let mut catalog = Catalog::new();
        catalog.set_language_code(language);
        for entry in entries {
            catalog.append(entry);
        }
        catalog
    }

    /// Splits a compiled catalog into (tag, payload) blocks.
    fn blocks(bytes: &[u8]) -> Vec<(u8, Vec<u8>)> {
        let mut rest = &bytes[MAGIC.len()..];
        let mut blocks = Vec::new();
        while rest.len() >= 5 {
            let len = u32::from_be_bytes(rest[1..5].try_into().unwrap()) as usize;
            blocks.push((rest[0], rest[5..5 + len].to_vec()));
            rest = &rest[5 + len..];
        }
        blocks
    }

    #[googletest::test]
    fn test_block_order_and_omission() {
        let catalog = catalog_of("de", vec![finished("ctx", "Open", "", &["Öffnen"])]);
        let mut diagnostics = Diagnostics::new();

        let compiled = compile(&catalog, &ReleaseOptions::default(), &mut diagnostics).unwrap();

        assert_eq!(&compiled.bytes[..16], &MAGIC);
        let tags: Vec<u8> = blocks(&compiled.bytes).iter().map(|(tag, _)| *tag).collect();
        assert_eq!(
            tags,
            [
                BlockTag::Language as u8,
                BlockTag::Hashes as u8,
                BlockTag::Messages as u8,
                BlockTag::NumerusRules as u8,
            ]
        );
        expect_that!(diagnostics.is_empty(), eq(true));
    }

    #[googletest::test]
    fn test_full_record_layout() {
        let catalog = catalog_of("", vec![finished("C", "ab", "x", &["Z"])]);
        let compiled =
            compile(&catalog, &ReleaseOptions::default(), &mut Diagnostics::new()).unwrap();

        let blocks = blocks(&compiled.bytes);
        let (_, messages) = blocks.iter().find(|(tag, _)| *tag == BlockTag::Messages as u8).unwrap();
        let expected: Vec<u8> = [
            &[3, 0, 0, 0, 2, 0, b'Z'][..],
            &[8, 0, 0, 0, 1, b'x'],
            &[6, 0, 0, 0, 2, b'a', b'b'],
            &[7, 0, 0, 0, 1, b'C'],
            &[1],
        ]
        .concat();
        assert_eq!(messages, &expected);

        let (_, hashes) = blocks.iter().find(|(tag, _)| *tag == BlockTag::Hashes as u8).unwrap();
        let hash = record_hash(b"ab", b"x");
        assert_eq!(hashes, &[hash.to_be_bytes(), 0_u32.to_be_bytes()].concat());
    }

    #[googletest::test]
    fn test_stats_and_untranslated_policy() {
        let mut retired = finished("ctx", "old", "", &["alt"]);
        retired.entry_type = EntryType::Obsolete;
        let catalog = catalog_of(
            "de",
            vec![
                finished("ctx", "a", "", &["A"]),
                translated(entry("ctx", "b"), &["B"]),
                entry("ctx", "c"),
                retired,
            ],
        );
        let mut diagnostics = Diagnostics::verbose();

        let compiled = compile(&catalog, &ReleaseOptions::default(), &mut diagnostics).unwrap();

        assert_eq!(
            compiled.stats,
            ReleaseStats { finished: 1, unfinished: 1, untranslated: 1, ..ReleaseStats::default() }
        );
        assert_eq!(
            diagnostics.errors(),
            [
                "Generated 2 translation(s) (1 finished and 1 unfinished)",
                "Ignored 1 untranslated source text(s)",
            ]
        );
    }

    #[googletest::test]
    fn test_ignore_unfinished() {
        let catalog = catalog_of(
            "de",
            vec![finished("ctx", "a", "", &["A"]), translated(entry("ctx", "b"), &["B"])],
        );
        let options = ReleaseOptions { ignore_unfinished: true, ..ReleaseOptions::default() };

        let compiled = compile(&catalog, &options, &mut Diagnostics::new()).unwrap();

        expect_that!(compiled.stats.unfinished, eq(0));
        expect_that!(compiled.stats.finished, eq(1));
    }

    #[googletest::test]
    fn test_id_based_drops_missing_ids_and_context() {
        let catalog = catalog_of(
            "de",
            vec![
                translated(entry_with_id("open", "Dialog", "Open"), &["Öffnen"]),
                finished("ctx", "no id", "", &["x"]),
            ],
        );
        let options = ReleaseOptions { id_based: true, ..ReleaseOptions::default() };
        let mut diagnostics = Diagnostics::new();

        let compiled = compile(&catalog, &options, &mut diagnostics).unwrap();

        expect_that!(compiled.stats.missing_ids, eq(1));
        expect_that!(compiled.stats.dropped_data, eq(1));
        assert_eq!(
            diagnostics.errors(),
            [
                "Dropped 1 message(s) which had no ID.",
                "Excess context/disambiguation dropped from 1 message(s).",
            ]
        );
    }

    #[googletest::test]
    #[rstest]
    #[case::prefix(Some("~"), "~Open")]
    #[case::empty_prefix(Some(""), "")]
    fn test_untranslated_prefix(#[case] prefix: Option<&str>, #[case] expected: &str) {
        let catalog = catalog_of("de", vec![translated(entry("ctx", "Open"), &[""])]);
        let options = ReleaseOptions {
            untranslated_prefix: prefix.map(ToString::to_string),
            ..ReleaseOptions::default()
        };

        let compiled = compile(&catalog, &options, &mut Diagnostics::new()).unwrap();
        let blocks = blocks(&compiled.bytes);
        let messages = blocks.iter().find(|(tag, _)| *tag == BlockTag::Messages as u8);

        match messages {
            Some((_, record)) => {
                let encoded = utf16_be(expected);
                assert_eq!(&record[5..5 + encoded.len()], &encoded[..]);
            }
            None => expect_that!(expected, eq("")),
        }
    }

    #[googletest::test]
    fn test_squeeze_comments_drops_unique_comments() {
        let catalog = catalog_of(
            "de",
            vec![
                finished("Dialog", "Open", "menu", &["Öffnen"]),
                finished("Dialog", "Close", "", &["Schließen"]),
                finished("Dialog", "Close", "button", &["Zumachen"]),
            ],
        );
        let options = ReleaseOptions { squeeze_comments: true, ..ReleaseOptions::default() };

        let compiled = compile(&catalog, &options, &mut Diagnostics::new()).unwrap();
        let blocks = blocks(&compiled.bytes);
        let (_, hashes) = blocks.iter().find(|(tag, _)| *tag == BlockTag::Hashes as u8).unwrap();
        let stored: BTreeSet<u32> = hashes
            .chunks_exact(8)
            .map(|chunk| u32::from_be_bytes(chunk[..4].try_into().unwrap()))
            .collect();

        expect_that!(stored.contains(&record_hash(b"Open", b"")), eq(true));
        expect_that!(stored.contains(&record_hash(b"Close", b"button")), eq(true));
        expect_that!(stored.contains(&record_hash(b"Open", b"menu")), eq(false));
    }

    #[googletest::test]
    fn test_dependencies_block() {
        let mut catalog = catalog_of("de", vec![]);
        catalog.set_dependencies(vec!["qt_de.qm".to_string()]);

        let compiled =
            compile(&catalog, &ReleaseOptions::default(), &mut Diagnostics::new()).unwrap();
        let blocks = blocks(&compiled.bytes);
        let (_, dependencies) =
            blocks.iter().find(|(tag, _)| *tag == BlockTag::Dependencies as u8).unwrap();

        let mut expected = 16_u32.to_be_bytes().to_vec();
        expected.extend(utf16_be("qt_de.qm"));
        assert_eq!(dependencies, &expected);
    }

    #[googletest::test]
    fn test_write_to_matches_compile() {
        let catalog = catalog_of("fr", vec![finished("ctx", "Open", "", &["Ouvrir"])]);
        let mut out = Vec::new();

        let stats =
            write_to(&mut out, &catalog, &ReleaseOptions::default(), &mut Diagnostics::new())
                .unwrap();
        let compiled =
            compile(&catalog, &ReleaseOptions::default(), &mut Diagnostics::new()).unwrap();

        assert_eq!(out, compiled.bytes);
        expect_that!(stats.finished, eq(1));
    }

    /// Messages block of a compiled catalog.
    fn messages_block(bytes: &[u8]) -> Vec<u8> {
        blocks(bytes)
            .into_iter()
            .find(|(tag, _)| *tag == BlockTag::Messages as u8)
            .map(|(_, payload)| payload)
            .unwrap_or_default()
    }

    /// A single-character translation field followed by `rest`.
    fn record(translation: u8, rest: &[&[u8]]) -> Vec<u8> {
        let mut record = vec![3, 0, 0, 0, 2, 0, translation];
        for part in rest {
            record.extend_from_slice(part);
        }
        record
    }

    #[rstest]
    #[case::none(Prefix::None, &[])]
    #[case::hash(Prefix::Hash, &[])]
    #[case::context(Prefix::HashContext, &[7, 0, 0, 0, 1, b'C'])]
    #[case::source_text(
        Prefix::HashContextSourceText,
        &[6, 0, 0, 0, 2, b'a', b'b', 7, 0, 0, 0, 1, b'C']
    )]
    #[case::full(
        Prefix::HashContextSourceTextComment,
        &[8, 0, 0, 0, 1, b'x', 6, 0, 0, 0, 2, b'a', b'b', 7, 0, 0, 0, 1, b'C']
    )]
    fn test_write_record_per_prefix(#[case] prefix: Prefix, #[case] key_fields: &[u8]) {
        let key = RecordKey::new("C", "ab", "x");
        let mut out = Vec::new();

        write_record(&mut out, &key, &["Z".to_string()], prefix).unwrap();

        assert_eq!(out, record(b'Z', &[key_fields, &[1]]));
    }

    #[googletest::test]
    fn test_stripped_record_with_unique_hash_has_no_key() {
        let catalog = catalog_of("de", vec![finished("Dialog", "Open the file", "", &["Z"])]);
        let options = ReleaseOptions { save_mode: SaveMode::Stripped, ..ReleaseOptions::default() };

        let compiled = compile(&catalog, &options, &mut Diagnostics::new()).unwrap();

        assert_eq!(messages_block(&compiled.bytes), record(b'Z', &[&[1]]));
    }

    #[googletest::test]
    fn test_stripped_pair_differing_in_context() {
        let catalog = catalog_of(
            "de",
            vec![finished("B", "ab", "c", &["2"]), finished("A", "ab", "c", &["1"])],
        );
        let options = ReleaseOptions { save_mode: SaveMode::Stripped, ..ReleaseOptions::default() };

        let compiled = compile(&catalog, &options, &mut Diagnostics::new()).unwrap();

        // the first one needs its context; the last one of the bucket is
        // told apart by the context check of everything before it
        let expected = [record(b'1', &[&[7, 0, 0, 0, 1, b'A'], &[1]]), record(b'2', &[&[1]])].concat();
        assert_eq!(messages_block(&compiled.bytes), expected);
    }

    #[googletest::test]
    fn test_stripped_pair_differing_in_source_text() {
        // "ab" + "c" and "a" + "bc" hash alike
        let catalog = catalog_of(
            "de",
            vec![finished("C", "ab", "c", &["2"]), finished("C", "a", "bc", &["1"])],
        );
        let options = ReleaseOptions { save_mode: SaveMode::Stripped, ..ReleaseOptions::default() };

        let compiled = compile(&catalog, &options, &mut Diagnostics::new()).unwrap();

        let expected = [
            record(b'1', &[&[6, 0, 0, 0, 1, b'a'], &[7, 0, 0, 0, 1, b'C'], &[1]]),
            record(b'2', &[&[7, 0, 0, 0, 1, b'C'], &[1]]),
        ]
        .concat();
        assert_eq!(messages_block(&compiled.bytes), expected);
    }

    #[googletest::test]
    fn test_stripped_messages_are_smaller() {
        let catalog = catalog_of(
            "de",
            vec![
                finished("C", "ab", "c", &["1"]),
                finished("C", "a", "bc", &["2"]),
                finished("D", "a", "bc", &["3"]),
                finished("Dialog", "Open the file", "", &["4"]),
            ],
        );
        let stripped = ReleaseOptions { save_mode: SaveMode::Stripped, ..ReleaseOptions::default() };

        let everything =
            compile(&catalog, &ReleaseOptions::default(), &mut Diagnostics::new()).unwrap();
        let stripped = compile(&catalog, &stripped, &mut Diagnostics::new()).unwrap();

        expect_that!(
            messages_block(&stripped.bytes).len(),
            lt(messages_block(&everything.bytes).len())
        );
    }

    #[googletest::test]
    fn test_prefix_levels() {
        let a = RecordKey::new("ctx", "ab", "c");
        let b = RecordKey::new("ctx", "a", "bc");
        let c = RecordKey::new("other", "a", "bc");
        let d = RecordKey::new("ctx", "zzz", "");

        expect_that!(Prefix::common(&a, &b), eq(Prefix::HashContext));
        expect_that!(Prefix::common(&b, &c), eq(Prefix::Hash));
        expect_that!(Prefix::common(&a, &d), eq(Prefix::None));
        expect_that!(Prefix::common(&a, &a), eq(Prefix::HashContextSourceTextComment));
        expect_that!(Prefix::HashContextSourceText.next(), eq(Prefix::HashContextSourceTextComment));
    }
}
