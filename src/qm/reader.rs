//! Decoder: compiled binary catalog → catalog, plus runtime-style lookup.

use super::context_table::ContextTable;
use super::error::QmError;
use super::format::{
    BlockTag,
    ByteReader,
    MAGIC,
    NULL_STRING_LEN,
    RecordTag,
    from_utf16_be,
};
use super::hash::record_hash;
use crate::catalog::{
    Catalog,
    CatalogEntry,
    EntryType,
};
use crate::numerus;

/// Placeholder the runtime substitutes with the count.
const COUNT_MARKER: &str = "%n";

/// One message record as stored. Absent fields were compacted away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RawRecord<'a> {
    /// One string per plural form.
    translations: Vec<String>,
    /// Context, if stored.
    context: Option<&'a [u8]>,
    /// Source text, if stored.
    source_text: Option<&'a [u8]>,
    /// Disambiguation comment, if stored.
    comment: Option<&'a [u8]>,
    /// Set when a translation held unpaired surrogates.
    invalid_text: bool,
}

impl RawRecord<'_> {
    /// Runtime matching: only stored fields are compared, and an empty
    /// stored comment matches any comment.
    fn matches(&self, context: &[u8], source_text: &[u8], comment: &[u8]) -> bool {
        self.context.is_none_or(|stored| stored == context)
            && self.source_text.is_none_or(|stored| stored == source_text)
            && self.comment.is_none_or(|stored| stored.is_empty() || stored == comment)
    }
}

/// Reads a length-prefixed byte field.
fn read_sized<'a>(reader: &mut ByteReader<'a>, field_offset: usize) -> Result<&'a [u8], QmError> {
    let len = reader.read_u32().ok_or(QmError::TruncatedRecord { offset: field_offset })?;
    let len = usize::try_from(len).map_err(|_| QmError::TruncatedRecord { offset: field_offset })?;
    reader.take(len).ok_or(QmError::TruncatedRecord { offset: field_offset })
}

/// Decodes the record starting at `offset` in the message block.
fn read_record(messages: &[u8], offset: usize) -> Result<RawRecord<'_>, QmError> {
    let mut reader = ByteReader::at(messages, offset).ok_or(QmError::OffsetOutOfRange { offset })?;
    let mut record = RawRecord::default();
    loop {
        let tag_offset = reader.position();
        let tag = reader.read_u8().ok_or(QmError::TruncatedRecord { offset: tag_offset })?;
        match RecordTag::from_byte(tag) {
            Some(RecordTag::End) => return Ok(record),
            Some(RecordTag::Translation) => {
                let len =
                    reader.read_u32().ok_or(QmError::TruncatedRecord { offset: tag_offset })?;
                if len == NULL_STRING_LEN {
                    record.translations.push(String::new());
                    continue;
                }
                let len = usize::try_from(len)
                    .map_err(|_| QmError::TruncatedRecord { offset: tag_offset })?;
                if len % 2 != 0 {
                    return Err(QmError::OddUtf16Length { offset: tag_offset, length: len });
                }
                let bytes =
                    reader.take(len).ok_or(QmError::TruncatedRecord { offset: tag_offset })?;
                let (text, valid) = from_utf16_be(bytes);
                record.invalid_text |= !valid;
                record.translations.push(text);
            }
            Some(RecordTag::SourceText) => {
                record.source_text = Some(read_sized(&mut reader, tag_offset)?);
            }
            Some(RecordTag::Context) => {
                record.context = Some(read_sized(&mut reader, tag_offset)?);
            }
            Some(RecordTag::Comment) => {
                record.comment = Some(read_sized(&mut reader, tag_offset)?);
            }
            Some(RecordTag::SourceText16 | RecordTag::Context16) => {
                read_sized(&mut reader, tag_offset)?;
            }
            Some(RecordTag::Obsolete1 | RecordTag::Obsolete2) => {
                reader.take(4).ok_or(QmError::TruncatedRecord { offset: tag_offset })?;
            }
            None => return Err(QmError::UnknownRecordTag { tag, offset: tag_offset }),
        }
    }
}

/// Decodes the UTF-16 names of the Dependencies block.
///
/// Unpaired surrogates are replaced and flagged in `invalid`.
fn read_dependencies(block: &[u8], invalid: &mut bool) -> Result<Vec<String>, QmError> {
    let mut reader = ByteReader::new(block);
    let mut dependencies = Vec::new();
    while reader.remaining() > 0 {
        let offset = reader.position();
        let len = reader.read_u32().ok_or(QmError::TruncatedRecord { offset })?;
        if len == NULL_STRING_LEN {
            dependencies.push(String::new());
            continue;
        }
        let len = usize::try_from(len).map_err(|_| QmError::TruncatedRecord { offset })?;
        if len % 2 != 0 {
            return Err(QmError::OddUtf16Length { offset, length: len });
        }
        let bytes = reader.take(len).ok_or(QmError::TruncatedRecord { offset })?;
        let (name, valid) = from_utf16_be(bytes);
        *invalid |= !valid;
        dependencies.push(name);
    }
    Ok(dependencies)
}

/// Text of a decoded key field; invalid UTF-8 is replaced and flagged.
fn key_text(bytes: &[u8], invalid: &mut bool) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            *invalid = true;
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// A parsed compiled catalog.
#[derive(Debug, Clone, Default)]
pub struct QmFile {
    /// Target language code.
    language: String,
    /// Catalogs this one extends.
    dependencies: Vec<String>,
    /// (hash, offset into `messages`), sorted.
    offsets: Vec<(u32, u32)>,
    /// Raw Messages block.
    messages: Vec<u8>,
    /// Present in stripped catalogs.
    contexts: Option<ContextTable>,
    /// Plural rule program.
    numerus_rules: Vec<u8>,
}

impl QmFile {
    /// Parses the block structure of a compiled catalog.
    ///
    /// Blocks are read until fewer than five bytes remain or a block with a
    /// zero tag or zero length shows up. Unknown blocks are skipped.
    ///
    /// # Errors
    /// Fails on a missing magic number, a block longer than the remaining
    /// input and malformed dependency strings. Invalid text in the language
    /// or the dependency names is reported after everything else parsed.
    pub fn parse(bytes: &[u8]) -> Result<Self, QmError> {
        let body = bytes.strip_prefix(MAGIC.as_slice()).ok_or(QmError::BadMagic)?;
        let mut reader = ByteReader::new(body);
        let mut file = Self::default();
        let mut invalid_text = false;

        while reader.remaining() >= 5 {
            let (Some(tag), Some(len)) = (reader.read_u8(), reader.read_u32()) else {
                break;
            };
            if tag == 0 || len == 0 {
                break;
            }
            let declared = usize::try_from(len).unwrap_or(usize::MAX);
            let remaining = reader.remaining();
            let block = reader
                .take(declared)
                .ok_or(QmError::TruncatedBlock { tag, declared, remaining })?;

            match BlockTag::from_byte(tag) {
                Some(BlockTag::Language) => {
                    file.language = key_text(block, &mut invalid_text);
                }
                Some(BlockTag::Dependencies) => {
                    file.dependencies = read_dependencies(block, &mut invalid_text)?;
                }
                Some(BlockTag::Hashes) => {
                    file.offsets = block
                        .chunks_exact(8)
                        .filter_map(|chunk| <[u8; 8]>::try_from(chunk).ok())
                        .map(|[h0, h1, h2, h3, o0, o1, o2, o3]| {
                            (u32::from_be_bytes([h0, h1, h2, h3]), u32::from_be_bytes([o0, o1, o2, o3]))
                        })
                        .collect();
                }
                Some(BlockTag::Messages) => file.messages = block.to_vec(),
                Some(BlockTag::Contexts) => file.contexts = Some(ContextTable::parse(block)?),
                Some(BlockTag::NumerusRules) => file.numerus_rules = block.to_vec(),
                None => tracing::debug!(tag, len = declared, "Skipping unknown block"),
            }
        }

        if invalid_text {
            return Err(QmError::InvalidUtf8);
        }
        tracing::debug!(
            language = %file.language,
            records = file.offsets.len(),
            stripped = file.contexts.is_some(),
            "Parsed compiled catalog"
        );
        Ok(file)
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    #[must_use]
    pub fn numerus_rules(&self) -> &[u8] {
        &self.numerus_rules
    }

    #[must_use]
    pub const fn context_table(&self) -> Option<&ContextTable> {
        self.contexts.as_ref()
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.offsets.len()
    }

    /// Rebuilds a catalog from the records.
    ///
    /// Fields a record omits are taken from the previous record of the same
    /// hash. Every entry comes back finished. An entry is plural when it has
    /// several translations, or, when the language is known to have a single
    /// plural form, when its source text contains `%n`.
    ///
    /// # Errors
    /// Fails on malformed records; invalid UTF-8 is reported after all
    /// records were decoded.
    pub fn to_catalog(&self) -> Result<Catalog, QmError> {
        let guess_plurals = numerus::form_count(&self.language) == Some(1);
        let mut catalog = Catalog::new();
        catalog.set_language_code(self.language.clone());
        catalog.set_dependencies(self.dependencies.clone());

        let mut invalid = false;
        let mut carried: Option<(u32, RawRecord<'_>)> = None;
        for &(hash, offset) in &self.offsets {
            let offset = usize::try_from(offset).unwrap_or(usize::MAX);
            let mut record = read_record(&self.messages, offset)?;
            if let Some((carried_hash, previous)) = &carried {
                if *carried_hash == hash {
                    record.context = record.context.or(previous.context);
                    record.source_text = record.source_text.or(previous.source_text);
                    record.comment = record.comment.or(previous.comment);
                }
            }
            invalid |= record.invalid_text;

            let source_text = key_text(record.source_text.unwrap_or_default(), &mut invalid);
            let plural = record.translations.len() > 1
                || (guess_plurals && source_text.contains(COUNT_MARKER));
            let entry = CatalogEntry {
                context: key_text(record.context.unwrap_or_default(), &mut invalid),
                comment: key_text(record.comment.unwrap_or_default(), &mut invalid),
                source_text,
                translations: record.translations.clone(),
                entry_type: EntryType::Finished,
                plural,
                ..CatalogEntry::default()
            };
            catalog.append(entry);
            carried = Some((hash, record));
        }

        if invalid {
            return Err(QmError::InvalidUtf8);
        }
        Ok(catalog)
    }

    /// Looks up a translation the way the runtime does.
    ///
    /// `n` selects the plural form through the embedded rules. A miss with a
    /// comment is retried without it.
    #[must_use]
    pub fn lookup(
        &self,
        context: &str,
        source_text: &str,
        comment: &str,
        n: Option<u64>,
    ) -> Option<String> {
        if let Some(table) = &self.contexts {
            if !table.contains(context.as_bytes()) {
                return None;
            }
        }
        let form = n.map_or(0, |n| numerus::plural_index(&self.numerus_rules, n));

        let mut comment = comment;
        loop {
            let hash = record_hash(source_text.as_bytes(), comment.as_bytes());
            let start = self.offsets.partition_point(|&(h, _)| h < hash);
            let found = self
                .offsets
                .get(start..)
                .unwrap_or_default()
                .iter()
                .take_while(|&&(h, _)| h == hash)
                .filter_map(|&(_, offset)| {
                    read_record(&self.messages, usize::try_from(offset).ok()?).ok()
                })
                .filter(|record| {
                    record.matches(context.as_bytes(), source_text.as_bytes(), comment.as_bytes())
                })
                .find_map(|record| record.translations.get(form).cloned());
            if found.is_some() || comment.is_empty() {
                return found;
            }
            comment = "";
        }
    }
}

/// Decodes a compiled catalog into a [`Catalog`].
///
/// # Errors
/// See [`QmFile::parse`] and [`QmFile::to_catalog`].
pub fn decompile(bytes: &[u8]) -> Result<Catalog, QmError> {
    QmFile::parse(bytes)?.to_catalog()
}
