//! End-to-end tests of the release and decompile pipelines.

#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]
#![allow(missing_docs)]

use std::fs::File;
use std::io::BufWriter;

use linguist_qm::catalog::{
    Catalog,
    CatalogEntry,
    EntryType,
};
use linguist_qm::diagnostics::Diagnostics;
use linguist_qm::numerus;
use linguist_qm::qm::{
    self,
    MAGIC,
    QmError,
    QmFile,
    ReleaseOptions,
    SaveMode,
    elf_hash,
};
use linguist_qm::release;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// (context, source, comment, translations, plural)
type Row = (String, String, String, Vec<String>, bool);

fn finished(context: &str, source_text: &str, comment: &str, translations: &[&str]) -> CatalogEntry {
    CatalogEntry {
        entry_type: EntryType::Finished,
        translations: translations.iter().map(ToString::to_string).collect(),
        plural: translations.len() > 1,
        ..CatalogEntry::new(context, source_text, comment)
    }
}

fn catalog(language: &str, entries: Vec<CatalogEntry>) -> Catalog {
    let mut catalog = Catalog::new();
    catalog.set_language_code(language);
    for entry in entries {
        catalog.append(entry);
    }
    catalog
}

fn rows(catalog: &Catalog) -> Vec<Row> {
    let mut rows: Vec<Row> = catalog
        .messages()
        .iter()
        .map(|entry| {
            (
                entry.context.clone(),
                entry.source_text.clone(),
                entry.comment.clone(),
                entry.translations.clone(),
                entry.plural,
            )
        })
        .collect();
    rows.sort();
    rows
}

fn options(save_mode: SaveMode) -> ReleaseOptions {
    ReleaseOptions { save_mode, ..ReleaseOptions::default() }
}

#[test]
fn test_roundtrip_preserves_entries() {
    let mut source = catalog(
        "de",
        vec![
            finished("MainWindow", "&File", "", &["&Datei"]),
            finished("MainWindow", "&File", "menu title", &["&Datei (Menü)"]),
            finished("MainWindow", "%n file(s) selected", "", &["%n Datei ausgewählt", "%n Dateien ausgewählt"]),
            finished("Dialog", "Grüße 🌍", "", &["Grüße 🌍"]),
            finished("", "No context", "", &["Kein Kontext"]),
            finished("Dialog", "Empty translation", "", &[""]),
        ],
    );
    source.set_dependencies(vec!["qt_de".to_string()]);
    let mut diagnostics = Diagnostics::new();
    source.normalize_translations(&mut diagnostics);

    let compiled = qm::compile(&source, &options(SaveMode::Everything), &mut diagnostics).unwrap();
    let decoded = qm::decompile(&compiled.bytes).unwrap();

    assert_eq!(rows(&decoded), rows(&source));
    assert_eq!(decoded.language_code(), "de");
    assert_eq!(decoded.dependencies(), ["qt_de"]);
    assert!(decoded.messages().iter().all(|entry| entry.entry_type == EntryType::Finished));
    assert!(diagnostics.is_empty());
}

#[test]
fn test_roundtrip_coerces_unfinished_to_finished() {
    let unfinished = CatalogEntry {
        translations: vec!["Später".to_string()],
        ..CatalogEntry::new("Dialog", "Later", "")
    };
    let source = catalog("de", vec![unfinished]);

    let compiled = qm::compile(&source, &ReleaseOptions::default(), &mut Diagnostics::new()).unwrap();
    let decoded = qm::decompile(&compiled.bytes).unwrap();

    assert_eq!(compiled.stats.unfinished, 1);
    assert_eq!(decoded.messages()[0].entry_type, EntryType::Finished);
    assert_eq!(decoded.messages()[0].translations, ["Später"]);
}

#[test]
fn test_retired_entries_are_not_compiled() {
    let mut vanished = finished("Dialog", "Gone", "", &["Weg"]);
    vanished.entry_type = EntryType::Vanished;
    let mut obsolete = finished("Dialog", "Old", "", &["Alt"]);
    obsolete.entry_type = EntryType::Obsolete;
    let source = catalog("de", vec![vanished, obsolete, finished("Dialog", "New", "", &["Neu"])]);

    let compiled = qm::compile(&source, &ReleaseOptions::default(), &mut Diagnostics::new()).unwrap();
    let decoded = qm::decompile(&compiled.bytes).unwrap();

    assert_eq!(decoded.message_count(), 1);
    assert_eq!(decoded.messages()[0].source_text, "New");
}

#[test]
fn test_same_hash_entries_in_both_modes() {
    // every split of one string hashes alike
    let text = "abcdefgh";
    let entries: Vec<CatalogEntry> = (1..text.len())
        .map(|i| {
            let (source_text, comment) = text.split_at(i);
            finished("Shared", source_text, comment, &[format!("#{i}").as_str()])
        })
        .chain([finished("Other", "abcd", "efgh", &["other"])])
        .collect();
    let source = catalog("de", entries);

    let everything = qm::compile(&source, &options(SaveMode::Everything), &mut Diagnostics::new())
        .unwrap();
    assert_eq!(rows(&qm::decompile(&everything.bytes).unwrap()), rows(&source));

    let stripped =
        qm::compile(&source, &options(SaveMode::Stripped), &mut Diagnostics::new()).unwrap();
    let file = QmFile::parse(&stripped.bytes).unwrap();
    for entry in source.messages() {
        assert_eq!(
            file.lookup(&entry.context, &entry.source_text, &entry.comment, None),
            Some(entry.translations[0].clone())
        );
    }

    // a record sharing hash and context with a neighbour keeps its context
    let decoded = file.to_catalog().unwrap();
    let mut contexts: Vec<&str> = decoded.messages().iter().map(|e| e.context.as_str()).collect();
    contexts.sort_unstable();
    let mut expected: Vec<&str> = source.messages().iter().map(|e| e.context.as_str()).collect();
    expected.sort_unstable();
    assert_eq!(contexts, expected);
}

#[test]
fn test_stripped_catalog_is_smaller() {
    let entries: Vec<CatalogEntry> = (0..200)
        .map(|i| {
            let context = if i % 2 == 0 { "MainWindow" } else { "SettingsDialog" };
            let translation = format!("Meldung {i}");
            finished(context, &format!("Status message number {i}"), "", &[translation.as_str()])
        })
        .collect();
    let source = catalog("de", entries);

    let everything = qm::compile(&source, &options(SaveMode::Everything), &mut Diagnostics::new())
        .unwrap();
    let stripped =
        qm::compile(&source, &options(SaveMode::Stripped), &mut Diagnostics::new()).unwrap();

    assert!(stripped.bytes.len() < everything.bytes.len());
    let file = QmFile::parse(&stripped.bytes).unwrap();
    assert_eq!(
        file.lookup("SettingsDialog", "Status message number 7", "", None),
        Some("Meldung 7".to_string())
    );
}

#[test]
fn test_resolve_duplicates_is_idempotent() {
    let mut source = catalog(
        "de",
        vec![
            finished("Dialog", "Open", "", &["Öffnen"]),
            finished("Dialog", "Open", "", &[""]),
            CatalogEntry { id: "save".to_string(), ..finished("Dialog", "Save", "", &["Sichern"]) },
            CatalogEntry { id: "save".to_string(), ..finished("Dialog", "Store", "", &[""]) },
        ],
    );

    let first = source.resolve_duplicates();
    let second = source.resolve_duplicates();

    assert!(!first.is_empty());
    assert!(second.is_empty());
    assert_eq!(source.message_count(), 2);
}

#[test]
fn test_plural_slots_match_form_count_after_normalize() {
    for language in ["ja", "de", "ru", "sl", "cy", "ar"] {
        let mut source = catalog(
            language,
            vec![
                CatalogEntry { plural: true, ..finished("C", "%n items", "", &["a", "b"]) },
                CatalogEntry { plural: true, ..finished("C", "%n rows", "", &[]) },
            ],
        );

        source.normalize_translations(&mut Diagnostics::new());

        let expected = numerus::form_count(language).unwrap();
        for entry in source.messages() {
            assert_eq!(entry.translations.len(), expected, "{language}");
        }
    }
}

#[test]
fn test_scenario_a_missing_plural_forms_are_padded() {
    let mut source = catalog(
        "ru",
        vec![CatalogEntry { plural: true, ..finished("Files", "%n file(s)", "", &["%n файл"]) }],
    );
    let mut diagnostics = Diagnostics::new();

    source.normalize_translations(&mut diagnostics);

    assert_eq!(source.messages()[0].translations, ["%n файл", "", ""]);
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn test_scenario_b_duplicate_ids_keep_first_source() {
    let mut source = catalog(
        "de",
        vec![
            CatalogEntry { id: "greeting".to_string(), ..finished("", "Hello", "", &["Hallo"]) },
            CatalogEntry { id: "greeting".to_string(), ..finished("", "Hi", "", &["Hi"]) },
        ],
    );

    let duplicates = source.resolve_duplicates();

    assert_eq!(duplicates.by_id.len(), 1);
    assert!(duplicates.by_contents.is_empty());
    assert_eq!(source.message_count(), 1);
    assert_eq!(source.messages()[0].source_text, "Hello");
}

#[test]
fn test_scenario_c_many_contexts_stripped() {
    let entries: Vec<CatalogEntry> = (0..5000)
        .map(|i| {
            finished(&format!("Context{i}"), &format!("Close {i}"), "", &[format!("Schließen {i}").as_str()])
        })
        .collect();
    let source = catalog("de", entries);
    let mut diagnostics = Diagnostics::new();

    let compiled = qm::compile(&source, &options(SaveMode::Stripped), &mut diagnostics).unwrap();
    let file = QmFile::parse(&compiled.bytes).unwrap();

    assert!(diagnostics.is_empty());
    let table = file.context_table().unwrap();
    // 5000 falls into the 2500..10000 band of `table_size`, sized 15013
    assert_eq!(table.bucket_count(), 15013);
    for i in (0..5000).step_by(7) {
        let context = format!("Context{i}");
        assert!(table.contains(context.as_bytes()));
        let source_text = format!("Close {i}");
        assert_eq!(file.lookup(&context, &source_text, "", None), Some(format!("Schließen {i}")));
    }
    assert_eq!(file.lookup("Context5000", "Close 0", "", None), None);
}

#[test]
fn test_scenario_d_truncated_block_fails() {
    let mut bytes = MAGIC.to_vec();
    bytes.extend_from_slice(&[0x42, 0, 0, 0, 10, 1, 2, 3]);

    let result = release::decompile(&bytes, &mut Diagnostics::new());

    assert!(matches!(
        result,
        Err(QmError::TruncatedBlock { tag: 0x42, declared: 10, remaining: 3 })
    ));
}

#[test]
fn test_elf_hash_is_never_zero() {
    let mut inputs: Vec<Vec<u8>> = vec![Vec::new(), vec![0], vec![0; 16]];
    inputs.extend((0_u16..2048).map(|i| i.to_be_bytes().repeat(usize::from(i % 9))));
    for input in inputs {
        assert_ne!(elf_hash(&input), 0);
    }
}

#[test]
fn test_id_based_release() {
    let source = catalog(
        "de",
        vec![
            CatalogEntry { id: "app.open".to_string(), ..finished("Dialog", "Open", "", &["Öffnen"]) },
            finished("Dialog", "Without id", "", &["Ohne"]),
        ],
    );
    let options = ReleaseOptions { id_based: true, ..ReleaseOptions::default() };
    let mut diagnostics = Diagnostics::new();

    let compiled = qm::compile(&source, &options, &mut diagnostics).unwrap();
    let file = QmFile::parse(&compiled.bytes).unwrap();

    assert_eq!(file.lookup("", "app.open", "", None), Some("Öffnen".to_string()));
    assert_eq!(file.record_count(), 1);
    assert_eq!(
        diagnostics.errors(),
        [
            "Dropped 1 message(s) which had no ID.",
            "Excess context/disambiguation dropped from 1 message(s).",
        ]
    );
}

#[test]
fn test_write_to_file_and_decompile_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("app_fr.qm");
    let source = catalog("fr", vec![finished("Dialog", "Open", "", &["Ouvrir"])]);
    {
        let mut writer = BufWriter::new(File::create(&path).unwrap());
        qm::write_to(&mut writer, &source, &ReleaseOptions::default(), &mut Diagnostics::new())
            .unwrap();
    }

    let output = release::decompile_file(&path, None, &mut Diagnostics::new()).unwrap();

    assert_eq!(output, temp_dir.path().join("app_fr.json"));
    let decoded = release::load_catalog(&output).unwrap();
    assert_eq!(rows(&decoded), rows(&source));
}
