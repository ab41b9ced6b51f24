//! End-to-end pipelines between editable catalogs and compiled ones.

use std::fs;
use std::path::{
    Path,
    PathBuf,
};

use thiserror::Error;

use crate::catalog::Catalog;
use crate::config::Settings;
use crate::diagnostics::Diagnostics;
use crate::locale;
use crate::qm::{
    self,
    QmError,
    QmFile,
    ReleaseOptions,
};

/// Fatal problems of a release or decompile run.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Cannot read '{}': {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Cannot write '{}': {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error("Invalid catalog '{}': {source}", path.display())]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("Cannot serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Cannot decode '{}': {source}", path.display())]
    Decode { path: PathBuf, source: QmError },

    #[error(transparent)]
    Encode(#[from] QmError),

    #[error("No input catalogs given")]
    NoInput,
}

/// Compiles a catalog for release.
///
/// Duplicates are folded (and reported under `file_name`), translations
/// equal to their source are dropped when `remove_identical` is set, plural
/// slots are fitted to the target language and the result is encoded.
///
/// # Errors
/// Fails only when encoding fails.
pub fn release_catalog(
    catalog: &mut Catalog,
    options: &ReleaseOptions,
    remove_identical: bool,
    verbose: bool,
    file_name: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<u8>, ReleaseError> {
    let duplicates = catalog.resolve_duplicates();
    for report in catalog.report_duplicates(&duplicates, file_name, verbose) {
        diagnostics.append_error(report);
    }

    diagnostics.append_info(format!("Updating '{}'...", file_name.display()));
    if remove_identical {
        diagnostics.append_info(format!(
            "Removing translations equal to source text in '{}'...",
            file_name.display()
        ));
        catalog.strip_identical_source_translations();
    }
    catalog.normalize_translations(diagnostics);

    let compiled = qm::compile(catalog, options, diagnostics)?;
    tracing::debug!(
        file = %file_name.display(),
        bytes = compiled.bytes.len(),
        finished = compiled.stats.finished,
        unfinished = compiled.stats.unfinished,
        "Released catalog"
    );
    Ok(compiled.bytes)
}

/// Decodes a compiled catalog.
///
/// Stripped catalogs keep only the key fields a lookup needs, so their keys
/// come back incomplete; that is reported.
///
/// # Errors
/// See [`QmFile::parse`] and [`QmFile::to_catalog`].
pub fn decompile(bytes: &[u8], diagnostics: &mut Diagnostics) -> Result<Catalog, QmError> {
    let file = QmFile::parse(bytes)?;
    let catalog = file.to_catalog()?;
    if file.context_table().is_some() {
        diagnostics.append_error(
            "Catalog was compiled in stripped mode; omitted context, source text and \
             comment fields cannot be restored.",
        );
    }
    diagnostics.append_info(format!(
        "Decoded {} message(s) for language '{}'",
        catalog.message_count(),
        catalog.language_code()
    ));
    Ok(catalog)
}

/// Reads a JSON catalog.
///
/// # Errors
/// Fails on I/O and JSON errors.
pub fn load_catalog(path: &Path) -> Result<Catalog, ReleaseError> {
    tracing::debug!("Loading catalog from: {:?}", path);
    let content = fs::read_to_string(path)
        .map_err(|source| ReleaseError::Read { path: path.to_path_buf(), source })?;
    serde_json::from_str(&content)
        .map_err(|source| ReleaseError::Parse { path: path.to_path_buf(), source })
}

/// Writes `catalog` as pretty-printed JSON.
///
/// # Errors
/// Fails on I/O and serialization errors.
pub fn save_catalog(catalog: &Catalog, path: &Path) -> Result<(), ReleaseError> {
    let mut content = serde_json::to_string_pretty(catalog)?;
    content.push('\n');
    fs::write(path, content).map_err(|source| ReleaseError::Write { path: path.to_path_buf(), source })
}

/// Folds `others` into `base`; later catalogs win on conflicting entries.
#[must_use]
pub fn merge_catalogs(mut base: Catalog, others: Vec<Catalog>) -> Catalog {
    for other in others {
        for entry in other.into_messages() {
            base.replace_sorted(entry);
        }
    }
    base
}

/// Applies the configured target language, or guesses one from the file
/// name when the catalog has none.
fn settle_language(
    catalog: &mut Catalog,
    file_name: &Path,
    settings: &Settings,
    diagnostics: &mut Diagnostics,
) {
    if let Some(language) = &settings.target_language {
        catalog.set_language_code(language.clone());
        return;
    }
    if !catalog.language_code().is_empty() {
        return;
    }
    let guessed = locale::guess_language_code_from_file_name(file_name);
    if guessed.is_empty() {
        diagnostics.append_error(format!(
            "No target language set for '{}'; plural forms cannot be checked.",
            file_name.display()
        ));
    } else {
        diagnostics.append_info(format!(
            "Target language of '{}' guessed as '{guessed}'",
            file_name.display()
        ));
        catalog.set_language_code(guessed);
    }
}

/// Releases one (possibly merged) catalog to `output`.
fn write_release(
    mut catalog: Catalog,
    file_name: &Path,
    output: &Path,
    settings: &Settings,
    diagnostics: &mut Diagnostics,
) -> Result<(), ReleaseError> {
    settle_language(&mut catalog, file_name, settings, diagnostics);
    let bytes = release_catalog(
        &mut catalog,
        &settings.conversion_options(),
        settings.remove_identical,
        settings.verbose,
        file_name,
        diagnostics,
    )?;
    fs::write(output, bytes)
        .map_err(|source| ReleaseError::Write { path: output.to_path_buf(), source })
}

/// Compiles JSON catalogs to disk.
///
/// With an `output`, all inputs are merged into that one file. Otherwise
/// every input is compiled next to itself with a `.qm` extension. Returns
/// the files written.
///
/// # Errors
/// Fails on the first input that cannot be read, compiled or written.
pub fn release_files(
    inputs: &[PathBuf],
    output: Option<&Path>,
    settings: &Settings,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<PathBuf>, ReleaseError> {
    let [first, rest @ ..] = inputs else {
        return Err(ReleaseError::NoInput);
    };

    if let Some(output) = output {
        let others = rest.iter().map(|path| load_catalog(path)).collect::<Result<Vec<_>, _>>()?;
        let merged = merge_catalogs(load_catalog(first)?, others);
        write_release(merged, first, output, settings, diagnostics)?;
        return Ok(vec![output.to_path_buf()]);
    }

    let mut written = Vec::with_capacity(inputs.len());
    for input in inputs {
        let output = input.with_extension("qm");
        write_release(load_catalog(input)?, input, &output, settings, diagnostics)?;
        written.push(output);
    }
    Ok(written)
}

/// Decodes a compiled catalog file to JSON, by default next to the input.
///
/// # Errors
/// Fails when the input cannot be read or decoded, or the output written.
pub fn decompile_file(
    input: &Path,
    output: Option<&Path>,
    diagnostics: &mut Diagnostics,
) -> Result<PathBuf, ReleaseError> {
    let bytes =
        fs::read(input).map_err(|source| ReleaseError::Read { path: input.to_path_buf(), source })?;
    let catalog = decompile(&bytes, diagnostics)
        .map_err(|source| ReleaseError::Decode { path: input.to_path_buf(), source })?;
    let output = output.map_or_else(|| input.with_extension("json"), Path::to_path_buf);
    save_catalog(&catalog, &output)?;
    Ok(output)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::catalog::{
        CatalogEntry,
        EntryType,
    };
    use crate::qm::SaveMode;
    use crate::test_utils::{
        entry_with_id,
        finished,
        translated,
    };

    fn catalog(language: &str, entries: Vec<CatalogEntry>) -> Catalog {
        let mut catalog = Catalog::new();
        catalog.set_language_code(language);
        for entry in entries {
            catalog.append(entry);
        }
        catalog
    }

    #[googletest::test]
    fn test_release_reports_duplicates() {
        let mut source = catalog(
            "de",
            vec![finished("ctx", "Open", "", &["Öffnen"]), finished("ctx", "Open", "", &["Auf"])],
        );
        let mut diagnostics = Diagnostics::new();

        let bytes = release_catalog(
            &mut source,
            &ReleaseOptions::default(),
            false,
            false,
            Path::new("app_de.json"),
            &mut diagnostics,
        )
        .unwrap();

        expect_that!(source.message_count(), eq(1));
        assert_eq!(
            diagnostics.errors(),
            ["Warning: dropping duplicate messages in 'app_de.json'\n(try --verbose for more info)."]
        );
        let file = QmFile::parse(&bytes).unwrap();
        assert_eq!(file.lookup("ctx", "Open", "", None).unwrap(), "Öffnen");
    }

    #[googletest::test]
    fn test_release_removes_identical_translations() {
        let mut source = catalog(
            "de",
            vec![finished("ctx", "OK", "", &["OK"]), finished("ctx", "Cancel", "", &["Abbrechen"])],
        );
        let mut diagnostics = Diagnostics::verbose();

        let bytes = release_catalog(
            &mut source,
            &ReleaseOptions::default(),
            true,
            true,
            Path::new("app.json"),
            &mut diagnostics,
        )
        .unwrap();

        let file = QmFile::parse(&bytes).unwrap();
        expect_that!(file.lookup("ctx", "OK", "", None), none());
        expect_that!(file.lookup("ctx", "Cancel", "", None), some(eq("Abbrechen")));
        expect_that!(
            diagnostics.errors().iter().any(|line| line.starts_with("Removing translations")),
            eq(true)
        );
    }

    #[googletest::test]
    fn test_release_fits_plural_forms() {
        let plural = CatalogEntry {
            plural: true,
            ..finished("ctx", "%n file(s)", "", &["%n soubor"])
        };
        let mut source = catalog("cs", vec![plural]);
        let mut diagnostics = Diagnostics::new();

        let bytes = release_catalog(
            &mut source,
            &ReleaseOptions::default(),
            false,
            false,
            Path::new("app_cs.json"),
            &mut diagnostics,
        )
        .unwrap();

        expect_that!(source.messages()[0].translations.len(), eq(3));
        expect_that!(diagnostics.len(), eq(1));
        let decoded = decompile(&bytes, &mut Diagnostics::new()).unwrap();
        assert_eq!(decoded.messages()[0].translations, ["%n soubor", "", ""]);
    }

    #[rstest]
    #[case::override_wins(Some("fr"), "de", "fr")]
    #[case::keeps_existing(None, "de", "de")]
    #[case::guessed_from_name(None, "", "nl_NL")]
    fn test_settle_language(
        #[case] target: Option<&str>,
        #[case] current: &str,
        #[case] expected: &str,
    ) {
        let mut source = catalog(current, Vec::new());
        let settings =
            Settings { target_language: target.map(ToString::to_string), ..Settings::default() };

        settle_language(&mut source, Path::new("app_nl.json"), &settings, &mut Diagnostics::new());

        assert_eq!(source.language_code(), expected);
    }

    #[googletest::test]
    fn test_settle_language_reports_unknown() {
        let mut source = catalog("", Vec::new());
        let mut diagnostics = Diagnostics::new();

        settle_language(&mut source, Path::new("strings.json"), &Settings::default(), &mut diagnostics);

        expect_that!(source.language_code(), eq(""));
        expect_that!(diagnostics.len(), eq(1));
    }

    #[googletest::test]
    fn test_merge_catalogs_later_wins() {
        let base = catalog("de", vec![finished("ctx", "Open", "", &["Öffnen"])]);
        let other = catalog(
            "",
            vec![finished("ctx", "Open", "", &["Aufmachen"]), finished("ctx", "Save", "", &["Speichern"])],
        );

        let merged = merge_catalogs(base, vec![other]);

        expect_that!(merged.message_count(), eq(2));
        expect_that!(merged.language_code(), eq("de"));
        let open = merged.messages().iter().find(|e| e.source_text == "Open").unwrap();
        assert_eq!(open.translations, ["Aufmachen"]);
    }

    #[googletest::test]
    fn test_release_files_next_to_inputs() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("app_de.json");
        save_catalog(&catalog("", vec![finished("ctx", "Open", "", &["Öffnen"])]), &input).unwrap();

        let written =
            release_files(&[input], None, &Settings::default(), &mut Diagnostics::new()).unwrap();

        assert_eq!(written, [temp_dir.path().join("app_de.qm")]);
        let file = QmFile::parse(&fs::read(&written[0]).unwrap()).unwrap();
        expect_that!(file.language(), eq("de_DE"));
    }

    #[googletest::test]
    fn test_release_files_merged_output() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("a.json");
        let second = temp_dir.path().join("b.json");
        let output = temp_dir.path().join("out.qm");
        save_catalog(&catalog("de", vec![finished("A", "One", "", &["Eins"])]), &first).unwrap();
        save_catalog(&catalog("de", vec![finished("B", "Two", "", &["Zwei"])]), &second).unwrap();
        let settings = Settings { save_mode: SaveMode::Stripped, ..Settings::default() };

        release_files(&[first, second], Some(&output), &settings, &mut Diagnostics::new())
            .unwrap();

        let file = QmFile::parse(&fs::read(&output).unwrap()).unwrap();
        expect_that!(file.lookup("A", "One", "", None), some(eq("Eins")));
        expect_that!(file.lookup("B", "Two", "", None), some(eq("Zwei")));
    }

    #[googletest::test]
    fn test_release_files_without_input() {
        let result = release_files(&[], None, &Settings::default(), &mut Diagnostics::new());
        expect_that!(matches!(result, Err(ReleaseError::NoInput)), eq(true));
    }

    #[googletest::test]
    fn test_load_catalog_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{").unwrap();

        let error = load_catalog(&path).unwrap_err();

        expect_that!(error.to_string(), contains_substring("broken.json"));
        expect_that!(matches!(error, ReleaseError::Parse { .. }), eq(true));
    }

    #[googletest::test]
    fn test_decompile_file_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("app.qm");
        let mut source = catalog(
            "de",
            vec![
                finished("ctx", "Open", "menu", &["Öffnen"]),
                translated(entry_with_id("", "ctx", "Later"), &["Später"]),
            ],
        );
        let bytes = release_catalog(
            &mut source,
            &ReleaseOptions::default(),
            false,
            false,
            &input,
            &mut Diagnostics::new(),
        )
        .unwrap();
        fs::write(&input, bytes).unwrap();

        let output = decompile_file(&input, None, &mut Diagnostics::new()).unwrap();

        assert_eq!(output, temp_dir.path().join("app.json"));
        let decoded = load_catalog(&output).unwrap();
        expect_that!(decoded.message_count(), eq(2));
        expect_that!(
            decoded.messages().iter().all(|e| e.entry_type == EntryType::Finished),
            eq(true)
        );
    }

    #[googletest::test]
    fn test_decompile_reports_stripped_catalog() {
        let source = catalog("de", vec![finished("ctx", "Open", "", &["Öffnen"])]);
        let options = ReleaseOptions { save_mode: SaveMode::Stripped, ..ReleaseOptions::default() };
        let stripped = qm::compile(&source, &options, &mut Diagnostics::new()).unwrap();
        let everything =
            qm::compile(&source, &ReleaseOptions::default(), &mut Diagnostics::new()).unwrap();

        let mut diagnostics = Diagnostics::new();
        let decoded = decompile(&stripped.bytes, &mut diagnostics).unwrap();

        expect_that!(decoded.messages()[0].translations, elements_are![eq("Öffnen")]);
        expect_that!(diagnostics.len(), eq(1));

        let mut diagnostics = Diagnostics::new();
        decompile(&everything.bytes, &mut diagnostics).unwrap();
        expect_that!(diagnostics.is_empty(), eq(true));
    }

    #[googletest::test]
    fn test_decompile_file_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("bad.qm");
        fs::write(&input, b"garbage").unwrap();

        let result = decompile_file(&input, None, &mut Diagnostics::new());

        expect_that!(
            matches!(result, Err(ReleaseError::Decode { source: QmError::BadMagic, .. })),
            eq(true)
        );
    }
}
