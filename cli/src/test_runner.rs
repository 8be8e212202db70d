use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use analyser::{ModifierClassification, Warning, WarningCollector};
use blocktext::block::Atomic;
use blocktext::{ParseError, Parser};

use crate::config::{ClassifierConfig, build_analyser};

const FIXTURE_SUFFIX: &str = ".test.blk";
const FENCE: &str = "---";

#[derive(Debug, Deserialize)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message.
    pub contains: String,

    /// 1-based line the warning's span must start on.
    #[serde(default)]
    pub line: Option<usize>,
}

/// Front matter of a `.test.blk` fixture.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectations {
    #[serde(default)]
    pub description: Option<String>,

    /// Tokenizing or parsing must fail.
    #[serde(default)]
    pub expect_parse_error: bool,

    /// Parsing must fail with a message containing this text.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// When present (even empty) the warnings must match one to one.
    #[serde(default)]
    pub expect_warnings: Option<Vec<ExpectedWarning>>,

    /// Categories of the classified atomic blocks, in walk order.
    #[serde(default)]
    pub expect_categories: Option<Vec<String>>,

    /// Classifiers appended to the built-in registry for this fixture only.
    #[serde(default, rename = "classifier")]
    pub classifiers: Vec<ClassifierConfig>,
}

impl Expectations {
    fn expects_failure(&self) -> bool {
        self.expect_parse_error || self.expect_error.is_some()
    }
}

/// A fixture split into its expectations and the notation source below them.
struct Fixture<'a> {
    expectations: Expectations,
    source: &'a str,
}

impl<'a> Fixture<'a> {
    fn parse(content: &'a str) -> Result<Self, String> {
        let content = content.trim_start_matches('\u{feff}');
        let rest = content
            .strip_prefix(FENCE)
            .ok_or("front matter must open with ---")?;
        let rest = rest
            .trim_start_matches('\r')
            .strip_prefix('\n')
            .unwrap_or(rest);

        let (front, after) =
            split_at_fence(rest).ok_or("front matter is never closed with ---")?;
        let source = after
            .strip_prefix("\r\n")
            .or_else(|| after.strip_prefix('\n'))
            .unwrap_or(after);

        let expectations = toml::from_str(front.trim_end_matches('\r'))
            .map_err(|e| format!("invalid front matter: {}", e))?;
        Ok(Fixture {
            expectations,
            source,
        })
    }

    fn check(&self) -> Result<(), String> {
        let expectations = &self.expectations;
        let analyser = build_analyser(&expectations.classifiers)
            .map_err(|e| format!("classifier error: {}", e))?;

        let parsed = Parser::new(self.source.to_string(), 0).parse();
        let code = match (parsed, expectations.expects_failure()) {
            (Err(error), true) => return self.check_failure(&error),
            (Ok(_), true) => return Err("parsing succeeded but a failure was expected".into()),
            (Err(error), false) => return Err(format!("unexpected parse error: {}", error)),
            (Ok(code), false) => code,
        };

        let mut sink = WarningCollector::new(0);
        let results = analyser.analyse_code(&code, &mut sink);

        if let Some(expected) = &expectations.expect_categories {
            check_categories(&results, expected)?;
        }
        if let Some(expected) = &expectations.expect_warnings {
            check_warnings(self.source, sink.warnings(), expected)?;
        }
        Ok(())
    }

    fn check_failure(&self, error: &ParseError) -> Result<(), String> {
        let message = error.to_string();
        match &self.expectations.expect_error {
            Some(expected) if !message.contains(expected.as_str()) => Err(format!(
                "error should mention \"{}\"\n  actual: {}",
                expected, message
            )),
            _ => Ok(()),
        }
    }
}

/// Split `text` at the first line starting with `---`.
fn split_at_fence(text: &str) -> Option<(&str, &str)> {
    let at = text.find("\n---")?;
    Some((&text[..at], &text[at + 1 + FENCE.len()..]))
}

fn check_categories(
    results: &[(&Atomic, ModifierClassification)],
    expected: &[String],
) -> Result<(), String> {
    let actual: Vec<String> = results
        .iter()
        .filter_map(|(_, classification)| classification.category())
        .map(ToString::to_string)
        .collect();
    let expected: Vec<String> = expected.iter().map(|name| name.to_uppercase()).collect();
    if actual == expected {
        return Ok(());
    }
    Err(format!(
        "category mismatch\n  expected: [{}]\n  actual:   [{}]",
        expected.join(", "),
        actual.join(", ")
    ))
}

fn check_warnings(
    source: &str,
    warnings: &[Warning],
    expected: &[ExpectedWarning],
) -> Result<(), String> {
    if warnings.len() != expected.len() {
        let listed = if warnings.is_empty() {
            "    (none)".to_string()
        } else {
            warnings
                .iter()
                .map(|w| format!("    {} (line {})", w, byte_offset_to_line(source, w.span.start)))
                .collect::<Vec<_>>()
                .join("\n")
        };
        return Err(format!(
            "expected {} warning(s), got {}\n{}",
            expected.len(),
            warnings.len(),
            listed
        ));
    }

    for (index, (warning, want)) in warnings.iter().zip(expected).enumerate() {
        if !warning.message.contains(&want.contains) {
            return Err(format!(
                "warning #{}: \"{}\" does not mention \"{}\"",
                index + 1,
                warning.message,
                want.contains
            ));
        }
        if let Some(wanted) = want.line {
            let line = byte_offset_to_line(source, warning.span.start);
            if line != wanted {
                return Err(format!(
                    "warning #{}: reported on line {}, expected line {}",
                    index + 1,
                    line,
                    wanted
                ));
            }
        }
    }
    Ok(())
}

/// 1-based line of a byte offset.
pub fn byte_offset_to_line(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    1 + source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count()
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Fixture files under `root` keyed by their directory relative to `root`
/// (`""` for files directly inside it). Both levels are sorted.
fn discover(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut found: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for path in entries.flatten().map(|entry| entry.path()) {
            if path.is_dir() {
                pending.push(path);
            } else if is_fixture(&path) {
                let category = dir
                    .strip_prefix(root)
                    .map(|relative| relative.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                found.entry(category).or_default().push(path);
            }
        }
    }
    for files in found.values_mut() {
        files.sort();
    }
    found
}

fn is_fixture(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(FIXTURE_SUFFIX))
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// Keep the categories named in `requested` and their sub-directories.
fn select<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a [PathBuf]> {
    let mut selected = BTreeMap::new();
    for request in requested {
        let request = request.trim_matches('/');
        let nested = format!("{}/", request);
        let mut matched = false;
        for (category, files) in all {
            if category == request || category.starts_with(&nested) {
                selected.insert(category.as_str(), files.as_slice());
                matched = true;
            }
        }
        if !matched {
            let available: Vec<&str> = all.keys().map(|c| category_label(c)).collect();
            eprintln!(
                "warning: category '{}' not found (available: {})",
                request,
                available.join(", ")
            );
        }
    }
    selected
}

/// Print the fixture categories found under `path`.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }
    let categories = discover(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", FIXTURE_SUFFIX, path.display());
        return;
    }
    eprintln!("available categories:");
    for (category, files) in &categories {
        eprintln!("  {} ({} tests)", category_label(category), files.len());
    }
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// ANSI styling, disabled by `--no-color`.
#[derive(Clone, Copy)]
struct Style {
    color: bool,
}

impl Style {
    fn paint(self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn pass(self) -> String {
        self.paint("32", "PASS")
    }

    fn fail(self) -> String {
        self.paint("31", "FAIL")
    }

    fn heading(self, text: &str) -> String {
        self.paint("1", text)
    }
}

struct Failure {
    path: PathBuf,
    reason: String,
}

#[derive(Default)]
struct Summary {
    passed: usize,
    failures: Vec<Failure>,
}

impl Summary {
    /// Run one fixture and print its status line.
    fn run(&mut self, path: &Path, style: Style) {
        let (description, result) = match std::fs::read_to_string(path) {
            Err(e) => (None, Err(format!("cannot read file: {}", e))),
            Ok(content) => match Fixture::parse(&content) {
                Err(e) => (None, Err(e)),
                Ok(fixture) => (fixture.expectations.description.clone(), fixture.check()),
            },
        };
        let name = description.unwrap_or_else(|| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.trim_end_matches(FIXTURE_SUFFIX).to_string())
                .unwrap_or_else(|| "?".to_string())
        });

        match result {
            Ok(()) => {
                self.passed += 1;
                eprintln!("  {}  {}", style.pass(), name);
            }
            Err(reason) => {
                eprintln!("  {}  {}", style.fail(), name);
                self.failures.push(Failure {
                    path: path.to_path_buf(),
                    reason,
                });
            }
        }
    }

    /// Print failure details and the result line. Returns the exit code.
    fn finish(self, style: Style) -> i32 {
        if !self.failures.is_empty() {
            eprintln!();
            eprintln!("failures:");
            for failure in &self.failures {
                eprintln!();
                eprintln!("  --- {} ---", failure.path.display());
                for line in failure.reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }

        eprintln!();
        let failed = self.failures.len();
        if failed == 0 {
            eprintln!(
                "test result: {}. {} passed, 0 failed",
                style.paint("32", "ok"),
                self.passed
            );
            0
        } else {
            eprintln!(
                "test result: {}. {} passed, {} failed (of {})",
                style.paint("31", "FAILED"),
                self.passed,
                failed,
                self.passed + failed
            );
            1
        }
    }
}

/// Run the fixture at `path`, or every fixture below it, optionally limited
/// to `categories`. Returns 0 when all pass and 1 otherwise.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let style = Style { color: !no_color };
    let mut summary = Summary::default();

    if path.is_file() {
        summary.run(path, style);
        return summary.finish(style);
    }

    let all = discover(path);
    if all.is_empty() {
        eprintln!("no {} files found in {}", FIXTURE_SUFFIX, path.display());
        return 1;
    }

    let selected: BTreeMap<&str, &[PathBuf]> = if categories.is_empty() {
        all.iter()
            .map(|(category, files)| (category.as_str(), files.as_slice()))
            .collect()
    } else {
        select(&all, categories)
    };
    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    for (category, files) in selected {
        eprintln!();
        eprintln!("{}", style.heading(category_label(category)));
        for file in files {
            summary.run(file, style);
        }
    }
    summary.finish(style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_front_matter_from_source() {
        let fixture = Fixture::parse("---\ndescription = \"x\"\n---\nmove {10} steps\n")
            .expect("fixture should parse");
        assert_eq!(fixture.expectations.description.as_deref(), Some("x"));
        assert_eq!(fixture.source, "move {10} steps\n");
    }

    #[test]
    fn rejects_missing_fences() {
        assert!(Fixture::parse("---\ndescription = \"x\"\n").is_err());
        assert!(Fixture::parse("move {10} steps\n").is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Fixture::parse("---\nexpect_output = \"x\"\n---\nsay [hi]\n").is_err());
    }

    #[test]
    fn line_numbers() {
        let source = "a\nb\nc";
        assert_eq!(byte_offset_to_line(source, 0), 1);
        assert_eq!(byte_offset_to_line(source, 2), 2);
        assert_eq!(byte_offset_to_line(source, 100), 3);
    }
}
