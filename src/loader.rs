//! Content loading: markdown pages with front-matter and pre-extracted API
//! member records, turned into `ContentUnit` values.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Error;
use crate::types::ContentUnit;

/// Front-matter keys docxref cares about. Other keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uid: Option<String>,
}

/// One member record as emitted by an API metadata extractor.
#[derive(Debug, Deserialize)]
struct ApiRecord {
    #[serde(default, rename = "fullName")]
    full_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    remarks: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    title: Option<String>,
    uid: String,
}

/// Accepted record file shapes: a DocFX-style `items:` document or a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiRecordFile {
    Items { items: Vec<ApiRecord> },
    List(Vec<ApiRecord>),
}

/// Load every API member record under the configured API directories.
/// Files are visited in sorted order; records keep their in-file order.
///
/// # Errors
///
/// Returns `Error::ContentUnreadable` if a file cannot be read,
/// or `Error::ApiRecordInvalid` if a record file cannot be parsed.
pub fn load_api_members(root: &Path, config: &Config) -> Result<Vec<ContentUnit>, Error> {
    let mut members = Vec::new();
    for file in content_files(root, &config.api, config, &["yml", "yaml", "json"]) {
        let content = read_content(root, &file)?;
        let records = parse_api_records(&file, &content)?;
        tracing::debug!(file = %file.display(), records = records.len(), "loaded api records");
        members.extend(records.into_iter().map(api_record_to_unit));
    }
    return Ok(members);
}

/// Load every markdown page under the configured manual directories.
/// Files are visited in sorted order so registration order is stable.
///
/// # Errors
///
/// Returns `Error::ContentUnreadable` if a file cannot be read,
/// or `Error::FrontMatterInvalid` if a front-matter block is not valid YAML.
pub fn load_manual_pages(root: &Path, config: &Config) -> Result<Vec<ContentUnit>, Error> {
    let mut pages = Vec::new();
    for file in content_files(root, &config.manual, config, &["md", "markdown"]) {
        let content = read_content(root, &file)?;
        pages.push(parse_manual_page(&file, &content)?);
    }
    tracing::debug!(pages = pages.len(), "loaded manual pages");
    return Ok(pages);
}

/// Build a manual page unit from a markdown file's content.
///
/// uid falls back to the path without extension; title falls back to the
/// first `# ` heading, then to the file stem.
///
/// # Errors
///
/// Returns `Error::FrontMatterInvalid` if the front-matter is not valid YAML.
pub fn parse_manual_page(relative_path: &Path, content: &str) -> Result<ContentUnit, Error> {
    let (front, body) = split_front_matter(content);
    let front_matter = match front {
        None => FrontMatter::default(),
        Some(yaml) if yaml.trim().is_empty() => FrontMatter::default(),
        Some(yaml) => serde_yaml::from_str(yaml).map_err(|e| {
            return Error::FrontMatterInvalid {
                file: relative_path.to_path_buf(),
                reason: e.to_string(),
            };
        })?,
    };

    let source_path = slash_path(relative_path);
    let uid = front_matter
        .uid
        .filter(|u| return !u.trim().is_empty())
        .unwrap_or_else(|| return path_uid(relative_path));
    let title = front_matter
        .title
        .or_else(|| return first_heading(body))
        .unwrap_or_else(|| return file_stem(relative_path));

    return Ok(ContentUnit::manual_page(&uid, &title, &source_path, body));
}

/// Convert one API record to a content unit. Records without any description
/// still load; the renderer gets an empty body and a warning is logged.
fn api_record_to_unit(record: ApiRecord) -> ContentUnit {
    let title = record
        .title
        .or(record.name)
        .or_else(|| return record.full_name.as_deref().map(last_segment))
        .unwrap_or_else(|| return last_segment(&record.uid));

    let parts: Vec<&str> = [record.summary.as_deref(), record.remarks.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| return !p.is_empty())
        .collect();
    if parts.is_empty() {
        tracing::warn!(uid = %record.uid, "member has no description");
    }

    return ContentUnit::api_member(&record.uid, &title, &parts.join("\n\n"));
}

/// Relative paths of matching files under `dirs`, sorted, filtered by config.
fn content_files(root: &Path, dirs: &[PathBuf], config: &Config, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for dir in dirs {
        let start = root.join(dir);
        if !start.is_dir() {
            tracing::debug!(dir = %start.display(), "content directory not found, skipping");
            continue;
        }

        for entry in WalkDir::new(&start)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| return e.file_type().is_file())
            .filter(|e| {
                return e
                    .path()
                    .extension()
                    .and_then(|ext| return ext.to_str())
                    .is_some_and(|ext| return extensions.contains(&ext));
            })
        {
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path()).to_path_buf();
            if config.should_scan(&slash_path(&relative)) {
                files.push(relative);
            }
        }
    }
    return files;
}

/// File stem as a last-resort title.
fn file_stem(path: &Path) -> String {
    return path
        .file_stem()
        .map(|s| return s.to_string_lossy().to_string())
        .unwrap_or_default();
}

/// Text of the first level-one ATX heading, if any.
fn first_heading(body: &str) -> Option<String> {
    return body
        .lines()
        .find_map(|line| return line.strip_prefix("# "))
        .map(|title| return title.trim().trim_end_matches('#').trim().to_string())
        .filter(|title| return !title.is_empty());
}

/// Last dotted segment of a symbol name, ignoring dots in a parameter list.
fn last_segment(symbol: &str) -> String {
    let head = symbol.split('(').next().unwrap_or(symbol);
    let start = head.rfind('.').map_or(0, |i| return i.saturating_add(1));
    return symbol.get(start..).unwrap_or(symbol).to_string();
}

/// Parse a record file by extension.
///
/// # Errors
///
/// Returns `Error::ApiRecordInvalid` describing the parse failure.
fn parse_api_records(file: &Path, content: &str) -> Result<Vec<ApiRecord>, Error> {
    let is_json = file.extension().is_some_and(|ext| return ext == "json");
    let parsed: Result<ApiRecordFile, String> = if is_json {
        serde_json::from_str(content).map_err(|e| return e.to_string())
    } else {
        serde_yaml::from_str(content).map_err(|e| return e.to_string())
    };

    return match parsed {
        Ok(ApiRecordFile::Items { items }) => Ok(items),
        Ok(ApiRecordFile::List(records)) => Ok(records),
        Err(reason) => Err(Error::ApiRecordInvalid { file: file.to_path_buf(), reason }),
    };
}

/// Read one content file, naming it in the error.
///
/// # Errors
///
/// Returns `Error::ContentUnreadable` for missing files, permission problems
/// and content that is not valid UTF-8.
fn read_content(root: &Path, relative: &Path) -> Result<String, Error> {
    return std::fs::read_to_string(root.join(relative)).map_err(|e| {
        return Error::ContentUnreadable {
            file: relative.to_path_buf(),
            reason: e.to_string(),
        };
    });
}

/// Relative path without extension, `/`-separated.
fn path_uid(path: &Path) -> String {
    return slash_path(&path.with_extension(""));
}

/// Render a relative path with `/` separators on every platform.
fn slash_path(path: &Path) -> String {
    return path
        .components()
        .map(|c| return c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/");
}

/// Split `---` delimited front-matter from the body. Content without a
/// complete block is all body.
fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content.strip_prefix("---\n").or_else(|| return content.strip_prefix("---\r\n")) else {
        return (None, content);
    };

    let mut offset = 0usize;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = rest.get(..offset).unwrap_or("");
            let body = rest.get(offset.saturating_add(line.len())..).unwrap_or("");
            return (Some(yaml), body);
        }
        offset = offset.saturating_add(line.len());
    }
    return (None, content);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_matter_supplies_uid_and_title() {
        let unit = parse_manual_page(
            Path::new("docs/getting_started.md"),
            "---\nuid: getting_started\ntitle: Getting Started\nlayout: page\n---\n# Ignored\nsee xref:guides\n",
        )
        .unwrap();
        assert_eq!(unit.uid, "getting_started");
        assert_eq!(unit.title, "Getting Started");
        assert_eq!(unit.source_path, "docs/getting_started.md");
        assert_eq!(unit.raw_body, "# Ignored\nsee xref:guides\n");
    }

    #[test]
    fn fallbacks_without_front_matter() {
        let unit = parse_manual_page(Path::new("docs/guides/intro.md"), "# Intro Guide\n\ntext").unwrap();
        assert_eq!(unit.uid, "docs/guides/intro");
        assert_eq!(unit.title, "Intro Guide");

        let bare = parse_manual_page(Path::new("docs/notes.md"), "no heading").unwrap();
        assert_eq!(bare.title, "notes");
    }

    #[test]
    fn unterminated_front_matter_is_body() {
        let unit = parse_manual_page(Path::new("a.md"), "---\nuid: a\n").unwrap();
        assert_eq!(unit.uid, "a");
        assert_eq!(unit.raw_body, "---\nuid: a\n");
    }

    #[test]
    fn broken_front_matter_is_an_error() {
        let err = parse_manual_page(Path::new("a.md"), "---\nuid: [unclosed\n---\n").unwrap_err();
        assert!(matches!(err, Error::FrontMatterInvalid { .. }));
    }

    #[test]
    fn docfx_items_and_bare_lists_both_load() {
        let yaml = "items:\n  - uid: ReqRest.RestClient\n    name: RestClient\n    summary: Sends requests.\n";
        let records = parse_api_records(Path::new("api/reqrest.yml"), yaml).unwrap();
        assert_eq!(records.len(), 1);

        let json = r#"[{"uid": "ReqRest.RestClient.Get(System.String)", "summary": "Get.", "remarks": "See xref:guides"}]"#;
        let unit = api_record_to_unit(parse_api_records(Path::new("api/extra.json"), json).unwrap().remove(0));
        assert_eq!(unit.title, "Get(System.String)");
        assert_eq!(unit.raw_body, "Get.\n\nSee xref:guides");
        assert_eq!(unit.source_path, "ReqRest.RestClient.Get(System.String)");
    }

    #[test]
    fn record_without_uid_is_invalid() {
        let err = parse_api_records(Path::new("api/bad.yml"), "- name: Orphan\n").unwrap_err();
        assert!(matches!(err, Error::ApiRecordInvalid { .. }));
    }

    #[test]
    fn loads_sorted_and_filtered_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir_all(docs.join("archive")).unwrap();
        std::fs::write(docs.join("b.md"), "# B").unwrap();
        std::fs::write(docs.join("a.md"), "# A").unwrap();
        std::fs::write(docs.join("archive/old.md"), "# Old").unwrap();
        std::fs::write(docs.join("notes.txt"), "not markdown").unwrap();

        let config = Config::parse("exclude = [\"docs/archive/\"]").unwrap();
        let pages = load_manual_pages(dir.path(), &config).unwrap();
        let uids: Vec<&str> = pages.iter().map(|p| p.uid.as_str()).collect();
        assert_eq!(uids, vec!["docs/a", "docs/b"]);

        assert!(load_api_members(dir.path(), &config).unwrap().is_empty());
    }

    #[test]
    fn non_utf8_page_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("bad.md"), b"\xff\xfe").unwrap();

        let err = load_manual_pages(dir.path(), &Config::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::ContentUnreadable { ref file, .. } if file == Path::new("docs/bad.md")
        ));
    }
}
