//! Text corpus and the loaders that produce it.
//!
//! The corpus is the root input of a run: an ordered list of raw texts whose
//! positions are the node ids used everywhere downstream.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::CorpusLoadError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCorpus {
    texts: Vec<String>,
}

impl TextCorpus {
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TextCorpus {
            texts: texts.into_iter().map(Into::into).collect(),
        }
    }

    /// Missing values become empty strings.
    pub fn from_optional_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        TextCorpus {
            texts: texts
                .into_iter()
                .map(|t| t.map(Into::into).unwrap_or_default())
                .collect(),
        }
    }

    /// One text per line. Trailing `\r` is stripped; blank lines are kept as empty texts.
    pub fn from_lines<R: Read>(reader: R) -> Result<Self, CorpusLoadError> {
        let mut texts = Vec::new();
        for line in BufReader::new(reader).lines() {
            let line = line?;
            texts.push(line.trim_end_matches('\r').to_string());
        }
        Ok(TextCorpus { texts })
    }

    /// Read a JSON array of objects and take `column` from each record.
    ///
    /// `null` or absent fields become empty strings, strings are taken
    /// verbatim and other scalars use their JSON rendering.
    ///
    /// # Errors
    /// `MissingColumn` when no record carries `column`.
    pub fn from_json_records<R: Read>(reader: R, column: &str) -> Result<Self, CorpusLoadError> {
        let value: Value = serde_json::from_reader(reader)?;
        let Value::Array(records) = value else {
            return Err(CorpusLoadError::NotRecords);
        };

        let mut available: IndexSet<String> = IndexSet::new();
        let mut texts = Vec::with_capacity(records.len());
        for record in &records {
            let Value::Object(fields) = record else {
                return Err(CorpusLoadError::NotRecords);
            };
            available.extend(fields.keys().cloned());
            texts.push(match fields.get(column) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            });
        }

        if !records.is_empty() && !available.contains(column) {
            return Err(CorpusLoadError::MissingColumn {
                column: column.to_string(),
                available: available.into_iter().collect(),
            });
        }
        debug!("Loaded JSON records - rows={}, column={}", texts.len(), column);
        Ok(TextCorpus { texts })
    }

    /// Load from a file: JSON records when `column` is given, plain lines otherwise.
    pub fn load(path: &Path, column: Option<&str>) -> Result<Self, CorpusLoadError> {
        let file = File::open(path).map_err(|source| CorpusLoadError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        match column {
            Some(column) => Self::from_json_records(file, column),
            None => Self::from_lines(file).map_err(|e| match e {
                CorpusLoadError::Io { source, .. } => CorpusLoadError::Io {
                    source,
                    path: path.to_path_buf(),
                },
                other => other,
            }),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.texts.get(index).map(String::as_str)
    }

    #[inline]
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.texts.iter().map(String::as_str).enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn optional_texts_fill_missing_with_empty() {
        let corpus = TextCorpus::from_optional_texts(vec![Some("nano ink"), None, Some("")]);
        assert_eq!(corpus.texts(), &["nano ink".to_string(), String::new(), String::new()]);
    }

    #[test]
    fn json_records_select_column() {
        let json = r#"[
            {"name": "A", "desc": "carbon nanotube"},
            {"name": "B", "desc": null},
            {"name": "C"},
            {"name": "D", "desc": 42}
        ]"#;
        let corpus = TextCorpus::from_json_records(json.as_bytes(), "desc").unwrap();
        assert_eq!(corpus.len(), 4);
        assert_eq!(corpus.get(0), Some("carbon nanotube"));
        assert_eq!(corpus.get(1), Some(""));
        assert_eq!(corpus.get(2), Some(""));
        assert_eq!(corpus.get(3), Some("42"));
    }

    #[test]
    fn json_records_reject_unknown_column() {
        let json = r#"[{"name": "A", "desc": "x"}]"#;
        match TextCorpus::from_json_records(json.as_bytes(), "summary") {
            Err(CorpusLoadError::MissingColumn { column, available }) => {
                assert_eq!(column, "summary");
                assert_eq!(available, vec!["desc".to_string(), "name".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn json_must_be_array_of_objects() {
        assert!(matches!(
            TextCorpus::from_json_records(r#"{"desc": "x"}"#.as_bytes(), "desc"),
            Err(CorpusLoadError::NotRecords)
        ));
        assert!(matches!(
            TextCorpus::from_json_records(r#"["x"]"#.as_bytes(), "desc"),
            Err(CorpusLoadError::NotRecords)
        ));
        assert!(matches!(
            TextCorpus::from_json_records("not json".as_bytes(), "desc"),
            Err(CorpusLoadError::Json(_))
        ));
    }

    #[test]
    fn load_lines_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "solar cell\r\n\nbattery pack\n").unwrap();
        let corpus = TextCorpus::load(file.path(), None).unwrap();
        assert_eq!(corpus.texts(), &["solar cell".to_string(), String::new(), "battery pack".to_string()]);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = TextCorpus::load(Path::new("/nonexistent/corpus.json"), Some("desc")).unwrap_err();
        match err {
            CorpusLoadError::Io { path, .. } => assert_eq!(path, Path::new("/nonexistent/corpus.json")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
