//! Filesystem-backed node provider.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::canonical::blue_id_of;
use crate::ident::BlueId;
use crate::node::{wire, Node};

use super::{document_set_blue_id, NodeProvider, ProviderError};

/// Provider serving a directory of YAML and JSON documents.
///
/// The directory is scanned once at [`open`](Self::open); the provider is
/// immutable afterwards. Files ending in `.yaml`, `.yml`, or `.json` are
/// loaded, everything else is skipped. A file holding a list is indexed
/// both as a document set under the set id and member by member, so
/// references to individual members resolve too.
///
/// File names carry no meaning; content is addressed purely by hash.
#[derive(Debug)]
pub struct DirectoryNodeProvider {
    documents: BTreeMap<BlueId, Vec<Node>>,
}

impl DirectoryNodeProvider {
    /// Loads every document under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the directory cannot be read or any
    /// eligible file fails to parse; loading is all-or-nothing.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in std::fs::read_dir(root.as_ref())? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                paths.push(entry.path());
            }
        }
        // Directory iteration order is platform-dependent.
        paths.sort();

        let mut documents = BTreeMap::new();
        for path in paths {
            let Some(extension) = path.extension().and_then(OsStr::to_str) else {
                continue;
            };
            if !matches!(extension, "yaml" | "yml" | "json") {
                tracing::debug!(path = %path.display(), "skipping non-document file");
                continue;
            }

            let file = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let text = std::fs::read_to_string(&path)?;
            let value = parse_text(extension, &text, &file)?;
            index_value(&mut documents, &value, &file)?;
        }

        Ok(Self { documents })
    }

    /// Number of distinct ids loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether nothing was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn parse_text(
    extension: &str,
    text: &str,
    file: &str,
) -> Result<serde_json::Value, ProviderError> {
    if extension == "json" {
        serde_json::from_str(text).map_err(|err| ProviderError::Parse {
            file: file.to_owned(),
            message: err.to_string(),
        })
    } else {
        serde_yaml::from_str(text).map_err(|err| ProviderError::Parse {
            file: file.to_owned(),
            message: err.to_string(),
        })
    }
}

fn index_value(
    documents: &mut BTreeMap<BlueId, Vec<Node>>,
    value: &serde_json::Value,
    file: &str,
) -> Result<(), ProviderError> {
    let to_wire_error = |source| ProviderError::Wire {
        file: file.to_owned(),
        source,
    };

    if let serde_json::Value::Array(elements) = value {
        let mut members = Vec::with_capacity(elements.len());
        for element in elements {
            members.push(wire::node_from_value(element).map_err(to_wire_error)?);
        }
        if members.is_empty() {
            tracing::debug!(file, "skipping empty document list");
            return Ok(());
        }

        for member in &members {
            documents.insert(blue_id_of(member)?, vec![member.clone()]);
        }
        documents.insert(document_set_blue_id(&members)?, members);
        return Ok(());
    }

    let node = wire::node_from_value(value).map_err(to_wire_error)?;
    documents.insert(blue_id_of(&node)?, vec![node]);
    Ok(())
}

impl NodeProvider for DirectoryNodeProvider {
    fn fetch_by_blue_id(&self, id: &BlueId) -> Result<Option<Vec<Node>>, ProviderError> {
        Ok(self.documents.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn loads_yaml_and_json_documents() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "person.yaml", "name: Alice\nage:\n  value: 39\n");
        write_file(dir.path(), "count.json", r#"{"value": 7}"#);
        write_file(dir.path(), "notes.txt", "not a document");

        let provider = DirectoryNodeProvider::open(dir.path()).unwrap();
        assert_eq!(provider.len(), 2);

        let person = Node::from_yaml_str("name: Alice\nage:\n  value: 39\n").unwrap();
        let id = blue_id_of(&person).unwrap();
        assert_eq!(provider.fetch_by_blue_id(&id).unwrap(), Some(vec![person]));
    }

    #[test]
    fn list_files_index_set_and_members() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "set.yaml", "- value: 1\n- value: 2\n");

        let provider = DirectoryNodeProvider::open(dir.path()).unwrap();
        assert_eq!(provider.len(), 3);

        let a = Node::new().with_value(1_i64);
        let b = Node::new().with_value(2_i64);
        let set_id = document_set_blue_id(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(
            provider.fetch_by_blue_id(&set_id).unwrap(),
            Some(vec![a.clone(), b])
        );
        let a_id = blue_id_of(&a).unwrap();
        assert_eq!(provider.fetch_by_blue_id(&a_id).unwrap(), Some(vec![a]));
    }

    #[test]
    fn malformed_document_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "broken.json", "{ not json");

        let err = DirectoryNodeProvider::open(dir.path()).unwrap_err();
        match err {
            ProviderError::Parse { file, .. } => assert_eq!(file, "broken.json"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_node_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "null.yaml", "age: null\n");

        let err = DirectoryNodeProvider::open(dir.path()).unwrap_err();
        assert!(matches!(err, ProviderError::Wire { .. }));
    }

    #[test]
    fn subdirectories_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        write_file(dir.path(), "doc.yaml", "value: 5\n");

        let provider = DirectoryNodeProvider::open(dir.path()).unwrap();
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn empty_directory_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let provider = DirectoryNodeProvider::open(dir.path()).unwrap();
        assert!(provider.is_empty());
    }
}
