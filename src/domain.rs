use serde::{Deserialize, Serialize};

/// Common shape of every outline node: an id and an ordered list of child ids.
pub trait TreeNode {
    fn id(&self) -> &str;
    fn children(&self) -> &[String];
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Document,
    Folder,
    #[serde(other)]
    Other,
}

/// Entry of the file list: a folder or a document.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FileNode {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FileKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
}

impl FileNode {
    pub fn is_document(&self) -> bool {
        self.kind == Some(FileKind::Document)
    }
}

/// A single outline item inside a document.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ContentNode {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
}

impl TreeNode for FileNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn children(&self) -> &[String] {
        self.children.as_deref().unwrap_or_default()
    }
}

impl TreeNode for ContentNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn children(&self) -> &[String] {
        self.children.as_deref().unwrap_or_default()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FileList {
    pub files: Vec<FileNode>,
    pub root_file_id: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Document {
    pub nodes: Vec<ContentNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_list_payload_deserializes() {
        let json = r#"{
            "_code": "Ok",
            "root_file_id": "r",
            "files": [
                {"id": "r", "title": "Root", "type": "folder", "children": ["d"]},
                {"id": "d", "title": "Doc", "type": "document", "permission": 4}
            ]
        }"#;
        let list: FileList = serde_json::from_str(json).unwrap();
        assert_eq!(list.root_file_id, "r");
        assert_eq!(list.files[0].children(), ["d".to_string()]);
        assert!(list.files[1].is_document());
        assert!(list.files[1].children().is_empty());
    }

    #[test]
    fn unknown_file_type_is_not_a_document() {
        let node: FileNode =
            serde_json::from_str(r#"{"id": "x", "title": "X", "type": "shortcut"}"#).unwrap();
        assert_eq!(node.kind, Some(FileKind::Other));
        assert!(!node.is_document());
    }

    #[test]
    fn content_node_defaults() {
        let node: ContentNode = serde_json::from_str(r#"{"id": "n"}"#).unwrap();
        assert_eq!(node.content, "");
        assert_eq!(node.note, None);
        assert!(node.children().is_empty());
    }
}
