use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::path::Path;

/// A file the employee picked as the justification for a bill.
#[derive(Clone, Eq, PartialEq)]
pub struct SelectedFile {
    name: String,
    mime_type: String,
    content: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content,
        }
    }

    /// Reads the file at `path`. The MIME type is derived from its extension.
    pub async fn load(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .with_context(|| format!("The path '{}' does not name a file", path.display()))?;
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read file at {}", path.display()))?;
        let mime_type = mime_type_for(extension_of(&name).as_deref()).to_string();
        Ok(Self {
            name,
            mime_type,
            content,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The lowercased text after the last `.` of the name, if there is one.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }
}

impl Debug for SelectedFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.content.len())
            .finish()
    }
}

fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

fn mime_type_for(extension: Option<&str>) -> &'static str {
    match extension {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// The multipart payload sent to `create`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BillUpload {
    pub file: SelectedFile,
    pub email: String,
}

/// What the remote service answers to `create`.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBill {
    pub file_url: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl CreatedBill {
    /// The identifier of the created bill: `billId` when present, otherwise `key`.
    pub fn id(&self) -> &str {
        self.bill_id.as_deref().unwrap_or(&self.key)
    }
}
