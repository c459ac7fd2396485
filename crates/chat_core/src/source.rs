//! Files handed to the core by the shell. The core never touches the file
//! system itself; it only sees this trait.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

#[async_trait]
pub trait FileSource: Debug + Send + Sync {
    /// Display name, also used as the upload file name
    fn name(&self) -> &str;

    /// Size in bytes, known without reading the content
    fn size(&self) -> u64;

    async fn read_bytes(&self) -> anyhow::Result<Vec<u8>>;
}

pub type SharedFile = Arc<dyn FileSource>;

/// A file whose bytes are already in memory (pasted content, tests).
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    bytes: Arc<[u8]>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into().into(),
        }
    }

    pub fn shared(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> SharedFile {
        Arc::new(Self::new(name, bytes))
    }
}

#[async_trait]
impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    async fn read_bytes(&self) -> anyhow::Result<Vec<u8>> {
        Ok(self.bytes.to_vec())
    }
}
