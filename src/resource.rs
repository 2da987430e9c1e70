//! Access to the resources holding transform documents.

use std::{
    collections::HashMap,
    io::{self, ErrorKind},
};

/// Reading and writing of text resources identified by name.
pub trait ResourceAccess {
    fn read_text(&self, resource: &str) -> io::Result<String>;

    fn write_text(&mut self, resource: &str, text: &str) -> io::Result<()>;
}

/// Resources are files, identified by their path. Missing parent directories
/// of written files are created.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileSystem;

/// Resources held in memory, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct InMemoryResources {
    texts: HashMap<String, String>,
}

impl ResourceAccess for FileSystem {
    fn read_text(&self, resource: &str) -> io::Result<String> {
        framechain_io::read_text_file(resource)
    }

    fn write_text(&mut self, resource: &str, text: &str) -> io::Result<()> {
        framechain_io::write_text_file(resource, text)
    }
}

impl InMemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, resource: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(resource, text);
        self
    }

    pub fn insert(&mut self, resource: impl Into<String>, text: impl Into<String>) {
        self.texts.insert(resource.into(), text.into());
    }

    pub fn get(&self, resource: &str) -> Option<&str> {
        self.texts.get(resource).map(String::as_str)
    }
}

impl ResourceAccess for InMemoryResources {
    fn read_text(&self, resource: &str) -> io::Result<String> {
        self.get(resource).map(str::to_owned).ok_or_else(|| {
            io::Error::new(ErrorKind::NotFound, format!("No resource named {resource}"))
        })
    }

    fn write_text(&mut self, resource: &str, text: &str) -> io::Result<()> {
        self.insert(resource, text);
        Ok(())
    }
}
