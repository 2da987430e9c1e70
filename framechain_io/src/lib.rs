//! File input/output for transform documents and configuration.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::Path,
};

/// Creates the parent directory of the given file path, along with any of its
/// missing ancestors.
pub fn create_parent_directories(file_path: impl AsRef<Path>) -> io::Result<()> {
    match file_path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Creates (or truncates) the file at the given path, as well as any missing
/// parent directories.
pub fn create_file_and_required_directories(file_path: impl AsRef<Path>) -> io::Result<File> {
    create_parent_directories(&file_path)?;
    File::create(file_path)
}

/// Reads the whole text file at the given path.
pub fn read_text_file(file_path: impl AsRef<Path>) -> io::Result<String> {
    fs::read_to_string(file_path)
}

/// Writes the given string as a text file with the specified path, regardless
/// of whether the file already exists.
pub fn write_text_file(output_file_path: impl AsRef<Path>, text: &str) -> io::Result<()> {
    let mut file = create_file_and_required_directories(output_file_path)?;
    file.write_all(text.as_bytes())?;
    file.flush()
}

/// Deserializes a value of type `T` from the RON file at the given path.
#[cfg(feature = "ron")]
pub fn parse_ron_file<T>(file_path: impl AsRef<Path>) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    use anyhow::Context;

    let file_path = file_path.as_ref();
    let text = read_text_file(file_path)
        .with_context(|| format!("Could not read RON file {}", file_path.display()))?;

    ron::from_str(&text)
        .with_context(|| format!("Could not parse RON file {}", file_path.display()))
}

/// Writes the given value as pretty-printed RON to the given path, creating
/// missing parent directories.
#[cfg(feature = "ron")]
pub fn write_ron_file<T>(value: &T, output_file_path: impl AsRef<Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    use anyhow::Context;

    let output_file_path = output_file_path.as_ref();
    let text = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
        .context("Could not serialize value as RON")?;

    write_text_file(output_file_path, &text)
        .with_context(|| format!("Could not write RON file {}", output_file_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writing_text_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.yaml");

        write_text_file(&path, "child_frame_id: sensor\n").unwrap();

        assert_eq!(read_text_file(&path).unwrap(), "child_frame_id: sensor\n");
    }

    #[test]
    fn writing_text_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yaml");

        write_text_file(&path, "first version with more text").unwrap();
        write_text_file(&path, "second").unwrap();

        assert_eq!(read_text_file(&path).unwrap(), "second");
    }

    #[test]
    fn reading_missing_file_fails_with_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let error = read_text_file(dir.path().join("absent.yaml")).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn bare_file_name_has_no_parent_to_create() {
        assert!(create_parent_directories("out.yaml").is_ok());
    }

    #[cfg(feature = "ron")]
    #[test]
    fn parsing_malformed_ron_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compose.ron");
        write_text_file(&path, "(rotation_norm_tolerance: ").unwrap();

        let error = parse_ron_file::<std::collections::HashMap<String, f64>>(&path).unwrap_err();

        assert!(error.to_string().contains("compose.ron"));
    }
}
