//! # Member file format.
//!
//! Members are stored one per line as `first,last,id,level,paid` with no header and no quoting.
//! A name containing a comma can not be represented. The level is written as its raw number so
//! that unknown levels survive a round trip, and the paid flag is written as `0` or `1`. Names
//! are kept byte for byte, including surrounding spaces; only the numeric fields are trimmed.

use std::{
    fmt::Display,
    fs::File,
    io::{self, Read, Write},
    path::Path,
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::{Error, Result},
    member::{Level, Member},
    tree::{Inserted, Tree},
};

const FIELDS: usize = 5;

#[derive(Debug, Serialize, Deserialize)]
struct Row<'a> {
    first_name: &'a str,
    last_name: &'a str,
    #[serde(deserialize_with = "trimmed")]
    id: u32,
    #[serde(deserialize_with = "trimmed")]
    level: u16,
    #[serde(deserialize_with = "trimmed")]
    paid: i64,
}

fn trimmed<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let field = <&str>::deserialize(deserializer)?;
    field.trim().parse().map_err(serde::de::Error::custom)
}

impl<'a> From<&'a Member> for Row<'a> {
    fn from(member: &'a Member) -> Self {
        Self {
            first_name: member.first_name(),
            last_name: member.last_name(),
            id: member.id(),
            level: member.level().into(),
            paid: i64::from(member.paid()),
        }
    }
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::None);
    builder
}

fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'));
    builder
}

fn malformed(record: &csv::StringRecord, reason: impl ToString) -> Error {
    Error::Malformed {
        line: record.iter().collect::<Vec<_>>().join(","),
        reason: reason.to_string(),
    }
}

fn decode_record(record: &csv::StringRecord) -> Result<Member> {
    if record.len() != FIELDS {
        let reason = format!("expected {FIELDS} fields, found {}", record.len());
        return Err(malformed(record, reason));
    }
    let row: Row<'_> = record.deserialize(None).map_err(|err| malformed(record, err))?;
    Member::try_new(
        row.first_name,
        row.last_name,
        row.id,
        Level::from(row.level),
        row.paid != 0,
    )
}

/// Load members from the file at `path`.
///
/// A missing or unreadable file yields an empty tree. Malformed lines are skipped, and when the
/// same id appears on more than one line the first occurrence wins.
pub fn load(path: impl AsRef<Path>) -> Tree {
    let path = path.as_ref();
    match File::open(path) {
        Ok(file) => read_from(file),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no member file, starting empty");
            Tree::new()
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "member file unreadable, starting empty");
            Tree::new()
        }
    }
}

/// Load members from any reader. See [`load`].
pub fn read_from<R: Read>(source: R) -> Tree {
    let mut reader = reader_builder().from_reader(source);
    let mut record = csv::StringRecord::new();
    let mut tree = Tree::new();
    let mut skipped = 0usize;
    loop {
        let line = reader.position().line();
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => match decode_record(&record) {
                Ok(member) => {
                    if tree.insert_owned(member) == Inserted::Duplicate {
                        tracing::debug!(line, "ignoring duplicate member id");
                    }
                }
                Err(err) => {
                    skipped += 1;
                    tracing::warn!(line, %err, "skipping malformed member record");
                }
            },
            Err(err) if err.is_io_error() => {
                tracing::warn!(line, %err, "stopped reading member records");
                break;
            }
            Err(err) => {
                skipped += 1;
                tracing::warn!(line, %err, "skipping unreadable member record");
            }
        }
    }
    tracing::debug!(loaded = tree.len(), skipped, "loaded members");
    tree
}

/// Write every member to the file at `path` in ascending id order, replacing its contents.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file can not be created, written, or flushed. Members written
/// before the failure stay in the file.
pub fn dump(tree: &Tree, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut file = File::create(path)?;
    write_to(tree, &mut file)?;
    file.sync_all()?;
    tracing::debug!(path = %path.display(), members = tree.len(), "saved members");
    Ok(())
}

/// Write every member to any writer in ascending id order. See [`dump`].
///
/// # Errors
///
/// Returns [`Error::Csv`] or [`Error::Io`] if writing or flushing fails.
pub fn write_to<W: Write>(tree: &Tree, sink: W) -> Result<()> {
    let mut writer = writer_builder().from_writer(sink);
    for member in tree {
        writer.serialize(Row::from(member))?;
    }
    writer.flush()?;
    Ok(())
}
