//! Plain-text point clouds
//!
//! One point per row, `x y z`, separated by tabs, spaces, commas or
//! semicolons. The separator is detected from the first data row. Blank lines
//! and lines starting with `#` are skipped; columns past the third are
//! ignored.

use meshgen_core::{Error, Point3d, PointCloud, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Supported column separators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Space,
    Tab,
    Semicolon,
}

impl Delimiter {
    /// Get the character representation of the delimiter
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Space => ' ',
            Delimiter::Tab => '\t',
            Delimiter::Semicolon => ';',
        }
    }

    /// The most frequent separator in `line`, if any. Ties go to tab, then
    /// comma, then semicolon, so `1, 2, 3` reads as comma separated.
    pub fn detect_from_line(line: &str) -> Option<Self> {
        [
            Delimiter::Space,
            Delimiter::Semicolon,
            Delimiter::Comma,
            Delimiter::Tab,
        ]
        .into_iter()
        .map(|d| (line.matches(d.as_char()).count(), d))
        .filter(|(count, _)| *count > 0)
        .max_by_key(|(count, _)| *count)
        .map(|(_, d)| d)
    }
}

/// Read points from any reader
pub fn read_points<R: Read>(reader: R) -> Result<PointCloud> {
    let mut delimiter = None;
    let mut points = Vec::new();

    for (number, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let row = line.trim();
        if row.is_empty() || row.starts_with('#') {
            continue;
        }

        let d = match delimiter {
            Some(d) => d,
            None => {
                let d = Delimiter::detect_from_line(row).ok_or_else(|| {
                    Error::Parse(format!("line {}: expected x, y and z columns", number + 1))
                })?;
                log::debug!("detected {:?} separated points", d);
                *delimiter.insert(d)
            }
        };
        points.push(parse_row(row, d).map_err(|e| match e {
            Error::Parse(message) => Error::Parse(format!("line {}: {}", number + 1, message)),
            other => other,
        })?);
    }

    let cloud = PointCloud::from_points(points);
    cloud.validate()?;
    Ok(cloud)
}

fn parse_row(row: &str, delimiter: Delimiter) -> Result<Point3d> {
    let mut values = row
        .split(delimiter.as_char())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut xyz = [0.0; 3];
    for (axis, value) in xyz.iter_mut().enumerate() {
        let field = values.next().ok_or_else(|| {
            Error::Parse(format!("expected 3 columns, found {}", axis))
        })?;
        *value = field
            .parse()
            .map_err(|_| Error::Parse(format!("invalid number {:?}", field)))?;
    }
    Ok(Point3d::from(xyz))
}

/// Read a point file
pub fn read_point_file<P: AsRef<Path>>(path: P) -> Result<PointCloud> {
    let file = File::open(path)?;
    read_points(file)
}

/// Write one tab-separated `x y z` row per point
pub fn write_points<W: Write>(cloud: &PointCloud, writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for p in cloud {
        writeln!(writer, "{}\t{}\t{}", p.x, p.y, p.z)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a point file
pub fn write_point_file<P: AsRef<Path>>(cloud: &PointCloud, path: P) -> Result<()> {
    write_points(cloud, File::create(path)?)
}
