use crate::error::Converter;
use crate::Error;
use crate::Result;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

const COMMENT: &str = "# .PCD v0.7 - Point Cloud Data file format";
const VERSION: &str = "0.7";
const DEFAULT_VIEWPOINT: [f64; 7] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];

/// Storage type of a single PCD field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    /// IEEE floating point value (`F`).
    Float,
    /// Unsigned integer value (`U`).
    Unsigned,
    /// Signed integer value (`I`).
    Signed,
}

impl FieldType {
    /// Returns the single letter used in the TYPE header line.
    pub fn letter(self) -> char {
        match self {
            FieldType::Float => 'F',
            FieldType::Unsigned => 'U',
            FieldType::Signed => 'I',
        }
    }

    fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "F" => Some(FieldType::Float),
            "U" => Some(FieldType::Unsigned),
            "I" => Some(FieldType::Signed),
            _ => None,
        }
    }
}

/// Encoding of the point data that follows the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataEncoding {
    Ascii,
    Binary,
    /// LZF compressed binary data. Recognized but not supported for reading.
    BinaryCompressed,
}

impl DataEncoding {
    /// Returns the keyword used in the DATA header line.
    pub fn keyword(self) -> &'static str {
        match self {
            DataEncoding::Ascii => "ascii",
            DataEncoding::Binary => "binary",
            DataEncoding::BinaryCompressed => "binary_compressed",
        }
    }
}

/// Compile time description of one field of a point record schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub size: usize,
    pub field_type: FieldType,
}

/// A field as declared in the header of a PCD file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    /// Size of a single value in bytes.
    pub size: usize,
    pub field_type: FieldType,
    /// Number of values of this field in each record.
    pub count: usize,
}

impl Field {
    fn matches(&self, spec: &FieldSpec) -> bool {
        self.name == spec.name
            && self.size == spec.size
            && self.field_type == spec.field_type
            && self.count == 1
    }
}

impl From<&FieldSpec> for Field {
    fn from(spec: &FieldSpec) -> Self {
        Self {
            name: spec.name.to_owned(),
            size: spec.size,
            field_type: spec.field_type,
            count: 1,
        }
    }
}

/// Represents the ASCII header at the start of a PCD file.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct Header {
    /// Format version, always "0.7" for supported files.
    pub version: String,

    /// Fields of each point record in storage order.
    pub fields: Vec<Field>,

    /// Width of the point cloud, equal to the number of points for unorganized clouds.
    pub width: u32,

    /// Height of the point cloud, 1 for unorganized clouds.
    pub height: u32,

    /// Acquisition viewpoint as translation (tx ty tz) and quaternion (qw qx qy qz).
    pub viewpoint: [f64; 7],

    /// Total number of points in the file.
    pub points: usize,

    /// Encoding of the point data section.
    pub data: DataEncoding,
}

impl Header {
    /// Creates a binary header for an unorganized cloud with the given record schema.
    pub fn new(schema: &[FieldSpec], width: u32, height: u32) -> Self {
        Self {
            version: VERSION.to_owned(),
            fields: schema.iter().map(Field::from).collect(),
            width,
            height,
            viewpoint: DEFAULT_VIEWPOINT,
            points: width as usize * height as usize,
            data: DataEncoding::Binary,
        }
    }

    /// Size of a single packed point record in bytes.
    pub fn record_size(&self) -> usize {
        self.fields.iter().map(|f| f.size * f.count).sum()
    }

    /// Expected size of the binary point data section in bytes.
    /// Returns None if the declared point count is too large to be addressed.
    pub fn payload_size(&self) -> Option<usize> {
        self.record_size().checked_mul(self.points)
    }

    /// Checks that the declared fields match a record schema exactly.
    pub fn ensure_schema(&self, schema: &[FieldSpec], schema_name: &str) -> Result<()> {
        if self.fields.len() != schema.len() {
            let found: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();
            let expected: Vec<&str> = schema.iter().map(|s| s.name).collect();
            Error::format(format!(
                "File declares {} fields ({}) but the {schema_name} schema expects {} ({})",
                found.len(),
                found.join(" "),
                expected.len(),
                expected.join(" ")
            ))?
        }
        for (field, spec) in self.fields.iter().zip(schema) {
            if !field.matches(spec) {
                Error::format(format!(
                    "Field '{}' (SIZE {} TYPE {} COUNT {}) does not match field '{}' \
                     (SIZE {} TYPE {} COUNT 1) of the {schema_name} schema",
                    field.name,
                    field.size,
                    field.field_type.letter(),
                    field.count,
                    spec.name,
                    spec.size,
                    spec.field_type.letter()
                ))?
            }
        }
        Ok(())
    }

    /// Reads and validates a PCD header up to and including the DATA line.
    /// The reader is left at the first byte of the point data.
    pub fn read(reader: &mut dyn BufRead) -> Result<Self> {
        let mut version = None;
        let mut names: Option<Vec<String>> = None;
        let mut sizes: Option<Vec<usize>> = None;
        let mut types: Option<Vec<FieldType>> = None;
        let mut counts: Option<Vec<usize>> = None;
        let mut width = None;
        let mut height = None;
        let mut viewpoint = None;
        let mut points = None;
        let data;

        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            let read = reader
                .read_until(b'\n', &mut buffer)
                .io_err("Failed to read PCD header line")?;
            if read == 0 {
                Error::format("Unexpected end of file before the DATA header line")?
            }
            let line = std::str::from_utf8(&buffer)
                .format_err("Header line is not valid UTF-8")?
                .trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let keyword = tokens.next().unwrap_or_default();
            let values: Vec<&str> = tokens.collect();
            match keyword {
                "VERSION" => {
                    let value = single_value(keyword, &values)?;
                    if value != "0.7" && value != ".7" {
                        Error::format(format!("Unsupported PCD version {value}"))?
                    }
                    version = Some(VERSION.to_owned());
                }
                "FIELDS" => names = Some(values.iter().map(|v| v.to_string()).collect()),
                "SIZE" => {
                    let parsed = parse_values::<usize>(keyword, &values)?;
                    if let Some(size) = parsed.iter().find(|s| ![1, 2, 4, 8].contains(*s)) {
                        Error::format(format!("Unsupported field size {size}"))?
                    }
                    sizes = Some(parsed);
                }
                "TYPE" => {
                    let parsed = values
                        .iter()
                        .map(|v| {
                            FieldType::from_letter(v)
                                .format_err(format!("Unknown field type '{v}'"))
                        })
                        .collect::<Result<Vec<_>>>()?;
                    types = Some(parsed);
                }
                "COUNT" => counts = Some(parse_values::<usize>(keyword, &values)?),
                "WIDTH" => width = Some(parse_single::<u32>(keyword, &values)?),
                "HEIGHT" => height = Some(parse_single::<u32>(keyword, &values)?),
                "VIEWPOINT" => {
                    let parsed = parse_values::<f64>(keyword, &values)?;
                    let parsed: [f64; 7] = parsed.try_into().map_err(|v: Vec<f64>| {
                        Error::Format {
                            reason: format!("VIEWPOINT needs 7 values, found {}", v.len()),
                            source: None,
                        }
                    })?;
                    viewpoint = Some(parsed);
                }
                "POINTS" => points = Some(parse_single::<usize>(keyword, &values)?),
                "DATA" => {
                    data = match single_value(keyword, &values)? {
                        "ascii" => DataEncoding::Ascii,
                        "binary" => DataEncoding::Binary,
                        "binary_compressed" => DataEncoding::BinaryCompressed,
                        other => Error::format(format!("Unknown DATA encoding '{other}'"))?,
                    };
                    break;
                }
                other => Error::format(format!("Unknown header keyword '{other}'"))?,
            }
        }

        let version = version.format_err("Missing VERSION header line")?;
        let names = names.format_err("Missing FIELDS header line")?;
        let sizes = sizes.format_err("Missing SIZE header line")?;
        let types = types.format_err("Missing TYPE header line")?;
        let counts = counts.unwrap_or_else(|| vec![1; names.len()]);
        let width = width.format_err("Missing WIDTH header line")?;
        let height = height.format_err("Missing HEIGHT header line")?;
        let points = points.format_err("Missing POINTS header line")?;
        let viewpoint = viewpoint.unwrap_or(DEFAULT_VIEWPOINT);

        if names.is_empty() {
            Error::format("FIELDS header line declares no fields")?
        }
        let declared = [
            ("SIZE", sizes.len()),
            ("TYPE", types.len()),
            ("COUNT", counts.len()),
        ];
        for (keyword, len) in declared {
            if len != names.len() {
                Error::format(format!(
                    "{keyword} declares {len} values but FIELDS declares {}",
                    names.len()
                ))?
            }
        }
        if width as usize * height as usize != points {
            Error::format(format!(
                "WIDTH {width} times HEIGHT {height} does not match POINTS {points}"
            ))?
        }

        let fields = names
            .into_iter()
            .zip(sizes)
            .zip(types)
            .zip(counts)
            .map(|(((name, size), field_type), count)| Field {
                name,
                size,
                field_type,
                count,
            })
            .collect();

        Ok(Self {
            version,
            fields,
            width,
            height,
            viewpoint,
            points,
            data,
        })
    }

    /// Writes the header including the trailing DATA line.
    pub fn write(&self, writer: &mut dyn Write) -> Result<()> {
        let names = join(self.fields.iter().map(|f| &f.name));
        let sizes = join(self.fields.iter().map(|f| f.size));
        let types = join(self.fields.iter().map(|f| f.field_type.letter()));
        let counts = join(self.fields.iter().map(|f| f.count));
        let viewpoint = join(self.viewpoint.iter());
        let header = format!(
            "{COMMENT}\n\
             VERSION {}\n\
             FIELDS {names}\n\
             SIZE {sizes}\n\
             TYPE {types}\n\
             COUNT {counts}\n\
             WIDTH {}\n\
             HEIGHT {}\n\
             VIEWPOINT {viewpoint}\n\
             POINTS {}\n\
             DATA {}\n",
            self.version,
            self.width,
            self.height,
            self.points,
            self.data.keyword()
        );
        writer
            .write_all(header.as_bytes())
            .io_err("Failed to write PCD header")
    }
}

fn join<T: Display>(values: impl Iterator<Item = T>) -> String {
    values
        .map(|v| v.to_string())
        .collect::<Vec<String>>()
        .join(" ")
}

fn single_value<'a>(keyword: &str, values: &[&'a str]) -> Result<&'a str> {
    match values {
        &[value] => Ok(value),
        _ => Error::format(format!(
            "{keyword} expects a single value, found {}",
            values.len()
        )),
    }
}

fn parse_single<T>(keyword: &str, values: &[&str]) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    single_value(keyword, values)?
        .parse::<T>()
        .format_err(format!("Cannot parse value of {keyword}"))
}

fn parse_values<T>(keyword: &str, values: &[&str]) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    values
        .iter()
        .map(|v| {
            v.parse::<T>()
                .format_err(format!("Cannot parse value '{v}' of {keyword}"))
        })
        .collect()
}
