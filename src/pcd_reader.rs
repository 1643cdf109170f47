use crate::error::Converter;
use crate::header::DataEncoding;
use crate::Error;
use crate::Header;
use crate::PointCloud;
use crate::PointRecord;
use crate::Result;
use log::{debug, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Main interface for reading PCD files.
pub struct PcdReader<R: BufRead> {
    reader: R,
    header: Header,
}

impl<R: BufRead> PcdReader<R> {
    /// Creates a new PCD reader and parses the file header.
    pub fn new(mut reader: R) -> Result<Self> {
        let header = Header::read(&mut reader)?;
        debug!(
            "Parsed PCD header with {} fields, {} points and {} data",
            header.fields.len(),
            header.points,
            header.data.keyword()
        );
        Ok(Self { reader, header })
    }

    /// Returns the parsed file header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Reads all points of the file.
    /// The fields declared in the header must match the record schema exactly.
    pub fn read_cloud<T: PointRecord>(mut self) -> Result<PointCloud<T>> {
        self.header.ensure_schema(T::FIELDS, T::SCHEMA_NAME)?;
        if self.header.height != 1 {
            warn!(
                "Reading organized PCD data with height {} as flat point sequence",
                self.header.height
            );
        }
        let points = match self.header.data {
            DataEncoding::Binary => self.read_binary::<T>()?,
            DataEncoding::Ascii => self.read_ascii::<T>()?,
            DataEncoding::BinaryCompressed => {
                Error::format("Compressed binary PCD data is not supported")?
            }
        };
        Ok(PointCloud::from_parts(
            points,
            self.header.width,
            self.header.height,
        ))
    }

    fn read_binary<T: PointRecord>(&mut self) -> Result<Vec<T>> {
        let expected = self
            .header
            .payload_size()
            .format_err(format!("POINTS {} is too large", self.header.points))?;
        let mut payload = Vec::new();
        self.reader
            .read_to_end(&mut payload)
            .io_err("Failed to read binary point data")?;
        debug!("Read {} bytes of binary point data", payload.len());

        if payload.len() < expected {
            Error::format(format!(
                "Binary point data is truncated, POINTS {} requires {expected} bytes but only {} are present",
                self.header.points,
                payload.len()
            ))?
        }
        if payload.len() > expected {
            Error::format(format!(
                "Found {} bytes after the {} declared points",
                payload.len() - expected,
                self.header.points
            ))?
        }

        let mut data = payload.as_slice();
        let mut points = Vec::with_capacity(self.header.points);
        for _ in 0..self.header.points {
            let point = T::read_binary(&mut data).format_err("Failed to decode point record")?;
            points.push(point);
        }
        Ok(points)
    }

    fn read_ascii<T: PointRecord>(&mut self) -> Result<Vec<T>> {
        let expected_values = T::FIELDS.len();
        let mut points = Vec::new();
        let mut line = String::new();
        let mut line_number = 0;
        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .io_err("Failed to read ASCII point data")?;
            if read == 0 {
                break;
            }
            line_number += 1;
            let values: Vec<&str> = line.split_whitespace().collect();
            if values.is_empty() {
                continue;
            }
            if points.len() == self.header.points {
                Error::format(format!(
                    "Found data after the {} declared points in line {line_number}",
                    self.header.points
                ))?
            }
            if values.len() != expected_values {
                Error::format(format!(
                    "Expected {expected_values} values in ASCII data line {line_number}, found {}",
                    values.len()
                ))?
            }
            points.push(T::parse_ascii(&values)?);
        }
        if points.len() < self.header.points {
            Error::format(format!(
                "ASCII point data is truncated, POINTS {} declared but only {} found",
                self.header.points,
                points.len()
            ))?
        }
        Ok(points)
    }
}

impl PcdReader<BufReader<File>> {
    /// Creates a PCD reader instance from a path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).io_err(format!("Unable to open file {}", path.display()))?;
        Self::new(BufReader::new(file))
    }
}

/// Reads a complete point cloud with the record schema `T` from a PCD file.
pub fn read<T: PointRecord>(path: impl AsRef<Path>) -> Result<PointCloud<T>> {
    PcdReader::from_file(path)?.read_cloud()
}

/// Reads only the header of a PCD file.
pub fn read_header(path: impl AsRef<Path>) -> Result<Header> {
    Ok(PcdReader::from_file(path)?.header)
}
