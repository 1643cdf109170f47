use crate::error::Converter;
use crate::header::{FieldSpec, FieldType};
use crate::Result;
use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::fmt::Debug;
use std::io::{Read, Write};
use std::str::FromStr;

/// Fixed layout point record that can be stored in a PCD file.
///
/// Records are packed field after field without any padding,
/// multi-byte values use the native byte order of the host.
pub trait PointRecord: Copy + Debug + Default {
    /// Human readable schema name used in error messages.
    const SCHEMA_NAME: &'static str;

    /// Fields of the record in storage order.
    const FIELDS: &'static [FieldSpec];

    /// Size of the packed binary record in bytes.
    fn record_size() -> usize {
        Self::FIELDS.iter().map(|f| f.size).sum()
    }

    /// Writes the packed binary representation of the record.
    fn write_binary<W: Write>(&self, writer: &mut W) -> std::io::Result<()>;

    /// Reads a packed binary record.
    fn read_binary<R: Read>(reader: &mut R) -> std::io::Result<Self>;

    /// Parses one whitespace separated ASCII line.
    /// The caller guarantees there is exactly one value per field.
    fn parse_ascii(values: &[&str]) -> Result<Self>;

    /// Returns X, Y, Z and intensity of the point.
    fn coord_intensity(&self) -> [f32; 4];
}

const fn field(name: &'static str, size: usize, field_type: FieldType) -> FieldSpec {
    FieldSpec {
        name,
        size,
        field_type,
    }
}

/// Point with intensity and motion offset attributes as recorded by the sensor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointImo {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub intensity: f32,
    /// Sensor channel that measured the point.
    pub laserid: u16,
    /// Capture time relative to the start of the sweep.
    pub timeoffset: f64,
    /// Scan angle.
    pub yawangle: f32,
    /// Index of the scanning mirror.
    pub mirrorid: u8,
}

impl PointRecord for PointImo {
    const SCHEMA_NAME: &'static str = "IMO";

    const FIELDS: &'static [FieldSpec] = &[
        field("x", 4, FieldType::Float),
        field("y", 4, FieldType::Float),
        field("z", 4, FieldType::Float),
        field("intensity", 4, FieldType::Float),
        field("laserid", 2, FieldType::Unsigned),
        field("timeoffset", 8, FieldType::Float),
        field("yawangle", 4, FieldType::Float),
        field("mirrorid", 1, FieldType::Unsigned),
    ];

    fn write_binary<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_f32::<NativeEndian>(self.x)?;
        writer.write_f32::<NativeEndian>(self.y)?;
        writer.write_f32::<NativeEndian>(self.z)?;
        writer.write_f32::<NativeEndian>(self.intensity)?;
        writer.write_u16::<NativeEndian>(self.laserid)?;
        writer.write_f64::<NativeEndian>(self.timeoffset)?;
        writer.write_f32::<NativeEndian>(self.yawangle)?;
        writer.write_u8(self.mirrorid)
    }

    fn read_binary<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        Ok(Self {
            x: reader.read_f32::<NativeEndian>()?,
            y: reader.read_f32::<NativeEndian>()?,
            z: reader.read_f32::<NativeEndian>()?,
            intensity: reader.read_f32::<NativeEndian>()?,
            laserid: reader.read_u16::<NativeEndian>()?,
            timeoffset: reader.read_f64::<NativeEndian>()?,
            yawangle: reader.read_f32::<NativeEndian>()?,
            mirrorid: reader.read_u8()?,
        })
    }

    fn parse_ascii(values: &[&str]) -> Result<Self> {
        Ok(Self {
            x: parse_value(values, 0, "x")?,
            y: parse_value(values, 1, "y")?,
            z: parse_value(values, 2, "z")?,
            intensity: parse_value(values, 3, "intensity")?,
            laserid: parse_value(values, 4, "laserid")?,
            timeoffset: parse_value(values, 5, "timeoffset")?,
            yawangle: parse_value(values, 6, "yawangle")?,
            mirrorid: parse_value(values, 7, "mirrorid")?,
        })
    }

    fn coord_intensity(&self) -> [f32; 4] {
        [self.x, self.y, self.z, self.intensity]
    }
}

/// Point with intensity and a semantic segmentation label.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointAl {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub intensity: f32,
    /// Semantic segmentation label, stored as `segLabel`.
    pub seg_label: u16,
}

impl PointRecord for PointAl {
    const SCHEMA_NAME: &'static str = "AL";

    const FIELDS: &'static [FieldSpec] = &[
        field("x", 4, FieldType::Float),
        field("y", 4, FieldType::Float),
        field("z", 4, FieldType::Float),
        field("intensity", 4, FieldType::Float),
        field("segLabel", 2, FieldType::Unsigned),
    ];

    fn write_binary<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_f32::<NativeEndian>(self.x)?;
        writer.write_f32::<NativeEndian>(self.y)?;
        writer.write_f32::<NativeEndian>(self.z)?;
        writer.write_f32::<NativeEndian>(self.intensity)?;
        writer.write_u16::<NativeEndian>(self.seg_label)
    }

    fn read_binary<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        Ok(Self {
            x: reader.read_f32::<NativeEndian>()?,
            y: reader.read_f32::<NativeEndian>()?,
            z: reader.read_f32::<NativeEndian>()?,
            intensity: reader.read_f32::<NativeEndian>()?,
            seg_label: reader.read_u16::<NativeEndian>()?,
        })
    }

    fn parse_ascii(values: &[&str]) -> Result<Self> {
        Ok(Self {
            x: parse_value(values, 0, "x")?,
            y: parse_value(values, 1, "y")?,
            z: parse_value(values, 2, "z")?,
            intensity: parse_value(values, 3, "intensity")?,
            seg_label: parse_value(values, 4, "segLabel")?,
        })
    }

    fn coord_intensity(&self) -> [f32; 4] {
        [self.x, self.y, self.z, self.intensity]
    }
}

fn parse_value<T>(values: &[&str], index: usize, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = values
        .get(index)
        .format_err(format!("Missing ASCII value for field '{name}'"))?;
    value
        .parse::<T>()
        .format_err(format!("Cannot parse ASCII value '{value}' of field '{name}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sizes() {
        assert_eq!(PointImo::record_size(), 31);
        assert_eq!(PointAl::record_size(), 18);
    }

    #[test]
    fn imo_binary_layout() {
        let point = PointImo {
            x: 1.0,
            y: 2.0,
            z: 3.0,
            intensity: 0.5,
            laserid: 7,
            timeoffset: 0.25,
            yawangle: -1.5,
            mirrorid: 2,
        };
        let mut buffer = Vec::new();
        point.write_binary(&mut buffer).unwrap();
        assert_eq!(buffer.len(), PointImo::record_size());
        assert_eq!(&buffer[16..18], &7_u16.to_ne_bytes());
        assert_eq!(&buffer[18..26], &0.25_f64.to_ne_bytes());
        assert_eq!(buffer[30], 2);

        let decoded = PointImo::read_binary(&mut buffer.as_slice()).unwrap();
        assert_eq!(decoded, point);
    }

    #[test]
    fn al_binary_layout() {
        let point = PointAl {
            x: -1.0,
            y: 0.0,
            z: 8.5,
            intensity: 255.0,
            seg_label: 513,
        };
        let mut buffer = Vec::new();
        point.write_binary(&mut buffer).unwrap();
        assert_eq!(buffer.len(), 18);
        assert_eq!(&buffer[0..4], &(-1.0_f32).to_ne_bytes());
        assert_eq!(&buffer[16..18], &513_u16.to_ne_bytes());
    }

    #[test]
    fn short_binary_record() {
        let buffer = [0_u8; 20];
        assert!(PointImo::read_binary(&mut buffer.as_slice()).is_err());
    }

    #[test]
    fn ascii_values() {
        let values = ["1.5", "-2", "3e2", "nan", "12", "0.125", "90", "3"];
        let point = PointImo::parse_ascii(&values).unwrap();
        assert_eq!(point.x, 1.5);
        assert_eq!(point.z, 300.0);
        assert!(point.intensity.is_nan());
        assert_eq!(point.laserid, 12);
        assert_eq!(point.timeoffset, 0.125);
        assert_eq!(point.mirrorid, 3);

        let values = ["1", "2", "3", "4", "-5"];
        let err = PointAl::parse_ascii(&values).unwrap_err();
        assert!(err.to_string().contains("segLabel"));
    }
}
