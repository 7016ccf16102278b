//! Typed access to the fields of [`PointCloud2`]. The cloud layout is arbitrary: each
//! field sits at its own offset within the point, with its own datatype and byte order.
//! Readers here resolve the field once and then fetch scalars by point index.

use std::fmt;

use nalgebra::Point3;

use crate::messages::{datatype, Header, PointCloud2, PointField};

/// Errors while interpreting the cloud layout.
#[derive(Debug, Clone, PartialEq)]
pub enum CloudError {
    MissingField(String),
    UnsupportedDatatype { field: String, datatype: u8 },
    /// Data buffer is shorter than width, height and steps declare
    Truncated { expected: usize, found: usize },
}

impl fmt::Display for CloudError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CloudError::MissingField(name) => write!(f, "Missing field: {}", name),
            CloudError::UnsupportedDatatype { field, datatype } => {
                write!(f, "Unsupported datatype {} of field {}", datatype, field)
            }
            CloudError::Truncated { expected, found } => write!(
                f,
                "Truncated cloud: expected at least {} bytes, found {}",
                expected, found
            ),
        }
    }
}

impl std::error::Error for CloudError {}

fn datatype_size(code: u8) -> Option<usize> {
    match code {
        datatype::INT8 | datatype::UINT8 => Some(1),
        datatype::INT16 | datatype::UINT16 => Some(2),
        datatype::INT32 | datatype::UINT32 | datatype::FLOAT32 => Some(4),
        datatype::FLOAT64 => Some(8),
        _ => None,
    }
}

/// Reads one field of every point in the cloud.
pub struct FieldReader<'a> {
    cloud: &'a PointCloud2,
    offset: usize,
    datatype: u8,
}

impl<'a> FieldReader<'a> {
    pub fn new(cloud: &'a PointCloud2, name: &str) -> Result<Self, CloudError> {
        let field = cloud
            .field(name)
            .ok_or_else(|| CloudError::MissingField(name.to_string()))?;
        let size = datatype_size(field.datatype).ok_or_else(|| CloudError::UnsupportedDatatype {
            field: name.to_string(),
            datatype: field.datatype,
        })?;

        // The last byte of the last point must be present
        let points = cloud.len();
        if points > 0 {
            let last = cloud.point_offset(points - 1) + field.offset as usize + size;
            if cloud.data.len() < last {
                return Err(CloudError::Truncated {
                    expected: last,
                    found: cloud.data.len(),
                });
            }
        }

        Ok(FieldReader {
            cloud,
            offset: field.offset as usize,
            datatype: field.datatype,
        })
    }

    /// Value of the field at the given point, widened to f64. Index must be below
    /// `cloud.len()`.
    pub fn get(&self, index: usize) -> f64 {
        let start = self.cloud.point_offset(index) + self.offset;
        let data = &self.cloud.data;
        let big = self.cloud.is_bigendian;

        macro_rules! read {
            ($t:ty, $n:expr) => {{
                let mut bytes = [0u8; $n];
                bytes.copy_from_slice(&data[start..start + $n]);
                if big {
                    <$t>::from_be_bytes(bytes) as f64
                } else {
                    <$t>::from_le_bytes(bytes) as f64
                }
            }};
        }

        match self.datatype {
            datatype::INT8 => data[start] as i8 as f64,
            datatype::UINT8 => data[start] as f64,
            datatype::INT16 => read!(i16, 2),
            datatype::UINT16 => read!(u16, 2),
            datatype::INT32 => read!(i32, 4),
            datatype::UINT32 => read!(u32, 4),
            datatype::FLOAT32 => read!(f32, 4),
            datatype::FLOAT64 => read!(f64, 8),
            // Rejected in new()
            _ => f64::NAN,
        }
    }
}

impl PointCloud2 {
    /// Number of points, width x height.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn field(&self, name: &str) -> Option<&PointField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn point_offset(&self, index: usize) -> usize {
        let width = (self.width as usize).max(1);
        let row = index / width;
        let col = index % width;
        row * self.row_step as usize + col * self.point_step as usize
    }

    /// Coordinates of all points in the cloud.
    pub fn xyz(&self) -> Result<Vec<Point3<f32>>, CloudError> {
        let x = FieldReader::new(self, "x")?;
        let y = FieldReader::new(self, "y")?;
        let z = FieldReader::new(self, "z")?;
        Ok((0..self.len())
            .map(|i| Point3::new(x.get(i) as f32, y.get(i) as f32, z.get(i) as f32))
            .collect())
    }

    /// Coordinates of all points together with the integer value of the label field.
    pub fn labeled_xyz(&self, label_field: &str) -> Result<Vec<(Point3<f32>, i64)>, CloudError> {
        let label = FieldReader::new(self, label_field)?;
        let points = self.xyz()?;
        Ok(points
            .into_iter()
            .enumerate()
            .map(|(i, p)| (p, label.get(i) as i64))
            .collect())
    }

    /// Dense little endian cloud of FLOAT32 x, y, z.
    pub fn from_xyz(header: Header, points: &[[f32; 3]]) -> Self {
        let mut data = Vec::with_capacity(points.len() * 12);
        for p in points {
            for c in p {
                data.extend_from_slice(&c.to_le_bytes());
            }
        }
        dense(header, xyz_fields(), 12, points.len(), data)
    }

    /// Dense little endian cloud of FLOAT32 x, y, z and INT32 label.
    pub fn from_labeled_xyz(header: Header, points: &[([f32; 3], i32)]) -> Self {
        let mut data = Vec::with_capacity(points.len() * 16);
        for (p, label) in points {
            for c in p {
                data.extend_from_slice(&c.to_le_bytes());
            }
            data.extend_from_slice(&label.to_le_bytes());
        }
        let mut fields = xyz_fields();
        fields.push(PointField {
            name: "label".to_string(),
            offset: 12,
            datatype: datatype::INT32,
            count: 1,
        });
        dense(header, fields, 16, points.len(), data)
    }
}

fn xyz_fields() -> Vec<PointField> {
    ["x", "y", "z"]
        .iter()
        .enumerate()
        .map(|(i, name)| PointField {
            name: name.to_string(),
            offset: 4 * i as u32,
            datatype: datatype::FLOAT32,
            count: 1,
        })
        .collect()
}

fn dense(header: Header, fields: Vec<PointField>, step: u32, count: usize, data: Vec<u8>) -> PointCloud2 {
    PointCloud2 {
        header,
        height: 1,
        width: count as u32,
        fields,
        is_bigendian: false,
        point_step: step,
        row_step: step * count as u32,
        data,
        is_dense: true,
    }
}
