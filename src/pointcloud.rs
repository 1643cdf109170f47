use crate::error::Converter;
use crate::point::PointRecord;
use crate::Result;
use std::slice::Iter;

/// Ordered sequence of point records of a single schema.
///
/// Clouds created by this crate are unorganized: the height is 1 and the width
/// equals the number of points. Clouds read from files keep the declared
/// width and height, the number of points is always `width * height`.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloud<T> {
    points: Vec<T>,
    width: u32,
    height: u32,
    is_dense: bool,
}

impl<T: PointRecord> PointCloud<T> {
    /// Creates an unorganized point cloud from a list of points.
    /// Fails if there are more points than a PCD header can declare.
    pub fn from_points(points: Vec<T>) -> Result<Self> {
        let width = u32::try_from(points.len()).validation_err(format!(
            "Point cloud with {} points exceeds the maximum PCD width",
            points.len()
        ))?;
        Ok(Self {
            points,
            width,
            height: 1,
            is_dense: false,
        })
    }

    pub(crate) fn from_parts(points: Vec<T>, width: u32, height: u32) -> Self {
        debug_assert_eq!(points.len(), width as usize * height as usize);
        Self {
            points,
            width,
            height,
            is_dense: false,
        }
    }

    pub fn points(&self) -> &[T] {
        &self.points
    }

    pub fn into_points(self) -> Vec<T> {
        self.points
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.points.iter()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Always false, points are never checked for NaN or infinite values.
    pub fn is_dense(&self) -> bool {
        self.is_dense
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<T: PointRecord> Default for PointCloud<T> {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            width: 0,
            height: 1,
            is_dense: false,
        }
    }
}

impl<'a, T: PointRecord> IntoIterator for &'a PointCloud<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
