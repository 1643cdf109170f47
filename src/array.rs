//! Conversion between point clouds and flat `ndarray` matrices.
//!
//! The coordinate-intensity matrix has one row per point and the four
//! columns X, Y, Z and intensity. Row order equals point order.

use crate::error::Converter;
use crate::pcd_reader::read;
use crate::pcd_writer::write;
use crate::Error;
use crate::PointAl;
use crate::PointCloud;
use crate::PointImo;
use crate::PointRecord;
use crate::Result;
use ndarray::{Array1, Array2, ArrayView, ArrayView2, Dimension, Ix2};
use std::path::Path;

fn coord_intensity_rows<D: Dimension>(
    coords: ArrayView<'_, f32, D>,
) -> Result<ArrayView2<'_, f32>> {
    let coords = coords.into_dyn();
    if coords.ndim() != 2 || coords.shape()[1] != 4 {
        Error::validation(format!(
            "Coord-intensity array must have shape (N, 4), got {:?}",
            coords.shape()
        ))?
    }
    coords
        .into_dimensionality::<Ix2>()
        .validation_err("Coord-intensity array is not two-dimensional")
}

/// Builds an IMO point cloud from an N x 4 coordinate-intensity matrix.
/// Laser id, time offset, yaw angle and mirror id are set to zero.
pub fn imo_cloud_from_array<D: Dimension>(
    coords: ArrayView<'_, f32, D>,
) -> Result<PointCloud<PointImo>> {
    let rows = coord_intensity_rows(coords)?;
    let points = rows
        .outer_iter()
        .map(|row| PointImo {
            x: row[0],
            y: row[1],
            z: row[2],
            intensity: row[3],
            ..Default::default()
        })
        .collect();
    PointCloud::from_points(points)
}

/// Builds a labeled point cloud from an N x 4 coordinate-intensity matrix
/// and a vector with N segmentation labels.
pub fn al_cloud_from_array<D1: Dimension, D2: Dimension>(
    coords: ArrayView<'_, f32, D1>,
    labels: ArrayView<'_, u16, D2>,
) -> Result<PointCloud<PointAl>> {
    let rows = coord_intensity_rows(coords)?;
    if labels.ndim() != 1 || labels.len() != rows.nrows() {
        Error::validation(format!(
            "Segmentation label array must have shape (N,), got {:?} with {} labels for {} coordinate rows",
            labels.shape(),
            labels.len(),
            rows.nrows()
        ))?
    }
    let points = rows
        .outer_iter()
        .zip(labels.iter())
        .map(|(row, label)| PointAl {
            x: row[0],
            y: row[1],
            z: row[2],
            intensity: row[3],
            seg_label: *label,
        })
        .collect();
    PointCloud::from_points(points)
}

/// Returns an N x 4 matrix with X, Y, Z and intensity of all points.
/// All other point attributes are dropped.
pub fn cloud_to_array<T: PointRecord>(cloud: &PointCloud<T>) -> Array2<f32> {
    let mut array = Array2::zeros((cloud.len(), 4));
    for (mut row, point) in array.outer_iter_mut().zip(cloud) {
        for (value, component) in row.iter_mut().zip(point.coord_intensity()) {
            *value = component;
        }
    }
    array
}

/// Returns the segmentation labels of all points.
pub fn cloud_labels(cloud: &PointCloud<PointAl>) -> Array1<u16> {
    cloud.iter().map(|p| p.seg_label).collect()
}

/// Reads an IMO PCD file and returns its N x 4 coordinate-intensity matrix.
pub fn read_pcd(path: impl AsRef<Path>) -> Result<Array2<f32>> {
    let cloud = read::<PointImo>(path)?;
    Ok(cloud_to_array(&cloud))
}

/// Saves coordinates, intensities and segmentation labels as AL PCD file.
pub fn save_pcd<D1: Dimension, D2: Dimension>(
    coords: ArrayView<'_, f32, D1>,
    labels: ArrayView<'_, u16, D2>,
    path: impl AsRef<Path>,
) -> Result<()> {
    let cloud = al_cloud_from_array(coords, labels)?;
    write(&cloud, path)
}

/// Saves coordinates and intensities as IMO PCD file.
pub fn save_imo_pcd<D: Dimension>(
    coords: ArrayView<'_, f32, D>,
    path: impl AsRef<Path>,
) -> Result<()> {
    let cloud = imo_cloud_from_array(coords)?;
    write(&cloud, path)
}
