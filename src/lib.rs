//! Reading and writing of PCD point cloud files with two fixed record layouts.
//!
//! - [`PointImo`]: position, intensity, laser id, time offset, yaw angle and mirror id.
//! - [`PointAl`]: position, intensity and a semantic segmentation label.
//!
//! Files are always written with binary point data in native byte order.
//! Binary and ASCII point data can be read.
//!
//! ```no_run
//! use imo_pcd::{read_pcd, save_pcd};
//! use ndarray::Array1;
//!
//! let scan = read_pcd("scan.pcd")?;
//! let labels = Array1::<u16>::zeros(scan.nrows());
//! save_pcd(scan.view(), labels.view(), "labeled.pcd")?;
//! # Ok::<(), imo_pcd::Error>(())
//! ```

#![forbid(unsafe_code)]

mod array;
mod error;
mod header;
mod pcd_reader;
mod pcd_writer;
mod point;
mod pointcloud;

pub use self::array::{
    al_cloud_from_array, cloud_labels, cloud_to_array, imo_cloud_from_array, read_pcd, save_imo_pcd,
    save_pcd,
};
pub use self::error::Error;
pub use self::error::Result;
pub use self::header::{DataEncoding, Field, FieldSpec, FieldType, Header};
pub use self::pcd_reader::{read, read_header, PcdReader};
pub use self::pcd_writer::{write, PcdWriter};
pub use self::point::{PointAl, PointImo, PointRecord};
pub use self::pointcloud::PointCloud;
