/*
 * Small tool that attaches segmentation results to a scan.
 *
 * Reads X, Y, Z and intensity from an IMO PCD file and one label per point
 * from a NumPy .npy file with 64 bit integers (as saved by np.save for
 * predicted class ids). Writes a PCD file with the segLabel attribute.
 */

use anyhow::{ensure, Context, Result};
use imo_pcd::{read_pcd, save_pcd};
use ndarray::Array1;
use ndarray_npy::read_npy;
use std::env::args;

fn main() -> Result<()> {
    // Show library log output if requested via RUST_LOG
    env_logger::init();

    // Check command line arguments and show usage
    let args: Vec<String> = args().collect();
    ensure!(
        args.len() >= 4,
        "Usage: pcd-apply-labels <path/to/scan.pcd> <path/to/labels.npy> <path/to/output.pcd>"
    );

    // Read scan and predicted labels
    let scan = read_pcd(&args[1]).context("Failed to read scan")?;
    let predictions: Array1<i64> = read_npy(&args[2]).context("Failed to read labels")?;

    // Labels are stored as 16 bit unsigned integers
    let labels = predictions
        .iter()
        .map(|&label| {
            u16::try_from(label).with_context(|| format!("Label {label} does not fit into 16 bits"))
        })
        .collect::<Result<Array1<u16>>>()?;

    // Write labeled point cloud
    save_pcd(scan.view(), labels.view(), &args[3]).context("Failed to write labeled PCD file")?;

    Ok(())
}
