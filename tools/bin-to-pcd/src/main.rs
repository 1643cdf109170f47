/*
 * Small tool that converts raw LiDAR sweeps into IMO PCD files.
 *
 * The input is a flat sequence of little endian 32 bit floats with a fixed
 * number of values per point (5 by default, as in nuScenes .pcd.bin sweeps).
 * The first four values of each point are X, Y, Z and intensity.
 * The output file name will be the input file name plus ".pcd".
 */

use anyhow::{ensure, Context, Result};
use byteorder::{ByteOrder, LittleEndian};
use imo_pcd::save_imo_pcd;
use ndarray::{s, Array2};
use std::env::args;
use std::fs::read;

fn main() -> Result<()> {
    // Show library log output if requested via RUST_LOG
    env_logger::init();

    // Check command line arguments and show usage
    let args: Vec<String> = args().collect();
    ensure!(
        args.len() >= 2,
        "Usage: bin-to-pcd <path/to/sweep.bin> [values per point]"
    );

    // Prepare file paths and number of values per point
    let in_file = args[1].clone();
    let out_file = in_file.clone() + ".pcd";
    let stride: usize = match args.get(2) {
        Some(stride) => stride.parse().context("Failed to parse values per point")?,
        None => 5,
    };
    ensure!(stride >= 4, "Each point needs at least 4 values");

    // Load raw sweep data
    let bytes = read(&in_file).context("Failed to read input file")?;
    ensure!(
        bytes.len() % (stride * 4) == 0,
        "Input size {} is not a multiple of {} bytes per point",
        bytes.len(),
        stride * 4
    );

    // Decode floats and arrange them as one row per point
    let mut values = vec![0_f32; bytes.len() / 4];
    LittleEndian::read_f32_into(&bytes, &mut values);
    let points = Array2::from_shape_vec((values.len() / stride, stride), values)
        .context("Failed to arrange values as points")?;

    // Keep XYZ and intensity columns and write PCD file
    save_imo_pcd(points.slice(s![.., ..4]), &out_file).context("Failed to write PCD file")?;

    Ok(())
}
