/*
 * Small tool that exports an IMO PCD file as XYZ ASCII point cloud.
 *
 * The output file name will be the input file plus ".xyz".
 * Each line contains X, Y, Z and intensity separated by a space.
 */

use anyhow::{ensure, Context, Result};
use imo_pcd::{read, PointImo};
use std::env::args;
use std::fs::File;
use std::io::{BufWriter, Write};

fn main() -> Result<()> {
    // Show library log output if requested via RUST_LOG
    env_logger::init();

    // Check command line arguments and show usage
    let args: Vec<String> = args().collect();
    ensure!(args.len() >= 2, "Usage: pcd-to-xyz <path/to/my.pcd>");

    // Prepare input and output file paths
    let in_file = args[1].clone();
    let out_file = in_file.clone() + ".xyz";

    // Read all points of the input file
    let cloud = read::<PointImo>(&in_file).context("Failed to read IMO PCD file")?;

    // Prepare buffered writing into output file
    let writer = File::create(out_file).context("Unable to open output file for writing")?;
    let mut writer = BufWriter::new(writer);
    // Write one line with XYZ and intensity per point
    for p in &cloud {
        writeln!(writer, "{} {} {} {}", p.x, p.y, p.z, p.intensity)
            .context("Failed to write point")?;
    }
    writer.flush().context("Failed to flush output file")?;

    Ok(())
}
