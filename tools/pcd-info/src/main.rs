/*
 * Small tool that prints the header of a PCD file.
 *
 * Only the header is parsed, the point data is not touched.
 */

use anyhow::{ensure, Context, Result};
use imo_pcd::read_header;
use std::env::args;

fn main() -> Result<()> {
    // Show library log output if requested via RUST_LOG
    env_logger::init();

    // Check command line arguments and show usage
    let args: Vec<String> = args().collect();
    ensure!(args.len() >= 2, "Usage: pcd-info <path/to/my.pcd>");

    // Parse header only, point data is not needed
    let header = read_header(&args[1]).context("Failed to read PCD header")?;

    // Print all header values
    println!("Version:    {}", header.version);
    println!("Fields:");
    for field in &header.fields {
        println!(
            "  {:<12} size {} type {} count {}",
            field.name,
            field.size,
            field.field_type.letter(),
            field.count
        );
    }
    println!("Record:     {} bytes", header.record_size());
    println!("Width:      {}", header.width);
    println!("Height:     {}", header.height);
    println!("Viewpoint:  {:?}", header.viewpoint);
    println!("Points:     {}", header.points);
    println!("Data:       {}", header.data.keyword());

    Ok(())
}
