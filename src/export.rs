//! CSV export of the schedule, the projection and the exit analysis
//!
//! Column headers are the row field names; values are written unrounded.

use crate::amortization::AmortizationSchedule;
use crate::projection::ProjectionResult;
use serde::Serialize;
use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default export file names
pub const AMORTIZATION_FILE: &str = "tableau_amortissement.csv";
pub const PROJECTION_FILE: &str = "resultats_simulation_scpi.csv";
pub const EXIT_POINTS_FILE: &str = "point_de_sortie.csv";

fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_amortization_csv<W: Write>(writer: W, schedule: &AmortizationSchedule) -> Result<(), Box<dyn Error>> {
    write_rows(writer, &schedule.rows)
}

pub fn write_projection_csv<W: Write>(writer: W, projection: &ProjectionResult) -> Result<(), Box<dyn Error>> {
    write_rows(writer, &projection.years)
}

pub fn write_exit_points_csv<W: Write>(writer: W, projection: &ProjectionResult) -> Result<(), Box<dyn Error>> {
    write_rows(writer, &projection.exit_points)
}

/// Write all three tables into `dir`, returning the paths written
pub fn export_to_dir(
    dir: &Path,
    schedule: &AmortizationSchedule,
    projection: &ProjectionResult,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;

    let amortization_path = dir.join(AMORTIZATION_FILE);
    write_amortization_csv(File::create(&amortization_path)?, schedule)?;

    let projection_path = dir.join(PROJECTION_FILE);
    write_projection_csv(File::create(&projection_path)?, projection)?;

    let exit_path = dir.join(EXIT_POINTS_FILE);
    write_exit_points_csv(File::create(&exit_path)?, projection)?;

    log::info!("Exported simulation tables to {}", dir.display());
    Ok(vec![amortization_path, projection_path, exit_path])
}
