use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{Error, Result, planner::RoutePlan, point::Coord};

pub const VISITS_HEADER: &str = "id,x,y,group,order";

/// Buffered writer to `path`, or stdout when `None`.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                Error::other(format!(
                    "failed to create output file {}: {e}",
                    path.display()
                ))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout().lock()))),
    }
}

/// One CSV row per input point, in input order.
pub fn write_visits<W: Write>(out: &mut W, plan: &RoutePlan) -> Result<()> {
    writeln!(out, "{VISITS_HEADER}")?;
    for visit in plan.visits() {
        writeln!(
            out,
            "{},{},{},{}",
            visit.point.id,
            visit.point.coord(),
            visit.group,
            visit.order
        )?;
    }
    out.flush()?;
    Ok(())
}

/// One `group,LINESTRING (...)` row per group that has a path.
pub fn write_routes<W: Write>(out: &mut W, plan: &RoutePlan) -> Result<()> {
    for route in plan.routes() {
        let Some(path) = route.path() else {
            continue;
        };
        writeln!(out, "{},{}", route.group(), linestring_wkt(path))?;
    }
    out.flush()?;
    Ok(())
}

pub fn linestring_wkt(path: &[Coord]) -> String {
    let mut b1 = ryu::Buffer::new();
    let mut b2 = ryu::Buffer::new();
    let vertices: Vec<String> = path
        .iter()
        .map(|c| format!("{} {}", b1.format(c.x), b2.format(c.y)))
        .collect();
    format!("LINESTRING ({})", vertices.join(", "))
}
