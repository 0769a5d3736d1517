//! JSON report: the rendered [`ChartData`], pretty-printed

use crate::chart::ChartData;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, data: &ChartData) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, data)?;
    writeln!(writer)
}
