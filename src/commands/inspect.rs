use std::io::{self, Write};

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::InspectArgs;
use crate::model::Table;
use crate::table::{load_table, status_counts};

pub fn run(args: InspectArgs) -> Result<()> {
    let table = load_table(&args.input)?;
    info!(input = %args.input.display(), rows = table.len(), "inspect requested");

    let mut output = io::BufWriter::new(io::stdout().lock());
    write_preview(&mut output, &table, args.rows)?;

    match status_counts(&table, &args.status_column) {
        Some(counts) => {
            writeln!(output, "Statuses:")?;
            for (status, count) in counts {
                writeln!(output, "\t{status}: {count}")?;
            }
        }
        None => warn!(column = %args.status_column, "status column missing"),
    }

    output.flush()?;
    Ok(())
}

fn write_preview<W: Write>(output: &mut W, table: &Table, rows: usize) -> Result<()> {
    writeln!(output, "Columns: {}", table.headers.join(", "))?;
    writeln!(output, "Rows: {}", table.len())?;

    for (index, row) in table.rows.iter().take(rows).enumerate() {
        writeln!(output, "[{index}]")?;
        for (header, cell) in table.headers.iter().zip(row) {
            writeln!(output, "\t{header}: {cell}")?;
        }
    }
    Ok(())
}
