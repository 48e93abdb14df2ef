use std::io::Write;

use hhsim::Trajectory;

/// Column names, in the field order of [`hhsim::Record`].
const COLUMNS: [&str; 9] = ["t", "v", "m", "h", "n", "i_na", "i_k", "i_l", "i_stim"];

/// Writes `trajectory` as CSV with a header row.
///
/// The header is written even when there are no records. Floats are written
/// with enough digits to parse back to the same value.
pub(crate) fn write_csv<W: Write>(trajectory: &Trajectory, writer: W) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(COLUMNS)?;
    for record in trajectory {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
