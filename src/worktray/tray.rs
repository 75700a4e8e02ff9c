use std::path::{Path, PathBuf};

use getset::Getters;
use log::debug;

use super::row::TrayRow;
use super::StageError;
use crate::data::{self, InputRecord, TrayRecord, TRAY_COLUMNS};

/// The worktray: every transaction of the run together with its validation
/// and submission state. Loaded wholesale, mutated in memory by the passes,
/// rewritten wholesale on save. There is no append-only journal; crash
/// recovery is re-running against the last saved state.
#[derive(Debug, Getters)]
pub struct Worktray {
    #[getset(get = "pub")]
    path: PathBuf,
    #[getset(get = "pub")]
    rows: Vec<TrayRow>,
}

impl Worktray {
    pub fn load(path: &Path) -> Result<Worktray, StageError> {
        let mut reader = data::open_reader(path)?;

        let mut rows = Vec::new();
        for record in reader.deserialize::<TrayRecord>() {
            rows.push(TrayRow::try_from(record?)?);
        }
        debug!("loaded {} rows from {}", rows.len(), path.display());

        Ok(Worktray {
            path: path.to_path_buf(),
            rows,
        })
    }

    /// Rewrites the whole file, header included, even when there are no
    /// rows yet.
    pub fn save(&self) -> Result<(), StageError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;

        writer.write_record(TRAY_COLUMNS)?;
        for row in &self.rows {
            writer.serialize(TrayRecord::from(row))?;
        }
        writer.flush()?;

        Ok(())
    }

    pub fn append_pending(&mut self, record: &InputRecord) {
        self.rows.push(TrayRow::from(record));
    }

    pub fn rows_mut(&mut self) -> &mut [TrayRow] {
        &mut self.rows
    }
}
