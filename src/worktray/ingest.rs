use std::fs;

use log::{error, info};

use super::tray::Worktray;
use super::StageError;
use crate::config::Config;
use crate::data::{self, InputRecord, INPUT_COLUMNS};

/// Outcome of the input pre-check, one field per rule. Unexpected I/O
/// failures are stage errors, not check failures.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InputCheck {
    pub exists: bool,
    pub format_matches: bool,
    pub has_rows: bool,
}

impl InputCheck {
    pub fn passed(&self) -> bool {
        self.exists && self.format_matches && self.has_rows
    }

    pub fn failure_summary(&self) -> String {
        let mut reasons = Vec::new();
        if !self.exists {
            reasons.push("- the input file does not exist");
        }
        if !self.format_matches {
            reasons.push("- the input file does not follow the template format");
        }
        if !self.has_rows {
            reasons.push("- the input file has no rows of data");
        }

        format!(
            "The operation has been cancelled for the following reasons:\n{}",
            reasons.join("\n")
        )
    }
}

/// Checks the raw input file: it must exist, match the input template's
/// column list exactly, and carry at least one data row. A missing file
/// short-circuits the remaining checks.
pub fn check_input(config: &Config) -> Result<InputCheck, StageError> {
    let mut check = InputCheck::default();

    let input_path = config.input_path();
    if !input_path.exists() {
        error!("input file {} does not exist", input_path.display());
        return Ok(check);
    }
    check.exists = true;

    let template_columns = data::read_headers(&config.input_template_path())?;
    let input_columns = data::read_headers(&input_path)?;
    check.format_matches = template_columns == input_columns;
    if !check.format_matches {
        error!("input file does not follow the template format");
    }

    let mut reader = data::open_reader(&input_path)?;
    check.has_rows = reader.records().next().transpose()?.is_some();
    if !check.has_rows {
        error!("input file has no rows of data");
    }

    Ok(check)
}

/// Builds the worktray: copies the tray template into the process
/// directory, then stages one pending row per input record. Returns the
/// input records; callers use them only for the row count.
pub fn create_worktray(config: &Config) -> Result<Vec<InputRecord>, StageError> {
    fs::create_dir_all(&config.process_dir)?;

    let tray_path = config.worktray_path();
    fs::copy(config.worktray_template_path(), &tray_path)?;
    info!("worktray template copied to {}", tray_path.display());

    let input_path = config.input_path();
    let headers = data::read_headers(&input_path)?;
    let missing: Vec<&str> = INPUT_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(StageError::InputFormat(missing.join(", ")));
    }

    let records = data::read_input(&input_path)?;

    let mut tray = Worktray::load(&tray_path)?;
    for record in &records {
        tray.append_pending(record);
    }
    tray.save()?;
    info!(
        "worktray staged with {} pending rows at {}",
        records.len(),
        tray_path.display()
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::worktray::row::Flag;

    fn test_config(root: &Path) -> Config {
        Config {
            input_dir: root.join("input"),
            process_dir: root.join("process_data"),
            ..Config::default()
        }
    }

    fn write_file(config: &Config, name: &str, content: &str) {
        fs::create_dir_all(&config.input_dir).expect("input dir");
        fs::write(config.input_dir.join(name), content).expect("write file");
    }

    const INPUT_HEADER: &str = "Name,Product,Amount,RequestDate\n";
    const TRAY_HEADER: &str =
        "Name,Product,Amount,RequestDate,DataValid,FormSubmitted,Observations\n";

    #[test]
    fn check_reports_missing_input() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = test_config(dir.path());

        let check = check_input(&config)?;
        assert_eq!(
            check,
            InputCheck {
                exists: false,
                format_matches: false,
                has_rows: false,
            }
        );
        assert!(!check.passed());
        assert!(check.failure_summary().contains("does not exist"));

        Ok(())
    }

    #[test]
    fn check_reports_format_mismatch() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = test_config(dir.path());
        write_file(&config, &config.input_template, INPUT_HEADER);
        write_file(
            &config,
            &config.input_file,
            "Name,Product,Amount\nAna,Loan,10\n",
        );

        let check = check_input(&config)?;
        assert!(check.exists);
        assert!(!check.format_matches);
        assert!(check.has_rows);
        assert!(!check.passed());

        Ok(())
    }

    #[test]
    fn check_reports_empty_input() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = test_config(dir.path());
        write_file(&config, &config.input_template, INPUT_HEADER);
        write_file(&config, &config.input_file, INPUT_HEADER);

        let check = check_input(&config)?;
        assert!(check.exists);
        assert!(check.format_matches);
        assert!(!check.has_rows);

        Ok(())
    }

    #[test]
    fn check_passes_well_formed_input() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = test_config(dir.path());
        write_file(&config, &config.input_template, INPUT_HEADER);
        write_file(
            &config,
            &config.input_file,
            "Name,Product,Amount,RequestDate\nAna,Loan,10,2024-01-02\n",
        );

        assert!(check_input(&config)?.passed());

        Ok(())
    }

    #[test]
    fn create_stages_pending_rows() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = test_config(dir.path());
        write_file(&config, &config.worktray_template, TRAY_HEADER);
        write_file(
            &config,
            &config.input_file,
            "Name,Product,Amount,RequestDate\n\
             José Pérez,Loan,1000,2024-03-15\n\
             Ana,Card,25.50,2024-04-01\n",
        );

        let records = create_worktray(&config)?;
        assert_eq!(records.len(), 2);

        let tray = Worktray::load(&config.worktray_path())?;
        assert_eq!(tray.rows().len(), 2);
        for row in tray.rows() {
            assert_eq!(row.data_valid, Flag::Pending);
            assert_eq!(row.form_submitted, Flag::Pending);
            assert_eq!(row.observations, "");
        }

        Ok(())
    }

    #[test]
    fn create_rejects_missing_columns() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = test_config(dir.path());
        write_file(&config, &config.worktray_template, TRAY_HEADER);
        write_file(&config, &config.input_file, "Name,Product\nAna,Loan\n");

        match create_worktray(&config) {
            Err(StageError::InputFormat(missing)) => {
                assert_eq!(missing, "Amount, RequestDate");
            },
            other => anyhow::bail!("expected an input format error, got {other:?}"),
        }

        Ok(())
    }
}
