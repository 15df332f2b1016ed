use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use csv::Writer;
use serde::Serialize;

use crate::domain::{CANONICAL_COLUMNS, PLACE_COLUMNS};

use super::PipelineOutput;

/// Spreadsheet applications need the byte-order mark to detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Serialize)]
pub struct ExportedArtifacts {
    pub extracted: PathBuf,
    pub refined: PathBuf,
    pub registry: PathBuf,
}

/// Keeps letters, digits, `-` and `_`; anything else is dropped.
pub fn sanitize_base_name(base_name: Option<&str>, default_base_name: &str) -> String {
    let cleaned: String = base_name
        .unwrap_or_default()
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    match cleaned.is_empty() {
        true => default_base_name.to_string(),
        false => cleaned,
    }
}

pub fn write_csv<W: Write>(mut writer: W, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    writer.write_all(UTF8_BOM)?;

    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(headers)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;

    Ok(())
}

pub fn csv_bytes(headers: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut buffer = vec![];
    write_csv(&mut buffer, headers, rows)?;
    Ok(buffer)
}

pub fn registry_csv(output: &PipelineOutput) -> Result<Vec<u8>> {
    let rows: Vec<Vec<String>> = output.records.iter().map(|r| r.row(output.layout)).collect();
    csv_bytes(&output.layout.headers(), &rows)
}

fn write_file(path: &Path, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, headers, rows)?;
    log::info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Writes raw candidates, canonical names and final registry rows as three
/// CSV files under `output_dir`.
pub fn export_artifacts(
    output_dir: &Path,
    base_name: &str,
    output: &PipelineOutput,
) -> Result<ExportedArtifacts> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let artifacts = ExportedArtifacts {
        extracted: output_dir.join(format!("{}_extracted.csv", base_name)),
        refined: output_dir.join(format!("{}_refined.csv", base_name)),
        registry: output_dir.join(format!("{}_registry.csv", base_name)),
    };

    let candidate_rows: Vec<Vec<String>> = output.candidates.iter().map(|c| c.row()).collect();
    write_file(&artifacts.extracted, &PLACE_COLUMNS, &candidate_rows)?;

    let name_rows: Vec<Vec<String>> = output.canonical_names.iter().map(|c| c.row()).collect();
    write_file(&artifacts.refined, &CANONICAL_COLUMNS, &name_rows)?;

    let record_rows: Vec<Vec<String>> = output.records.iter().map(|r| r.row(output.layout)).collect();
    write_file(&artifacts.registry, &output.layout.headers(), &record_rows)?;

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::{csv_bytes, sanitize_base_name, UTF8_BOM};

    #[test]
    fn csv_starts_with_bom_and_headers() {
        let bytes = csv_bytes(
            &["searchedPhoneNumber", "name"],
            &[vec!["021234567".to_string(), "한빛, 상사".to_string()]],
        )
        .unwrap();

        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text, "searchedPhoneNumber,name\n021234567,\"한빛, 상사\"\n");
    }

    #[test]
    fn base_name_is_sanitized() {
        assert_eq!(sanitize_base_name(Some("../고객 목록"), "extracted_data"), "고객목록");
        assert_eq!(sanitize_base_name(Some("batch-01_a"), "extracted_data"), "batch-01_a");
        assert_eq!(sanitize_base_name(Some(" /.. "), "extracted_data"), "extracted_data");
        assert_eq!(sanitize_base_name(None, "extracted_data"), "extracted_data");
    }
}
