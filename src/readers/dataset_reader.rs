use csv::{ReaderBuilder, Trim};
use memmap2::Mmap;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::{StationDataset, StationMetadata};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use crate::utils::coordinates::parse_coordinate;

/// Reads one station CSV file: a `#`-prefixed metadata header block
/// followed by a regular CSV body.
///
/// A missing file, an unreadable body or a header block without a
/// `station_id` aborts the run; the input set is small and manually
/// curated, so silent skipping would hide mistakes.
pub struct DatasetReader {
    use_mmap: bool,
}

impl DatasetReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    /// Load a station file into a dataset
    pub fn read_dataset(&self, path: &Path) -> Result<StationDataset> {
        if self.use_mmap {
            self.read_dataset_mmap(path)
        } else {
            self.read_dataset_buffered(path)
        }
    }

    fn read_dataset_buffered(&self, path: &Path) -> Result<StationDataset> {
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        self.parse_content(&content, path)
    }

    /// Memory-mapped path for large station files
    fn read_dataset_mmap(&self, path: &Path) -> Result<StationDataset> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let content = std::str::from_utf8(&mmap)
            .map_err(|e| ProcessingError::InvalidFormat(format!("Invalid UTF-8: {}", e)))?;

        self.parse_content(content, path)
    }

    fn parse_content(&self, content: &str, path: &Path) -> Result<StationDataset> {
        let (header_block, body) = split_header_block(content);
        let metadata = self.parse_metadata(&header_block, path)?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(body.as_bytes());

        let headers = reader.headers()?.clone();
        if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
            return Err(ProcessingError::InvalidFormat(format!(
                "{}: no column header row after metadata block",
                path.display()
            )));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record);
        }

        Ok(StationDataset::new(metadata, headers, rows))
    }

    /// Parse the `# key: value` lines into station metadata
    fn parse_metadata(&self, header_lines: &[String], path: &Path) -> Result<StationMetadata> {
        let mut fields: HashMap<String, String> = HashMap::new();

        for line in header_lines {
            let stripped = line.trim_start().trim_start_matches('#').trim();
            if stripped.is_empty() {
                continue;
            }
            // Values may contain ':' (DMS coordinates), so split on the first one
            let (key, value) = stripped.split_once(':').ok_or_else(|| {
                ProcessingError::InvalidFormat(format!(
                    "{}: malformed metadata line '{}'",
                    path.display(),
                    line
                ))
            })?;
            fields.insert(key.trim().to_lowercase(), value.trim().to_string());
        }

        let station_id = fields.remove("station_id").ok_or_else(|| {
            ProcessingError::MissingData(format!(
                "{}: metadata header has no station_id",
                path.display()
            ))
        })?;

        let name = fields
            .remove("station")
            .or_else(|| fields.remove("name"))
            .unwrap_or_else(|| station_id.clone());

        let network = fields.remove("network");

        let latitude = fields
            .get("latitude")
            .map(|v| parse_coordinate(v))
            .transpose()?;
        let longitude = fields
            .get("longitude")
            .map(|v| parse_coordinate(v))
            .transpose()?;

        let elevation_m = fields
            .get("elevation_m")
            .or_else(|| fields.get("elevation"))
            .map(|v| {
                v.parse::<f64>().map_err(|_| {
                    ProcessingError::InvalidFormat(format!("Invalid elevation: '{}'", v))
                })
            })
            .transpose()?;

        let metadata =
            StationMetadata::new(station_id, name, network, latitude, longitude, elevation_m);
        metadata.validate()?;

        Ok(metadata)
    }
}

impl Default for DatasetReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Split file content into the leading `#` header block and the CSV body.
/// Blank lines between the two are tolerated.
fn split_header_block(content: &str) -> (Vec<String>, &str) {
    let mut header_lines = Vec::new();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            header_lines.push(trimmed.to_string());
            offset += line.len();
        } else if trimmed.is_empty() && offset + line.len() < content.len() {
            offset += line.len();
        } else {
            break;
        }
    }

    (header_lines, &content[offset..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SURFRAD_FILE: &str = "\
# station: Bondville
# station_id: BON
# network: SURFRAD
# latitude: 40.05
# longitude: -88.37
# elevation_m: 230
timestamp,t_m,pw_hpa,ghi_m,ghi_c,dlw_m,clr_pct
2022-07-01 17:00:00,298.4,21.3,845.2,910.6,391.2,0.82
2022-07-01 17:01:00,298.5,21.4,850.0,911.0,391.8,0.81
";

    #[test]
    fn test_read_surfrad_file() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        write!(temp_file, "{}", SURFRAD_FILE)?;

        let reader = DatasetReader::new();
        let dataset = reader.read_dataset(temp_file.path())?;

        assert_eq!(dataset.metadata.station_id, "BON");
        assert_eq!(dataset.metadata.name, "Bondville");
        assert_eq!(dataset.metadata.network.as_deref(), Some("SURFRAD"));
        assert_eq!(dataset.metadata.latitude, Some(40.05));
        assert_eq!(dataset.metadata.elevation_m, Some(230.0));
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.column_index("dlw_m"), Some(5));
        assert_eq!(&dataset.rows[0][1], "298.4");

        Ok(())
    }

    #[test]
    fn test_read_with_mmap_matches_buffered() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        write!(temp_file, "{}", SURFRAD_FILE)?;

        let buffered = DatasetReader::new().read_dataset(temp_file.path())?;
        let mapped = DatasetReader::with_mmap(true).read_dataset(temp_file.path())?;

        assert_eq!(buffered.metadata.station_id, mapped.metadata.station_id);
        assert_eq!(buffered.row_count(), mapped.row_count());
        assert_eq!(buffered.headers, mapped.headers);

        Ok(())
    }

    #[test]
    fn test_dms_coordinates_in_header() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "# station_id: 014HI")?;
        writeln!(temp_file, "# network: HI-GROUND")?;
        writeln!(temp_file, "# latitude: 21:18:00")?;
        writeln!(temp_file, "# longitude: -157:51:00")?;
        writeln!(temp_file, "# elevation_m: 5")?;
        writeln!(temp_file, "timestamp,temp,dlw")?;
        writeln!(temp_file, "2022-07-01 17:00:00,25.1,410.2")?;

        let dataset = DatasetReader::new().read_dataset(temp_file.path())?;
        assert!((dataset.metadata.latitude.unwrap() - 21.3).abs() < 1e-6);
        assert!((dataset.metadata.longitude.unwrap() - -157.85).abs() < 1e-6);

        Ok(())
    }

    #[test]
    fn test_missing_station_id_fails() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "# station: Somewhere")?;
        writeln!(temp_file, "timestamp,temp")?;
        writeln!(temp_file, "2022-07-01 17:00:00,25.1")?;

        let result = DatasetReader::new().read_dataset(temp_file.path());
        assert!(matches!(result, Err(ProcessingError::MissingData(_))));

        Ok(())
    }

    #[test]
    fn test_missing_file_fails() {
        let result = DatasetReader::new().read_dataset(Path::new("no/such/station.csv"));
        assert!(matches!(result, Err(ProcessingError::Io(_))));
    }

    #[test]
    fn test_split_header_block() {
        let (header, body) = split_header_block("# a: 1\n# b: 2\n\ncol1,col2\n1,2\n");
        assert_eq!(header.len(), 2);
        assert!(body.starts_with("col1,col2"));
    }
}
