use std::fmt;

pub const OUTPUT_HEADER: &str = "ID,Address,Latitude,Longitude";

/// One parsed line of the input file.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRow {
    /// 0-based position among the non-blank lines of the file
    pub row_index: usize,
    pub id: i64,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
}

/// A row of the output file. Coordinates are either both present or both absent.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub id: i64,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl OutputRow {
    pub fn from_lookup(row: InputRow, result: Option<GeocodeResult>) -> Self {
        Self {
            id: row.id,
            address: row.address,
            latitude: result.map(|r| r.latitude),
            longitude: result.map(|r| r.longitude),
        }
    }

    pub fn is_geocoded(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

impl fmt::Display for OutputRow {
    /// `id,"address",lat,lon`, or `id,"address",,` when the lookup failed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => write!(f, "{},\"{}\",{},{}", self.id, self.address, lat, lon),
            _ => write!(f, "{},\"{}\",,", self.id, self.address),
        }
    }
}

/// Output of the transform stage.
#[derive(Debug, Clone)]
pub struct GeocodeReport {
    pub rows: Vec<OutputRow>,
    pub csv_output: String,
    pub geocoded: usize,
    pub failed: usize,
}

impl GeocodeReport {
    pub fn from_rows(rows: Vec<OutputRow>) -> Self {
        let geocoded = rows.iter().filter(|row| row.is_geocoded()).count();
        let failed = rows.len() - geocoded;

        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(OUTPUT_HEADER.to_string());
        lines.extend(rows.iter().map(OutputRow::to_string));

        Self {
            csv_output: lines.join("\n"),
            rows,
            geocoded,
            failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output_path: String,
    pub rows_written: usize,
    pub geocoded: usize,
    pub failed: usize,
}
