/// BGC-Argo+ float profile ingest
///
/// Reads a JSON export of one float file (platform metadata plus its
/// profiles) and assembles the documents stored by the service: one
/// metadata document per float and one data document per profile. Each
/// profile position is cleaned by the `CoordinateNormalizer` and classified
/// by the `BasinResolver` on the way through.
///
/// Fleet monitoring: https://fleetmonitoring.euro-argo.eu/
/// OceanOPS:         https://www.ocean-ops.org/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::basin::{BasinGrid, BasinResolution, BasinResolver};
use crate::geolocation::CoordinateNormalizer;
use crate::logging::{self, Component};
use crate::model::ProfileError;

const FLEETMONITORING_URL: &str = "https://fleetmonitoring.euro-argo.eu/float/";
const OCEANOPS_URL: &str = "https://www.ocean-ops.org/board/wa/Platform?ref=";

/// Suffix of the adjusted, real-time-or-delayed parameter variables.
const ADJUSTED_SUFFIX: &str = "_ADJUSTED_RO";

/// Downstream consumers require the pressure axis under exactly this name.
pub const PRESSURE_AXIS: &str = "pressure";

// ============================================================================
// Float file export
// ============================================================================

/// One float file, as exported from NetCDF.
#[derive(Debug, Clone, Deserialize)]
pub struct FloatFile {
    pub platform_number: String,
    pub data_centre: String,
    /// Comma-separated principal investigator names.
    pub pi_name: String,
    pub platform_type: String,
    pub positioning_system: String,
    pub wmo_inst_type: String,
    pub profiles: Vec<RawProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawProfile {
    pub cycle_number: i32,
    /// "A" ascending, "D" descending.
    pub direction: String,
    /// `null` in the export means the value was NaN in the source.
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// Julian day of the profile, already converted to RFC 3339.
    pub juld: Option<String>,
    #[serde(default)]
    pub position_qc: String,
    #[serde(default)]
    pub juld_qc: String,
    pub parameters: Vec<RawParameter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawParameter {
    /// Bare parameter name, e.g. "PRES" or "DOXY". May be blank.
    pub name: String,
    pub units: String,
    pub data_mode: String,
    pub values: Vec<Option<f64>>,
}

// ============================================================================
// Stored documents
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub data_type: String,
    pub data_center: String,
    pub instrument: String,
    pub pi_name: Vec<String>,
    pub platform: String,
    pub platform_type: String,
    pub positioning_system: String,
    pub wmo_inst_type: String,
    pub fleetmonitoring: String,
    pub oceanops: String,
}

/// GeoJSON point, `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { kind: "Point".to_string(), coordinates: [longitude, latitude] }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceInfo {
    pub source: Vec<String>,
    pub doi: String,
}

/// `[variable names, ["units", "mode"], [[unit, mode], ...]]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataInfo(pub Vec<String>, pub Vec<String>, pub Vec<[String; 2]>);

impl DataInfo {
    fn empty() -> Self {
        DataInfo(Vec::new(), vec!["units".to_string(), "mode".to_string()], Vec::new())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub geolocation: GeoPoint,
    pub basin: i32,
    pub timestamp: Option<DateTime<Utc>>,
    pub date_updated_argovis: DateTime<Utc>,
    pub source: Vec<SourceInfo>,
    pub data_info: DataInfo,
    pub cycle_number: i32,
    pub geolocation_argoqc: i32,
    pub profile_direction: String,
    pub timestamp_argoqc: i32,
    pub metadata: Vec<String>,
    pub data: Vec<Vec<Option<f64>>>,
}

// ============================================================================
// Reading
// ============================================================================

pub fn parse_float_file(json: &str) -> Result<FloatFile, ProfileError> {
    serde_json::from_str(json).map_err(|e| ProfileError::Parse(e.to_string()))
}

pub fn read_float_file<P: AsRef<Path>>(path: P) -> Result<FloatFile, ProfileError> {
    let text = std::fs::read_to_string(path).map_err(ProfileError::Io)?;
    parse_float_file(&text)
}

// ============================================================================
// Assembly helpers
// ============================================================================

/// `{platform}_{cycle:03}`, with a trailing `D` for descending profiles.
pub fn profile_id(platform: &str, cycle_number: i32, direction: &str) -> String {
    let id = format!("{}_{:03}", platform.trim(), cycle_number);
    if direction.trim() == "D" { format!("{}D", id) } else { id }
}

/// QC flags are single-character strings; anything unparseable is -1.
pub fn parse_qc_flag(flag: &str) -> i32 {
    flag.trim().parse().unwrap_or(-1)
}

fn parse_timestamp(juld: Option<&str>) -> Option<DateTime<Utc>> {
    juld.and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Build the per-float metadata document.
pub fn metadata_document(file: &FloatFile) -> MetadataDocument {
    let platform = file.platform_number.trim().to_string();
    MetadataDocument {
        id: format!("{}_m0", platform),
        data_type: "expertQC_oceanicProfile".to_string(),
        data_center: file.data_centre.trim().to_string(),
        instrument: "profiling_float".to_string(),
        pi_name: file.pi_name.split(',').map(|s| s.trim().to_string()).collect(),
        platform_type: file.platform_type.trim().to_string(),
        positioning_system: file.positioning_system.trim().to_string(),
        wmo_inst_type: file.wmo_inst_type.trim().to_string(),
        fleetmonitoring: format!("{}{}", FLEETMONITORING_URL, platform),
        oceanops: format!("{}{}", OCEANOPS_URL, platform),
        platform,
    }
}

// ============================================================================
// Assembler
// ============================================================================

/// Turns raw profiles into stored documents.
pub struct ProfileAssembler<'a, G: BasinGrid + ?Sized> {
    normalizer: &'a CoordinateNormalizer,
    resolver: BasinResolver<'a, G>,
    suppress_warnings: bool,
}

impl<'a, G: BasinGrid + ?Sized> ProfileAssembler<'a, G> {
    pub fn new(normalizer: &'a CoordinateNormalizer, grid: &'a G, suppress_warnings: bool) -> Self {
        Self { normalizer, resolver: BasinResolver::new(grid), suppress_warnings }
    }

    /// Assemble one profile document.
    ///
    /// `now` becomes `date_updated_argovis`. Fails only when the profile
    /// has no pressure axis; position problems degrade to sentinel values.
    pub fn assemble(
        &self,
        file: &FloatFile,
        profile: &RawProfile,
        metadata_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ProfileDocument, ProfileError> {
        let id = profile_id(&file.platform_number, profile.cycle_number, &profile.direction);

        let (coordinate, warning) = self.normalizer.normalize(
            profile.longitude.unwrap_or(f64::NAN),
            profile.latitude.unwrap_or(f64::NAN),
        );
        if let Some(warning) = warning {
            if !self.suppress_warnings {
                logging::warn(Component::Geolocation, Some(&id), &warning.to_string());
            }
        }

        let resolution = self.resolver.resolve_detailed(coordinate);
        match &resolution {
            BasinResolution::NoValidBasin if !self.suppress_warnings => logging::warn(
                Component::Basin,
                Some(&id),
                "all surrounding basin grid points are NaN",
            ),
            BasinResolution::Nearest { tag, distance_miles, .. } => logging::debug(
                Component::Basin,
                Some(&id),
                &format!("land cell, using basin {} {:.1} miles away", tag, distance_miles),
            ),
            _ => {}
        }

        let mut data_info = DataInfo::empty();
        let mut data = Vec::new();
        for parameter in &profile.parameters {
            let name = parameter.name.trim();
            if name.is_empty() {
                continue; // blank entries in PARAMETER
            }
            let variable = format!("{}{}", name, ADJUSTED_SUFFIX);
            let column = if variable == "PRES_ADJUSTED_RO" { PRESSURE_AXIS.to_string() } else { variable };

            data.push(parameter.values.clone());
            data_info.0.push(column);
            data_info.2.push([parameter.units.clone(), parameter.data_mode.trim().to_string()]);
        }

        if !data_info.names().iter().any(|n| n == PRESSURE_AXIS) {
            return Err(ProfileError::MissingPressureAxis { id });
        }

        Ok(ProfileDocument {
            geolocation: GeoPoint::new(coordinate.longitude, coordinate.latitude),
            basin: resolution.tag(),
            timestamp: parse_timestamp(profile.juld.as_deref()),
            date_updated_argovis: now,
            source: vec![SourceInfo { source: vec!["bgcargo+".to_string()], doi: "tbd".to_string() }],
            data_info,
            cycle_number: profile.cycle_number,
            geolocation_argoqc: parse_qc_flag(&profile.position_qc),
            profile_direction: profile.direction.clone(),
            timestamp_argoqc: parse_qc_flag(&profile.juld_qc),
            metadata: vec![metadata_id.to_string()],
            data,
            id,
        })
    }

    /// Assemble every profile in a float file.
    ///
    /// Rejected profiles are logged and returned alongside the documents
    /// so one bad cycle does not stop the rest of the file.
    pub fn assemble_file(&self, file: &FloatFile, now: DateTime<Utc>) -> AssembledFile {
        let metadata = metadata_document(file);
        let mut documents = Vec::with_capacity(file.profiles.len());
        let mut rejected = Vec::new();

        for profile in &file.profiles {
            match self.assemble(file, profile, &metadata.id, now) {
                Ok(doc) => documents.push(doc),
                Err(e) => {
                    logging::error(Component::Ingest, e.record_id(), &format!("{}, skipping", e));
                    rejected.push(e);
                }
            }
        }

        AssembledFile { metadata, documents, rejected }
    }
}

/// Output of assembling one float file.
#[derive(Debug)]
pub struct AssembledFile {
    pub metadata: MetadataDocument,
    pub documents: Vec<ProfileDocument>,
    pub rejected: Vec<ProfileError>,
}

// ============================================================================
// Tests
// ============================================================================
