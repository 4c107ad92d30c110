//! Parameter vocabularies per data type and pipeline version.
//!
//! Every data type exposes a fixed set of named QA parameters. A plot may
//! only reference parameters from the vocabulary of its data type; anything
//! else is a validation failure raised before numeric work starts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QaError, Result};
use crate::record::DataType;

/// Declared value type of a parameter, used for histogram bin labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Integer-valued; bin labels truncate bounds.
    Int,
    /// Float-valued; bin labels keep two decimals.
    Float,
}

/// Static description of one QA parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamInfo {
    /// Lowercase wire name, as stored in record parameter maps.
    pub name: &'static str,
    /// Uppercase display label, as shown on axes and CSV headers.
    pub label: &'static str,
    /// Declared value type.
    pub kind: ParamKind,
}

const fn int(name: &'static str, label: &'static str) -> ParamInfo {
    ParamInfo {
        name,
        label,
        kind: ParamKind::Int,
    }
}

const fn float(name: &'static str, label: &'static str) -> ParamInfo {
    ParamInfo {
        name,
        label,
        kind: ParamKind::Float,
    }
}

const BIAS_PARAMS: &[ParamInfo] = &[
    int("clipmed", "CLIPMED"),
    float("clipstd", "CLIPSTD"),
    int("clipmin", "CLIPMIN"),
    int("clipmax", "CLIPMAX"),
];

const DARK_PARAMS: &[ParamInfo] = &[
    int("clipmed", "CLIPMED"),
    float("clipstd", "CLIPSTD"),
    int("clipmin", "CLIPMIN"),
    int("clipmax", "CLIPMAX"),
    float("uniform", "UNIFORM"),
    int("nhotpix", "NHOTPIX"),
];

const FLAT_PARAMS: &[ParamInfo] = &[
    int("clipmed", "CLIPMED"),
    float("clipstd", "CLIPSTD"),
    int("clipmin", "CLIPMIN"),
    int("clipmax", "CLIPMAX"),
    float("edgevar", "EDGEVAR"),
    float("sigmean", "SIGMEAN"),
];

const SCIENCE_PARAMS: &[ParamInfo] = &[
    float("awincrmn", "AWINCRMN"),
    float("astrometric_offset", "ASTROMETRIC_OFFSET"),
    float("ellipmn", "ELLIPMN"),
    float("ellipticity", "ELLIPTICITY"),
    float("ezp_auto", "EZP_AUTO"),
    float("rotang1", "ROTANG1"),
    float("rsep_p95", "RSEP_P95"),
    float("rsep_q2", "RSEP_Q2"),
    float("rsep_rms", "RSEP_RMS"),
    float("seeing", "SEEING"),
    float("skysig", "SKYSIG"),
    float("skyval", "SKYVAL"),
    int("stdnumb", "STDNUMB"),
    float("ul5_5", "UL5_5"),
    int("unmatch", "UNMATCH"),
    float("zp_auto", "ZP_AUTO"),
];

/// Pipeline generation selector. Participates in snapshot keys and
/// vocabulary lookup; both generations currently share the same tables.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PipelineVersion {
    /// First-generation reduction pipeline.
    #[default]
    V1,
    /// Reworked reduction pipeline.
    V2,
}

impl fmt::Display for PipelineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PipelineVersion::V1 => "v1",
            PipelineVersion::V2 => "v2",
        })
    }
}

/// Vocabulary for a data type under a pipeline version.
pub fn parameters_for(data_type: DataType, _version: PipelineVersion) -> &'static [ParamInfo] {
    match data_type {
        DataType::Bias => BIAS_PARAMS,
        DataType::Dark => DARK_PARAMS,
        DataType::Flat => FLAT_PARAMS,
        DataType::Science => SCIENCE_PARAMS,
    }
}

/// Look up a parameter by wire name.
pub fn lookup(
    data_type: DataType,
    version: PipelineVersion,
    name: &str,
) -> Option<&'static ParamInfo> {
    parameters_for(data_type, version)
        .iter()
        .find(|p| p.name == name)
}

/// Validate a parameter name against the vocabulary, reporting an
/// [`QaError::UnknownParameter`] when it does not exist.
pub fn validate(
    data_type: DataType,
    version: PipelineVersion,
    name: &str,
) -> Result<&'static ParamInfo> {
    lookup(data_type, version, name).ok_or_else(|| QaError::UnknownParameter {
        data_type,
        version,
        parameter: name.to_string(),
    })
}
