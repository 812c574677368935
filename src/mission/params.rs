//! Typed wing parameters and the parser for model replies.
//!
//! Replies are read as a JSON object first (`{"naca": "2412", ...}`, code
//! fences and surrounding prose tolerated). Replies without a usable object
//! fall back to the canonical sentence:
//!
//! ```text
//! generate a CAD model of a wing using the NACA2412 airfoil, with an aspect
//! ratio of 8, a taper ratio of 0.45, and a sweep angle of 25
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::airfoil::NacaCode;

const NUMBER: &str = r"([-+]?\d+(?:\.\d+)?)";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MissionError {
    #[error("mission description is empty")]
    EmptyMission,
    #[error("model reply is empty")]
    EmptyReply,
    #[error("model reply is missing the {0} parameter")]
    MissingParameter(&'static str),
    #[error("{name} value {raw:?} is not a number")]
    MalformedParameter { name: &'static str, raw: String },
    #[error("{name} = {value} is out of range")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("invalid NACA 4-digit code {0:?}")]
    InvalidNacaCode(String),
    #[error("reply pattern failed to compile: {0}")]
    Pattern(String),
}

impl From<regex::Error> for MissionError {
    fn from(err: regex::Error) -> Self {
        Self::Pattern(err.to_string())
    }
}

/// The four values the extraction stage produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WingParameters {
    pub naca: NacaCode,
    pub aspect_ratio: f64,
    pub taper_ratio: f64,
    /// Leading-edge sweep in degrees.
    #[serde(rename = "sweep_angle", alias = "sweep_deg")]
    pub sweep_deg: f64,
}

impl WingParameters {
    /// Aspect and taper ratio must be positive; sweep must lie in (-90, 90) degrees.
    pub fn validate(&self) -> Result<(), MissionError> {
        for (name, value) in [("aspect_ratio", self.aspect_ratio), ("taper_ratio", self.taper_ratio)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MissionError::InvalidParameter { name, value });
            }
        }
        if !self.sweep_deg.is_finite() || self.sweep_deg.abs() >= 90.0 {
            return Err(MissionError::InvalidParameter {
                name: "sweep_angle",
                value: self.sweep_deg,
            });
        }
        Ok(())
    }
}

/// Reject blank mission text; returns the trimmed description.
pub fn check_mission(mission: &str) -> Result<&str, MissionError> {
    let trimmed = mission.trim();
    if trimmed.is_empty() {
        Err(MissionError::EmptyMission)
    } else {
        Ok(trimmed)
    }
}

/// Parse a model reply into validated [`WingParameters`].
pub fn parse_wing_parameters(reply: &str) -> Result<WingParameters, MissionError> {
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(MissionError::EmptyReply);
    }

    let params = match json_object(reply) {
        Some(object) => from_json(&object)?,
        None => from_sentence(reply)?,
    };
    params.validate()?;
    Ok(params)
}

/// First parseable `{...}` span in the reply.
fn json_object(reply: &str) -> Option<Map<String, Value>> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&reply[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key)).filter(|v| !v.is_null())
}

fn from_json(object: &Map<String, Value>) -> Result<WingParameters, MissionError> {
    let naca = match lookup(object, &["naca", "naca_code", "airfoil"]) {
        Some(Value::String(code)) => parse_naca(code)?,
        Some(Value::Number(n)) => match n.as_u64() {
            Some(code) if code <= 9999 => parse_naca(&format!("{code:04}"))?,
            _ => return Err(MissionError::InvalidNacaCode(n.to_string())),
        },
        Some(other) => return Err(MissionError::InvalidNacaCode(other.to_string())),
        None => return Err(MissionError::MissingParameter("naca")),
    };

    Ok(WingParameters {
        naca,
        aspect_ratio: json_number(object, "aspect_ratio", &["aspect_ratio", "aspectRatio"])?,
        taper_ratio: json_number(object, "taper_ratio", &["taper_ratio", "taperRatio"])?,
        sweep_deg: json_number(object, "sweep_angle", &["sweep_angle", "sweep_deg", "sweep", "sweepAngle"])?,
    })
}

fn json_number(object: &Map<String, Value>, name: &'static str, keys: &[&str]) -> Result<f64, MissionError> {
    match lookup(object, keys) {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| MissionError::MalformedParameter {
            name,
            raw: n.to_string(),
        }),
        Some(Value::String(raw)) => parse_number(name, raw),
        Some(other) => Err(MissionError::MalformedParameter {
            name,
            raw: other.to_string(),
        }),
        None => Err(MissionError::MissingParameter(name)),
    }
}

fn parse_number(name: &'static str, raw: &str) -> Result<f64, MissionError> {
    let cleaned = raw
        .trim()
        .trim_end_matches("degrees")
        .trim_end_matches("deg")
        .trim_end_matches('°')
        .trim();
    cleaned.parse::<f64>().map_err(|_| MissionError::MalformedParameter {
        name,
        raw: raw.to_string(),
    })
}

fn parse_naca(raw: &str) -> Result<NacaCode, MissionError> {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '(' | ')' | '-')).collect();
    cleaned
        .parse()
        .map_err(|_| MissionError::InvalidNacaCode(raw.to_string()))
}

fn from_sentence(reply: &str) -> Result<WingParameters, MissionError> {
    let naca_re = Regex::new(r"(?i)NACA\s*\(?\s*(\d+)")?;
    let naca = naca_re
        .captures(reply)
        .and_then(|c| c.get(1))
        .ok_or(MissionError::MissingParameter("naca"))?;

    Ok(WingParameters {
        naca: parse_naca(naca.as_str())?,
        aspect_ratio: sentence_number(reply, "aspect_ratio", r"aspect\s+ratio")?,
        taper_ratio: sentence_number(reply, "taper_ratio", r"taper\s+ratio")?,
        sweep_deg: sentence_number(reply, "sweep_angle", r"sweep(?:\s+angle)?")?,
    })
}

fn sentence_number(reply: &str, name: &'static str, label: &str) -> Result<f64, MissionError> {
    let re = Regex::new(&format!(r"(?i){label}\s*(?:of|=|:|is)?\s*{NUMBER}"))?;
    let raw = re
        .captures(reply)
        .and_then(|c| c.get(1))
        .ok_or(MissionError::MissingParameter(name))?;
    parse_number(name, raw.as_str())
}
