//! Two-stage wing design: mission text → [`WingParameters`] → [`WingSolid`].
//!
//! Stage one is a single chat-completion round trip whose reply is parsed
//! into typed parameters. Stage two is offline: the parameters select a
//! section and planform, the wing is lofted and the mesh is written to the
//! output directory.

use std::path::PathBuf;

use thiserror::Error;
use time::OffsetDateTime;

use crate::airfoil::{AirfoilError, NacaProfile};
use crate::config::{ConfigError, PipelineConfig};
use crate::export::{self, ExportError, Provenance};
use crate::mission::{
    ChatClient, ChatResponse, LlmError, MissionError, WingParameters, check_mission, describe_wing,
    extraction_request, parse_wing_parameters,
};
use crate::wing::{WingError, WingOptions, WingSolid, build_wing};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("model request failed: {0}")]
    Llm(#[from] LlmError),
    #[error("parameter extraction failed: {0}")]
    Mission(#[from] MissionError),
    #[error("airfoil selection failed: {0}")]
    Airfoil(#[from] AirfoilError),
    #[error("wing construction failed: {0}")]
    Wing(#[from] WingError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct WingDesign {
    pub parameters: WingParameters,
    /// Canonical sentence for `parameters`.
    pub description: String,
    /// `None` for offline builds.
    pub reply: Option<ChatResponse>,
    pub solid: WingSolid,
    /// Files written, in `PipelineConfig::formats` order.
    pub files: Vec<PathBuf>,
}

/// Wing options for `params` under `config`.
pub fn wing_options(params: &WingParameters, config: &PipelineConfig) -> Result<WingOptions, AirfoilError> {
    let profile = if config.use_extracted_airfoil {
        params.naca.profile()?
    } else {
        NacaProfile::default()
    };
    Ok(WingOptions {
        stations: config.stations,
        root_chord: config.root_chord,
        taper_ratio: params.taper_ratio,
        aspect_ratio: params.aspect_ratio,
        profile,
    })
}

/// Stage two: build and materialize a wing from known parameters.
///
/// Failures are logged at `error` and returned unchanged.
pub fn build_design(
    params: WingParameters,
    reply: Option<ChatResponse>,
    config: &PipelineConfig,
) -> Result<WingDesign, PipelineError> {
    build_design_inner(params, reply, config).inspect_err(|err| log::error!("wing build failed: {err}"))
}

fn build_design_inner(
    params: WingParameters,
    reply: Option<ChatResponse>,
    config: &PipelineConfig,
) -> Result<WingDesign, PipelineError> {
    params.validate()?;
    if params.sweep_deg != 0.0 {
        log::warn!(
            "sweep angle {} deg is recorded but not applied to the geometry",
            params.sweep_deg
        );
    }

    let options = wing_options(&params, config)?;
    log::debug!(
        "building NACA {} wing: aspect_ratio={} taper_ratio={} stations={}",
        params.naca,
        options.aspect_ratio,
        options.taper_ratio,
        options.stations
    );
    let solid = build_wing(&options)?;

    let description = describe_wing(&params);
    let files = if config.formats.is_empty() {
        Vec::new()
    } else {
        let provenance = Provenance {
            description: Some(description.clone()),
            parameters: Some(params),
            model: reply.as_ref().map(|r| r.model.clone()),
            reply: reply.as_ref().map(|r| r.content.clone()),
        };
        let stem = export::timestamp_stem(OffsetDateTime::now_utc())?;
        export::export_mesh(&config.output_dir, &stem, &solid.mesh, &provenance, &config.formats)?
    };

    Ok(WingDesign {
        parameters: params,
        description,
        reply,
        solid,
        files,
    })
}

pub struct WingPipeline<C> {
    client: C,
    config: PipelineConfig,
}

impl<C: ChatClient> WingPipeline<C> {
    pub fn new(client: C, config: PipelineConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stage one: a single extraction round trip.
    pub fn extract_parameters(&self, mission: &str) -> Result<(WingParameters, ChatResponse), PipelineError> {
        let result = self.extract_inner(mission);
        if let Err(err) = &result {
            log::error!("parameter extraction failed: {err}");
        }
        result
    }

    fn extract_inner(&self, mission: &str) -> Result<(WingParameters, ChatResponse), PipelineError> {
        let mission = check_mission(mission)?;
        let response = self.client.complete(extraction_request(mission))?;
        log::debug!(
            "model {} replied ({} chars, finish_reason={:?})",
            response.model,
            response.content.len(),
            response.finish_reason
        );
        let params = parse_wing_parameters(&response.content)?;
        Ok((params, response))
    }

    /// Both stages end to end.
    pub fn run(&self, mission: &str) -> Result<WingDesign, PipelineError> {
        let (params, response) = self.extract_parameters(mission)?;
        build_design(params, Some(response), &self.config)
    }
}
