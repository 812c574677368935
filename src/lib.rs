#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Wing design from a mission description.
//!
//! A chat-completion model reduces free text to four [`WingParameters`]; the
//! crate then samples a NACA 4-digit section, lofts a straight tapered wing
//! between root and tip loops and writes the resulting mesh to disk. The
//! model contributes numbers only, geometry comes from [`airfoil`] and
//! [`wing`].
//!
//! ```no_run
//! use wingloft::{ClientConfig, OpenAiChatClient, PipelineConfig, WingPipeline};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiChatClient::new(ClientConfig::from_env()?)?;
//! let pipeline = WingPipeline::new(client, PipelineConfig::default());
//! let design = pipeline.run("a long-endurance surveillance glider")?;
//! println!("{} -> {:?}", design.description, design.files);
//! # Ok(())
//! # }
//! ```

pub mod airfoil;
pub mod config;
pub mod export;
pub mod geom;
pub mod mission;
pub mod pipeline;
pub mod wing;

pub use airfoil::{AirfoilError, EdgePoints, NacaCode, NacaProfile, TrailingEdge, generate_airfoil_edge_points};
pub use config::{ClientConfig, ConfigError, PipelineConfig};
pub use export::{ExportError, ExportFormat};
pub use mission::{
    ChatClient, ChatResponse, LlmError, MissionError, OpenAiChatClient, WingParameters, parse_wing_parameters,
};
pub use pipeline::{PipelineError, WingDesign, WingPipeline, build_design};
pub use wing::{WingError, WingOptions, WingSolid, build_airfoil_wing, build_wing};
