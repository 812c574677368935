//! Instruction template for parameter extraction and the canonical wing sentence.

use super::llm::{ChatMessage, ChatRequest};
use super::params::WingParameters;

/// System instruction for the extraction call.
///
/// Asks for a JSON object, with the canonical sentence as the fallback
/// format. [`parse_wing_parameters`](super::parse_wing_parameters) reads both.
pub const EXTRACTION_TEMPLATE: &str = r#"You will receive the mission specification and requirements for an aircraft.
Choose the wing for that aircraft. Only four parameters can vary:
- NACA airfoil (4 digit series only)
- aspect ratio
- taper ratio
- sweep angle, in degrees

Respond with a single JSON object and nothing else, for example:
{"naca": "2412", "aspect_ratio": 8, "taper_ratio": 0.45, "sweep_angle": 25}

If you cannot produce JSON, respond with exactly one sentence of this form:
generate a CAD model of a wing using the NACA(4 digit NACA series) airfoil, with an aspect ratio of X, a taper ratio of X, and a sweep angle of X

General guidelines for decision making:
- highly manoeuvrable aircraft, like fighter jets, have a very low aspect ratio (1), a very low taper ratio (0.1) and a high sweep angle.
- gliders have a very high aspect ratio and a high taper ratio.
- commercial aircraft have a high taper ratio, a moderate aspect ratio and a moderate sweep angle.
- do not choose the span; it follows from the aspect ratio.

Do not include anything else in your response."#;

/// Sampling temperature for the extraction call.
pub const EXTRACTION_TEMPERATURE: f64 = 0.0;

/// System + user messages for one extraction round trip.
#[must_use]
pub fn extraction_request(mission: &str) -> ChatRequest {
    ChatRequest {
        messages: vec![ChatMessage::system(EXTRACTION_TEMPLATE), ChatMessage::user(mission.trim())],
        temperature: Some(EXTRACTION_TEMPERATURE),
        ..Default::default()
    }
}

/// The one-line description of a wing, in the sentence form the template names.
#[must_use]
pub fn describe_wing(params: &WingParameters) -> String {
    format!(
        "generate a CAD model of a wing using the NACA{} airfoil, with an aspect ratio of {}, a taper ratio of {}, and a sweep angle of {}",
        params.naca, params.aspect_ratio, params.taper_ratio, params.sweep_deg
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::llm::ChatRole;

    #[test]
    fn test_extraction_request_layout() {
        let request = extraction_request("  long range airliner \n");
        assert!(request.model.is_empty());
        assert_eq!(request.temperature, Some(EXTRACTION_TEMPERATURE));
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages[0].content, EXTRACTION_TEMPLATE);
        assert_eq!(request.messages[1].role, ChatRole::User);
        assert_eq!(request.messages[1].content, "long range airliner");
    }

    #[test]
    fn test_template_mentions_every_parameter() {
        for key in ["\"naca\"", "\"aspect_ratio\"", "\"taper_ratio\"", "\"sweep_angle\""] {
            assert!(EXTRACTION_TEMPLATE.contains(key), "missing {key}");
        }
    }

    #[test]
    fn test_describe_wing_sentence() {
        let params = WingParameters {
            naca: "2412".parse().unwrap(),
            aspect_ratio: 8.0,
            taper_ratio: 0.45,
            sweep_deg: 25.0,
        };
        assert_eq!(
            describe_wing(&params),
            "generate a CAD model of a wing using the NACA2412 airfoil, with an aspect ratio of 8, a taper ratio of 0.45, and a sweep angle of 25"
        );
    }
}
