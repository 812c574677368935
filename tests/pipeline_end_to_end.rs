use std::fs;

use mockito::{Matcher, Server};
use regex::Regex;
use serde_json::json;
use wingloft::{
    ClientConfig, ExportFormat, LlmError, MissionError, OpenAiChatClient, PipelineConfig, PipelineError, WingPipeline,
};

fn completion(content: &str) -> String {
    json!({
        "model": "gpt-4-0125-preview",
        "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
    })
    .to_string()
}

fn client_for(server: &Server) -> OpenAiChatClient {
    let mut config = ClientConfig::new("sk-integration");
    config.base_url = server.url();
    OpenAiChatClient::new(config).expect("client builds")
}

#[test]
fn mission_to_obj_file_through_http_client() {
    let mut server = Server::new();
    let reply = "generate a CAD model of a wing using the NACA(2412) airfoil, with an aspect ratio of 8,\n\
                 a taper ratio of 0.45, and a sweep angle of 25";
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-integration")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""role":"user","content":"a regional airliner""#.to_string()),
            Matcher::PartialJson(json!({"temperature": 0.0})),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion(reply))
        .create();

    let tmp = tempfile::tempdir().expect("tempdir");
    let out_dir = tmp.path().join("generated");
    let config = PipelineConfig {
        output_dir: out_dir.clone(),
        stations: 60,
        formats: vec![ExportFormat::Obj, ExportFormat::Json],
        ..Default::default()
    };

    let pipeline = WingPipeline::new(client_for(&server), config);
    let design = pipeline.run("a regional airliner").expect("pipeline run");
    mock.assert();

    assert_eq!(design.parameters.naca.to_string(), "2412");
    assert_eq!(design.parameters.aspect_ratio, 8.0);
    assert_eq!(design.solid.span, 8.0);
    assert!(design.solid.mesh_diagnostics.is_valid_solid());

    let stamp = Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{6}\.(obj|json)$").expect("pattern");
    assert_eq!(design.files.len(), 2);
    for path in &design.files {
        assert_eq!(path.parent(), Some(out_dir.as_path()));
        let name = path.file_name().and_then(|n| n.to_str()).expect("utf-8 name");
        assert!(stamp.is_match(name), "unexpected file name {name}");
    }

    let obj = fs::read_to_string(&design.files[0]).expect("obj readable");
    let mut lines = obj.lines();
    assert!(lines.next().expect("generator line").starts_with("# wingloft"));
    assert!(obj.contains("# parameters: naca=2412 aspect_ratio=8 taper_ratio=0.45 sweep_angle=25"));
    assert!(obj.contains("#   a taper ratio of 0.45, and a sweep angle of 25"));
    let vertex_lines = obj.lines().filter(|l| l.starts_with("v ")).count();
    let face_lines = obj.lines().filter(|l| l.starts_with("f ")).count();
    assert_eq!(vertex_lines, design.solid.mesh.vertex_count());
    assert_eq!(face_lines, design.solid.mesh.triangle_count());

    let shape: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&design.files[1]).expect("json readable")).expect("json parses");
    assert_eq!(
        shape["triangles"].as_array().map(Vec::len),
        Some(design.solid.mesh.indices.len())
    );
}

#[test]
fn incomplete_reply_surfaces_missing_parameter_and_writes_nothing() {
    let mut server = Server::new();
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion(r#"{"naca": "0012", "aspect_ratio": 1, "sweep_angle": 45}"#))
        .create();

    let tmp = tempfile::tempdir().expect("tempdir");
    let out_dir = tmp.path().join("generated");
    let pipeline = WingPipeline::new(
        client_for(&server),
        PipelineConfig {
            output_dir: out_dir.clone(),
            ..Default::default()
        },
    );

    let err = pipeline.run("an agile fighter").expect_err("taper ratio missing");
    assert!(matches!(
        err,
        PipelineError::Mission(MissionError::MissingParameter("taper_ratio"))
    ));
    assert!(!out_dir.exists());
}

#[test]
fn authentication_failure_is_reported_as_llm_error() {
    let mut server = Server::new();
    server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "Incorrect API key provided"}}"#)
        .create();

    let pipeline = WingPipeline::new(client_for(&server), PipelineConfig::default());
    assert!(matches!(
        pipeline.extract_parameters("a glider"),
        Err(PipelineError::Llm(LlmError::AuthenticationError(_)))
    ));
}
