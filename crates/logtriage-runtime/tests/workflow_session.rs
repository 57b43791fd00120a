use std::sync::Arc;

use chrono::FixedOffset;
use logtriage_runtime::{
    GitlabClient, Outcome, Prompt, Stage, Turn, Workflow, WorkflowOptions,
};
use logtriage_testing::fixtures::{java_error_record, python_error_record, traceless_record};
use logtriage_testing::{CannedBackend, ScriptedAssistant};
use serde_json::Value;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options() -> WorkflowOptions {
    WorkflowOptions {
        top_n: 5,
        max_extract_attempts: 5,
        reference_tz: FixedOffset::east_opt(3600).unwrap(),
        package_marker: "de.carsync.".to_string(),
        fallback_branch: "master".to_string(),
        site: "datadoghq.eu".to_string(),
    }
}

fn workflow(assistant: ScriptedAssistant, records: Vec<Value>) -> Workflow {
    Workflow::new(
        Arc::new(CannedBackend::new(records)),
        Arc::new(assistant),
        None,
        options(),
    )
}

fn mixed_records() -> Vec<Value> {
    let mut records = Vec::new();
    for _ in 0..6 {
        records.push(java_error_record("NPE", "Foo.java", "svc"));
    }
    for _ in 0..3 {
        records.push(java_error_record("Timeout", "Bar.java", "svc"));
    }
    for i in 0..11 {
        records.push(traceless_record(&format!("noise-{}", i)));
    }
    records
}

#[tokio::test]
async fn full_session_with_review_and_analysis() {
    let assistant = ScriptedAssistant::new()
        .with_criteria("svc", "error", 24, "live")
        .with_analysis("Title: NPE in Foo\nlooks like a null check is missing");
    let workflow = workflow(assistant, mixed_records());

    let turn = workflow.start("errors in svc, prod, last day").await.unwrap();
    let (state, prompt) = match turn {
        Turn::Suspended { state, prompt } => (state, prompt),
        other => panic!("expected review suspension, got {:?}", other),
    };
    assert_eq!(state.stage, Stage::ReviewSelection);
    assert_eq!(state.ranked.len(), 2);
    assert_eq!(state.ranked[0].occurrence_count, 6);
    assert_eq!(state.ranked[1].occurrence_count, 3);
    match &prompt {
        Prompt::SelectRecord(listing) => assert!(listing.contains("1. [6x] NPE")),
        other => panic!("expected selection prompt, got {:?}", other),
    }
    // Environment synonym was normalized before querying.
    assert_eq!(
        state.criteria.as_ref().unwrap().environment,
        "prod"
    );

    let turn = workflow.resume(state, "1").await.unwrap();
    match turn {
        Turn::Finished { state, outcome } => {
            assert_eq!(state.stage, Stage::Done);
            assert_eq!(state.selected.as_ref().unwrap().message.as_deref(), Some("NPE"));
            assert_eq!(state.summary.as_deref(), Some("canned summary"));
            match outcome {
                Outcome::Report {
                    analysis,
                    issue_filed,
                } => {
                    assert!(analysis.contains("null check"));
                    assert!(!issue_filed);
                }
                other => panic!("expected report, got {:?}", other),
            }
        }
        other => panic!("expected finish, got {:?}", other),
    }
}

#[tokio::test]
async fn invalid_selection_resuspends_without_corrupting_transcript() {
    let assistant = ScriptedAssistant::new().with_criteria("svc", "error", 24, "prod");
    let workflow = workflow(assistant, mixed_records());

    let turn = workflow.start("errors in svc").await.unwrap();
    let state = match turn {
        Turn::Suspended { state, .. } => state,
        other => panic!("expected suspension, got {:?}", other),
    };
    let transcript_before = state.messages.clone();

    let turn = workflow.resume(state, "99").await.unwrap();
    let (state, prompt) = match turn {
        Turn::Suspended { state, prompt } => (state, prompt),
        other => panic!("expected re-suspension, got {:?}", other),
    };
    assert_eq!(state.stage, Stage::ReviewSelection);
    assert_eq!(state.messages, transcript_before);
    match prompt {
        Prompt::SelectRecord(text) => assert!(text.contains("out of range")),
        other => panic!("expected selection prompt, got {:?}", other),
    }

    // Non-numeric input behaves the same.
    let turn = workflow.resume(state, "pick the first one").await.unwrap();
    match turn {
        Turn::Suspended { state, .. } => assert_eq!(state.messages, transcript_before),
        other => panic!("expected re-suspension, got {:?}", other),
    }
}

#[tokio::test]
async fn clarification_loop_appends_input_and_retries() {
    let assistant = ScriptedAssistant::new()
        .with_extract_reply("Which environment do you mean?")
        .with_criteria("svc", "error", 24, "prod");
    let workflow = workflow(assistant, mixed_records());

    let turn = workflow.start("errors in svc").await.unwrap();
    let (state, prompt) = match turn {
        Turn::Suspended { state, prompt } => (state, prompt),
        other => panic!("expected clarify suspension, got {:?}", other),
    };
    assert_eq!(state.stage, Stage::AwaitClarification);
    assert_eq!(state.extract_attempts, 1);
    match prompt {
        Prompt::Clarify(question) => assert!(question.contains("environment")),
        other => panic!("expected clarify prompt, got {:?}", other),
    }

    let turn = workflow.resume(state, "prod please").await.unwrap();
    match turn {
        Turn::Suspended { state, .. } => {
            assert_eq!(state.stage, Stage::ReviewSelection);
            assert!(
                state
                    .messages
                    .iter()
                    .any(|m| m.content == "prod please")
            );
        }
        other => panic!("expected review suspension, got {:?}", other),
    }
}

#[tokio::test]
async fn extraction_attempts_are_capped() {
    let assistant = ScriptedAssistant::new(); // never yields parseable criteria
    let workflow = Workflow::new(
        Arc::new(CannedBackend::empty()),
        Arc::new(assistant),
        None,
        WorkflowOptions {
            max_extract_attempts: 2,
            ..options()
        },
    );

    let turn = workflow.start("vague request").await.unwrap();
    let state = match turn {
        Turn::Suspended { state, .. } => state,
        other => panic!("expected clarify suspension, got {:?}", other),
    };

    let turn = workflow.resume(state, "still vague").await.unwrap();
    match turn {
        Turn::Finished { state, outcome } => {
            assert_eq!(state.stage, Stage::GaveUp);
            assert_eq!(outcome, Outcome::GaveUp);
        }
        other => panic!("expected give-up, got {:?}", other),
    }
}

#[tokio::test]
async fn zero_matches_finishes_empty() {
    let assistant = ScriptedAssistant::new().with_criteria("svc", "error", 24, "prod");
    let workflow = workflow(assistant, Vec::new());

    let turn = workflow.start("errors in svc").await.unwrap();
    match turn {
        Turn::Finished { state, outcome } => {
            assert_eq!(state.stage, Stage::DoneEmpty);
            assert_eq!(outcome, Outcome::Empty);
        }
        other => panic!("expected empty finish, got {:?}", other),
    }
}

#[tokio::test]
async fn traceless_only_input_also_finishes_empty() {
    let assistant = ScriptedAssistant::new().with_criteria("svc", "error", 24, "prod");
    let records = (0..4).map(|i| traceless_record(&format!("n-{}", i))).collect();
    let workflow = workflow(assistant, records);

    let turn = workflow.start("errors in svc").await.unwrap();
    assert!(matches!(
        turn,
        Turn::Finished {
            outcome: Outcome::Empty,
            ..
        }
    ));
}

#[tokio::test]
async fn single_match_skips_review() {
    let assistant = ScriptedAssistant::new().with_criteria("svc", "error", 24, "prod");
    let records = vec![python_error_record("boom", "ValueError: boom", "svc")];
    let workflow = workflow(assistant, records);

    let turn = workflow.start("errors in svc").await.unwrap();
    match turn {
        Turn::Finished { state, outcome } => {
            assert_eq!(state.selected.as_ref().unwrap().message.as_deref(), Some("boom"));
            assert!(matches!(outcome, Outcome::Report { .. }));
        }
        other => panic!("expected direct finish, got {:?}", other),
    }
}

#[tokio::test]
async fn confirmed_issue_is_filed_against_resolved_project() {
    let server = MockServer::start().await;
    // Any raw-file probe succeeds; the issue POST expects 201.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("class Foo {}"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let gitlab =
        GitlabClient::new(server.uri(), "token".to_string(), "master".to_string()).unwrap();
    let assistant = ScriptedAssistant::new()
        .with_criteria("svc", "error", 24, "prod")
        .with_analysis("Title: NPE in Foo\nfix the null check");
    let records = vec![java_error_record("NPE", "Foo.java", "svc")];
    let workflow = Workflow::new(
        Arc::new(CannedBackend::new(records)),
        Arc::new(assistant),
        Some(Arc::new(gitlab)),
        options(),
    );

    let turn = workflow.start("errors in svc").await.unwrap();
    let (state, prompt) = match turn {
        Turn::Suspended { state, prompt } => (state, prompt),
        other => panic!("expected issue confirmation, got {:?}", other),
    };
    assert_eq!(state.stage, Stage::ConfirmIssue);
    assert!(!state.code.is_empty());
    assert!(
        !state.selected.as_ref().unwrap().code_urls.is_empty(),
        "selected record should carry resolved code urls"
    );
    match prompt {
        Prompt::ConfirmIssue(text) => assert!(text.contains("[auto-triage] NPE in Foo")),
        other => panic!("expected confirm prompt, got {:?}", other),
    }

    let turn = workflow.resume(state, "y").await.unwrap();
    match turn {
        Turn::Finished { outcome, .. } => match outcome {
            Outcome::Report { issue_filed, .. } => assert!(issue_filed),
            other => panic!("expected report, got {:?}", other),
        },
        other => panic!("expected finish, got {:?}", other),
    }
}

#[tokio::test]
async fn declined_issue_still_reports() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("class Foo {}"))
        .mount(&server)
        .await;

    let gitlab =
        GitlabClient::new(server.uri(), "token".to_string(), "master".to_string()).unwrap();
    let assistant = ScriptedAssistant::new().with_criteria("svc", "error", 24, "prod");
    let records = vec![java_error_record("NPE", "Foo.java", "svc")];
    let workflow = Workflow::new(
        Arc::new(CannedBackend::new(records)),
        Arc::new(assistant),
        Some(Arc::new(gitlab)),
        options(),
    );

    let turn = workflow.start("errors in svc").await.unwrap();
    let state = match turn {
        Turn::Suspended { state, .. } => state,
        other => panic!("expected issue confirmation, got {:?}", other),
    };

    let turn = workflow.resume(state, "n").await.unwrap();
    match turn {
        Turn::Finished { outcome, .. } => match outcome {
            Outcome::Report { issue_filed, .. } => assert!(!issue_filed),
            other => panic!("expected report, got {:?}", other),
        },
        other => panic!("expected finish, got {:?}", other),
    }
}
