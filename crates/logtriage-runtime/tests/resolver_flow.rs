use logtriage_runtime::{GitlabClient, Resolver};
use logtriage_types::{CodeCoordinate, LogRecord};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record(appname: &str, trace: &str) -> LogRecord {
    LogRecord {
        appname: Some(appname.to_string()),
        branch: Some("master".to_string()),
        stack_trace: Some(trace.to_string()),
        ..Default::default()
    }
}

fn client(server: &MockServer) -> GitlabClient {
    GitlabClient::new(server.uri(), "token".to_string(), "master".to_string()).unwrap()
}

const TRACE: &str = "boom\n\tat de.app.Foo.bar(Foo.java:3)";
const SVC_PATH: &str = "/projects/svc/repository/files/de%2Fapp%2FFoo.java/raw";
const ECO_PATH: &str = "/projects/eco%2Fsvc/repository/files/de%2Fapp%2FFoo.java/raw";

#[tokio::test]
async fn literal_project_wins_when_it_exists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SVC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("class Foo {}"))
        .expect(1)
        .mount(&server)
        .await;

    let gitlab = client(&server);
    let resolved = Resolver::new(&gitlab, "master")
        .resolve(&record("svc", TRACE), None)
        .await;

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].coordinate.project, "svc");
    assert_eq!(resolved[0].coordinate.file_path, "de/app/Foo.java");
    assert_eq!(resolved[0].content, "class Foo {}");
}

#[tokio::test]
async fn falls_back_to_eco_namespace_on_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SVC_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ECO_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("class Foo {}"))
        .expect(1)
        .mount(&server)
        .await;

    let gitlab = client(&server);
    let resolved = Resolver::new(&gitlab, "master")
        .resolve(&record("svc", TRACE), None)
        .await;

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].coordinate.project, "eco/svc");
}

#[tokio::test]
async fn both_candidates_missing_yields_empty_not_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let gitlab = client(&server);
    let resolved = Resolver::new(&gitlab, "master")
        .resolve(&record("svc", TRACE), None)
        .await;
    assert!(resolved.is_empty());
}

#[tokio::test]
async fn access_denied_skips_candidate_and_continues() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SVC_PATH))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ECO_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let gitlab = client(&server);
    let resolved = Resolver::new(&gitlab, "master")
        .resolve(&record("svc", TRACE), None)
        .await;
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].coordinate.project, "eco/svc");
}

#[tokio::test]
async fn record_without_appname_resolves_nothing() {
    let server = MockServer::start().await;
    let gitlab = client(&server);

    let mut rec = record("svc", TRACE);
    rec.appname = None;
    let resolved = Resolver::new(&gitlab, "master").resolve(&rec, None).await;
    assert!(resolved.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn explicit_hint_goes_through_normalization() {
    let server = MockServer::start().await;
    // Dotted class-style path with >= 4 segments: slashes plus the
    // multi-module source-root prefix (4th token is the module).
    let expected = "/projects/fleet/repository/files/core%2Fsrc%2Fmain%2Fjava%2Fde%2Fcarsync%2Ffleet%2Fcore%2Flistener%2FVehicleEventListener.java/raw";
    Mock::given(method("GET"))
        .and(path(expected))
        .respond_with(ResponseTemplate::new(200).set_body_string("class VehicleEventListener {}"))
        .expect(1)
        .mount(&server)
        .await;

    let gitlab = client(&server);
    let hint = CodeCoordinate::new(
        "fleet",
        "de.carsync.fleet.core.listener.VehicleEventListener.java",
        "master",
    );
    let resolved = Resolver::new(&gitlab, "master")
        .resolve(&LogRecord::default(), Some(&hint))
        .await;

    assert_eq!(resolved.len(), 1);
    assert_eq!(
        resolved[0].coordinate.file_path,
        "core/src/main/java/de/carsync/fleet/core/listener/VehicleEventListener.java"
    );
}
