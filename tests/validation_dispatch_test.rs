//! Precondition validation must gate every remote call: a missing
//! parameter is reported by name and the fleet manager is never invoked.

mod mocks;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use fleet_dispatch::config::{CoordinatorConfig, DispatchParameters};
use fleet_dispatch::constants::params;
use fleet_dispatch::dispatch::CancellationHandle;
use fleet_dispatch::orchestration::ReleaseCoordinator;
use fleet_dispatch::CoordinatorError;
use mocks::{
    complete_parameters, complete_params, RecordingFleetManager, ScriptedLogSink, ScriptedStep,
};
use tokio_test::assert_ok;

fn coordinator_with(fleet: Arc<RecordingFleetManager>) -> ReleaseCoordinator {
    ReleaseCoordinator::new(
        fleet,
        Arc::new(ScriptedLogSink::never_terminal()),
        CoordinatorConfig::default(),
    )
}

#[tokio::test]
async fn missing_parameter_names_key_and_blocks_release() {
    for missing in params::REQUIRED {
        let fleet = Arc::new(RecordingFleetManager::new("cmd-1"));
        let coordinator = coordinator_with(Arc::clone(&fleet));

        let mut input = complete_params();
        input.remove(missing);

        let build = ScriptedStep::succeeding(None);
        let build_executions = build.execution_counter();

        let err = coordinator
            .run_release(
                &input,
                Arc::new(build),
                Arc::new(ScriptedStep::succeeding(None)),
                &CancellationHandle::new(),
            )
            .await
            .unwrap_err();
        match err {
            CoordinatorError::MissingParameter { key } => assert_eq!(key, missing),
            other => panic!("expected MissingParameter, got {other:?}"),
        }
        // validation precedes every step and every remote call
        assert_eq!(build_executions.load(Ordering::SeqCst), 0);
        assert_eq!(
            fleet.submission_count(),
            0,
            "no submission may happen when {missing} is absent"
        );
    }
}

#[tokio::test]
async fn empty_parameter_blocks_release() {
    let fleet = Arc::new(RecordingFleetManager::new("cmd-1"));
    let coordinator = coordinator_with(Arc::clone(&fleet));

    let mut input = complete_params();
    input.insert(params::TARGET_ID.to_string(), String::new());

    let err = coordinator
        .run_release(
            &input,
            Arc::new(ScriptedStep::succeeding(None)),
            Arc::new(ScriptedStep::succeeding(None)),
            &CancellationHandle::new(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "missing_parameter");
    assert_eq!(fleet.submission_count(), 0);
}

#[tokio::test]
async fn valid_parameters_dispatch_exactly_once() {
    let fleet = Arc::new(RecordingFleetManager::new("cmd-accepted-42"));
    let coordinator = coordinator_with(Arc::clone(&fleet));

    let result = assert_ok!(coordinator.dispatch_only(&complete_parameters()).await);
    assert_eq!(result.command_id, "cmd-accepted-42");

    let submissions = fleet.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].target_id, "node-7");
    assert_eq!(submissions[0].log_sink, "deploy-log");
    assert_eq!(submissions[0].region, "eu-central-1");
}

#[tokio::test]
async fn padded_parameters_reach_the_wire_trimmed() {
    let fleet = Arc::new(RecordingFleetManager::new("cmd-1"));
    let coordinator = coordinator_with(Arc::clone(&fleet));

    let mut input = complete_params();
    input.insert(params::TARGET_ID.to_string(), "  node-7 ".to_string());
    input.insert(params::LOG_SINK.to_string(), "deploy-log\n".to_string());

    let parameters = DispatchParameters::from_map(&input).unwrap();
    assert_ok!(coordinator.dispatch_only(&parameters).await);

    let submissions = fleet.submissions();
    assert_eq!(submissions[0].target_id, "node-7");
    assert_eq!(submissions[0].log_sink, "deploy-log");
}

#[tokio::test]
async fn submission_failure_surfaces_without_retry() {
    let fleet = Arc::new(RecordingFleetManager::failing());
    let coordinator = coordinator_with(Arc::clone(&fleet));

    let err = coordinator
        .dispatch_only(&complete_parameters())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "submission_error");
    assert!(err.to_string().contains("node-7"));
    // exactly one attempt: the coordinator never retries submissions
    assert_eq!(fleet.submission_count(), 1);
}
