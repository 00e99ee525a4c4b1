//! The `reputation-node` command surface over a file-backed world state.

use clap::Parser;
use reputation_contract::cli::{self, Args};
use reputation_contract::ContractConfig;
use serde_json::{json, Value};
use std::path::Path;

fn config(state: &Path) -> ContractConfig {
    let mut config = ContractConfig::default();
    config.state.path = state.to_path_buf();
    config.penalty.enabled = false;
    config
}

async fn run(config: &ContractConfig, tx_id: &str, argv: &[&str]) -> anyhow::Result<Value> {
    let args = Args::parse_from(std::iter::once("reputation-node").chain(argv.iter().copied()));
    let runner = cli::build_runner(config)?;
    cli::execute(&runner, config, tx_id.to_string(), args.command).await
}

fn b64(value: Value) -> String {
    reputation_contract::args::encode_payload(&value).unwrap()
}

#[tokio::test]
async fn test_bed_evaluation_persists_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir.path().join("state.json"));

    let created = run(&config, "tx-1", &["create-service", "--id", "hotel-1"])
        .await
        .unwrap();
    assert_eq!(created["txId"], "tx-1");
    assert_eq!(created["result"]["serviceId"], "hotel-1");
    assert_eq!(created["dispatch"], "not_requested");

    let items = b64(json!([{"code": "BE003", "quantity": 1}]));
    let rules = b64(json!([{"type": "discount", "discountPercent": 15}]));
    run(
        &config,
        "tx-2",
        &[
            "add-agreement",
            "--service",
            "hotel-1",
            "--agreement",
            "beds",
            "--category",
            "bed",
            "--has-penalty-rule",
            "--items",
            &items,
            "--penalty-rules",
            &rules,
        ],
    )
    .await
    .unwrap();

    let evidence = b64(json!([
        {"code": "BE002", "quantity": 1},
        {"code": "BE002", "quantity": 1}
    ]));
    let verdict = run(
        &config,
        "tx-3",
        &[
            "evaluate-sla",
            "--service",
            "hotel-1",
            "--agreement",
            "beds",
            "--evaluation",
            "eval-1",
            "--data",
            &evidence,
            "--at",
            "2021-03-01T12:00:00.000Z",
        ],
    )
    .await
    .unwrap();
    assert_eq!(verdict["result"]["satisfied"], false);
    assert_eq!(verdict["result"]["penaltyRule"]["discountPercent"], 15.0);

    // A fresh runner reopens the snapshot
    let service = run(&config, "q", &["read-service", "--id", "hotel-1"])
        .await
        .unwrap();
    assert_eq!(service["numberOfEvaluations"], 1);
    assert_eq!(service["satisfactionRate"], 0.0);
    assert_eq!(service["lastEvaluationAt"], "2021-03-01T12:00:00.000Z");

    let count = run(&config, "q", &["count-evaluations"]).await.unwrap();
    assert_eq!(count, json!(1));

    let evaluation = run(&config, "q", &["read-evaluation", "--id", "eval-1"])
        .await
        .unwrap();
    assert_eq!(evaluation["txId"], "tx-3");
    assert_eq!(evaluation["docType"], "Evaluation");
    assert_eq!(evaluation["hash"], cli::evidence_digest(&evidence));
}

#[tokio::test]
async fn test_reads_do_not_advance_height() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir.path().join("state.json"));

    let created = run(&config, "tx-1", &["create-service", "--id", "hotel-1"])
        .await
        .unwrap();
    assert_eq!(created["height"], 1);

    let exists = run(&config, "q", &["service-exists", "--id", "hotel-1"])
        .await
        .unwrap();
    assert_eq!(exists, json!(true));
    let listed = run(&config, "q", &["list-services"]).await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let keyed = run(&config, "tx-2", &["set-access-key", "--token", "jwt"])
        .await
        .unwrap();
    assert_eq!(keyed["height"], 2);
    assert_eq!(keyed["result"]["type"], "Bearer");
}

#[tokio::test]
async fn test_errors_leave_snapshot_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let config = config(&path);

    run(&config, "tx-1", &["create-service", "--id", "hotel-1"])
        .await
        .unwrap();
    let before = std::fs::read(&path).unwrap();

    let err = run(&config, "tx-2", &["create-service", "--id", "hotel-1"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    let err = run(&config, "q", &["read-access-key"]).await.unwrap_err();
    assert!(err.to_string().contains("access key does not exist"));

    assert_eq!(std::fs::read(&path).unwrap(), before);
}
