//! End-to-end matches through the concurrent runner.

use std::time::Duration;

use aoa_core::observation::Observation;
use aoa_core::simulation::SimulationConfig;
use aoa_core::world::Outcome;
use aoa_headless::{
    Agent, AgentError, AgentSpec, ConfigError, IdleAgent, MatchConfig, MatchRunner, ScriptedAgent,
    Strategy,
};
use serde_json::{json, Value};

fn runner(turn_limit: u32, timeout: Duration) -> MatchRunner {
    MatchRunner::new(
        SimulationConfig {
            turn_limit,
            ..SimulationConfig::default()
        },
        timeout,
    )
}

/// Fails every call without producing anything.
struct BrokenAgent;

impl Agent for BrokenAgent {
    fn name(&self) -> &str {
        "broken"
    }

    async fn decide(&mut self, _observation: &Observation) -> Result<Value, AgentError> {
        Err(AgentError::NoJson)
    }
}

/// Takes far longer than any budget used here.
struct SlowAgent;

impl Agent for SlowAgent {
    fn name(&self) -> &str {
        "slow"
    }

    async fn decide(&mut self, _observation: &Observation) -> Result<Value, AgentError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(json!({}))
    }
}

/// Answers immediately until `stall_on`, then never answers again.
struct StallingAgent {
    calls: u32,
    stall_on: u32,
}

impl Agent for StallingAgent {
    fn name(&self) -> &str {
        "stalling"
    }

    async fn decide(&mut self, _observation: &Observation) -> Result<Value, AgentError> {
        self.calls += 1;
        if self.calls >= self.stall_on {
            std::future::pending::<()>().await;
        }
        Ok(json!({}))
    }
}

#[tokio::test]
async fn idle_match_runs_to_the_turn_limit() {
    let report = runner(4, Duration::from_secs(1))
        .run(&mut IdleAgent, &mut IdleAgent)
        .await;
    assert_eq!(report.outcome, Some(Outcome::Draw));
    assert_eq!(report.turns_played, 4);
    assert!(!report.cancelled);
    assert_eq!(report.players[0].agent_failures, 0);
    assert!(report.log.iter().any(|line| line.contains("Turn limit")));
}

#[tokio::test]
async fn scripted_match_completes() {
    let mut rush = ScriptedAgent::new(Strategy::rush());
    let report = runner(30, Duration::from_secs(5))
        .run(&mut rush, &mut IdleAgent)
        .await;
    assert!(report.outcome.is_some());
    assert!(!report.cancelled);
    assert!(report.turns_played <= 30);
    assert_eq!(report.players[0].agent, "scripted:rush");
    assert!(report.players[0].resources_spent > 0);
    assert_eq!(report.players[1].resources_spent, 0);
}

#[tokio::test]
async fn scripted_matches_are_reproducible() {
    let play = || async {
        let mut a = ScriptedAgent::new(Strategy::boom());
        let mut b = ScriptedAgent::new(Strategy::turtle());
        runner(25, Duration::from_secs(5)).run(&mut a, &mut b).await
    };
    let first = play().await;
    let second = play().await;
    assert_eq!(first.final_state_hash, second.final_state_hash);
    assert_eq!(first, second);
}

#[tokio::test]
async fn failing_agent_plays_empty_intent() {
    let report = runner(3, Duration::from_secs(1))
        .run(&mut BrokenAgent, &mut IdleAgent)
        .await;
    assert_eq!(report.turns_played, 3);
    assert_eq!(report.players[0].agent_failures, 3);
    assert_eq!(report.players[1].agent_failures, 0);
    let failures = report
        .log
        .iter()
        .filter(|line| line.contains("PA agent error: reply contained no JSON object: no-op"))
        .count();
    assert_eq!(failures, 3);
    // A broken agent still collects income like an idle one
    assert_eq!(report.outcome, Some(Outcome::Draw));
}

#[tokio::test]
async fn slow_agent_times_out_each_turn() {
    let report = runner(2, Duration::from_millis(50))
        .run(&mut IdleAgent, &mut SlowAgent)
        .await;
    assert_eq!(report.turns_played, 2);
    assert_eq!(report.players[1].agent_failures, 2);
    assert!(report
        .log
        .iter()
        .any(|line| line.contains("PB agent timed out: no-op")));
}

#[tokio::test]
async fn shutdown_before_first_turn_resolves_nothing() {
    let report = runner(10, Duration::from_secs(1))
        .run_until(&mut IdleAgent, &mut IdleAgent, std::future::ready(()))
        .await;
    assert!(report.cancelled);
    assert_eq!(report.outcome, None);
    assert_eq!(report.turns_played, 0);
    assert!(report.log.is_empty());
}

#[tokio::test]
async fn shutdown_discards_turn_in_flight() {
    let mut stalling = StallingAgent {
        calls: 0,
        stall_on: 3,
    };
    let report = runner(10, Duration::from_secs(60))
        .run_until(
            &mut IdleAgent,
            &mut stalling,
            tokio::time::sleep(Duration::from_millis(200)),
        )
        .await;
    assert!(report.cancelled);
    assert_eq!(report.outcome, None);
    assert_eq!(report.turns_played, 2);
    assert!(report.log.iter().all(|line| !line.starts_with("[T3]")));
}

#[tokio::test]
async fn config_file_drives_a_match() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("match.ron");
    std::fs::write(
        &path,
        r#"(
            turn_limit: 6,
            agent_timeout_secs: 2,
            player_a: Scripted("balanced"),
            player_b: Idle,
        )"#,
    )
    .unwrap();

    let config = MatchConfig::load(&path).unwrap();
    let mut a = config.player_a.build().unwrap();
    let mut b = config.player_b.build().unwrap();
    let report = MatchRunner::from_config(&config).run(&mut a, &mut b).await;
    assert_eq!(report.players[0].agent, "scripted:balanced");
    assert_eq!(report.players[1].agent, "idle");
    assert!(report.turns_played <= 6);
    assert!(report.outcome.is_some());
}

#[test]
fn missing_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = MatchConfig::load(dir.path().join("absent.ron")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
}

#[cfg(unix)]
#[tokio::test]
async fn external_program_plays_a_match() {
    let spec = AgentSpec::Command {
        program: "sh".to_string(),
        args: vec![
            "-c".to_string(),
            r#"while read line; do echo '{"task_villagers": {"wood": 3}}'; done"#.to_string(),
        ],
    };
    let mut external = spec.build().unwrap();
    let report = runner(3, Duration::from_secs(5))
        .run(&mut external, &mut IdleAgent)
        .await;
    assert_eq!(report.players[0].agent, "cmd:sh");
    assert_eq!(report.players[0].agent_failures, 0);
    assert_eq!(report.turns_played, 3);
}

#[cfg(unix)]
#[tokio::test]
async fn external_program_without_json_is_a_failure() {
    let spec: AgentSpec = "cmd:sh -c".parse().unwrap();
    assert_eq!(spec.to_string(), "cmd:sh -c");

    let spec = AgentSpec::Command {
        program: "sh".to_string(),
        args: vec![
            "-c".to_string(),
            "while read line; do echo thinking; done".to_string(),
        ],
    };
    let mut external = spec.build().unwrap();
    let report = runner(2, Duration::from_secs(5))
        .run(&mut IdleAgent, &mut external)
        .await;
    assert_eq!(report.players[1].agent_failures, 2);
    assert!(report
        .log
        .iter()
        .any(|line| line.contains("PB agent error: reply contained no JSON object")));
}
