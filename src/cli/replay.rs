use std::{
    fmt::Display,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use drea::gesture::encode_event;
use drea::target::Action;
use drea::{
    load_config, Disposition, EngineOutput, GestureConfig, GestureEngine, GestureState,
    GestureTrace, InMemoryTargets, SensorStatus, StatusStore, TouchEvent,
};

use super::env_utils;
use super::logging::Logger;

pub struct ReplayOptions {
    pub trace_path: PathBuf,
    pub targets_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub status_path: Option<PathBuf>,
    pub expect_path: Option<PathBuf>,
    pub trace_lines: bool,
}

struct TraceLine {
    line_no: usize,
    payload: String,
}

pub fn run_replay(logger: &mut Logger, options: ReplayOptions) -> Result<()> {
    let config = match env_utils::config_path(options.config_path) {
        Some(path) => {
            load_config(&path).with_context(|| format!("loading config {}", path.display()))?
        }
        None => {
            logger.warn("no config given; every finger count is unbound");
            GestureConfig::default()
        }
    };
    let targets = InMemoryTargets::from_path(&options.targets_path)?;
    let lines = parse_trace(&options.trace_path)?;
    let tail_ms = env_utils::tail_ms_from_env()?;

    let store = options.status_path.map(StatusStore::new);
    let mut status = match &store {
        Some(store) => store
            .load()
            .with_context(|| format!("loading status {}", store.path().display()))?,
        None => SensorStatus::default(),
    };

    let mut engine = GestureEngine::from_state(config, targets, status.gesture.clone());
    let mut actions: Vec<Action> = Vec::new();

    logger.info("call,ms,domain,action,target_id,value");
    for line in &lines {
        let output = engine.handle_and_dispatch(&line.payload);
        report(logger, line.line_no, &output, options.trace_lines, &mut actions);
        status.record(&line.payload, engine.state().clone());
    }

    // Traces cut off mid-touch never see the fingers lift.
    if let Some(payload) = tail_payload(engine.state(), tail_ms) {
        let output = engine.handle_and_dispatch(&payload);
        report(logger, lines.len() + 1, &output, options.trace_lines, &mut actions);
        status.record(&payload, engine.state().clone());
    }

    if let Some(store) = &store {
        store
            .save(&status)
            .with_context(|| format!("saving status {}", store.path().display()))?;
    }

    if let Some(expect_path) = options.expect_path {
        let expected = parse_expected_actions(&expect_path)?;
        if actions != expected {
            logger.warn(format!("expected actions: {}", join_actions(&expected)));
            logger.warn(format!("actual actions:   {}", join_actions(&actions)));
            bail!("action sequence mismatch");
        }
    }

    Ok(())
}

fn report(
    logger: &mut Logger,
    line_no: usize,
    output: &EngineOutput,
    trace_lines: bool,
    actions: &mut Vec<Action>,
) {
    logger.trace(line_no, &output.trace);
    if trace_lines {
        logger.info(format_trace(line_no, &output.trace));
    }

    match &output.disposition {
        Disposition::Continue => {}
        Disposition::Emit(call) => {
            logger.info(format!(
                "call,{},{},{},{},{}",
                opt(output.trace.timestamp),
                call.domain.as_str(),
                call.action.as_str(),
                call.target_id,
                opt(call.value.map(|value| value.to_json())),
            ));
            logger.call(line_no, call);
            actions.push(call.action);
        }
        Disposition::Reset(reason) => {
            logger.warn(format!("line {line_no}: gesture reset: {reason}"));
        }
    }
}

fn format_trace(line_no: usize, trace: &GestureTrace) -> String {
    format!(
        "trace,{line_no},{},{},{:?},{},{},{:?}",
        opt(trace.timestamp),
        opt(trace.finger_count),
        trace.phase,
        opt(trace.dominant),
        opt(trace.rotation_delta),
        trace.note,
    )
}

fn opt<T: Display>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

/// Synthetic release `tail_ms` after the last touch, if fingers are still down.
fn tail_payload(state: &GestureState, tail_ms: u64) -> Option<String> {
    if tail_ms == 0 {
        return None;
    }
    let last = state.last_event.filter(|event| event.finger_count > 0)?;
    let tail = i64::try_from(tail_ms).unwrap_or(i64::MAX);
    Some(encode_event(&TouchEvent::new(
        last.timestamp.saturating_add(tail),
        0,
        last.rotation,
    )))
}

fn parse_trace(path: &Path) -> Result<Vec<TraceLine>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line_result) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line_result
            .with_context(|| format!("failed to read {}:{line_no}", path.display()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        out.push(TraceLine {
            line_no,
            payload: trimmed.to_string(),
        });
    }
    Ok(out)
}

fn parse_expected_actions(path: &Path) -> Result<Vec<Action>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut actions = Vec::new();
    for (idx, line_result) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line_result
            .with_context(|| format!("failed to read {}:{line_no}", path.display()))?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        let Some(action) = Action::from_name(token) else {
            bail!("{}:{line_no} invalid expected action: {token}", path.display());
        };
        actions.push(action);
    }
    Ok(actions)
}

fn join_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .map(|action| action.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
