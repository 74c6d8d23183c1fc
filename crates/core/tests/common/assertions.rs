//! Assertion helpers over a run's event stream.

use pf_protocol::{AgentKind, AgentState, Event, PipelineStep};

/// Step indices in the order `StepStarted` reported them.
#[allow(dead_code)]
pub fn step_indices(events: &[Event]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::StepStarted { step_index, .. } => Some(*step_index),
            _ => None,
        })
        .collect()
}

/// States reported for `agent`, in order.
#[allow(dead_code)]
pub fn states_of(events: &[Event], agent: AgentKind) -> Vec<AgentState> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::AgentStatusChanged {
                agent: a, state, ..
            } if *a == agent => Some(*state),
            _ => None,
        })
        .collect()
}

/// Assert the stream is one complete run: started first, completed last,
/// every step entered once in order.
#[allow(dead_code)]
pub fn assert_complete_run(events: &[Event]) {
    assert!(!events.is_empty(), "Event sequence is empty");

    assert!(
        matches!(events[0], Event::RunStarted { .. }),
        "First event should be RunStarted, got: {:?}",
        events[0]
    );

    let last = &events[events.len() - 1];
    assert!(
        matches!(last, Event::RunCompleted { .. }),
        "Last event should be RunCompleted, got: {:?}",
        last
    );

    let expected: Vec<usize> = (0..PipelineStep::COUNT).collect();
    assert_eq!(step_indices(events), expected);

    let run_id = events[0].run_id();
    assert!(
        events.iter().all(|e| e.run_id() == run_id),
        "All events should carry run id {run_id}"
    );
}

/// Log messages appended under `step`.
#[allow(dead_code)]
pub fn log_messages(events: &[Event], step: PipelineStep) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::StepLogAppended {
                step: s, message, ..
            } if *s == step => Some(message.clone()),
            _ => None,
        })
        .collect()
}
