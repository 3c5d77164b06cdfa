//! Single-task inner search loop: expand one working system, process
//! results/failures, and merge into the task's local pending frontier.

use crate::collector::ResultCollector;
use crate::error::EngineResult;
use crate::fingerprint::Fingerprinter;
use crate::merge::{bounded_merge, RescoreHook};
use crate::observer::{Observer, CANCEL};
use crate::system::{Completion, System, SystemKind};

/// Runs one task's inner loop for up to `max_iterations`, starting from
/// `initial` (a concrete working system) and returning the task's final
/// local pending frontier.
///
/// Terminal results are pushed into `collector` as they're discovered;
/// they do not appear in the returned frontier.
///
/// # Errors
///
/// Propagates any [`crate::error::EngineError`] raised by `initial`'s
/// `generate_children`, a `commit_impl` hook, or the rescore hook. Per the
/// scheduler's contract, such an error should be caught by the caller and
/// reported via `Observer::on_task_error`, with this task contributing an
/// empty frontier to its round.
#[allow(clippy::too_many_arguments)]
pub fn run_task(
    initial: System,
    fingerprinter: &mut dyn Fingerprinter,
    observer: &dyn Observer,
    max_pending_systems: usize,
    max_children_per_generation: usize,
    max_iterations: usize,
    continue_on_failures: bool,
    rescore_hook: Option<&dyn RescoreHook>,
    collector: &ResultCollector,
) -> EngineResult<Vec<System>> {
    let mut local_pending: Vec<System> = Vec::new();
    let mut pending_initial = Some(initial);

    for iteration in 0..max_iterations {
        if observer.on_iteration_begin(iteration) == CANCEL {
            observer.on_iteration_end(iteration);
            break;
        }

        if !process_results_and_failures(
            &mut local_pending,
            iteration,
            fingerprinter,
            observer,
            continue_on_failures,
            collector,
        )? {
            observer.on_iteration_end(iteration);
            break;
        }

        let active = match pending_initial.take() {
            Some(sys) => Some(sys),
            None => select_active(&mut local_pending)?,
        };

        let Some(active) = active else {
            observer.on_iteration_end(iteration);
            break;
        };

        let (children, is_complete) = match &active {
            System::WorkingConcrete(w) => {
                observer.on_iteration_generating_work(iteration);
                let children = w.generate_children(max_children_per_generation)?;
                observer.on_iteration_generated_work(iteration, children.len());
                (children, w.is_complete())
            }
            _ => unreachable!("select_active only ever returns WorkingConcrete systems"),
        };

        let mut batch = children;
        if !is_complete {
            batch.push(active);
        }
        batch.sort_by(|a, b| b.cmp(a));

        if !process_results_and_failures(
            &mut batch,
            iteration,
            fingerprinter,
            observer,
            continue_on_failures,
            collector,
        )? {
            observer.on_iteration_end(iteration);
            break;
        }

        if !fingerprinter.is_noop() {
            batch.retain(|sys| fingerprinter.should_process(sys));
        }

        observer.on_iteration_merging_work(iteration);
        let outcome = bounded_merge(
            vec![batch, std::mem::take(&mut local_pending)],
            max_pending_systems,
            rescore_hook,
        )?;
        local_pending = outcome.merged;
        observer.on_iteration_merged_work(iteration, local_pending.len(), &outcome.removed);

        observer.on_iteration_end(iteration);

        if !local_pending.iter().any(|sys| sys.kind() == SystemKind::Working) {
            break;
        }
    }

    Ok(local_pending)
}

/// Drains leading entries from `pending` until a `Working` system is
/// found, committing any `WorkingCalculated` entry into `WorkingConcrete`
/// along the way. Any leading `Result` entries are dropped — callers are
/// expected to have already run [`process_results_and_failures`] so a
/// leading result should not normally occur, but draining defensively
/// keeps this independent of that invariant.
fn select_active(pending: &mut Vec<System>) -> EngineResult<Option<System>> {
    while !pending.is_empty() {
        let sys = pending.remove(0);
        if sys.kind() != SystemKind::Working {
            continue;
        }
        let sys = if sys.completion() == Completion::Calculated {
            sys.commit()?
        } else {
            sys
        };
        return Ok(Some(sys));
    }
    Ok(None)
}

/// Applies the failure-tail and result-head rules to `batch` in place.
/// Returns `Ok(false)` if an observer callback cancelled the task, or if the
/// collector reports it already holds `max_results` entries.
fn process_results_and_failures(
    batch: &mut Vec<System>,
    iteration: usize,
    fingerprinter: &mut dyn Fingerprinter,
    observer: &dyn Observer,
    continue_on_failures: bool,
    collector: &ResultCollector,
) -> EngineResult<bool> {
    if !continue_on_failures {
        if let Some(last) = batch.last() {
            if !last.get_score().is_successful() {
                let mut start = batch.len() - 1;
                while start > 0 && !batch[start - 1].get_score().is_successful() {
                    start -= 1;
                }
                let failed: Vec<System> = batch.split_off(start);
                if observer.on_failed_systems(iteration, &failed) == CANCEL {
                    return Ok(false);
                }
            }
        }
    }

    let mut result_prefix_len = 0;
    while result_prefix_len < batch.len() && batch[result_prefix_len].is_result() {
        result_prefix_len += 1;
    }
    if result_prefix_len > 0 {
        let prefix: Vec<System> = batch.drain(0..result_prefix_len).collect();
        let mut collected = Vec::new();
        for sys in prefix {
            if !fingerprinter.should_process(&sys) {
                continue;
            }
            let committed = sys.commit()?;
            if fingerprinter.should_process(&committed) {
                collected.push(committed);
            }
        }
        let signal = observer.on_successful_systems(iteration, &collected);
        let mut collector_full = false;
        for result in collected {
            if !collector.on_iteration_result_system(result) {
                collector_full = true;
            }
        }
        if signal == CANCEL || collector_full {
            return Ok(false);
        }
    }

    Ok(true)
}
