//! Subroutine boundary inference
//!
//! A label is a subroutine entry if some call instruction in the file targets it.
//! Targets and labels are compared by resolution key, so `bsr .loop` only matches the
//! `.loop` under the same global label, and parents are stored the same way.
//! Labels that follow an entry are attributed to it, and folded into its range, until a
//! return instruction closes the subroutine.  A call target met while inside a subroutine
//! does not start a new one, only a return does that.
//!
//! This is a heuristic meant for grouping and navigation, it does not follow control flow.

use std::collections::BTreeMap;
use lsp_types as lsp;
use super::Symbol;
use crate::lang::range_union;

/// State of the pass over the labels
struct BoundaryTracker {
    /// index of the entry label of the subroutine we are in
    entry: Option<usize>
}

impl BoundaryTracker {
    fn new() -> Self {
        Self { entry: None }
    }
    fn step(&mut self, labels: &mut [Symbol], idx: usize, subroutine_names: &[String], returns: &BTreeMap<usize,lsp::Range>) {
        match self.entry {
            None => {
                let key = labels[idx].resolved_name();
                if subroutine_names.iter().any(|s| *s == key) {
                    log::trace!("enter subroutine {}",key);
                    self.entry = Some(idx);
                }
            },
            Some(entry) => {
                let parent = labels[entry].resolved_name();
                let widened = range_union(labels[entry].range(),labels[idx].range());
                labels[idx].set_parent(&parent);
                labels[entry].set_range(widened);
            }
        }
        if let (Some(entry),Some(ret)) = (self.entry,returns.get(&idx)) {
            let widened = range_union(labels[entry].range(),ret);
            labels[entry].set_range(widened);
            log::trace!("exit subroutine {}",labels[entry].resolved_name());
            self.entry = None;
        }
    }
}

/// Assign parents and widen entry ranges.
/// * `labels` - labels of one file in source order
/// * `subroutine_names` - resolution key of every call target in the file
/// * `returns` - map from label index to the first return instruction following that label
pub fn infer(labels: &mut [Symbol], subroutine_names: &[String], returns: &BTreeMap<usize,lsp::Range>) {
    let mut tracker = BoundaryTracker::new();
    for idx in 0..labels.len() {
        tracker.step(labels,idx,subroutine_names,returns);
    }
}
