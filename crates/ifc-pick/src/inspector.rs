//! Double-click property inspection
//!
//! Each double-click becomes a numbered request. Requests complete out of
//! order; a completion is only applied while its element is still the
//! selected one and no other target was requested in between.

use crate::display::DisplayState;
use futures_util::future::{BoxFuture, FutureExt};
use ifc_pick_model::{ElementRef, InspectionError, PropertySet, PropertySource};
use std::sync::Arc;

/// Finished property request
#[derive(Clone, Debug, PartialEq)]
pub struct InspectionCompletion {
    pub seq: u64,
    pub element: ElementRef,
    pub result: Result<PropertySet, InspectionError>,
}

/// Pending property request, driven by the host
pub type InspectionTask = BoxFuture<'static, InspectionCompletion>;

#[derive(Clone, Copy, Debug)]
struct Ticket {
    /// Latest request
    seq: u64,
    /// First request of the current run of requests for `target`
    since: u64,
    target: Option<ElementRef>,
}

/// Issues property requests and filters their completions
pub struct SelectionInspector {
    source: Arc<dyn PropertySource>,
    next_seq: u64,
    latest: Option<Ticket>,
    applied: Option<u64>,
}

impl SelectionInspector {
    pub fn new(source: Arc<dyn PropertySource>) -> Self {
        Self {
            source,
            next_seq: 0,
            latest: None,
            applied: None,
        }
    }

    /// Target of the latest request (`None` after an empty-space double-click)
    pub fn target(&self) -> Option<ElementRef> {
        self.latest.and_then(|ticket| ticket.target)
    }

    /// Sequence number of the latest request
    pub fn latest_seq(&self) -> Option<u64> {
        self.latest.map(|ticket| ticket.seq)
    }

    /// Start inspecting `target`
    ///
    /// Returns `None` without contacting the property source when there is
    /// no target; the request still supersedes every earlier one.
    pub fn inspect(&mut self, target: Option<ElementRef>) -> Option<InspectionTask> {
        let seq = self.issue(target);
        let element = target?;
        log::debug!("[Inspector] Requesting properties of {} (request {})", element, seq);

        let request = self.source.item_properties(element.model_id, element.element_id);
        Some(
            async move {
                let result = request
                    .await
                    .map_err(|err| InspectionError::failed(element, err));
                InspectionCompletion {
                    seq,
                    element,
                    result,
                }
            }
            .boxed(),
        )
    }

    /// Drop the current target so every pending request goes stale
    pub fn reset(&mut self) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest = Some(Ticket {
            seq,
            since: seq,
            target: None,
        });
        log::debug!("[Inspector] Selection cleared (request {})", seq);
    }

    fn issue(&mut self, target: Option<ElementRef>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;

        let since = match self.latest {
            Some(previous) if previous.target == target => previous.since,
            _ => seq,
        };
        self.latest = Some(Ticket { seq, since, target });
        seq
    }

    /// Check whether a completion is still wanted
    pub fn is_current(&self, completion: &InspectionCompletion) -> bool {
        let Some(ticket) = self.latest else {
            return false;
        };
        let newer_applied = self.applied.is_some_and(|applied| applied > completion.seq);
        ticket.target == Some(completion.element) && completion.seq >= ticket.since && !newer_applied
    }

    /// Turn a completion into a display state, or drop it if stale
    pub fn accept(&mut self, completion: InspectionCompletion) -> Option<DisplayState> {
        if !self.is_current(&completion) {
            log::debug!(
                "[Inspector] Discarding stale result for {} (request {})",
                completion.element,
                completion.seq
            );
            return None;
        }
        self.applied = Some(completion.seq);

        Some(match completion.result {
            Ok(properties) => DisplayState::Properties(properties),
            Err(err) => {
                log::warn!("[Inspector] {}", err);
                DisplayState::Failed(err.to_string())
            }
        })
    }
}

impl std::fmt::Debug for SelectionInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionInspector")
            .field("next_seq", &self.next_seq)
            .field("latest", &self.latest)
            .field("applied", &self.applied)
            .finish_non_exhaustive()
    }
}
