//! Shifting laser events which would otherwise be read as slams.
//!
//! A ksh reader treats two laser nodes one 32nd note apart as a slam. When a vox chart places
//! nodes exactly that far apart, the later node is pushed one tick forward, together with every
//! following node of the same track that would end up too close to it. Moves are collected in a
//! [`RelocationQueue`] while a tick is rendered and applied to the timeline afterwards.

use crate::vox::{
    time::Timing,
    timeline::{EventKind, Timeline},
};

/// One event moved to a later timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relocation {
    /// The kind of the moved event.
    pub kind: EventKind,
    /// Where the event was.
    pub from: Timing,
    /// Where the event goes.
    pub to: Timing,
}

/// Relocations pending until the end of the current tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationQueue {
    moves: Vec<Relocation>,
}

/// The timing one tick after `timing`.
fn next_tick(timeline: &Timeline, timing: Timing) -> Timing {
    let signature = timeline
        .time_signature_at(timing.measure)
        .unwrap_or_default();
    timing.advance(1, signature)
}

impl RelocationQueue {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self { moves: Vec::new() }
    }

    /// Queues the event of `kind` at `now` to move one tick later, followed by the chain of
    /// later events of `kind` each within a 32nd note and a tick of its predecessor.
    pub fn plan(&mut self, timeline: &Timeline, now: Timing, kind: EventKind) {
        let mut previous = now;
        self.push(timeline, kind, now);
        while let Some(next) = timeline.next_of_kind(previous, kind) {
            let limit = timeline
                .time_signature_at(previous.measure)
                .unwrap_or_default()
                .thirty_second_ticks();
            if timeline.ticks_between(previous, next) > i64::from(limit) + 1 {
                break;
            }
            self.push(timeline, kind, next);
            previous = next;
        }
    }

    fn push(&mut self, timeline: &Timeline, kind: EventKind, from: Timing) {
        self.moves.push(Relocation {
            kind,
            from,
            to: next_tick(timeline, from),
        });
    }

    /// Applies and clears the queue, latest move first so that no event overwrites another.
    /// Returns the moves made, in the order applied.
    pub fn apply(&mut self, timeline: &mut Timeline) -> Vec<Relocation> {
        let mut moved = Vec::with_capacity(self.moves.len());
        for relocation in self.moves.drain(..).rev() {
            let Some(event) = timeline.remove(relocation.from, relocation.kind) else {
                continue;
            };
            log::debug!(
                "relocating {:?} from {} to {}",
                relocation.kind,
                relocation.from,
                relocation.to
            );
            timeline.insert(relocation.to, relocation.kind, event);
            moved.push(relocation);
        }
        moved
    }
}
