//! The melee trace component: the notification surface that watchers subscribe to.
//!
//! Hit detection itself (sweep geometry, timing, filtering) happens elsewhere; whatever performs
//! it drives the component through [`MeleeTraceComponent::start_trace`],
//! [`MeleeTraceComponent::report_hit`] and [`MeleeTraceComponent::end_trace`], which keep the
//! per-trace hit count and broadcast in start, hits, end order.

use crate::{
    delegate::MulticastDelegate, error::MeleeTraceError, pool::Handle, world::Actor, LOG_TARGET,
};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
};

/// Opaque id of one trace instance, bounded by a start and an end notification.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct MeleeTraceInstanceHandle {
    trace_id: u32,
}

impl MeleeTraceInstanceHandle {
    pub fn new(trace_id: u32) -> Self {
        Self { trace_id }
    }

    pub fn id(&self) -> u32 {
        self.trace_id
    }
}

/// What the detection code found for one strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeleeHitResult {
    pub hit_actor: Handle<Actor>,
    pub location: Vec3,
    pub normal: Vec3,
    pub bone_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceHit {
    pub component: Handle<MeleeTraceComponent>,
    pub hit_actor: Handle<Actor>,
    pub hit_location: Vec3,
    pub hit_normal: Vec3,
    pub hit_bone_name: String,
    pub trace: MeleeTraceInstanceHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceStarted {
    pub component: Handle<MeleeTraceComponent>,
    pub trace: MeleeTraceInstanceHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceEnded {
    pub component: Handle<MeleeTraceComponent>,
    pub hit_count: u32,
    pub trace: MeleeTraceInstanceHandle,
}

#[derive(Debug)]
pub struct MeleeTraceComponent {
    owner: Handle<Actor>,
    handle: Handle<MeleeTraceComponent>,
    on_trace_hit: MulticastDelegate<TraceHit>,
    on_trace_start: MulticastDelegate<TraceStarted>,
    on_trace_end: MulticastDelegate<TraceEnded>,
    // Hit count per running trace.
    active_traces: RefCell<BTreeMap<MeleeTraceInstanceHandle, u32>>,
    next_trace_id: Cell<u32>,
}

impl MeleeTraceComponent {
    pub(crate) fn new(owner: Handle<Actor>) -> Self {
        Self {
            owner,
            handle: Handle::NONE,
            on_trace_hit: Default::default(),
            on_trace_start: Default::default(),
            on_trace_end: Default::default(),
            active_traces: Default::default(),
            next_trace_id: Cell::new(1),
        }
    }

    pub(crate) fn set_handle(&mut self, handle: Handle<MeleeTraceComponent>) {
        self.handle = handle;
    }

    pub fn owner(&self) -> Handle<Actor> {
        self.owner
    }

    pub fn handle(&self) -> Handle<MeleeTraceComponent> {
        self.handle
    }

    pub fn on_trace_hit(&self) -> &MulticastDelegate<TraceHit> {
        &self.on_trace_hit
    }

    pub fn on_trace_start(&self) -> &MulticastDelegate<TraceStarted> {
        &self.on_trace_start
    }

    pub fn on_trace_end(&self) -> &MulticastDelegate<TraceEnded> {
        &self.on_trace_end
    }

    pub fn is_tracing(&self) -> bool {
        !self.active_traces.borrow().is_empty()
    }

    pub fn active_trace_count(&self) -> usize {
        self.active_traces.borrow().len()
    }

    pub fn start_trace(&self) -> MeleeTraceInstanceHandle {
        let trace = {
            let mut active = self.active_traces.borrow_mut();
            // Id 0 is never handed out, and ids of running traces are skipped after a wrap.
            let mut id = self.next_trace_id.get();
            while id == 0 || active.contains_key(&MeleeTraceInstanceHandle::new(id)) {
                id = id.wrapping_add(1);
            }
            let trace = MeleeTraceInstanceHandle::new(id);
            active.insert(trace, 0);
            trace
        };
        self.next_trace_id.set(trace.trace_id.wrapping_add(1));

        tracing::trace!(
            target: LOG_TARGET,
            component = ?self.handle,
            trace = trace.id(),
            "melee trace started"
        );
        self.on_trace_start.broadcast(&TraceStarted {
            component: self.handle,
            trace,
        });
        trace
    }

    pub fn report_hit(
        &self,
        trace: MeleeTraceInstanceHandle,
        hit: MeleeHitResult,
    ) -> Result<(), MeleeTraceError> {
        {
            let mut active = self.active_traces.borrow_mut();
            let hit_count = active
                .get_mut(&trace)
                .ok_or(MeleeTraceError::UnknownTrace(trace))?;
            *hit_count += 1;
        }

        self.on_trace_hit.broadcast(&TraceHit {
            component: self.handle,
            hit_actor: hit.hit_actor,
            hit_location: hit.location,
            hit_normal: hit.normal,
            hit_bone_name: hit.bone_name,
            trace,
        });
        Ok(())
    }

    /// Closes the trace and returns how many hits it produced.
    pub fn end_trace(&self, trace: MeleeTraceInstanceHandle) -> Result<u32, MeleeTraceError> {
        let hit_count = self
            .active_traces
            .borrow_mut()
            .remove(&trace)
            .ok_or(MeleeTraceError::UnknownTrace(trace))?;

        tracing::trace!(
            target: LOG_TARGET,
            component = ?self.handle,
            trace = trace.id(),
            hit_count,
            "melee trace ended"
        );
        self.on_trace_end.broadcast(&TraceEnded {
            component: self.handle,
            hit_count,
            trace,
        });
        Ok(hit_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn hit(bone: &str) -> MeleeHitResult {
        MeleeHitResult {
            hit_actor: Handle::NONE,
            location: Vec3::new(1.0, 2.0, 3.0),
            normal: Vec3::Z,
            bone_name: bone.to_string(),
        }
    }

    #[test]
    fn end_reports_accumulated_hit_count() {
        let component = MeleeTraceComponent::new(Handle::NONE);
        let ended = Rc::new(RefCell::new(Vec::new()));
        {
            let ended = ended.clone();
            component
                .on_trace_end()
                .add(move |e: &TraceEnded| ended.borrow_mut().push(e.hit_count));
        }

        let trace = component.start_trace();
        assert!(component.is_tracing());
        component.report_hit(trace, hit("head")).unwrap();
        component.report_hit(trace, hit("spine")).unwrap();

        assert_eq!(component.end_trace(trace), Ok(2));
        assert!(!component.is_tracing());
        assert_eq!(*ended.borrow(), vec![2]);
    }

    #[test]
    fn hit_on_unknown_trace_is_rejected_silently() {
        let component = MeleeTraceComponent::new(Handle::NONE);
        let hits = Rc::new(Cell::new(0));
        {
            let hits = hits.clone();
            component
                .on_trace_hit()
                .add(move |_| hits.set(hits.get() + 1));
        }

        let trace = component.start_trace();
        component.end_trace(trace).unwrap();

        assert_eq!(
            component.report_hit(trace, hit("head")),
            Err(MeleeTraceError::UnknownTrace(trace))
        );
        assert_eq!(
            component.end_trace(trace),
            Err(MeleeTraceError::UnknownTrace(trace))
        );
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn overlapping_traces_get_distinct_handles() {
        let component = MeleeTraceComponent::new(Handle::NONE);
        let a = component.start_trace();
        let b = component.start_trace();

        assert_ne!(a, b);
        assert_eq!(component.active_trace_count(), 2);
        component.report_hit(b, hit("arm")).unwrap();
        assert_eq!(component.end_trace(a), Ok(0));
        assert_eq!(component.end_trace(b), Ok(1));
    }

    #[test]
    fn wrapped_ids_skip_zero_and_running_traces() {
        let component = MeleeTraceComponent::new(Handle::NONE);
        let first = component.start_trace();
        component.report_hit(first, hit("head")).unwrap();
        assert_eq!(first.id(), 1);

        component.next_trace_id.set(u32::MAX);
        let last = component.start_trace();
        let wrapped = component.start_trace();

        assert_eq!(last.id(), u32::MAX);
        assert_eq!(wrapped.id(), 2);
        assert_eq!(component.active_trace_count(), 3);
        assert_eq!(component.end_trace(first), Ok(1));
        assert_eq!(component.end_trace(wrapped), Ok(0));
    }
}
