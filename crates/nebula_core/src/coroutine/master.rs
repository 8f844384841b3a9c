//! Per-component coroutine scheduler.

use std::mem;
use std::time::Duration;

use crate::behaviour::ScriptContext;
use crate::component::ComponentId;
use crate::scene::Scene;

use super::{Coroutine, CoroutineId, ScenePredicate, Yield};

/// Suspension state derived from the last yield.
#[derive(Default)]
enum Wait {
    #[default]
    Ready,
    Deadline(Duration),
    Until(ScenePredicate),
    While(ScenePredicate),
}

impl Wait {
    fn from_yield(result: Yield, now: Duration) -> Self {
        match result {
            Yield::NextPass | Yield::Finished => Self::Ready,
            Yield::WaitFor(d) => Self::Deadline(now.saturating_add(d)),
            Yield::WaitUntil(p) => Self::Until(p),
            Yield::WaitWhile(p) => Self::While(p),
        }
    }

    fn keep_waiting(&mut self, scene: &Scene) -> bool {
        match self {
            Self::Ready => false,
            Self::Deadline(at) => scene.now() < *at,
            Self::Until(p) => !p(scene),
            Self::While(p) => p(scene),
        }
    }
}

struct Record {
    id: CoroutineId,
    name: Option<String>,
    /// `None` while the coroutine is being resumed.
    coroutine: Option<Box<dyn Coroutine>>,
    wait: Wait,
}

/// Registry of the coroutines started by one component.
///
/// Coroutines are independent: each progresses at its own pace and is
/// addressable by id or by name. Names are not unique.
#[derive(Default)]
pub struct CoroutineMaster {
    records: Vec<Record>,
}

impl CoroutineMaster {
    /// Creates an empty scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub(crate) fn start(
        &mut self,
        id: CoroutineId,
        name: Option<String>,
        coroutine: Box<dyn Coroutine>,
    ) {
        self.records.push(Record {
            id,
            name,
            coroutine: Some(coroutine),
            wait: Wait::Ready,
        });
    }

    /// Removes a coroutine. Returns `false` if it was not scheduled.
    pub fn stop(&mut self, id: CoroutineId) -> bool {
        self.remove_where(|r| r.id == id)
    }

    /// Removes the first coroutine started under `name`.
    pub fn stop_named(&mut self, name: &str) -> bool {
        self.remove_where(|r| r.name.as_deref() == Some(name))
    }

    /// Checks if a coroutine is scheduled.
    #[must_use]
    pub fn is_running(&self, id: CoroutineId) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// Checks if any coroutine started under `name` is scheduled.
    #[must_use]
    pub fn is_running_named(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.name.as_deref() == Some(name))
    }

    /// Drops every coroutine, wherever it was suspended.
    pub fn stop_all(&mut self) {
        self.records.clear();
    }

    /// Number of scheduled coroutines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Checks if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn remove_where(&mut self, pred: impl Fn(&Record) -> bool) -> bool {
        match self.records.iter().position(pred) {
            Some(index) => {
                self.records.remove(index);
                true
            }
            None => false,
        }
    }

    fn record_mut(&mut self, id: CoroutineId) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    fn ids(&self) -> Vec<CoroutineId> {
        self.records.iter().map(|r| r.id).collect()
    }
}

fn record_mut(scene: &mut Scene, component: ComponentId, id: CoroutineId) -> Option<&mut Record> {
    scene
        .components
        .get_mut(component)?
        .coroutines
        .record_mut(id)
}

/// Runs one scheduling pass over a component's coroutines.
///
/// Every coroutine scheduled when the pass begins is considered once: skipped
/// if its last yield still holds, otherwise resumed. Coroutines started during
/// the pass first run on the next one. A coroutine stopped while it runs is
/// dropped as soon as it yields.
pub(crate) fn run_pass(scene: &mut Scene, component: ComponentId) {
    let (owner, ids) = match scene.components.get(component) {
        Some(entry) if !entry.coroutines.is_empty() => (entry.owner, entry.coroutines.ids()),
        _ => return,
    };

    for id in ids {
        let Some(record) = record_mut(scene, component, id) else {
            continue;
        };
        if record.coroutine.is_none() {
            continue;
        }

        let mut wait = mem::take(&mut record.wait);
        if wait.keep_waiting(scene) {
            if let Some(record) = record_mut(scene, component, id) {
                record.wait = wait;
            }
            continue;
        }

        let Some(mut coroutine) = record_mut(scene, component, id).and_then(|r| r.coroutine.take())
        else {
            continue;
        };

        let result = coroutine.resume(&mut ScriptContext::new(scene, owner, component));
        let now = scene.now();

        let Some(entry) = scene.components.get_mut(component) else {
            continue;
        };
        if result.is_finished() {
            entry.coroutines.stop(id);
            tracing::trace!(coroutine = id.raw(), "coroutine finished");
        } else if let Some(record) = entry.coroutines.record_mut(id) {
            record.coroutine = Some(coroutine);
            record.wait = Wait::from_yield(result, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::behaviour::testing::Idle;
    use crate::coroutine::from_fn;

    fn scene_with_component() -> (Scene, ComponentId) {
        let mut scene = Scene::new();
        let actor = scene.create_actor(None, "host");
        let component = scene.add_component(actor, Idle).unwrap();
        (scene, component)
    }

    fn counting(counter: &Rc<Cell<u32>>, result: impl Fn(u32) -> Yield + 'static) -> impl Coroutine {
        let counter = Rc::clone(counter);
        from_fn(move |_| {
            counter.set(counter.get() + 1);
            result(counter.get())
        })
    }

    #[test]
    fn test_finished_is_never_resumed() {
        let (mut scene, c) = scene_with_component();
        let calls = Rc::new(Cell::new(0));
        let id = scene
            .start_coroutine(c, Box::new(counting(&calls, |_| Yield::Finished)), Some("once".into()))
            .unwrap();

        for _ in 0..5 {
            scene.execute_coroutines();
        }

        assert_eq!(calls.get(), 1);
        assert!(!scene.is_coroutine_running(c, id));
        assert!(!scene.is_named_coroutine_running(c, "once"));
    }

    #[test]
    fn test_wait_for_respects_simulated_clock() {
        let (mut scene, c) = scene_with_component();
        let calls = Rc::new(Cell::new(0));
        scene.start_coroutine(c, Box::new(counting(&calls, |_| Yield::seconds(1.0))), None);

        scene.execute_coroutines();
        assert_eq!(calls.get(), 1);

        for _ in 0..9 {
            scene.advance_clock(Duration::from_millis(100));
            scene.execute_coroutines();
            assert_eq!(calls.get(), 1);
        }

        scene.advance_clock(Duration::from_millis(100));
        scene.execute_coroutines();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_wait_until_and_while() {
        let (mut scene, c) = scene_with_component();
        let gate = Rc::new(Cell::new(false));
        let until_calls = Rc::new(Cell::new(0));
        let while_calls = Rc::new(Cell::new(0));

        let g = Rc::clone(&gate);
        scene.start_coroutine(
            c,
            Box::new(counting(&until_calls, move |_| {
                let g = Rc::clone(&g);
                Yield::until(move |_| g.get())
            })),
            None,
        );
        let g = Rc::clone(&gate);
        scene.start_coroutine(
            c,
            Box::new(counting(&while_calls, move |_| {
                let g = Rc::clone(&g);
                Yield::while_(move |_| !g.get())
            })),
            None,
        );

        scene.execute_coroutines();
        scene.execute_coroutines();
        assert_eq!((until_calls.get(), while_calls.get()), (1, 1));

        gate.set(true);
        scene.execute_coroutines();
        assert_eq!((until_calls.get(), while_calls.get()), (2, 2));
    }

    #[test]
    fn test_duplicate_names_run_side_by_side() {
        let (mut scene, c) = scene_with_component();
        let calls = Rc::new(Cell::new(0));
        scene.start_coroutine(c, Box::new(counting(&calls, |_| Yield::NextPass)), Some("blink".into()));
        scene.start_coroutine(c, Box::new(counting(&calls, |_| Yield::NextPass)), Some("blink".into()));

        scene.execute_coroutines();
        assert_eq!(calls.get(), 2);

        assert!(scene.stop_named_coroutine(c, "blink"));
        assert!(scene.is_named_coroutine_running(c, "blink"));
        assert!(scene.stop_named_coroutine(c, "blink"));
        assert!(!scene.is_named_coroutine_running(c, "blink"));
        assert!(!scene.stop_named_coroutine(c, "blink"));
    }

    #[test]
    fn test_stop_all() {
        let (mut scene, c) = scene_with_component();
        let calls = Rc::new(Cell::new(0));
        let a = scene
            .start_coroutine(c, Box::new(counting(&calls, |_| Yield::NextPass)), None)
            .unwrap();
        scene.start_coroutine(c, Box::new(counting(&calls, |_| Yield::NextPass)), None);

        scene.stop_all_coroutines(c);
        scene.execute_coroutines();

        assert_eq!(calls.get(), 0);
        assert!(!scene.is_coroutine_running(c, a));
    }

    #[test]
    fn test_stop_by_id_while_waiting() {
        let (mut scene, c) = scene_with_component();
        let stopped_calls = Rc::new(Cell::new(0));
        let sibling_calls = Rc::new(Cell::new(0));
        let stopped = scene
            .start_coroutine(c, Box::new(counting(&stopped_calls, |_| Yield::seconds(0.5))), None)
            .unwrap();
        let sibling = scene
            .start_coroutine(c, Box::new(counting(&sibling_calls, |_| Yield::seconds(0.5))), None)
            .unwrap();

        scene.execute_coroutines();
        assert_eq!((stopped_calls.get(), sibling_calls.get()), (1, 1));

        assert!(scene.stop_coroutine(c, stopped));
        assert!(!scene.is_coroutine_running(c, stopped));
        assert!(!scene.stop_coroutine(c, stopped));

        for _ in 0..3 {
            scene.advance_clock(Duration::from_millis(500));
            scene.execute_coroutines();
        }

        assert_eq!(stopped_calls.get(), 1);
        assert_eq!(sibling_calls.get(), 4);
        assert!(scene.is_coroutine_running(c, sibling));
    }

    #[test]
    fn test_coroutine_can_stop_itself() {
        let (mut scene, c) = scene_with_component();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        scene.start_coroutine(
            c,
            Box::new(from_fn(move |ctx| {
                counter.set(counter.get() + 1);
                ctx.stop_all_coroutines();
                Yield::NextPass
            })),
            None,
        );

        scene.execute_coroutines();
        scene.execute_coroutines();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_started_during_pass_runs_next_pass() {
        let (mut scene, c) = scene_with_component();
        let inner_calls = Rc::new(Cell::new(0));
        let inner = Rc::clone(&inner_calls);
        scene.start_coroutine(
            c,
            Box::new(from_fn(move |ctx| {
                ctx.start_coroutine(counting(&inner, |_| Yield::Finished));
                Yield::Finished
            })),
            None,
        );

        scene.execute_coroutines();
        assert_eq!(inner_calls.get(), 0);
        scene.execute_coroutines();
        assert_eq!(inner_calls.get(), 1);
    }
}
