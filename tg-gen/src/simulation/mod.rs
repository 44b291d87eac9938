//! Call-stack simulation over a generated landscape.
//!
//! The simulator keeps a stack of open frames, one per call in progress. Each step picks the next
//! class (through the active communication style, or directly from the not-yet-called methods when
//! full coverage is requested), closes a random number of frames so the call tree branches instead
//! of growing into a single chain, and pushes a frame for the new call. Frames are closed at the
//! current simulated time and attached to the frame beneath them; the last frame standing becomes
//! the root of the emitted trace.
use std::collections::{
    BTreeMap,
    HashSet,
};

use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use tg_core::rng::{
    rng_from_seed,
    SimRng,
};
use tracing::{
    debug,
    info,
    instrument,
    warn,
};

use crate::errors::GenError;
use crate::model::{
    Application,
    ClassRef,
    MethodId,
    Span,
};
use crate::params::{
    CommunicationStyle,
    TraceParams,
};
use crate::strategy::{
    link_cohesive,
    select_next,
    Selection,
};

/// Span attribute holding the owning application's name.
pub const SERVICE_NAME_KEY: &str = "service.name";
/// Span attribute holding the called class's fully-qualified name.
pub const NAMESPACE_KEY: &str = "code.namespace";
/// Span attribute holding the called method's name.
pub const FUNCTION_KEY: &str = "code.function";

/// Result of a simulation run, with the bookkeeping needed to judge how it went.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationOutcome {
    /// Root spans of the generated trace forest.
    pub spans: Vec<Span>,
    /// Number of calls generated after the entry span.
    pub generated_calls: usize,
    /// Number of calls the run aimed for.
    pub target_calls: usize,
    /// Whether the run stopped before reaching `target_calls`.
    pub terminated_early: bool,
    /// Largest number of simultaneously open frames.
    pub max_stack_depth: usize,
    /// Frames closed early because no candidate was left for the current caller.
    pub exhaustion_pops: usize,
}

/// An open call.
struct Frame {
    /// Class being executed.
    class: ClassRef,
    /// Span that is closed when the frame is popped.
    span: Span,
}

/// Simulate a trace over `apps`, returning its root spans.
pub fn simulate(apps: &mut [Application], params: &TraceParams) -> Result<Vec<Span>> {
    simulate_detailed(apps, params).map(|outcome| outcome.spans)
}

/// Simulate a trace over `apps`.
///
/// The first application supplies the entry point. Cohesive runs relink the landscape before the
/// first call, which is the only mutation made to `apps`.
#[instrument(skip_all, fields(apps = apps.len(), style = ?params.communication_style, call_count = params.call_count))]
pub fn simulate_detailed(apps: &mut [Application], params: &TraceParams) -> Result<SimulationOutcome> {
    params.validate()?;
    if apps.is_empty() {
        return Err(GenError::EmptyLandscape.into());
    }

    if apps[0].entry_point.0 >= apps[0].classes.len() {
        return Err(GenError::NoClasses(apps[0].name.clone()).into());
    }
    let classes: Vec<ClassRef> = apps
        .iter()
        .enumerate()
        .flat_map(|(app, a)| a.class_ids().map(move |class| ClassRef { app, class }))
        .collect();
    if let Some(empty) = classes.iter().find(|c| apps[c.app].class(c.class).methods.is_empty()) {
        return Err(GenError::NoMethods(apps[empty.app].class_fqn(empty.class)).into());
    }

    // all checks precede the only mutation of `apps`
    let mut rng = rng_from_seed(params.seed);
    if params.communication_style == CommunicationStyle::Cohesive {
        let links = link_cohesive(apps, &mut rng);
        info!(links, "Linked landscape for cohesive communication");
    }
    let apps: &[Application] = apps;

    let entry = ClassRef { app: 0, class: apps[0].entry_point };
    let entry_method = pick_method(apps, entry, &mut rng)?;

    let mut unvisited_methods: Vec<(ClassRef, MethodId)> = Vec::new();
    if params.visit_all_methods {
        unvisited_methods = classes
            .iter()
            .flat_map(|&c| apps[c.app].class(c.class).methods.iter().map(move |&m| (c, m)))
            .filter(|&pair| pair != (entry, entry_method))
            .collect();
    }
    let total_methods = apps.iter().map(|a| a.methods.len()).sum::<usize>();
    let target_calls = if params.visit_all_methods {
        params.call_count.max(total_methods)
    } else {
        params.call_count
    };
    #[allow(clippy::cast_precision_loss)]
    let time_at = |calls: usize| params.duration as f64 * calls as f64 / target_calls as f64;

    let mut stack = vec![Frame {
        class: entry,
        span: open_span(apps, entry, entry_method, 0.0, &params.fixed_attributes),
    }];
    let mut visited: HashSet<ClassRef> = HashSet::from([entry]);
    let mut previous = entry;
    let mut generated = 0;
    let mut now = 0.0;
    let mut terminated_early = false;
    let mut max_stack_depth = 1;
    let mut exhaustion_pops = 0;

    while generated < target_calls {
        let picked = match take_random(&mut unvisited_methods, &mut rng) {
            Some(pair) => Some(pair),
            None => {
                let sel = Selection {
                    apps,
                    classes: &classes,
                    previous,
                    visited: &visited,
                    allow_cyclic_calls: params.allow_cyclic_calls,
                };
                match select_next(params.communication_style, &sel, &mut rng) {
                    Some(next) => Some((next, pick_method(apps, next, &mut rng)?)),
                    None => None,
                }
            },
        };

        let Some((next, method)) = picked else {
            debug!(depth = stack.len(), "Candidates exhausted, returning from current call");
            let Some(caller) = close_top(&mut stack, now) else {
                warn!(generated, target_calls, "No class left to call, ending trace early");
                terminated_early = true;
                break;
            };
            exhaustion_pops += 1;
            previous = caller;
            continue;
        };

        let span = open_span(apps, next, method, now, &params.fixed_attributes);
        visited.insert(next);
        previous = next;

        while stack.len() > 1 && (stack.len() >= params.max_connection_depth || rng.gen_bool(0.5)) {
            if let Some(caller) = close_top(&mut stack, now) {
                previous = caller;
            }
        }
        stack.push(Frame { class: next, span });
        max_stack_depth = max_stack_depth.max(stack.len());

        generated += 1;
        now = time_at(generated);
    }

    let mut spans = Vec::new();
    while let Some(mut frame) = stack.pop() {
        frame.span.relative_end_time = now;
        match stack.last_mut() {
            Some(parent) => parent.span.children.push(frame.span),
            None => spans.push(frame.span),
        }
    }

    info!(
        generated,
        target_calls,
        terminated_early,
        exhaustion_pops,
        spans = spans.iter().map(Span::span_count).sum::<usize>(),
        "Trace simulated"
    );
    Ok(SimulationOutcome {
        spans,
        generated_calls: generated,
        target_calls,
        terminated_early,
        max_stack_depth,
        exhaustion_pops,
    })
}

/// Close the top frame at `now`, attach it to the frame beneath and return that frame's class.
///
/// The entry frame is never closed here; `None` means only it is left.
fn close_top(stack: &mut Vec<Frame>, now: f64) -> Option<ClassRef> {
    if stack.len() < 2 {
        return None;
    }
    let mut frame = stack.pop()?;
    let parent = stack.last_mut()?;
    frame.span.relative_end_time = now;
    parent.span.children.push(frame.span);
    Some(parent.class)
}

/// Remove and return a uniformly chosen element.
fn take_random<T>(items: &mut Vec<T>, rng: &mut SimRng) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let idx = rng.gen_range(0..items.len());
    Some(items.swap_remove(idx))
}

/// Pick one of `class`'s methods uniformly.
fn pick_method(apps: &[Application], class: ClassRef, rng: &mut SimRng) -> Result<MethodId> {
    let app = &apps[class.app];
    app.class(class.class)
        .methods
        .choose(rng)
        .copied()
        .ok_or_else(|| GenError::NoMethods(app.class_fqn(class.class)).into())
}

/// Open a span for a call to `method` on `class` at `start`.
fn open_span(
    apps: &[Application],
    class: ClassRef,
    method: MethodId,
    start: f64,
    fixed_attributes: &BTreeMap<String, String>,
) -> Span {
    let app = &apps[class.app];
    let fqn = app.class_fqn(class.class);
    let method_name = &app.method(method).identifier;

    let mut attributes = fixed_attributes.clone();
    attributes.insert(SERVICE_NAME_KEY.into(), app.name.clone());
    attributes.insert(NAMESPACE_KEY.into(), fqn.clone());
    attributes.insert(FUNCTION_KEY.into(), method_name.clone());

    Span::open(format!("{fqn}.{method_name}"), start, attributes)
}
