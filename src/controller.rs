//! Two-phase effect interpreter
//!
//! Every game action is dispatched in two passes:
//!
//! 1. **Model pass** (synchronous): each `model.*` leaf is handed to the
//!    [`Model`], and whatever tree it returns is resolved in its place,
//!    depth first. The result holds view leaves only.
//! 2. **View pass** (async): the view tree is played against the registered
//!    [`View`]s. Serial phases await each child in turn; parallel phases
//!    await all children together.
//!
//! Failures never abort a pass. A failed or unknown leaf is logged and
//! contributes nothing.

use std::collections::HashMap;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, join_all};

use crate::consts::MAX_CASCADE_DEPTH;
use crate::effect::{Effect, Leaf, Strategy};
use crate::error::{DispatchError, ViewError};

/// The model side: applies one model leaf and returns what follows from it
pub trait Model {
    fn apply(&mut self, leaf: &Leaf) -> Result<Effect, DispatchError>;
}

/// A view collaborator handling `view.<domain>.*` leaves.
///
/// Handlers take `&self` so parallel lanes can share a view; views that
/// record or animate keep their state behind interior mutability.
pub trait View {
    fn play<'a>(&'a self, leaf: &'a Leaf) -> LocalBoxFuture<'a, Result<(), ViewError>>;
}

/// Work item for the model pass
enum Step {
    /// Resolve this node; `depth` counts the cascades that produced it
    Visit(Effect, usize),
    /// Rebuild a phase from the last `len` resolved nodes
    Build(Strategy, usize),
}

/// Walks effect trees against a model and a set of views
pub struct Controller {
    views: HashMap<String, Rc<dyn View>>,
    max_depth: usize,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(MAX_CASCADE_DEPTH)
    }
}

impl Controller {
    pub fn new(max_depth: usize) -> Self {
        Self {
            views: HashMap::new(),
            max_depth,
        }
    }

    /// Route `view.<domain>.*` leaves to `view`
    pub fn register(&mut self, domain: &str, view: Rc<dyn View>) {
        self.views.insert(domain.to_string(), view);
    }

    /// Same view for several domains
    pub fn register_all(&mut self, domains: &[&str], view: Rc<dyn View>) {
        for domain in domains {
            self.register(domain, view.clone());
        }
    }

    /// Model pass.
    ///
    /// Runs on an explicit stack rather than recursion. Each node leaves
    /// exactly one resolved node on the output stack, so a parallel
    /// branch's cascades stay in their own lane, each in its own order.
    pub fn resolve<M: Model + ?Sized>(&self, model: &mut M, effect: Effect) -> Effect {
        let mut work = vec![Step::Visit(effect, 0)];
        let mut done: Vec<Effect> = Vec::new();

        while let Some(step) = work.pop() {
            match step {
                Step::Visit(Effect::None, _) => done.push(Effect::None),
                Step::Visit(Effect::Leaf(leaf), _) if !leaf.is_model() => {
                    done.push(Effect::Leaf(leaf));
                }
                Step::Visit(Effect::Leaf(leaf), depth) => {
                    if depth >= self.max_depth {
                        log::error!("{leaf}: {}", DispatchError::CascadeTooDeep(self.max_depth));
                        done.push(Effect::None);
                        continue;
                    }
                    log::debug!("{leaf}");
                    match model.apply(&leaf) {
                        Ok(next) => work.push(Step::Visit(next, depth + 1)),
                        Err(err) => {
                            log::error!("{} failed: {err}", leaf.path());
                            done.push(Effect::None);
                        }
                    }
                }
                Step::Visit(Effect::Phase(phase), depth) => {
                    work.push(Step::Build(phase.strategy, phase.effects.len()));
                    work.extend(
                        phase
                            .effects
                            .into_iter()
                            .rev()
                            .map(|child| Step::Visit(child, depth)),
                    );
                }
                Step::Build(strategy, len) => {
                    let children = done.split_off(done.len() - len);
                    done.push(Effect::collapse(strategy, children));
                }
            }
        }
        done.pop().unwrap_or_default()
    }

    /// View pass
    pub fn play<'a>(&'a self, effect: &'a Effect) -> LocalBoxFuture<'a, ()> {
        async move {
            match effect {
                Effect::None => {}
                Effect::Leaf(leaf) => self.play_leaf(leaf).await,
                Effect::Phase(phase) => match phase.strategy {
                    Strategy::Serial => {
                        for child in &phase.effects {
                            self.play(child).await;
                        }
                    }
                    Strategy::Parallel => {
                        join_all(phase.effects.iter().map(|child| self.play(child))).await;
                    }
                },
            }
        }
        .boxed_local()
    }

    async fn play_leaf(&self, leaf: &Leaf) {
        if leaf.is_model() {
            log::warn!("Unresolved model leaf in view pass: {leaf}");
            return;
        }
        let Some(view) = self.views.get(&leaf.domain) else {
            log::warn!("No view for {}", leaf.path());
            return;
        };
        if let Err(err) = view.play(leaf).await {
            log::error!("{} failed: {err}", leaf.path());
        }
    }

    /// Both passes. Returns the resolved view tree.
    pub async fn dispatch<M: Model + ?Sized>(&self, model: &mut M, effect: Effect) -> Effect {
        let resolved = self.resolve(model, effect);
        self.play(&resolved).await;
        resolved
    }
}
