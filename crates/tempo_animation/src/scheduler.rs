//! Animation scheduler
//!
//! The [`Animator`] holds every currently playing animation and advances
//! them from a single external frame tick. There is no internal thread or
//! clock: the host calls [`Animator::update`] once per frame with the elapsed
//! time.
//!
//! Callbacks run synchronously inside `update` and may re-enter the animator
//! to cancel or play animations. Each pass iterates over a snapshot of entry
//! ids and re-checks that an entry is still tracked before touching it, so
//! cancelling any animation (itself included) mid-pass is safe. An animation
//! played again from its own completion callbacks restarts on the next update.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::animatable::{instance_key, Animatable, AnimatableRef};
use crate::clock::ClockSource;
use crate::error::Result;
use crate::observer::AnimationObserver;

new_key_type! {
    /// Identifier of a tracked animation entry
    pub struct AnimationId;
}

// ============================================================================
// Activity Filter
// ============================================================================

/// Host-defined predicate deciding which entries receive updates this pass.
///
/// Inactive entries stay tracked but are not advanced, so their clocks stand
/// still until they become active again.
pub trait ActivityFilter {
    fn is_currently_active(&self, animatable: &AnimatableRef) -> bool;
}

impl<F> ActivityFilter for F
where
    F: Fn(&AnimatableRef) -> bool,
{
    fn is_currently_active(&self, animatable: &AnimatableRef) -> bool {
        self(animatable)
    }
}

/// Default filter: every entry is active
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysActive;

impl ActivityFilter for AlwaysActive {
    fn is_currently_active(&self, _animatable: &AnimatableRef) -> bool {
        true
    }
}

// ============================================================================
// Tracked Entries
// ============================================================================

/// Type-erased view of an animation paired with its observer
trait TrackedAnimation {
    fn advance(&self, delta_time: f32) -> Result<()>;
    fn is_completed(&self) -> bool;
    fn notify_frame(&self, is_live: &dyn Fn() -> bool);
    fn notify_complete(&self);
    fn animatable(&self) -> AnimatableRef;
}

struct Tracked<A> {
    animatable: Rc<RefCell<A>>,
    observer: AnimationObserver<A>,
}

impl<A: Animatable + 'static> TrackedAnimation for Tracked<A> {
    fn advance(&self, delta_time: f32) -> Result<()> {
        self.animatable.borrow_mut().on_frame(delta_time)
    }

    fn is_completed(&self) -> bool {
        self.animatable.borrow().is_completed()
    }

    fn notify_frame(&self, is_live: &dyn Fn() -> bool) {
        self.observer.notify_frame(&self.animatable, is_live);
    }

    fn notify_complete(&self) {
        self.observer.notify_complete(&self.animatable);
    }

    fn animatable(&self) -> AnimatableRef {
        self.animatable.clone()
    }
}

struct Entry {
    key: usize,
    tracked: Rc<dyn TrackedAnimation>,
    /// The typed `AnimationObserver<A>`, handed back on repeated `play`
    observer: Box<dyn Any>,
    /// Set while completion callbacks run; the entry is removed right after
    completing: bool,
}

/// Internal state of the animator
struct AnimatorState {
    entries: SlotMap<AnimationId, Entry>,
    /// Registration order
    order: Vec<AnimationId>,
    /// Instance identity to entry
    index: FxHashMap<usize, AnimationId>,
    filter: Rc<dyn ActivityFilter>,
}

impl AnimatorState {
    fn new(filter: Rc<dyn ActivityFilter>) -> Self {
        Self {
            entries: SlotMap::with_key(),
            order: Vec::new(),
            index: FxHashMap::default(),
            filter,
        }
    }

    fn remove(&mut self, id: AnimationId) -> Option<Entry> {
        let entry = self.entries.remove(id)?;
        self.order.retain(|other| *other != id);
        if self.index.get(&entry.key) == Some(&id) {
            self.index.remove(&entry.key);
        }
        Some(entry)
    }

    fn clear(&mut self) -> SlotMap<AnimationId, Entry> {
        self.order.clear();
        self.index.clear();
        std::mem::replace(&mut self.entries, SlotMap::with_key())
    }
}

// ============================================================================
// Animator
// ============================================================================

/// The scheduler that advances all playing animations each frame.
///
/// `Animator` is a cheap handle: clones share the same live set. It is
/// single-threaded (`!Send`) by construction.
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use tempo_animation::{Animator, Timeline};
///
/// let animator = Animator::new();
/// let fade = Rc::new(RefCell::new(
///     Timeline::builder().key_frame(0.0, 0.0).key_frame(1.0, 1.0).build().unwrap(),
/// ));
///
/// animator.play(&fade).on_complete(|timeline: &Rc<RefCell<Timeline>>| {
///     assert_eq!(timeline.borrow().value().unwrap(), 1.0);
/// });
///
/// animator.update(0.5).unwrap();
/// animator.update(0.5).unwrap();
/// assert!(animator.is_empty());
/// ```
#[derive(Clone)]
pub struct Animator {
    state: Rc<RefCell<AnimatorState>>,
}

impl Animator {
    pub fn new() -> Self {
        Self::with_activity_filter(AlwaysActive)
    }

    /// Create an animator that only updates entries accepted by `filter`
    pub fn with_activity_filter<F: ActivityFilter + 'static>(filter: F) -> Self {
        Self {
            state: Rc::new(RefCell::new(AnimatorState::new(Rc::new(filter)))),
        }
    }

    /// Replace the activity filter. Takes effect from the next update.
    pub fn set_activity_filter<F: ActivityFilter + 'static>(&self, filter: F) {
        self.state.borrow_mut().filter = Rc::new(filter);
    }

    /// Get a weak handle that does not keep the animator alive
    pub fn handle(&self) -> AnimatorHandle {
        AnimatorHandle {
            state: Rc::downgrade(&self.state),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Bind the animator to a host clock
    pub fn start<C: ClockSource + ?Sized>(&self, clock: &mut C) {
        tracing::debug!("Animator: attaching clock source");
        clock.attach(self.handle());
    }

    /// Unbind from the host clock and cancel everything
    pub fn stop<C: ClockSource + ?Sized>(&self, clock: &mut C) {
        tracing::debug!("Animator: detaching clock source");
        clock.detach();
        self.cancel_all();
    }

    // ========================================================================
    // Live set
    // ========================================================================

    /// Start playing an animation from the next update.
    ///
    /// Tracking is by instance identity: playing an instance that is already
    /// tracked returns its existing observer instead of adding a second entry.
    /// An instance played from its own completion callbacks gets a fresh
    /// entry and observer, so it restarts instead of being removed.
    pub fn play<A: Animatable + 'static>(&self, animatable: &Rc<RefCell<A>>) -> AnimationObserver<A> {
        let key = instance_key(animatable) as usize;
        let mut state = self.state.borrow_mut();

        let mut replaced = None;
        if let Some(&id) = state.index.get(&key) {
            let existing = state.entries.get(id).and_then(|entry| {
                if entry.completing {
                    return None;
                }
                entry.observer.downcast_ref::<AnimationObserver<A>>()
            });
            if let Some(observer) = existing {
                tracing::debug!(?id, "Animator: animation already playing");
                return observer.clone();
            }
            tracing::debug!(?id, "Animator: replaying completing animation");
            replaced = state.remove(id);
        }

        let observer = AnimationObserver::new();
        let tracked: Rc<dyn TrackedAnimation> = Rc::new(Tracked {
            animatable: Rc::clone(animatable),
            observer: observer.clone(),
        });
        let id = state.entries.insert(Entry {
            key,
            tracked,
            observer: Box::new(observer.clone()),
            completing: false,
        });
        state.order.push(id);
        state.index.insert(key, id);

        tracing::debug!(?id, playing = state.order.len(), "Animator: play");
        drop(state);
        drop(replaced);
        observer
    }

    /// Stop tracking an animation. Returns whether it was tracked.
    ///
    /// Once this returns the animation receives no further frame or
    /// completion callbacks, even when called from inside [`update`](Self::update).
    pub fn cancel<A: ?Sized>(&self, animatable: &Rc<RefCell<A>>) -> bool {
        let key = instance_key(animatable) as usize;
        let removed = {
            let mut state = self.state.borrow_mut();
            let Some(id) = state.index.get(&key).copied() else {
                return false;
            };
            tracing::debug!(?id, "Animator: cancel");
            state.remove(id)
        };
        // Dropped outside the borrow; callbacks may own animator handles
        removed.is_some()
    }

    /// Stop tracking every animation
    pub fn cancel_all(&self) {
        let removed = self.state.borrow_mut().clear();
        if !removed.is_empty() {
            tracing::debug!(cancelled = removed.len(), "Animator: cancel all");
        }
        drop(removed);
    }

    /// Whether an animation instance is currently tracked
    pub fn is_playing<A: ?Sized>(&self, animatable: &Rc<RefCell<A>>) -> bool {
        let key = instance_key(animatable) as usize;
        self.state.borrow().index.contains_key(&key)
    }

    /// Snapshot of tracked animations in registration order
    pub fn currently_playing(&self) -> Vec<AnimatableRef> {
        let state = self.state.borrow();
        state
            .order
            .iter()
            .filter_map(|id| state.entries.get(*id))
            .map(|entry| entry.tracked.animatable())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().entries.is_empty()
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    /// Advance every active animation by `delta_time` seconds.
    ///
    /// For each eligible entry, in registration order: `on_frame`, then the
    /// frame callbacks, then, if the animation reports completion, the
    /// completion callbacks followed by removal.
    ///
    /// Errors from `on_frame` are returned immediately. Entries after the
    /// failing one are not visited in this pass and the failing entry stays
    /// tracked.
    pub fn update(&self, delta_time: f32) -> Result<()> {
        let (candidates, filter) = {
            let state = self.state.borrow();
            let candidates: Vec<(AnimationId, Rc<dyn TrackedAnimation>)> = state
                .order
                .iter()
                .filter_map(|id| {
                    state
                        .entries
                        .get(*id)
                        .map(|entry| (*id, Rc::clone(&entry.tracked)))
                })
                .collect();
            (candidates, Rc::clone(&state.filter))
        };

        // The filter is host code, so it runs without the state borrowed
        let eligible: Vec<_> = candidates
            .into_iter()
            .filter(|(_, tracked)| filter.is_currently_active(&tracked.animatable()))
            .collect();

        tracing::trace!(delta_time, eligible = eligible.len(), "Animator: update");

        for (id, tracked) in eligible {
            if !self.is_live(id) {
                continue;
            }

            if let Err(err) = tracked.advance(delta_time) {
                tracing::warn!(?id, %err, "Animator: frame update failed, aborting pass");
                return Err(err);
            }

            let is_live = || self.is_live(id);
            tracked.notify_frame(&is_live);

            if tracked.is_completed() && self.mark_completing(id) {
                tracked.notify_complete();
                let removed = self.state.borrow_mut().remove(id);
                if removed.is_some() {
                    tracing::debug!(?id, "Animator: animation completed");
                }
            }
        }

        Ok(())
    }

    fn is_live(&self, id: AnimationId) -> bool {
        self.state.borrow().entries.contains_key(id)
    }

    /// Flag a live entry as completing. Returns false if it is gone.
    fn mark_completing(&self, id: AnimationId) -> bool {
        match self.state.borrow_mut().entries.get_mut(id) {
            Some(entry) => {
                entry.completing = true;
                true
            }
            None => false,
        }
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Animator Handle
// ============================================================================

/// A weak handle to an [`Animator`].
///
/// Capture this in callbacks instead of the animator itself so the callback
/// does not keep the live set alive. Every operation is a no-op once the
/// animator has been dropped.
#[derive(Clone)]
pub struct AnimatorHandle {
    state: Weak<RefCell<AnimatorState>>,
}

impl AnimatorHandle {
    /// Get the animator back, if it still exists
    pub fn upgrade(&self) -> Option<Animator> {
        self.state.upgrade().map(|state| Animator { state })
    }

    pub fn is_alive(&self) -> bool {
        self.state.strong_count() > 0
    }

    /// Forward a frame tick. Does nothing if the animator is gone.
    pub fn update(&self, delta_time: f32) -> Result<()> {
        match self.upgrade() {
            Some(animator) => animator.update(delta_time),
            None => Ok(()),
        }
    }

    pub fn cancel<A: ?Sized>(&self, animatable: &Rc<RefCell<A>>) -> bool {
        self.upgrade()
            .map(|animator| animator.cancel(animatable))
            .unwrap_or(false)
    }

    pub fn cancel_all(&self) {
        if let Some(animator) = self.upgrade() {
            animator.cancel_all();
        }
    }

    /// Number of tracked animations, 0 once the animator is gone
    pub fn len(&self) -> usize {
        self.upgrade().map(|animator| animator.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
