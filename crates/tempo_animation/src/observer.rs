//! Per-animation frame and completion listeners

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

/// Callback invoked with the animation after each frame
pub type FrameCallback<A> = Box<dyn FnMut(&Rc<RefCell<A>>)>;

/// Callback invoked once when the animation completes
pub type CompleteCallback<A> = Box<dyn FnMut(&Rc<RefCell<A>>)>;

type CallbackList<A> = SmallVec<[FrameCallback<A>; 2]>;

struct Callbacks<A> {
    frame: CallbackList<A>,
    complete: CallbackList<A>,
}

/// Puts a taken callback list back on drop, unwinding included.
///
/// Callbacks registered while the list was out are appended after it.
struct Dispatch<'a, A> {
    callbacks: &'a RefCell<Callbacks<A>>,
    slot: fn(&mut Callbacks<A>) -> &mut CallbackList<A>,
    running: CallbackList<A>,
}

impl<'a, A> Dispatch<'a, A> {
    fn take(
        callbacks: &'a RefCell<Callbacks<A>>,
        slot: fn(&mut Callbacks<A>) -> &mut CallbackList<A>,
    ) -> Self {
        let running = std::mem::take(slot(&mut callbacks.borrow_mut()));
        Self {
            callbacks,
            slot,
            running,
        }
    }
}

impl<A> Drop for Dispatch<'_, A> {
    fn drop(&mut self) {
        let Ok(mut callbacks) = self.callbacks.try_borrow_mut() else {
            return;
        };
        let list = (self.slot)(&mut callbacks);
        let added = std::mem::replace(list, std::mem::take(&mut self.running));
        list.extend(added);
    }
}

/// Listener registration point returned by [`Animator::play`](crate::Animator::play).
///
/// Clones share the same callback lists. Callbacks run synchronously inside
/// [`Animator::update`](crate::Animator::update), in the order they were
/// registered, and receive the shared animation. No borrow of the animation
/// is held while they run, so they may inspect or mutate it (rewind a
/// timeline, add key frames). They may also call back into the animator to
/// cancel or play animations, and may register further callbacks, which take
/// effect from the next dispatch.
pub struct AnimationObserver<A> {
    callbacks: Rc<RefCell<Callbacks<A>>>,
}

impl<A> AnimationObserver<A> {
    pub(crate) fn new() -> Self {
        Self {
            callbacks: Rc::new(RefCell::new(Callbacks {
                frame: SmallVec::new(),
                complete: SmallVec::new(),
            })),
        }
    }

    /// Register a callback for every frame the animation receives
    pub fn on_frame<F: FnMut(&Rc<RefCell<A>>) + 'static>(&self, callback: F) -> &Self {
        self.callbacks.borrow_mut().frame.push(Box::new(callback));
        self
    }

    /// Register a callback for when the animation completes
    pub fn on_complete<F: FnMut(&Rc<RefCell<A>>) + 'static>(&self, callback: F) -> &Self {
        self.callbacks.borrow_mut().complete.push(Box::new(callback));
        self
    }

    pub fn frame_callback_count(&self) -> usize {
        self.callbacks.borrow().frame.len()
    }

    pub fn complete_callback_count(&self) -> usize {
        self.callbacks.borrow().complete.len()
    }

    /// Run frame callbacks while `is_live` holds
    pub(crate) fn notify_frame(&self, animatable: &Rc<RefCell<A>>, is_live: &dyn Fn() -> bool) {
        let mut dispatch = Dispatch::take(&self.callbacks, |callbacks| &mut callbacks.frame);
        for callback in dispatch.running.iter_mut() {
            if !is_live() {
                break;
            }
            callback(animatable);
        }
    }

    /// Run every completion callback
    pub(crate) fn notify_complete(&self, animatable: &Rc<RefCell<A>>) {
        let mut dispatch = Dispatch::take(&self.callbacks, |callbacks| &mut callbacks.complete);
        for callback in dispatch.running.iter_mut() {
            callback(animatable);
        }
    }
}

impl<A> Clone for AnimationObserver<A> {
    fn clone(&self) -> Self {
        Self {
            callbacks: Rc::clone(&self.callbacks),
        }
    }
}

impl<A> fmt::Debug for AnimationObserver<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationObserver")
            .field("frame_callbacks", &self.frame_callback_count())
            .field("complete_callbacks", &self.complete_callback_count())
            .finish()
    }
}
