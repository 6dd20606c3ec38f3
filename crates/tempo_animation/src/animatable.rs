//! The capability every scheduled animation provides

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;

/// Anything the [`Animator`](crate::Animator) can drive.
///
/// The animator calls [`on_frame`](Animatable::on_frame) once per update and
/// drops the animation as soon as [`is_completed`](Animatable::is_completed)
/// reports `true`.
pub trait Animatable {
    /// Advance by `delta_time` seconds
    fn on_frame(&mut self, delta_time: f32) -> Result<()>;

    /// Whether the animation has finished
    fn is_completed(&self) -> bool;
}

/// Shared, type-erased reference to a playing animation
pub type AnimatableRef = Rc<RefCell<dyn Animatable>>;

/// Identity of a shared animation, independent of its concrete type
pub(crate) fn instance_key<T: ?Sized>(animatable: &Rc<RefCell<T>>) -> *const () {
    Rc::as_ptr(animatable) as *const ()
}

/// Whether two shared references point at the same animation instance.
///
/// Useful inside activity filters, which only see the type-erased
/// [`AnimatableRef`].
pub fn same_instance<A: ?Sized, B: ?Sized>(a: &Rc<RefCell<A>>, b: &Rc<RefCell<B>>) -> bool {
    instance_key(a) == instance_key(b)
}
