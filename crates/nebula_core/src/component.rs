//! # Component Model
//!
//! Anything attachable to an actor implements [`Component`]. The trait carries
//! the cloning contract and capability queries; concrete types stay plain structs.
//!
//! ```text
//!   Component ──as_behaviour_mut()──> Behaviour  (scripts: update, input, collision, coroutines)
//!       │
//!       └──────as_collider()────────> Collider   (shapes tested by the collision pool)
//! ```
//!
//! Type recovery goes through [`ComponentBase::as_any`], so a stored
//! `Box<dyn Component>` can be checked against a concrete type without
//! knowing the hierarchy.

use std::any::Any;

use nebula_shared::{Transform2, Vec2};

use crate::behaviour::Behaviour;
use crate::coroutine::CoroutineMaster;
use crate::handle::SafeHandle;
use crate::scene::ActorId;

/// Handle to an attached component.
pub type ComponentId = SafeHandle<ComponentEntry>;

/// Object-safe plumbing every component gets for free from `Clone + 'static`.
pub trait ComponentBase: Any {
    /// Deep copy of the component's own state. The copy has no owner yet.
    fn clone_component(&self) -> Box<dyn Component>;

    /// Upcast for checked downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for checked downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component + Clone> ComponentBase for T {
    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Unit of state or behaviour owned by exactly one actor.
pub trait Component: ComponentBase {
    /// Scripting capability, if this component is a behaviour.
    fn as_behaviour_mut(&mut self) -> Option<&mut dyn Behaviour> {
        None
    }

    /// Collision capability, if this component is a collider.
    fn as_collider(&self) -> Option<&dyn Collider> {
        None
    }
}

impl dyn Component {
    /// Checked downcast.
    #[must_use]
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Checked mutable downcast.
    #[must_use]
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Checks the concrete type.
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Registry slot for an attached component.
///
/// The owner is fixed at attach time. While a callback of this component runs,
/// its body is checked out of the slot and [`ComponentEntry::body`] is `None`.
pub struct ComponentEntry {
    pub(crate) owner: ActorId,
    pub(crate) destroyed: bool,
    pub(crate) started: bool,
    pub(crate) behaviour: bool,
    pub(crate) collider: bool,
    pub(crate) body: Option<Box<dyn Component>>,
    pub(crate) coroutines: CoroutineMaster,
}

impl ComponentEntry {
    pub(crate) fn new(owner: ActorId, mut body: Box<dyn Component>) -> Self {
        let behaviour = body.as_behaviour_mut().is_some();
        let collider = body.as_collider().is_some();
        Self {
            owner,
            destroyed: false,
            started: false,
            behaviour,
            collider,
            body: Some(body),
            coroutines: CoroutineMaster::new(),
        }
    }

    /// Slot for a copy whose source body is checked out. The body arrives when
    /// the source's callback returns.
    pub(crate) fn pending(owner: ActorId, behaviour: bool, collider: bool) -> Self {
        Self {
            owner,
            destroyed: false,
            started: false,
            behaviour,
            collider,
            body: None,
            coroutines: CoroutineMaster::new(),
        }
    }

    /// Owning actor.
    #[inline]
    #[must_use]
    pub const fn owner(&self) -> ActorId {
        self.owner
    }

    /// Checks the pending-destruction flag.
    #[inline]
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Checks if this component is a behaviour.
    #[inline]
    #[must_use]
    pub const fn is_behaviour(&self) -> bool {
        self.behaviour
    }

    /// Checks if this component is a collider.
    #[inline]
    #[must_use]
    pub const fn is_collider(&self) -> bool {
        self.collider
    }

    /// The component itself, unless one of its callbacks is running.
    #[must_use]
    pub fn body(&self) -> Option<&dyn Component> {
        self.body.as_deref()
    }

    /// Coroutines scheduled by this component. Always empty for non-behaviours.
    #[must_use]
    pub const fn coroutines(&self) -> &CoroutineMaster {
        &self.coroutines
    }
}

// =============================================================================
// Colliders
// =============================================================================

/// Collider shape resolved into world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WorldShape {
    /// Circle.
    Circle {
        /// World-space center.
        center: Vec2,
        /// World-space radius.
        radius: f32,
    },
}

impl WorldShape {
    /// Overlap test, dispatched on both shape kinds.
    ///
    /// Touching shapes collide.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Circle { center: c1, radius: r1 },
                Self::Circle { center: c2, radius: r2 },
            ) => r1 + r2 >= c1.distance(*c2),
        }
    }
}

/// Geometry component tested by the collision pool.
pub trait Collider {
    /// Shape in world space for an owner with the given global transform.
    fn world_shape(&self, owner: &Transform2) -> WorldShape;
}

/// Circle positioned relative to its owner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleCollider {
    /// Center offset in the owner's local space.
    pub relative_position: Vec2,
    /// Radius before the owner's scale is applied.
    pub radius: f32,
}

impl CircleCollider {
    /// Circle centered on its owner.
    #[must_use]
    pub const fn new(radius: f32) -> Self {
        Self {
            relative_position: Vec2::ZERO,
            radius,
        }
    }

    /// Circle offset from its owner.
    #[must_use]
    pub const fn with_offset(radius: f32, relative_position: Vec2) -> Self {
        Self {
            relative_position,
            radius,
        }
    }
}

impl Collider for CircleCollider {
    fn world_shape(&self, owner: &Transform2) -> WorldShape {
        WorldShape::Circle {
            center: owner.transform_point(self.relative_position),
            radius: self.radius * owner.scale.average(),
        }
    }
}

impl Component for CircleCollider {
    fn as_collider(&self) -> Option<&dyn Collider> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle_at(x: f32, radius: f32) -> WorldShape {
        CircleCollider::new(radius).world_shape(&Transform2::new(Vec2::new(x, 0.0), Vec2::ONE, 0.0))
    }

    #[test]
    fn test_circles_touching_collide() {
        assert!(circle_at(0.0, 10.0).intersects(&circle_at(20.0, 10.0)));
    }

    #[test]
    fn test_circles_just_apart() {
        // r1 + r2 == dist - 0.01
        assert!(!circle_at(0.0, 10.0).intersects(&circle_at(20.01, 10.0)));
    }

    #[test]
    fn test_radius_uses_average_scale() {
        let owner = Transform2::new(Vec2::ZERO, Vec2::new(1.0, 3.0), 0.0);
        let WorldShape::Circle { radius, .. } = CircleCollider::new(5.0).world_shape(&owner);
        assert!((radius - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_offset_rotates_with_owner() {
        let owner = Transform2::new(Vec2::new(1.0, 1.0), Vec2::splat(2.0), 90.0);
        let shape = CircleCollider::with_offset(1.0, Vec2::new(3.0, 0.0)).world_shape(&owner);
        let WorldShape::Circle { center, .. } = shape;
        assert!((center.x - 1.0).abs() < 1e-4);
        assert!((center.y - 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_downcast() {
        let boxed: Box<dyn Component> = Box::new(CircleCollider::new(2.0));
        assert!(boxed.is::<CircleCollider>());
        assert_eq!(boxed.downcast_ref::<CircleCollider>().map(|c| c.radius), Some(2.0));
        assert!(boxed.as_collider().is_some());

        let copy = boxed.clone_component();
        assert_eq!(copy.downcast_ref::<CircleCollider>(), boxed.downcast_ref::<CircleCollider>());
    }
}
