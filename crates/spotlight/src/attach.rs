#![forbid(unsafe_code)]

//! Anchor registry: marking host elements as step targets.
//!
//! [`AttachStep`] wraps one host element and registers it as the anchor of
//! one or more step indices. After every host render the host calls
//! [`AttachStep::layout`]; when the tour's current step is one of the
//! wrapper's indices the element is measured and the result is reported with
//! `change_spot`.
//!
//! Elements that cannot be measured directly (composite components without a
//! native node) are wrapped in a measurable container provided by the host,
//! sized to fit the child or to fill its parent.
//!
//! Registrations are RAII: dropping the `AttachStep` removes the anchor.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use spotlight_core::geometry::Rect;

use crate::tour::{SpotlightTour, TourStatus};

/// A rendered node that can report its window-space rectangle.
pub trait Measure {
    /// Measure in window coordinates; `None` while not laid out yet.
    fn measure_in_window(&self) -> Option<Rect>;
}

impl<F> Measure for F
where
    F: Fn() -> Option<Rect>,
{
    fn measure_in_window(&self) -> Option<Rect> {
        self()
    }
}

/// How an injected container sizes itself around the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerLayout {
    /// Shrink to the child's content.
    #[default]
    FitContent,
    /// Stretch to fill the parent.
    Fill,
}

/// The host UI framework, as seen by the anchor registry.
pub trait AnchorHost {
    type Element;

    /// Native measurement handle of `child`, if it is a primitive element.
    fn native_handle(&self, child: &Self::Element) -> Option<Rc<dyn Measure>>;

    /// Wrap `child` in a measurable container.
    fn container(
        &self,
        child: Self::Element,
        layout: ContainerLayout,
    ) -> (Self::Element, Rc<dyn Measure>);
}

/// What an anchor needs from the tour.
pub(crate) trait AnchorTarget {
    fn current(&self) -> Option<usize>;
    fn status(&self) -> TourStatus;
    fn change_spot(&self, rect: Rect);
    fn registry(&self) -> &Rc<AnchorRegistry>;
}

struct Slot {
    id: u64,
    node: Weak<dyn Measure>,
}

/// Step index → live anchor nodes.
#[derive(Default)]
pub(crate) struct AnchorRegistry {
    slots: RefCell<BTreeMap<usize, Vec<Slot>>>,
    next_id: Cell<u64>,
}

impl fmt::Debug for AnchorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorRegistry")
            .field("indices", &self.slots.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AnchorRegistry {
    fn register(&self, indices: &[usize], node: &Rc<dyn Measure>) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let mut slots = self.slots.borrow_mut();
        for &index in indices {
            slots.entry(index).or_default().push(Slot {
                id,
                node: Rc::downgrade(node),
            });
        }
        id
    }

    fn unregister(&self, id: u64) {
        let mut slots = self.slots.borrow_mut();
        slots.retain(|_, nodes| {
            nodes.retain(|slot| slot.id != id);
            !nodes.is_empty()
        });
    }

    /// Measure the most recently mounted live anchor of `index`.
    pub(crate) fn measure(&self, index: usize) -> Option<Rect> {
        let node = self
            .slots
            .borrow()
            .get(&index)?
            .iter()
            .rev()
            .find_map(|slot| slot.node.upgrade())?;
        node.measure_in_window().filter(Rect::is_finite)
    }

    pub(crate) fn is_registered(&self, index: usize) -> bool {
        self.slots
            .borrow()
            .get(&index)
            .is_some_and(|nodes| nodes.iter().any(|slot| slot.node.strong_count() > 0))
    }
}

/// Keeps an anchor registered until dropped.
#[derive(Debug)]
pub struct AnchorRegistration {
    registry: Weak<AnchorRegistry>,
    id: u64,
}

impl Drop for AnchorRegistration {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unregister(self.id);
        }
    }
}

/// A host element registered as the anchor of one or more steps.
pub struct AttachStep<El> {
    element: El,
    node: Rc<dyn Measure>,
    indices: Vec<usize>,
    tour: Weak<dyn AnchorTarget>,
    registration: AnchorRegistration,
}

impl<El> fmt::Debug for AttachStep<El> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachStep")
            .field("indices", &self.indices)
            .field("registration", &self.registration)
            .finish_non_exhaustive()
    }
}

impl<El> AttachStep<El> {
    /// Wrap `child` and register it for `indices`.
    ///
    /// `fill` selects [`ContainerLayout::Fill`] when a container has to be
    /// injected; it has no effect on elements with a native handle.
    pub fn mount<H, E>(
        host: &H,
        tour: &SpotlightTour<E>,
        indices: impl IntoIterator<Item = usize>,
        child: El,
        fill: bool,
    ) -> Self
    where
        H: AnchorHost<Element = El>,
        E: 'static,
    {
        let (element, node) = match host.native_handle(&child) {
            Some(node) => (child, node),
            None => {
                let layout = if fill {
                    ContainerLayout::Fill
                } else {
                    ContainerLayout::FitContent
                };
                host.container(child, layout)
            }
        };

        let target = tour.anchor_target();
        let indices: Vec<usize> = indices.into_iter().collect();
        let registration = register(&target, &indices, &node);
        let attach = Self {
            element,
            node,
            indices,
            tour: Rc::downgrade(&target),
            registration,
        };
        attach.layout();
        attach
    }

    /// The element to place in the host tree.
    pub fn element(&self) -> &El {
        &self.element
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Re-register for different indices and re-measure.
    pub fn set_indices(&mut self, indices: impl IntoIterator<Item = usize>) {
        let indices: Vec<usize> = indices.into_iter().collect();
        if indices == self.indices {
            return;
        }
        if let Some(target) = self.tour.upgrade() {
            // The old registration unregisters when replaced.
            self.registration = register(&target, &indices, &self.node);
        }
        self.indices = indices;
        self.layout();
    }

    /// Post-render effect: report the element's rectangle when its step is
    /// active and the tour is running. Returns the reported rectangle.
    pub fn layout(&self) -> Option<Rect> {
        let tour = self.tour.upgrade()?;
        let current = tour.current()?;
        if !self.indices.contains(&current) || tour.status() != TourStatus::Running {
            return None;
        }
        let rect = self.node.measure_in_window().filter(Rect::is_finite)?;
        tour.change_spot(rect);
        Some(rect)
    }
}

fn register(
    target: &Rc<dyn AnchorTarget>,
    indices: &[usize],
    node: &Rc<dyn Measure>,
) -> AnchorRegistration {
    let registry = target.registry();
    AnchorRegistration {
        id: registry.register(indices, node),
        registry: Rc::downgrade(registry),
    }
}
