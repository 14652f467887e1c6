//! Property-based invariant tests for the tour state machine.
//!
//! Random operation sequences are applied to a tour and to a reference
//! model; after every operation:
//!
//! 1. `current` and `status` match the model.
//! 2. `status == Idle` exactly when `current` is `None`.
//! 3. `current` is always a valid index.
//! 4. Right after `stop` the spot is empty and nothing is rendered.
//! 5. Every active→idle change produces exactly one stop event, naming the
//!    step that was active.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures_util::FutureExt;
use proptest::prelude::*;
use spotlight::prelude::*;
use spotlight::TooltipFade;

#[derive(Debug, Clone)]
enum Op {
    Start,
    Next,
    Previous,
    GoTo(usize),
    Pause,
    Resume,
    Stop,
    Spot(Rect),
    Tick(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Start),
        3 => Just(Op::Next),
        2 => Just(Op::Previous),
        1 => (0usize..8).prop_map(Op::GoTo),
        1 => Just(Op::Pause),
        1 => Just(Op::Resume),
        1 => Just(Op::Stop),
        2 => (0.0f64..300.0, 0.0f64..600.0, 0.0f64..100.0, 0.0f64..100.0)
            .prop_map(|(x, y, w, h)| Op::Spot(Rect::new(x, y, w, h))),
        1 => (0u64..500).prop_map(Op::Tick),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Model {
    current: Option<usize>,
    status: TourStatus,
}

impl Model {
    fn enter(&mut self, index: usize, len: usize) {
        if index < len {
            self.current = Some(index);
            self.status = TourStatus::Running;
        }
    }

    fn stop(&mut self) -> Option<usize> {
        self.status = TourStatus::Idle;
        self.current.take()
    }

    /// Apply `op`; returns the index reported to `on_stop`, if any.
    fn apply(&mut self, op: &Op, len: usize) -> Option<usize> {
        match *op {
            Op::Start => self.enter(0, len),
            Op::GoTo(index) => self.enter(index, len),
            Op::Next => match self.current {
                Some(c) if c + 1 >= len => return self.stop(),
                Some(c) => self.enter(c + 1, len),
                None => {}
            },
            Op::Previous => {
                if let Some(c) = self.current.filter(|&c| c > 0) {
                    self.enter(c - 1, len);
                }
            }
            Op::Pause if self.status == TourStatus::Running => self.status = TourStatus::Paused,
            Op::Resume if self.status == TourStatus::Paused => self.status = TourStatus::Running,
            Op::Stop => return self.stop(),
            _ => {}
        }
        None
    }
}

fn run_op(tour: &SpotlightTour<usize>, op: &Op) {
    let fut = match *op {
        Op::Start => tour.start(),
        Op::Next => tour.next(),
        Op::Previous => tour.previous(),
        Op::GoTo(index) => tour.go_to(index),
        Op::Pause => return tour.pause(),
        Op::Resume => return tour.resume(),
        Op::Stop => return tour.stop(),
        Op::Spot(rect) => return tour.change_spot(rect),
        Op::Tick(ms) => return tour.tick(Duration::from_millis(ms)),
    };
    fut.now_or_never()
        .expect("zero fade never waits")
        .expect("no hooks to fail");
}

proptest! {
    #[test]
    fn operations_follow_the_model(
        len in 0usize..6,
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let stops = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&stops);
        let tour = SpotlightTour::builder(
            (0..len).map(|_| TourStep::new(|p: &RenderProps| p.current)).collect(),
        )
        .config(TourConfig::default().tooltip(TooltipFade {
            delay: Duration::ZERO,
            duration: Duration::ZERO,
        }))
        .on_stop(move |event: StopEvent| sink.borrow_mut().push(event))
        .build();

        let mut model = Model { current: None, status: TourStatus::Idle };
        let mut expected_stops = Vec::new();

        for op in &ops {
            let last = len.checked_sub(1);
            if let Some(index) = model.apply(op, len) {
                expected_stops.push(StopEvent { index, is_last: Some(index) == last });
            }
            run_op(&tour, op);

            prop_assert_eq!(tour.current(), model.current, "after {:?}", op);
            prop_assert_eq!(tour.status(), model.status, "after {:?}", op);
            prop_assert_eq!(tour.status() == TourStatus::Idle, tour.current().is_none());
            if let Some(current) = tour.current() {
                prop_assert!(current < len);
            } else {
                prop_assert!(tour.render_overlay().is_none());
            }
            if matches!(op, Op::Stop) {
                prop_assert_eq!(tour.spot(), Rect::ZERO);
            }
        }
        prop_assert_eq!(&*stops.borrow(), &expected_stops);
    }

    #[test]
    fn scene_exists_only_while_running_on_a_spot(
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let tour = SpotlightTour::builder(
            (0..3).map(|_| TourStep::new(|p: &RenderProps| p.current)).collect(),
        )
        .config(TourConfig::default().tooltip(TooltipFade {
            delay: Duration::ZERO,
            duration: Duration::ZERO,
        }))
        .viewport(Rect::new(0.0, 0.0, 390.0, 844.0))
        .build();

        for op in &ops {
            run_op(&tour, op);
            let visible = tour.status() == TourStatus::Running && !tour.spot().is_empty();
            let scene = tour.render_overlay();
            prop_assert_eq!(scene.is_some(), visible, "after {:?}", op);
            if let Some(scene) = scene {
                prop_assert_eq!(Some(scene.tooltip.content), tour.current());
                prop_assert!(scene.cutout_opacity >= 0.0 && scene.cutout_opacity <= 1.0);
            }
        }
    }
}
