//! Step-transition protocol: ordering, no-ops, stop events, pause/resume and
//! failing hooks.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use spotlight::prelude::*;
use spotlight::{TooltipFade, TourError};
use tokio::sync::oneshot;

const FRAME: Duration = Duration::from_millis(16);

type Slot<E> = Rc<RefCell<Option<SpotlightTour<E>>>>;

/// Poll `fut` to completion while ticking the overlay every frame.
async fn drive<E: 'static, T>(tour: &SpotlightTour<E>, mut fut: LocalBoxFuture<'static, T>) -> T {
    for _ in 0..10_000 {
        if let Some(out) = (&mut fut).now_or_never() {
            return out;
        }
        tour.tick(FRAME);
        tokio::task::yield_now().await;
    }
    panic!("transition never settled");
}

fn plain(n: usize) -> Vec<TourStep<usize>> {
    (0..n).map(|_| TourStep::new(|props| props.current)).collect()
}

fn no_fade() -> TourConfig {
    TourConfig::default().tooltip(TooltipFade {
        delay: Duration::ZERO,
        duration: Duration::ZERO,
    })
}

#[tokio::test]
async fn tooltip_hides_before_hook_runs_before_index_changes() {
    let slot: Slot<usize> = Rc::default();
    let log = Rc::new(RefCell::new(Vec::new()));
    let steps = (0..2)
        .map(|i| {
            let slot = Rc::clone(&slot);
            let log = Rc::clone(&log);
            TourStep::new(|props: &RenderProps| props.current).before(move |_| {
                let tour = slot.borrow().clone().expect("tour installed");
                log.borrow_mut().push(format!(
                    "before {i}: current={:?} tooltip={}",
                    tour.current(),
                    tour.tooltip_opacity()
                ));
                Ok(())
            })
        })
        .collect();
    let tour = SpotlightTour::new(steps);
    *slot.borrow_mut() = Some(tour.clone());

    drive(&tour, tour.start()).await.unwrap();
    assert_eq!(tour.current(), Some(0));
    tour.finish_animations();
    assert_eq!(tour.tooltip_opacity(), 1.0);

    let mut next = tour.next();
    assert!((&mut next).now_or_never().is_none(), "waits for the fade-out");
    assert!(log.borrow().len() == 1, "hook must not run while hiding");
    drive(&tour, next).await.unwrap();

    assert_eq!(tour.current(), Some(1));
    assert_eq!(
        *log.borrow(),
        vec![
            "before 0: current=None tooltip=0".to_string(),
            "before 1: current=Some(0) tooltip=0".to_string(),
        ]
    );
}

#[tokio::test]
async fn async_hook_is_awaited() {
    let (tx, rx) = oneshot::channel::<()>();
    let gate = Rc::new(RefCell::new(Some(rx)));
    let step = TourStep::new(|_: &RenderProps| ()).before_async(move |_| {
        let rx = gate.borrow_mut().take();
        async move {
            match rx {
                Some(rx) => rx.await.map_err(Into::into),
                None => Ok(()),
            }
        }
    });
    let tour = SpotlightTour::new(vec![step]);

    let mut start = tour.start();
    assert!((&mut start).now_or_never().is_none());
    assert_eq!(tour.current(), None);
    assert_eq!(tour.status(), TourStatus::Idle);

    tx.send(()).unwrap();
    drive(&tour, start).await.unwrap();
    assert_eq!(tour.current(), Some(0));
}

#[tokio::test]
async fn out_of_range_go_to_is_ignored() {
    let hooks = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hooks);
    let mut steps = plain(2);
    steps.push(TourStep::new(|p: &RenderProps| p.current).before(move |_| {
        counter.set(counter.get() + 1);
        Ok(())
    }));
    let tour = SpotlightTour::new(steps);

    drive(&tour, tour.start()).await.unwrap();
    tour.change_spot(Rect::new(1.0, 1.0, 10.0, 10.0));
    drive(&tour, tour.go_to(3)).await.unwrap();
    drive(&tour, tour.go_to(usize::MAX)).await.unwrap();

    assert_eq!(tour.current(), Some(0));
    assert_eq!(tour.status(), TourStatus::Running);
    assert_eq!(tour.spot(), Rect::new(1.0, 1.0, 10.0, 10.0));
    assert_eq!(hooks.get(), 0);
}

#[tokio::test]
async fn empty_tour_never_starts() {
    let tour: SpotlightTour<()> = SpotlightTour::new(Vec::new());
    drive(&tour, tour.start()).await.unwrap();
    assert_eq!(tour.status(), TourStatus::Idle);
    assert_eq!(tour.current(), None);
}

#[tokio::test]
async fn next_on_last_step_stops_with_event() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let tour = SpotlightTour::builder(plain(3))
        .on_stop(move |event| sink.borrow_mut().push(event))
        .build();

    drive(&tour, tour.go_to(2)).await.unwrap();
    tour.change_spot(Rect::new(0.0, 0.0, 20.0, 20.0));
    drive(&tour, tour.next()).await.unwrap();

    assert_eq!(tour.status(), TourStatus::Idle);
    assert_eq!(tour.current(), None);
    assert_eq!(tour.spot(), Rect::ZERO);
    assert!(tour.render_overlay().is_none());
    assert_eq!(
        *events.borrow(),
        vec![StopEvent {
            index: 2,
            is_last: true
        }]
    );
}

#[tokio::test]
async fn stop_mid_tour_reports_not_last_and_idle_stop_is_silent() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let tour = SpotlightTour::builder(plain(3))
        .on_stop(move |event| sink.borrow_mut().push(event))
        .build();

    tour.stop();
    assert!(events.borrow().is_empty());

    drive(&tour, tour.go_to(1)).await.unwrap();
    tour.stop();
    tour.stop();
    assert_eq!(
        *events.borrow(),
        vec![StopEvent {
            index: 1,
            is_last: false
        }]
    );
}

#[tokio::test]
async fn previous_at_first_step_is_noop() {
    let tour = SpotlightTour::new(plain(3));

    drive(&tour, tour.previous()).await.unwrap();
    assert_eq!(tour.current(), None);

    drive(&tour, tour.start()).await.unwrap();
    drive(&tour, tour.previous()).await.unwrap();
    assert_eq!(tour.current(), Some(0));

    drive(&tour, tour.go_to(2)).await.unwrap();
    drive(&tour, tour.previous()).await.unwrap();
    assert_eq!(tour.current(), Some(1));
}

#[tokio::test]
async fn next_while_idle_is_noop() {
    let tour = SpotlightTour::new(plain(2));
    drive(&tour, tour.next()).await.unwrap();
    assert_eq!(tour.status(), TourStatus::Idle);
}

#[tokio::test]
async fn pause_and_resume_keep_step_and_spot() {
    let hooks = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hooks);
    let step = TourStep::new(|p: &RenderProps| p.current).before(move |_| {
        counter.set(counter.get() + 1);
        Ok(())
    });
    let tour = SpotlightTour::new(vec![step, TourStep::new(|p| p.current)]);
    let spot = Rect::new(30.0, 40.0, 50.0, 60.0);

    drive(&tour, tour.start()).await.unwrap();
    tour.change_spot(spot);

    tour.resume();
    assert_eq!(tour.status(), TourStatus::Running, "resume only from paused");

    tour.pause();
    assert_eq!(tour.status(), TourStatus::Paused);
    tour.pause();
    assert_eq!(tour.status(), TourStatus::Paused);

    tour.resume();
    assert_eq!(tour.status(), TourStatus::Running);
    assert_eq!(tour.current(), Some(0));
    assert_eq!(tour.spot(), spot);
    assert_eq!(hooks.get(), 1);

    tour.stop();
    tour.pause();
    assert_eq!(tour.status(), TourStatus::Idle, "pause only from running");
}

#[tokio::test]
async fn failing_hook_keeps_previous_step() {
    let step_one = TourStep::new(|p: &RenderProps| p.current).before(|_| Err("offline".into()));
    let tour = SpotlightTour::new(vec![TourStep::new(|p| p.current), step_one]);

    drive(&tour, tour.start()).await.unwrap();
    tour.finish_animations();

    let err = drive(&tour, tour.next()).await.unwrap_err();
    assert!(matches!(err, TourError::BeforeHook { index: 1, .. }));
    assert_eq!(err.to_string(), "before hook of step 1 failed: offline");
    assert_eq!(tour.current(), Some(0));
    assert_eq!(tour.status(), TourStatus::Running);

    // The previous step's tooltip comes back.
    tour.finish_animations();
    assert_eq!(tour.tooltip_opacity(), 1.0);
}

#[tokio::test]
async fn overlapping_transitions_last_completion_wins() {
    let (tx, rx) = oneshot::channel::<()>();
    let gate = Rc::new(RefCell::new(Some(rx)));
    let slow = TourStep::new(|p: &RenderProps| p.current).before_async(move |_| {
        let rx = gate.borrow_mut().take();
        async move {
            match rx {
                Some(rx) => rx.await.map_err(Into::into),
                None => Ok(()),
            }
        }
    });
    let tour = SpotlightTour::builder(vec![
        TourStep::new(|p| p.current),
        slow,
        TourStep::new(|p| p.current),
    ])
    .config(no_fade())
    .build();

    drive(&tour, tour.start()).await.unwrap();

    let mut to_slow = tour.go_to(1);
    assert!((&mut to_slow).now_or_never().is_none());
    drive(&tour, tour.go_to(2)).await.unwrap();
    assert_eq!(tour.current(), Some(2));

    tx.send(()).unwrap();
    drive(&tour, to_slow).await.unwrap();
    assert_eq!(tour.current(), Some(1));
}

#[tokio::test]
async fn stop_does_not_cancel_a_pending_transition() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let tour = SpotlightTour::builder(plain(3))
        .on_stop(move |event| sink.borrow_mut().push(event))
        .build();
    drive(&tour, tour.start()).await.unwrap();
    tour.finish_animations();

    // The tooltip is fully shown, so `next` waits for the fade-out.
    let mut next = tour.next();
    assert!((&mut next).now_or_never().is_none());

    tour.stop();
    assert_eq!(tour.status(), TourStatus::Idle);
    assert_eq!(
        *events.borrow(),
        vec![StopEvent {
            index: 0,
            is_last: false
        }]
    );

    // Stopping released the fade; the transition still lands.
    assert!(matches!(next.now_or_never(), Some(Ok(()))));
    assert_eq!(tour.current(), Some(1));
    assert_eq!(tour.status(), TourStatus::Running);
    assert_eq!(events.borrow().len(), 1);
}

#[tokio::test]
async fn go_to_from_paused_runs_again() {
    let tour = SpotlightTour::new(plain(3));
    drive(&tour, tour.start()).await.unwrap();
    tour.pause();
    drive(&tour, tour.go_to(2)).await.unwrap();
    assert_eq!(tour.current(), Some(2));
    assert_eq!(tour.status(), TourStatus::Running);
}

#[tokio::test]
async fn controls_drive_the_same_tour() {
    let tour = SpotlightTour::new(plain(3));
    let controls = tour.controls();
    drive(&tour, controls.go_to(1)).await.unwrap();
    assert_eq!(tour.current(), Some(1));
    assert_eq!(controls.current(), Some(1));
    controls.pause();
    assert_eq!(tour.status(), TourStatus::Paused);
    controls.stop();
    assert_eq!(tour.current(), None);
}

#[tokio::test]
async fn render_callback_may_navigate() {
    let tour = SpotlightTour::new(vec![
        TourStep::new(|props: &RenderProps| {
            props.stop();
            props.current
        }),
        TourStep::new(|p| p.current),
    ]);
    drive(&tour, tour.start()).await.unwrap();
    tour.change_spot(Rect::new(0.0, 0.0, 10.0, 10.0));
    let scene = tour.render_overlay().expect("running with a spot");
    assert_eq!(scene.tooltip.content, 0);
    assert_eq!(tour.status(), TourStatus::Idle);
}
