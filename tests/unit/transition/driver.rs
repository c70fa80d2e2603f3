use super::*;
use crate::transition::state::visual_state;

fn driver(timings: TransitionTimings) -> (OverlayDriver, SharedVisual, SharedVisual) {
    let overlay = SharedVisual::default();
    let button = SharedVisual::default();
    let d = OverlayDriver::new(Box::new(overlay.clone()), Box::new(button.clone()), timings);
    (d, overlay, button)
}

#[test]
fn initial_state_is_hidden() {
    let (_d, overlay, button) = driver(TransitionTimings::default());
    assert_eq!(overlay.get().opacity, 0.0);
    assert_eq!(button.get().opacity, 0.0);
    assert_eq!(button.get().offset_y, BUTTON_HIDDEN_OFFSET_PX);
}

#[test]
fn overlay_and_button_ease_in_with_their_own_durations() {
    let (mut d, overlay, button) = driver(TransitionTimings::default());
    d.set_target(&visual_state(0.95, 100), 0.0);

    d.tick(0.05);
    let o = overlay.get().opacity;
    let b = button.get().opacity;
    assert!(o > 0.0 && o < 1.0);
    assert!(b > 0.0 && b < o);

    d.tick(0.1);
    assert_eq!(overlay.get().opacity, 1.0);
    assert!(button.get().opacity < 1.0);
    assert!(!d.is_settled());

    d.tick(0.3);
    assert_eq!(button.get(), VisualProps { opacity: 1.0, offset_y: 0.0 });
    assert!(d.is_settled());
}

#[test]
fn scrolling_back_reverses_smoothly() {
    let (mut d, overlay, _button) = driver(TransitionTimings::default());
    d.set_target(&visual_state(1.0, 10), 0.0);
    d.tick(0.05);
    let mid = overlay.get().opacity;

    d.set_target(&visual_state(0.2, 10), 0.05);
    d.tick(0.05);
    assert!((overlay.get().opacity - mid).abs() < 1e-9);
    d.tick(0.2);
    assert_eq!(overlay.get().opacity, 0.0);
}

#[test]
fn immediate_timings_apply_on_next_tick() {
    let (mut d, overlay, button) = driver(TransitionTimings::immediate());
    d.set_target(&visual_state(0.755, 10), 1.0);
    d.tick(1.0);
    assert!((overlay.get().opacity - 0.5).abs() < 1e-9);
    assert_eq!(button.get().opacity, 0.0);
}

#[test]
fn detached_driver_writes_nothing() {
    let (mut d, overlay, _button) = driver(TransitionTimings::default());
    d.set_target(&visual_state(1.0, 10), 0.0);
    d.tick(0.02);
    let frozen = overlay.get();
    d.detach();
    d.set_target(&visual_state(0.0, 10), 0.5);
    assert_eq!(d.tick(1.0), None);
    assert_eq!(overlay.get(), frozen);
    assert!(d.is_detached());
}
