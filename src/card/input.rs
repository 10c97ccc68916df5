// Mouse and touch listeners on the scratch canvas. Client coordinates are
// mapped into canvas pixels here; only the first touch point is used.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

use super::dispatch;
use crate::geometry::{ClientRect, Point, map_client_point};
use crate::scratch::PointerInput;

fn to_surface(canvas: &HtmlCanvasElement, client: Point) -> Option<Point> {
    let r = canvas.get_bounding_client_rect();
    let rect = ClientRect {
        left: r.left(),
        top: r.top(),
        width: r.width(),
        height: r.height(),
    };
    map_client_point(client, rect, (canvas.width(), canvas.height()))
}

fn first_touch(evt: &TouchEvent) -> Option<Point> {
    evt.touches()
        .get(0)
        .map(|t| Point::new(t.client_x() as f64, t.client_y() as f64))
}

#[derive(Clone, Copy)]
enum Gesture {
    Press,
    Drag,
}

impl Gesture {
    fn input(self, p: Point) -> PointerInput {
        match self {
            Gesture::Press => PointerInput::Down(p),
            Gesture::Drag => PointerInput::Move(p),
        }
    }
}

fn on_mouse(
    canvas: &HtmlCanvasElement,
    event: &str,
    gesture: Gesture,
) -> Result<(), JsValue> {
    let target = canvas.clone();
    let closure = Closure::wrap(Box::new(move |evt: MouseEvent| {
        let client = Point::new(evt.client_x() as f64, evt.client_y() as f64);
        if let Some(p) = to_surface(&target, client) {
            dispatch(gesture.input(p));
        }
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn on_touch(
    canvas: &HtmlCanvasElement,
    event: &str,
    gesture: Gesture,
) -> Result<(), JsValue> {
    let target = canvas.clone();
    let closure = Closure::wrap(Box::new(move |evt: TouchEvent| {
        // Keep the page from scrolling while scratching.
        evt.prevent_default();
        if let Some(p) = first_touch(&evt).and_then(|c| to_surface(&target, c)) {
            dispatch(gesture.input(p));
        }
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn on_release(canvas: &HtmlCanvasElement, event: &str, input: PointerInput) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
        dispatch(input);
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

pub(super) fn attach(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    on_mouse(canvas, "mousedown", Gesture::Press)?;
    on_mouse(canvas, "mousemove", Gesture::Drag)?;
    on_touch(canvas, "touchstart", Gesture::Press)?;
    on_touch(canvas, "touchmove", Gesture::Drag)?;

    on_release(canvas, "mouseup", PointerInput::Up)?;
    on_release(canvas, "touchend", PointerInput::Up)?;
    on_release(canvas, "touchcancel", PointerInput::Cancel)?;
    on_release(canvas, "mouseleave", PointerInput::Leave)?;
    Ok(())
}
