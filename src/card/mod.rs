//! Page glue: mounts the scratch card, owns the reveal state and plays the
//! fireworks once the card is uncovered.
//!
//! All state lives in `CARD` and is only touched from DOM callbacks and the
//! animation frame loop. The scratch pad's reveal callback just raises a flag;
//! `settle_reveal` picks it up after the state borrow is released, so the page
//! callback (arbitrary JS) never runs while `CARD` is borrowed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::config::CardConfig;
use crate::error::CardError;
use crate::fireworks::Fireworks;
use crate::mask::paint_mask;
use crate::scratch::{PointerInput, ScratchPad};
use crate::surface::{CanvasSurface, Surface};

mod input;
mod overlay;

use overlay::Overlay;

struct Show {
    fireworks: Fireworks,
    surface: CanvasSurface,
}

struct CardState {
    config: CardConfig,
    overlay: Overlay,
    /// `None` when the 2D context could not be created; input is then ignored.
    surface: Option<CanvasSurface>,
    pad: ScratchPad,
    rng: SmallRng,
    /// Reveal state owned by the page. Raised by the pad or by `reveal`.
    revealed: Rc<Cell<bool>>,
    celebrated: bool,
    on_reveal: Option<js_sys::Function>,
    show: Option<Show>,
}

thread_local! {
    static CARD: RefCell<Option<CardState>> = const { RefCell::new(None) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub fn mount(config: CardConfig, on_reveal: Option<js_sys::Function>) -> Result<(), CardError> {
    config.validate()?;
    if CARD.with(|c| c.borrow().is_some()) {
        log::warn!("card already mounted; ignoring second mount");
        return Ok(());
    }

    let win = window().ok_or(CardError::NoWindow)?;
    let doc = win.document().ok_or(CardError::NoDocument)?;
    let overlay = Overlay::build(&doc, &config)?;
    let canvas = overlay.canvas().clone();

    let mut rng = SmallRng::from_entropy();
    let surface = match CanvasSurface::new(&canvas, true) {
        Ok(mut s) => {
            paint_mask(&mut s, &mut rng, &config.scratch);
            Some(s)
        }
        Err(e) => {
            log::warn!("scratch surface unavailable ({e}); card stays unpainted");
            None
        }
    };

    let revealed = Rc::new(Cell::new(false));
    let mut pad = ScratchPad::new(config.scratch.clone());
    {
        let flag = revealed.clone();
        pad.on_reveal(move || flag.set(true));
    }

    CARD.with(|c| {
        c.replace(Some(CardState {
            config,
            overlay,
            surface,
            pad,
            rng,
            revealed,
            celebrated: false,
            on_reveal,
            show: None,
        }))
    });

    input::attach(&canvas)?;
    log::info!("scratch card mounted");
    Ok(())
}

/// Feed one mapped input event to the pad.
fn dispatch(input: PointerInput) {
    CARD.with(|c| {
        if let Some(st) = c.borrow_mut().as_mut() {
            if let Some(surface) = st.surface.as_mut() {
                st.pad.handle(surface, input, &mut st.rng);
            }
        }
    });
    settle_reveal();
}

/// Reveal on the page's behalf (e.g. a "show me" button).
pub fn reveal() {
    CARD.with(|c| {
        if let Some(st) = c.borrow_mut().as_mut() {
            match st.surface.as_mut() {
                Some(surface) => st.pad.force_reveal(surface),
                None => log::warn!("forcing reveal without a surface"),
            }
            st.revealed.set(true);
        }
    });
    settle_reveal();
}

pub fn is_revealed() -> bool {
    CARD.with(|c| c.borrow().as_ref().is_some_and(|st| st.revealed.get()))
}

/// Run the one-time reveal side effects if the flag was raised.
fn settle_reveal() {
    let outcome = CARD.with(|c| {
        let mut guard = c.borrow_mut();
        let st = guard.as_mut()?;
        if !st.revealed.get() || st.celebrated {
            return None;
        }
        st.celebrated = true;
        st.overlay.show_revealed();
        let started = start_show(st);
        Some((st.on_reveal.take(), started))
    });
    let Some((callback, started)) = outcome else {
        return;
    };
    if started {
        start_show_loop();
    }
    if let Some(f) = callback {
        if let Err(e) = f.call0(&JsValue::NULL) {
            log::error!("on_reveal callback threw: {e:?}");
        }
    }
}

fn start_show(st: &mut CardState) -> bool {
    let Some(win) = window() else {
        return false;
    };
    let Some(doc) = win.document() else {
        return false;
    };
    let now = win.performance().map(|p| p.now()).unwrap_or(0.0);
    let result = overlay::confetti_canvas(&doc, &win, &st.config.host_id)
        .and_then(|canvas| CanvasSurface::new(&canvas, false));
    match result {
        Ok(surface) => {
            let (w, h) = surface.size();
            st.show = Some(Show {
                fireworks: Fireworks::new(st.config.fireworks.clone(), (w as f64, h as f64), now),
                surface,
            });
            true
        }
        Err(e) => {
            log::warn!("fireworks skipped: {e}");
            false
        }
    }
}

/// Returns whether another frame is wanted.
fn show_tick(ts: f64) -> bool {
    CARD.with(|c| {
        let mut guard = c.borrow_mut();
        let Some(st) = guard.as_mut() else {
            return false;
        };
        let Some(show) = st.show.as_mut() else {
            return false;
        };
        let (w, h) = show.surface.size();
        show.fireworks.set_viewport((w as f64, h as f64));
        show.fireworks.update(ts, &mut st.rng);
        show.fireworks.render(&mut show.surface);
        if show.fireworks.is_finished(ts) {
            show.surface.clear();
            log::debug!("fireworks finished");
            st.show = None;
            return false;
        }
        true
    })
}

fn start_show_loop() {
    let f = frame_loop(show_tick);
    request_frame(&f);
}

/// Wrap `tick` in a self-rescheduling animation frame callback. Once `tick`
/// returns false the callback clears its own slot, which frees it after this
/// last frame returns.
fn frame_loop(mut tick: impl FnMut(f64) -> bool + 'static) -> FrameCallback {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        if tick(ts) {
            request_frame(&f);
        } else {
            *f.borrow_mut() = None;
        }
    }) as Box<dyn FnMut(f64)>));
    g
}

fn request_frame(f: &FrameCallback) {
    if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
