// DOM scaffolding around the scratch canvas: host box, hidden message, hint
// line, footer and the full-window confetti layer. Existing elements with the
// expected ids are reused so a page can provide its own markup.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, Window};

use crate::config::CardConfig;
use crate::error::CardError;

const HOST_STYLE: &str = "position:relative; display:flex; align-items:center; justify-content:center; width:100%; max-width:450px; aspect-ratio:1/1; margin:2rem auto 0; user-select:none;";
const MESSAGE_STYLE: &str = "position:absolute; inset:0; display:flex; align-items:center; justify-content:center; z-index:0; transform:rotate(-12deg); font-family:'Montserrat', sans-serif; font-weight:700; font-size:1.5rem; letter-spacing:0.05em; color:#e11d48; text-align:center; padding:0 1rem;";
const CANVAS_STYLE: &str = "position:absolute; inset:0; width:100%; height:100%; z-index:10; cursor:pointer; touch-action:none; opacity:1; transition:opacity 700ms;";
const CANVAS_REVEALED_STYLE: &str = "position:absolute; inset:0; width:100%; height:100%; z-index:10; touch-action:none; opacity:0; pointer-events:none; transition:opacity 700ms;";
const HINT_STYLE: &str = "position:absolute; top:-2rem; left:0; right:0; text-align:center; z-index:20; font-family:'Montserrat', sans-serif; font-size:0.75rem; text-transform:uppercase; letter-spacing:0.2em; color:#a8a29e;";
const FOOTER_STYLE: &str = "display:none; text-align:center; margin-top:1.5rem; font-family:'Great Vibes', cursive; font-size:2.5rem; color:#292524;";
const FOOTER_SHOWN_STYLE: &str = "display:block; text-align:center; margin-top:1.5rem; font-family:'Great Vibes', cursive; font-size:2.5rem; color:#292524;";
const CONFETTI_STYLE: &str = "position:fixed; inset:0; width:100%; height:100%; pointer-events:none; z-index:50;";

pub(super) struct Overlay {
    canvas: HtmlCanvasElement,
    hint: Option<Element>,
    footer: Element,
}

fn child(doc: &Document, parent: &Element, tag: &str, id: &str) -> Result<Element, CardError> {
    if let Some(el) = doc.get_element_by_id(id) {
        return Ok(el);
    }
    let el = doc.create_element(tag)?;
    el.set_id(id);
    parent.append_child(&el)?;
    Ok(el)
}

impl Overlay {
    pub(super) fn build(doc: &Document, cfg: &CardConfig) -> Result<Self, CardError> {
        let body = doc.body().ok_or(CardError::NoDocument)?;
        let host: Element = match doc.get_element_by_id(&cfg.host_id) {
            Some(el) => el,
            None => {
                let el = doc.create_element("div")?;
                el.set_id(&cfg.host_id);
                body.append_child(&el)?;
                el
            }
        };
        host.set_attribute("style", HOST_STYLE).ok();

        let id = |suffix: &str| format!("{}-{suffix}", cfg.host_id);

        let message = child(doc, &host, "div", &id("message"))?;
        message.set_text_content(Some(&cfg.message));
        message.set_attribute("style", MESSAGE_STYLE).ok();

        let canvas_id = id("canvas");
        let canvas: HtmlCanvasElement = child(doc, &host, "canvas", &canvas_id)?
            .dyn_into()
            .map_err(|_| CardError::NotACanvas(canvas_id.clone()))?;
        canvas.set_width(cfg.scratch.width);
        canvas.set_height(cfg.scratch.height);
        canvas.set_attribute("style", CANVAS_STYLE).ok();

        let hint = child(doc, &host, "div", &id("hint"))?;
        hint.set_text_content(Some(&cfg.hint));
        hint.set_attribute("style", HINT_STYLE).ok();

        // Footer sits below the card, not inside the square host.
        let footer = match doc.get_element_by_id(&id("footer")) {
            Some(el) => el,
            None => {
                let el = doc.create_element("div")?;
                el.set_id(&id("footer"));
                host.after_with_node_1(&el)?;
                el
            }
        };
        footer.set_text_content(Some(&cfg.footer));
        footer.set_attribute("style", FOOTER_STYLE).ok();

        Ok(Self {
            canvas,
            hint: Some(hint),
            footer,
        })
    }

    pub(super) fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Fade the mask out, drop the hint and show the footer.
    pub(super) fn show_revealed(&mut self) {
        self.canvas
            .set_attribute("style", CANVAS_REVEALED_STYLE)
            .ok();
        if let Some(hint) = self.hint.take() {
            hint.remove();
        }
        self.footer.set_attribute("style", FOOTER_SHOWN_STYLE).ok();
    }
}

/// Full-window canvas for the fireworks, sized to the current viewport.
pub(super) fn confetti_canvas(
    doc: &Document,
    win: &Window,
    host_id: &str,
) -> Result<HtmlCanvasElement, CardError> {
    let body = doc.body().ok_or(CardError::NoDocument)?;
    let id = format!("{host_id}-confetti");
    let canvas: HtmlCanvasElement = child(doc, &body, "canvas", &id)?
        .dyn_into()
        .map_err(|_| CardError::NotACanvas(id.clone()))?;
    let w = win.inner_width()?.as_f64().unwrap_or(800.0);
    let h = win.inner_height()?.as_f64().unwrap_or(600.0);
    canvas.set_width(w as u32);
    canvas.set_height(h as u32);
    canvas.set_attribute("style", CONFETTI_STYLE).ok();
    Ok(canvas)
}
