use std::{sync::Arc, time::Duration};

use leptos::{html, prelude::*};
use leptos_use::{
    use_element_bounding, use_raf_fn, use_window_scroll, use_window_size,
    UseElementBoundingReturn, UseRafFnCallbackArgs, UseWindowSizeReturn,
};

use crate::{
    scroll::{compute_fraction, page_fraction, Bounds, MappedFrame, ScrollMapping, ScrollWindow},
    spring::Spring,
};

/// Window height, or `None` before it is known (e.g. while rendering on the server).
fn viewport_height(height: f64) -> Option<f64> {
    (height.is_finite() && height > 0.0).then_some(height)
}

fn document_height() -> f64 {
    #[cfg(feature = "hydrate")]
    {
        document()
            .document_element()
            .map(|el| el.scroll_height() as f64)
            .unwrap_or_default()
    }
    #[cfg(not(feature = "hydrate"))]
    {
        0.0
    }
}

/// How far the whole page has been scrolled, in [0, 1].
pub fn use_page_fraction() -> Signal<f64> {
    let (_, scroll_y) = use_window_scroll();
    let UseWindowSizeReturn { height, .. } = use_window_size();
    Signal::derive(move || {
        let y = scroll_y.get();
        let Some(vh) = viewport_height(height.get()) else {
            return 0.0;
        };
        let doc_h = document_height();
        if doc_h <= 0.0 {
            return 0.0;
        }
        page_fraction(y, doc_h, vh)
    })
}

/// Maps the scroll position of `target` within `window` through `mapping`,
/// recomputed on every scroll or resize.
pub fn use_scroll_frame(
    target: NodeRef<html::Section>,
    window: ScrollWindow,
    mapping: Arc<ScrollMapping>,
) -> Memo<MappedFrame> {
    let UseElementBoundingReturn { top, height, .. } = use_element_bounding(target);
    let UseWindowSizeReturn {
        height: window_height,
        ..
    } = use_window_size();
    Memo::new(move |_| {
        let fraction = match viewport_height(window_height.get()) {
            Some(vh) => compute_fraction(
                Bounds::new(top.get(), height.get()),
                Bounds::new(0.0, vh),
                window,
            ),
            None => 0.0,
        };
        mapping.frame(fraction)
    })
}

/// Thin bar across the top of the page tracking overall scroll progress.
#[component]
pub fn ScrollProgress() -> impl IntoView {
    let target = use_page_fraction();
    let spring = StoredValue::new(Spring::scroll_progress());
    let (shown, set_shown) = signal(0.0_f64);

    let _ = use_raf_fn(move |args: UseRafFnCallbackArgs| {
        let dt = Duration::from_secs_f64(args.delta.max(0.0) / 1000.0);
        let goal = target.get_untracked();
        let position = spring.try_update_value(|s| {
            s.set_target(goal);
            s.step(dt)
        });
        if let Some(position) = position {
            if position != shown.get_untracked() {
                set_shown.set(position);
            }
        }
    });

    view! {
        <div
            class="fixed top-0 left-0 right-0 h-1 z-50 origin-left bg-gradient-to-r from-cyan via-blue to-purple"
            style:transform=move || format!("scaleX({})", shown.get())
            role="progressbar"
            aria-valuemin="0"
            aria-valuemax="100"
            aria-valuenow=move || (target.get() * 100.0).round().to_string()
        />
    }
}

/// A `<section>` that fades and slides as it passes through the viewport.
#[component]
pub fn RevealSection(
    #[prop(into)] id: String,
    #[prop(optional, into)] class: String,
    mapping: Arc<ScrollMapping>,
    children: Children,
) -> impl IntoView {
    let node = NodeRef::<html::Section>::new();
    let frame = use_scroll_frame(node, ScrollWindow::THROUGH, mapping);

    view! {
        <section
            id=id
            node_ref=node
            class=class
            style:opacity=move || frame.with(|f| f.number("opacity", 1.0).to_string())
            style:transform=move || frame.with(|f| format!("translateY({})", f.css("y")))
        >
            {children()}
        </section>
    }
}
