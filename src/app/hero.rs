use std::sync::Arc;

use leptos::{html, prelude::*};
use leptos_use::use_interval_fn;

use super::motion::use_scroll_frame;
use crate::scroll::{hero_parallax, ScrollMapping, ScrollWindow};

const SUBTITLES: [&str; 5] = [
    "Creative Full-Stack Developer & Designer",
    "Digital Experience & Innovation Architect",
    "Frontend Specialist with Pixel-Perfect UI/UX",
    "Backend & API Engineer for Scalable Web Apps",
    "User Experience Visionary & Interaction Designer",
];
const SUBTITLE_INTERVAL_MS: u64 = 3000;

/// Scrolls to the element with `id`, if present.
pub fn scroll_to_id(id: &str) {
    if let Some(el) = document().get_element_by_id(id) {
        el.scroll_into_view();
    }
}

#[component]
pub fn Hero() -> impl IntoView {
    let node = NodeRef::<html::Section>::new();
    let mapping = hero_parallax().unwrap_or_else(|e| {
        log::error!("hero parallax disabled: {e}");
        ScrollMapping::new()
    });
    let frame = use_scroll_frame(node, ScrollWindow::LEAVING, Arc::new(mapping));

    let (subtitle, set_subtitle) = signal(0_usize);
    let _ = use_interval_fn(
        move || set_subtitle.update(|i| *i = (*i + 1) % SUBTITLES.len()),
        SUBTITLE_INTERVAL_MS,
    );

    view! {
        <section
            id="hero"
            node_ref=node
            class="relative min-h-screen flex items-center justify-center overflow-hidden"
        >
            <div
                class="absolute inset-0 hero-backdrop pointer-events-none"
                style:transform=move || {
                    frame.with(|f| format!("translateY({})", f.css("background_y")))
                }
            />
            <div
                class="relative z-10 text-center px-4 space-y-6 md:space-y-8"
                style:opacity=move || frame.with(|f| f.number("opacity", 1.0).to_string())
                style:transform=move || frame.with(|f| format!("translateY({})", f.css("y")))
            >
                <p class="text-base md:text-lg text-foreground/70 font-light tracking-wide">
                    "Hello, I'm"
                </p>
                <h1 class="text-5xl md:text-8xl lg:text-9xl font-bold">"Ahmad"</h1>
                <div class="relative h-12 md:h-20 overflow-hidden">
                    {SUBTITLES
                        .iter()
                        .enumerate()
                        .map(|(i, text)| {
                            view! {
                                <h2
                                    class="absolute inset-0 text-xl md:text-4xl font-light flex items-center justify-center transition-all duration-500"
                                    class=("opacity-100", move || subtitle.get() == i)
                                    class=("opacity-0", move || subtitle.get() != i)
                                >
                                    {*text}
                                </h2>
                            }
                        })
                        .collect_view()}
                </div>
                <p class="text-base md:text-xl text-foreground/70 max-w-2xl mx-auto leading-relaxed font-light">
                    "I'm Ahmad, a creative Full-Stack developer & designer crafting modern web experiences with design-driven frontends and scalable backends."
                </p>
                <div class="flex justify-center items-center pt-6 md:pt-8">
                    <button
                        class="px-6 py-3 md:px-8 md:py-4 rounded-xl bg-gradient-to-r from-blue to-purple font-medium hover:scale-105 transition-transform duration-200"
                        on:click=move |_| scroll_to_id("contact")
                    >
                        "Get In Touch"
                    </button>
                </div>
            </div>
        </section>
    }
}
