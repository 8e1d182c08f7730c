mod contact;
mod hero;
mod intro;
mod motion;
mod projects;

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::{components::*, path};

use contact::Contact;
use hero::{scroll_to_id, Hero};
use intro::{IntroGate, ReplayIntro};
use motion::{RevealSection, ScrollProgress};
use projects::Projects;

use crate::{
    intro::IntroTiming,
    scroll::{section_reveal, ScrollMapping},
};

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <meta name="color-scheme" content="dark" />
                <link rel="shortcut icon" type="image/ico" href="/favicon.ico" />
                <link rel="stylesheet" id="leptos" href="/pkg/portfolio-site.css" />
                <MetaTags />
            </head>
            <body class="bg-black text-foreground antialiased">
                <App />
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    view! {
        <Title formatter=|title| format!("Ahmad - {title}") />
        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=path!("/") view=HomePage />
            </Routes>
        </Router>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    let reveal = Arc::new(section_reveal().unwrap_or_else(|e| {
        log::error!("section reveal disabled: {e}");
        ScrollMapping::new()
    }));

    view! {
        <Title text="Portfolio" />
        <IntroGate timing=IntroTiming::configured()>
            <ScrollProgress />
            <main class="flex flex-col w-full overflow-x-hidden">
                <Hero />
                <Skills reveal=reveal.clone() />
                <Projects reveal=reveal.clone() />
                <Contact />
            </main>
            <Footer />
        </IntroGate>
    }
}

struct SkillGroup {
    title: &'static str,
    subtitle: &'static str,
    description: &'static str,
    features: [&'static str; 4],
}

const SKILL_GROUPS: [SkillGroup; 3] = [
    SkillGroup {
        title: "Frontend Engineering",
        subtitle: "UI/UX Systems",
        description: "Architecting responsive interfaces with a focus on fluid interactions.",
        features: [
            "React & Next.js Systems",
            "Motion Design Frameworks",
            "Performance Optimization",
            "Typed State Orchestration",
        ],
    },
    SkillGroup {
        title: "Backend Core",
        subtitle: "Scalable Infrastructure",
        description: "Building resilient services and high-concurrency server architectures.",
        features: [
            "Distributed Computing",
            "Real-time Protocols",
            "Secure API Ecosystems",
            "Data Persistence Models",
        ],
    },
    SkillGroup {
        title: "Software Evolution",
        subtitle: "DevOps & Cloud",
        description: "Shipping with modern CI/CD pipelines and containerized environments.",
        features: [
            "Cloud Native Orchestration",
            "Edge Compute Deployment",
            "Zero-Trust Architectures",
            "Automated Scaling Logic",
        ],
    },
];

#[component]
fn Skills(reveal: Arc<ScrollMapping>) -> impl IntoView {
    view! {
        <RevealSection id="skills" class="py-16 md:py-32 px-4 max-w-6xl mx-auto" mapping=reveal>
            <h2 class="text-3xl md:text-5xl font-bold text-center mb-12">"What I Do"</h2>
            <div class="grid md:grid-cols-3 gap-6">
                {SKILL_GROUPS
                    .iter()
                    .map(|g| {
                        view! {
                            <div class="p-6 rounded-2xl bg-brightBlack/20 border border-muted/30">
                                <p class="text-xs tracking-widest uppercase text-cyan mb-2">
                                    {g.subtitle}
                                </p>
                                <h3 class="text-xl font-bold mb-3">{g.title}</h3>
                                <p class="text-sm text-foreground/70 mb-4">{g.description}</p>
                                <ul class="text-sm space-y-1">
                                    {g.features.iter().map(|f| view! { <li>{*f}</li> }).collect_view()}
                                </ul>
                            </div>
                        }
                    })
                    .collect_view()}
            </div>
        </RevealSection>
    }
}

fn build_time() -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(env!("BUILD_TIME"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[component]
fn Footer() -> impl IntoView {
    let year = Utc::now().year();
    let built = build_time()
        .map(|dt| dt.format("%b %e %Y, %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let replay = use_context::<ReplayIntro>();

    view! {
        <footer class="py-12 px-4 border-t border-muted/30 text-sm text-muted">
            <div class="max-w-6xl mx-auto flex flex-col md:flex-row items-center justify-between gap-4">
                <p>{format!("© {year} Ahmad. All rights reserved.")}</p>
                <p>"Built " {built}</p>
                <div class="flex gap-4">
                    {replay
                        .map(|ReplayIntro(replay)| {
                            view! {
                                <button
                                    class="hover:text-cyan transition-colors duration-200"
                                    on:click=move |_| replay.run(())
                                >
                                    "Replay intro"
                                </button>
                            }
                        })}
                    <button
                        class="hover:text-cyan transition-colors duration-200"
                        on:click=move |_| scroll_to_id("hero")
                    >
                        "Back to top ↑"
                    </button>
                </div>
            </div>
        </footer>
    }
}
