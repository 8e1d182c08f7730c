use std::sync::Arc;

use leptos::{either::*, prelude::*, server_fn::codec::GetUrl};

use super::motion::RevealSection;
#[cfg(feature = "ssr")]
use crate::projects::get_projects;
#[cfg(feature = "hydrate")]
use crate::projects::remember;
use crate::projects::{categories, Carousel, Project, GLOBAL_PROJECT_CACHE};
use crate::scroll::ScrollMapping;

#[server(input = GetUrl)]
pub async fn get_projects_server(category: String) -> Result<Vec<Project>, ServerFnError> {
    get_projects(&category).map_err(|e| {
        tracing::error!("loading projects failed: {e}");
        ServerFnError::new(e)
    })
}

async fn load_projects(category: String) -> Result<Vec<Project>, ServerFnError> {
    let cache = &*GLOBAL_PROJECT_CACHE;
    if let Some(p) = cache.get(&category) {
        return Ok((*p).clone());
    }
    let loaded = get_projects_server(category.clone()).await;
    if let Err(e) = &loaded {
        log::warn!("loading projects for {category:?} failed: {e}");
    }
    // only cache on the browser, the server keeps its own
    #[cfg(feature = "hydrate")]
    remember(cache, category, &loaded);
    loaded
}

#[component]
pub fn Projects(reveal: Arc<ScrollMapping>) -> impl IntoView {
    let (category, set_category) = signal(String::new());
    let (carousel, set_carousel) = signal(Carousel::default());
    let all = Resource::new(|| (), |_| load_projects(String::new()));
    let shown = Resource::new(category, load_projects);

    view! {
        <RevealSection id="portfolio" class="py-16 md:py-32 px-4 max-w-6xl mx-auto" mapping=reveal>
            <div class="text-center mb-12">
                <h2 class="text-3xl md:text-5xl font-bold mb-4">"Featured Work"</h2>
                <p class="text-base md:text-xl text-foreground/80 max-w-3xl mx-auto">
                    "A few recent projects across full-stack development, UI/UX design and problem solving."
                </p>
            </div>
            <Transition>
                {move || Suspend::new(async move {
                    let cats = all.await.map(|p| categories(&p)).unwrap_or_default();
                    view! {
                        <div class="flex flex-wrap justify-center gap-2 mb-8">
                            <CategoryButton
                                label="All"
                                value=String::new()
                                category=category
                                set_category=set_category
                            />
                            {cats
                                .into_iter()
                                .map(|c| {
                                    view! {
                                        <CategoryButton
                                            label=c.clone()
                                            value=c.to_lowercase()
                                            category=category
                                            set_category=set_category
                                        />
                                    }
                                })
                                .collect_view()}
                        </div>
                    }
                })}
            </Transition>
            <Transition fallback=move || {
                view! { <div class="loading-skeleton h-96 rounded-2xl"></div> }
            }>
                {move || Suspend::new(async move {
                    let projects = match shown.await {
                        Ok(projects) => projects,
                        Err(_) => {
                            set_carousel.update(|c| c.resize(0));
                            return EitherOf3::A(view! {
                                <div class="text-center space-y-4">
                                    <p class="text-red">"Couldn't load projects."</p>
                                    <button
                                        class="px-4 py-1 rounded-full border border-muted text-sm hover:bg-foreground/10"
                                        on:click=move |_| {
                                            all.refetch();
                                            shown.refetch();
                                        }
                                    >
                                        "Try again"
                                    </button>
                                </div>
                            });
                        }
                    };
                    set_carousel.update(|c| c.resize(projects.len()));
                    if projects.is_empty() {
                        return EitherOf3::B(
                            view! { <p class="text-center text-muted">"No projects in this category yet."</p> },
                        );
                    }
                    let projects = Arc::new(projects);
                    let len = projects.len();
                    EitherOf3::C(view! {
                        <div class="relative">
                            {move || {
                                let idx = carousel.get().index();
                                projects.get(idx).cloned().map(|p| view! { <ProjectCard project=p /> })
                            }}
                            <div class="flex items-center justify-center gap-4 mt-6">
                                <button
                                    class="px-3 py-2 rounded-full border border-muted hover:bg-foreground/10"
                                    aria-label="Previous project"
                                    on:click=move |_| set_carousel.update(Carousel::prev)
                                >
                                    "←"
                                </button>
                                {(0..len)
                                    .map(|i| {
                                        view! {
                                            <button
                                                class="w-2 h-2 rounded-full transition-colors duration-200"
                                                class=("bg-cyan", move || carousel.get().index() == i)
                                                class=("bg-muted", move || carousel.get().index() != i)
                                                aria-label=format!("Show project {}", i + 1)
                                                on:click=move |_| set_carousel.update(|c| c.select(i))
                                            />
                                        }
                                    })
                                    .collect_view()}
                                <button
                                    class="px-3 py-2 rounded-full border border-muted hover:bg-foreground/10"
                                    aria-label="Next project"
                                    on:click=move |_| set_carousel.update(Carousel::next)
                                >
                                    "→"
                                </button>
                            </div>
                        </div>
                    })
                })}
            </Transition>
        </RevealSection>
    }
}

#[component]
fn CategoryButton(
    #[prop(into)] label: String,
    value: String,
    category: ReadSignal<String>,
    set_category: WriteSignal<String>,
) -> impl IntoView {
    let active = {
        let value = value.clone();
        move || category.get() == value
    };
    view! {
        <button
            class="px-4 py-1 rounded-full border text-sm transition-colors duration-200"
            class=("border-cyan", active.clone())
            class=("text-cyan", active)
            on:click=move |_| set_category.set(value.clone())
        >
            {label}
        </button>
    }
}

#[component]
fn ProjectCard(project: Project) -> impl IntoView {
    view! {
        <article class="grid md:grid-cols-2 gap-6 md:gap-10 items-center bg-brightBlack/20 rounded-2xl p-4 md:p-8">
            <img
                src=project.image
                alt=project.title.clone()
                class="w-full h-64 md:h-80 object-cover rounded-xl"
                loading="lazy"
            />
            <div class="space-y-4">
                <div class="flex items-center gap-3 text-sm text-muted">
                    <span>{project.category}</span>
                    <span>"·"</span>
                    <span>{project.year}</span>
                    {project.featured.then(|| view! { <span class="text-yellow">"★ Featured"</span> })}
                </div>
                <h3 class="text-2xl md:text-3xl font-bold">{project.title}</h3>
                <p class="text-foreground/80 leading-relaxed">{project.description}</p>
                <div class="flex flex-wrap gap-2">
                    {project
                        .tags
                        .into_iter()
                        .map(|tag| {
                            view! {
                                <span class="rounded-md px-2 py-1 bg-brightBlack text-sm">{tag}</span>
                            }
                        })
                        .collect_view()}
                </div>
                <div class="flex gap-4 pt-2">
                    <a
                        href=project.link
                        target="_blank"
                        rel="noopener noreferrer"
                        class="text-cyan hover:underline"
                    >
                        "Live site"
                    </a>
                    {(project.github != "#")
                        .then(|| {
                            view! {
                                <a
                                    href=project.github
                                    target="_blank"
                                    rel="noopener noreferrer"
                                    class="text-muted hover:underline"
                                >
                                    "Source"
                                </a>
                            }
                        })}
                </div>
            </div>
        </article>
    }
}
