use std::{sync::Arc, time::Duration};

use codee::string::FromToStringCodec;
use leptos::{either::*, prelude::*};
use leptos_use::storage::use_local_storage;

use crate::{
    intro::{IntroSequencer, IntroTiming, Stage, Status},
    schedule::Scheduler,
    storage::{FlagStore, IntroFlag, StorageError, INTRO_SHOWN_KEY},
};

/// `setTimeout` backed scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    type Handle = TimeoutHandle;

    fn schedule(&self, after: Duration, task: Box<dyn FnOnce()>) -> Option<TimeoutHandle> {
        set_timeout_with_handle(task, after)
            .map_err(|e| log::error!("setTimeout failed: {e:?}"))
            .ok()
    }

    fn cancel(&self, handle: TimeoutHandle) {
        handle.clear();
    }
}

/// The `introShown` key in `localStorage`.
#[derive(Clone)]
pub struct LocalFlagStore {
    value: Signal<String>,
    set_value: WriteSignal<String>,
    remove: Arc<dyn Fn() + Send + Sync>,
}

impl LocalFlagStore {
    /// Must be called from a component body.
    pub fn new() -> Self {
        let (value, set_value, remove) =
            use_local_storage::<String, FromToStringCodec>(INTRO_SHOWN_KEY);
        Self {
            value,
            set_value,
            remove: Arc::new(remove),
        }
    }
}

impl FlagStore for LocalFlagStore {
    fn read(&self) -> Result<Option<String>, StorageError> {
        let value = self
            .value
            .try_get_untracked()
            .ok_or(StorageError::Unavailable)?;
        Ok(Some(value).filter(|v| !v.is_empty()))
    }

    fn write(&self, value: &str) -> Result<(), StorageError> {
        self.set_value
            .try_set(value.to_string())
            .map_or(Ok(()), |_| {
                Err(StorageError::WriteFailed("storage signal disposed".to_string()))
            })
    }

    fn clear(&self) -> Result<(), StorageError> {
        (self.remove)();
        Ok(())
    }
}

type BrowserSequencer = IntroSequencer<BrowserScheduler, LocalFlagStore>;

/// Replays the intro from anywhere under an `IntroGate`.
#[derive(Clone, Copy)]
pub struct ReplayIntro(pub Callback<()>);

/// Plays the intro overlay on a first visit and only renders `children` once
/// it has completed (or was already shown).
#[component]
pub fn IntroGate(
    #[prop(optional)] timing: Option<IntroTiming>,
    children: ChildrenFn,
) -> impl IntoView {
    let timing = timing.unwrap_or_default();
    let store = LocalFlagStore::new();
    let sequencer = StoredValue::new_local(None::<BrowserSequencer>);
    let (status, set_status) = signal(None::<Status>);
    let (ready, set_ready) = signal(false);
    let (run, set_run) = signal(0_u32);

    let teardown = move || {
        sequencer.try_update_value(|s| {
            if let Some(s) = s.take() {
                s.dispose();
            }
        });
    };

    // effects only run in the browser, after hydration has loaded the flag
    Effect::watch(
        move || run.get(),
        {
            let store = store.clone();
            move |_, _, _| {
                teardown();
                let seq = IntroSequencer::initialize(
                    IntroFlag::new(store.clone()),
                    BrowserScheduler,
                    timing,
                    move || set_ready.set(true),
                );
                seq.observe(move |s| set_status.set(Some(s)));
                if !seq.is_active() {
                    set_ready.set(true);
                }
                seq.start();
                sequencer.set_value(Some(seq));
            }
        },
        true,
    );
    on_cleanup(teardown);

    let replay = Callback::new(move |_| {
        log::info!("replaying intro");
        IntroFlag::new(store.clone()).reset();
        set_ready.set(false);
        set_run.update(|n| *n += 1);
    });
    provide_context(ReplayIntro(replay));

    let skip = move |_: leptos::ev::MouseEvent| {
        sequencer.with_value(|s| {
            if let Some(s) = s {
                s.skip();
            }
        })
    };

    view! {
        {move || {
            status
                .get()
                .and_then(|s| match s {
                    Status::Active(state) => Some(state),
                    _ => None,
                })
                .map(|state| {
                    view! {
                        <IntroOverlay
                            stage=state.stage
                            progress=state.progress
                            skipping=state.skip_requested
                            on_skip=skip
                        />
                    }
                })
        }}
        <Show when=move || ready.get()>{children()}</Show>
    }
}

#[component]
fn IntroOverlay(
    stage: Stage,
    progress: f64,
    skipping: bool,
    on_skip: impl Fn(leptos::ev::MouseEvent) + 'static,
) -> impl IntoView {
    let body = match stage {
        Stage::Loading => EitherOf3::A(view! {
            <div class="absolute inset-0 flex flex-col items-center justify-center pointer-events-none intro-fade">
                <div class="relative w-48 h-48 md:w-64 md:h-64 flex items-center justify-center">
                    <div class="absolute inset-0 rounded-full border border-cyan/30 intro-ring" />
                    <div class="absolute w-32 h-32 rounded-full bg-cyan/10 blur-xl intro-pulse" />
                    <div class="relative z-10 font-black text-4xl md:text-6xl tracking-tighter">
                        {progress.round() as u32}
                        <span class="text-sm md:text-lg align-top ml-1 text-cyan">"%"</span>
                    </div>
                </div>
                <div class="mt-8 text-[10px] font-bold tracking-[0.5em] text-cyan/60 uppercase">
                    "Initializing Core Systems"
                </div>
            </div>
        }),
        Stage::Revealing => EitherOf3::B(view! {
            <div class="absolute inset-0 flex flex-col items-center justify-center z-10 intro-fade">
                <h1 class="text-[12vw] leading-none font-black tracking-tighter intro-rise">
                    "AHMAD"
                </h1>
                <div class="h-1 bg-cyan mt-4 rounded-full intro-underline" />
                <p class="mt-8 text-sm md:text-xl font-light text-foreground/60 tracking-[0.3em] uppercase text-center px-4">
                    "Creative Developer"
                </p>
            </div>
        }),
        Stage::Exiting => EitherOf3::C(view! {
            <div class="absolute inset-0 bg-black z-50 pointer-events-none intro-curtain" />
        }),
    };

    view! {
        <div class="fixed inset-0 z-[100] bg-black overflow-hidden" aria-live="polite">
            {(!skipping && stage != Stage::Exiting)
                .then(|| {
                    view! {
                        <button
                            class="absolute top-6 right-6 z-[110] px-4 py-2 text-xs tracking-widest uppercase border border-foreground/20 rounded-full hover:bg-foreground/10 transition-colors duration-200"
                            on:click=on_skip
                        >
                            "Skip Intro"
                        </button>
                    }
                })}
            {body}
        </div>
    }
}
