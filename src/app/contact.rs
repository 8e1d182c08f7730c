use std::time::Duration;

use leptos::{html, prelude::*};

use super::intro::BrowserScheduler;
use crate::{contact::ContactForm, schedule::Timeout};

const PROJECT_KINDS: [&str; 5] = [
    "Web Development",
    "UI/UX Design",
    "Mobile App",
    "Consulting",
    "Other",
];
const SENT_NOTICE: Duration = Duration::from_secs(3);

#[server]
pub async fn submit_contact(form: ContactForm) -> Result<String, ServerFnError> {
    use std::sync::LazyLock;

    use crate::{
        config::SiteConfig,
        contact::{submit, ContactError},
    };

    static CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default()
    });

    let config = SiteConfig::from_env().map_err(|e| {
        tracing::error!("contact form not configured: {e}");
        ServerFnError::new(ContactError::NotConfigured(e.to_string()))
    })?;
    submit(&CLIENT, &config, &form)
        .await
        .map_err(ServerFnError::new)
}

#[component]
pub fn Contact() -> impl IntoView {
    let name_ref = NodeRef::<html::Input>::new();
    let email_ref = NodeRef::<html::Input>::new();
    let company_ref = NodeRef::<html::Input>::new();
    let project_ref = NodeRef::<html::Select>::new();
    let message_ref = NodeRef::<html::Textarea>::new();

    let send = ServerAction::<SubmitContact>::new();
    let (local_err, set_local_err) = signal(None::<String>);
    let (sent, set_sent) = signal(false);
    let notice = StoredValue::new_local(Timeout::new(BrowserScheduler));
    on_cleanup(move || {
        notice.try_update_value(Timeout::cancel);
    });

    let read_form = move || ContactForm {
        name: name_ref.get_untracked().map(|el| el.value()).unwrap_or_default(),
        email: email_ref.get_untracked().map(|el| el.value()).unwrap_or_default(),
        company: company_ref
            .get_untracked()
            .map(|el| el.value())
            .unwrap_or_default(),
        project: project_ref
            .get_untracked()
            .map(|el| el.value())
            .unwrap_or_default(),
        message: message_ref
            .get_untracked()
            .map(|el| el.value())
            .unwrap_or_default(),
    };

    let clear_form = move || {
        for el in [name_ref, email_ref, company_ref].into_iter().filter_map(|r| r.get_untracked()) {
            el.set_value("");
        }
        if let Some(el) = project_ref.get_untracked() {
            el.set_value("");
        }
        if let Some(el) = message_ref.get_untracked() {
            el.set_value("");
        }
    };

    Effect::watch(
        move || send.value().get(),
        move |res, _, _| match res {
            Some(Ok(_)) => {
                clear_form();
                set_sent.set(true);
                notice.update_value(|t| t.arm(SENT_NOTICE, move || set_sent.set(false)));
            }
            Some(Err(e)) => log::warn!("contact form failed: {e}"),
            None => {}
        },
        false,
    );

    let remote_err = move || {
        send.value()
            .get()
            .and_then(|res| res.err())
            .map(|_| "Failed to send your message. Please try again later.".to_string())
    };

    view! {
        <section id="contact" class="py-16 md:py-32 px-4 max-w-4xl mx-auto">
            <div class="text-center mb-12">
                <h2 class="text-3xl md:text-5xl font-bold mb-4">"Let's Work Together"</h2>
                <p class="text-base md:text-xl text-muted max-w-3xl mx-auto">
                    "Have a project in mind? Send a message and I'll get back to you."
                </p>
            </div>
            <Show
                when=move || !sent.get()
                fallback=|| {
                    view! {
                        <div class="text-center p-8 rounded-2xl bg-green/10 border border-green/30">
                            <p class="text-green text-lg font-medium">"Send is successful"</p>
                        </div>
                    }
                }
            >
                <form
                    class="grid gap-4"
                    on:submit=move |ev| {
                        ev.prevent_default();
                        let form = read_form();
                        if let Err(e) = form.validate() {
                            set_local_err.set(Some(e.to_string()));
                            return;
                        }
                        set_local_err.set(None);
                        send.dispatch(SubmitContact { form });
                    }
                >
                    <div class="grid md:grid-cols-2 gap-4">
                        <input
                            node_ref=name_ref
                            name="name"
                            placeholder="Your Name"
                            class="w-full px-4 py-3 rounded-xl border border-muted bg-background focus:outline-none focus:ring-2 focus:ring-cyan"
                        />
                        <input
                            node_ref=email_ref
                            name="email"
                            type="email"
                            placeholder="Email Address"
                            class="w-full px-4 py-3 rounded-xl border border-muted bg-background focus:outline-none focus:ring-2 focus:ring-cyan"
                        />
                    </div>
                    <div class="grid md:grid-cols-2 gap-4">
                        <input
                            node_ref=company_ref
                            name="company"
                            placeholder="Company"
                            class="w-full px-4 py-3 rounded-xl border border-muted bg-background focus:outline-none focus:ring-2 focus:ring-cyan"
                        />
                        <select
                            node_ref=project_ref
                            name="project"
                            class="w-full px-4 py-3 rounded-xl border border-muted bg-background focus:outline-none focus:ring-2 focus:ring-cyan"
                        >
                            <option value="">"Project Type"</option>
                            {PROJECT_KINDS
                                .iter()
                                .map(|kind| view! { <option value=*kind>{*kind}</option> })
                                .collect_view()}
                        </select>
                    </div>
                    <textarea
                        node_ref=message_ref
                        name="message"
                        rows="6"
                        placeholder="Tell me about your project..."
                        class="w-full px-4 py-3 rounded-xl border border-muted bg-background resize-none focus:outline-none focus:ring-2 focus:ring-cyan"
                    />
                    {move || {
                        local_err
                            .get()
                            .or_else(remote_err)
                            .map(|msg| view! { <p class="text-red text-sm">{msg}</p> })
                    }}
                    <button
                        type="submit"
                        class="px-6 py-3 rounded-xl bg-gradient-to-r from-blue to-purple font-medium disabled:opacity-50 transition-opacity duration-200"
                        disabled=move || send.pending().get()
                    >
                        {move || if send.pending().get() { "Sending..." } else { "Send Message" }}
                    </button>
                </form>
            </Show>
        </section>
    }
}
